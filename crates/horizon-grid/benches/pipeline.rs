use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use horizon_grid::{
    ColumnDef, FilterCondition, GridBuilder, GridEngine, Record, SortDirection, record,
};

const DEPARTMENTS: [&str; 6] = ["Engineering", "Sales", "Support", "Finance", "Legal", "Ops"];

fn rows(count: usize) -> Vec<Record> {
    (0..count)
        .map(|n| {
            record! {
                "id" => n,
                "name" => format!("employee {n}"),
                "age" => (n * 37) % 50 + 18,
                "department" => DEPARTMENTS[n % DEPARTMENTS.len()],
                "active" => n % 4 != 0,
            }
        })
        .collect()
}

fn builder(count: usize) -> GridBuilder<Record> {
    GridEngine::builder()
        .columns([
            ColumnDef::field("id"),
            ColumnDef::field("name"),
            ColumnDef::field("age"),
            ColumnDef::field("department"),
            ColumnDef::field("active"),
        ])
        .rows(rows(count))
        .configure(|options| {
            options.enable_grouping = true;
            options.enable_pagination = true;
            options.page_size = 100;
        })
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline");

    for n in [1_000, 10_000] {
        // --- Filter + sort: the common interactive path ---
        group.bench_with_input(BenchmarkId::new("FilterSort", n), &n, |b, &n| {
            b.iter_batched(
                || builder(n).build().unwrap(),
                |mut grid| {
                    grid.filter_column("age", Some(FilterCondition::greater_than("age", 30)));
                    grid.sort_column("age", Some(SortDirection::Desc));
                    black_box(grid.row_count())
                },
                BatchSize::LargeInput,
            )
        });

        // --- Text sort: every comparison goes through collation ---
        group.bench_with_input(BenchmarkId::new("SortText", n), &n, |b, &n| {
            b.iter_batched(
                || builder(n).build().unwrap(),
                |mut grid| {
                    grid.sort_column("name", Some(SortDirection::Asc));
                    black_box(grid.row_count())
                },
                BatchSize::LargeInput,
            )
        });

        // --- Two-level grouping with a collapsed group ---
        group.bench_with_input(BenchmarkId::new("GroupTwoLevels", n), &n, |b, &n| {
            b.iter_batched(
                || builder(n).build().unwrap(),
                |mut grid| {
                    grid.group_by_columns(["department", "active"]);
                    grid.toggle_group("Sales");
                    black_box(grid.processed_row_count())
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_viewport(c: &mut Criterion) {
    let mut grid = builder(10_000)
        .configure(|options| options.enable_pagination = false)
        .build()
        .unwrap();

    c.bench_function("Viewport/ScrollAndRange", |b| {
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 173.0) % 300_000.0;
            grid.set_scroll_top(offset);
            black_box(grid.visible_rows().len())
        })
    });
}

criterion_group!(benches, bench_pipeline, bench_viewport);
criterion_main!(benches);

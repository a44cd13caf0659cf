//! End-to-end scenarios driven through the public grid API.

use std::sync::Arc;

use horizon_grid::{
    CellValue, ColumnDef, DisplayRow, FilterCondition, GridConfig, GridEngine, Record, RowData,
    RowKind, SortDirection, record,
};
use parking_lot::Mutex;

const DEPARTMENTS: [&str; 6] = ["Engineering", "Sales", "Support", "Finance", "Legal", "Ops"];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ages(count: usize) -> Vec<Record> {
    (0..count)
        .map(|n| record! { "id" => n, "age" => (n * 37) % 80 + 10 })
        .collect()
}

fn staff(count: usize) -> Vec<Record> {
    (0..count)
        .map(|n| {
            record! {
                "id" => n,
                "department" => DEPARTMENTS[(n * 7) % DEPARTMENTS.len()],
                "active" => n % 4 != 0,
                "salary" => 40_000 + (n * 7919) % 60_000,
            }
        })
        .collect()
}

fn number(row: &DisplayRow<Record>, key: &str) -> f64 {
    row.data()
        .and_then(|item| item.field(key))
        .and_then(|value| value.as_f64())
        .unwrap_or(f64::NAN)
}

#[test]
fn test_filter_then_sort_ten_thousand_rows() {
    init_tracing();
    let data = ages(10_000);
    let expected = data
        .iter()
        .filter(|row| row.field("age").is_some_and(|age| age.to_number() > 30.0))
        .count();

    let mut grid = GridEngine::builder()
        .columns([ColumnDef::field("id"), ColumnDef::field("age")])
        .rows(data)
        .build()
        .unwrap();

    grid.filter_column("age", Some(FilterCondition::greater_than("age", 30)));
    grid.sort_column("age", Some(SortDirection::Desc));

    let rows = grid.rows();
    assert_eq!(rows.len(), expected);
    assert!(rows.iter().all(|row| number(row, "age") > 30.0));
    assert!(rows.windows(2).all(|pair| number(&pair[0], "age") >= number(&pair[1], "age")));
    assert_eq!(grid.viewport().total_rows(), expected);
}

#[test]
fn test_two_level_grouping() {
    init_tracing();
    let mut grid = GridEngine::builder()
        .columns([
            ColumnDef::field("id"),
            ColumnDef::field("department"),
            ColumnDef::field("active"),
            ColumnDef::field("salary"),
        ])
        .rows(staff(100))
        .configure(|options| options.enable_grouping = true)
        .build()
        .unwrap();

    grid.sort_column("salary", Some(SortDirection::Asc));
    let sorted_ids: Vec<f64> = grid.rows().iter().map(|row| number(row, "id")).collect();

    grid.group_by_columns(["department", "active"]);
    let rows = grid.rows();

    let top_level: Vec<&DisplayRow<Record>> = rows
        .iter()
        .filter(|row| row.is_group() && row.group_level() == 0)
        .collect();
    assert!(top_level.len() <= 6);
    assert!(rows[0].is_group() && rows[0].group_level() == 0);

    let mut position = 0;
    while position < rows.len() {
        let header = rows[position].group().unwrap();
        assert_eq!(header.level, 0);
        position += 1;

        let mut second_level = 0;
        while position < rows.len() && rows[position].is_group() && rows[position].group_level() == 1 {
            let sub = rows[position].group().unwrap();
            assert_eq!(sub.level, 1);
            assert!(sub.key.starts_with(&format!("{}|", header.key)));
            second_level += 1;
            position += 1;

            let members: Vec<f64> = rows[position..]
                .iter()
                .take_while(|row| !row.is_group())
                .map(|row| number(row, "id"))
                .collect();
            assert_eq!(members.len(), sub.member_count());
            position += members.len();

            // members keep their post-sort relative order
            let ranks: Vec<usize> = members
                .iter()
                .map(|id| sorted_ids.iter().position(|sorted| sorted == id).unwrap())
                .collect();
            assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
        }
        assert!((1..=2).contains(&second_level));
    }

    let data_rows = rows.iter().filter(|row| !row.is_group()).count();
    assert_eq!(data_rows, 100);
}

#[test]
fn test_collapse_survives_resort_and_refilter() {
    let mut grid = GridEngine::builder()
        .columns([
            ColumnDef::field("department"),
            ColumnDef::field("active"),
            ColumnDef::field("salary"),
        ])
        .rows(staff(60))
        .configure(|options| options.enable_grouping = true)
        .build()
        .unwrap();
    grid.group_by_columns(["department"]);
    grid.toggle_group("Sales");

    grid.sort_column("salary", Some(SortDirection::Desc));
    grid.filter_column("active", Some(FilterCondition::equals("active", true)));

    let rows = grid.rows();
    let sales = rows
        .iter()
        .position(|row| row.group_key() == Some("Sales"))
        .unwrap();
    assert!(!rows[sales].is_expanded());
    assert!(rows.get(sales + 1).is_none_or(DisplayRow::is_group));
}

#[test]
fn test_paging_through_groups() {
    let mut grid = GridEngine::builder()
        .columns([ColumnDef::field("department"), ColumnDef::field("id")])
        .rows(staff(30))
        .configure(|options| {
            options.enable_grouping = true;
            options.enable_pagination = true;
            options.page_size = 8;
        })
        .build()
        .unwrap();
    grid.group_by_columns(["department"]);

    // 30 rows under 6 headers
    assert_eq!(grid.processed_row_count(), 36);
    let pagination = grid.pagination_state().unwrap();
    assert_eq!(pagination.total_pages, 5);

    let mut seen = Vec::new();
    for page in 1..=pagination.total_pages {
        grid.set_page(page);
        seen.extend(grid.rows().iter().map(|row| match &row.kind {
            RowKind::Group(node) => format!("group:{}", node.key),
            RowKind::Data { source_index, .. } => format!("row:{source_index}"),
        }));
    }
    assert_eq!(seen.len(), 36);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 36);
}

#[test]
fn test_notifications_arrive_before_return() {
    let mut grid = GridEngine::builder()
        .columns([ColumnDef::field("age")])
        .rows(ages(50))
        .build()
        .unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    let data_log = log.clone();
    grid.signals()
        .data_changed
        .connect(move |rows| data_log.lock().push(format!("data:{}", rows.len())));
    let sort_log = log.clone();
    grid.signals()
        .sort_changed
        .connect(move |(column_id, direction)| {
            sort_log.lock().push(format!("sort:{column_id}:{direction:?}"));
        });

    grid.sort_column("age", Some(SortDirection::Asc));
    assert_eq!(*log.lock(), ["data:50", "sort:age:Some(Asc)"]);
}

#[test]
fn test_grid_from_json_config() {
    let config = GridConfig::from_json_str(
        r#"{
            "enablePagination": true,
            "pageSize": 10,
            "enableSelection": true,
            "selectionType": "single",
            "columns": [
                { "id": "name", "field": "name", "headerName": "Name" },
                { "id": "age", "field": "age", "type": "number", "sortable": true }
            ]
        }"#,
    )
    .unwrap();

    let mut grid: GridEngine<serde_json::Value> = GridEngine::from_config(config).unwrap();
    let rows: Vec<serde_json::Value> = (0..25)
        .map(|n| serde_json::json!({ "name": format!("user{n}"), "age": 20 + n }))
        .collect();
    grid.set_row_data(rows);

    assert_eq!(grid.row_count(), 10);
    assert_eq!(grid.pagination_state().map(|p| p.total_pages), Some(3));
    assert_eq!(grid.export_headers(), ["Name", "age"]);

    grid.sort_column("age", Some(SortDirection::Desc));
    assert_eq!(grid.cell_value(0, "age"), Some(CellValue::from(44)));

    grid.select_row(0, true);
    grid.select_row(1, true);
    assert_eq!(grid.selected_indices(), vec![1]);
}

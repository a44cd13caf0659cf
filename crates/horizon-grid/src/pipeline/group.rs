//! Group stage.
//!
//! Partitions the sorted sequence recursively, one grouping column per level.
//! Groups appear in first-seen order and members keep their sorted order.
//! Every group emits a [`GroupNode`] header; unless its composite key is in
//! the collapsed set, the header is followed by its subgroups or, at the last
//! level, by its member rows.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::PipelineItem;
use crate::column::{Column, ColumnRegistry};
use crate::data::RowData;
use crate::options::{AggregateFunction, AggregationConfig};
use crate::row::{GroupAggregate, GroupNode};
use crate::value::CellValue;

/// Separator between the level values of a composite group key.
pub const GROUP_KEY_SEPARATOR: char = '|';

/// Builds the composite key of a group from its ancestor key and value.
///
/// Values are joined without escaping, so a value containing `|` can make
/// headers at different levels share a key: a top-level `"x|y"` and the
/// subgroup `"y"` under `"x"` both become `"x|y"`. Collapsing is keyed by
/// this string and affects every header that shares it. Row identity uses
/// [`GroupNode::path`] instead, which keeps the levels apart.
pub fn composite_key(parent: Option<&str>, value: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}{GROUP_KEY_SEPARATOR}{value}"),
        None => value.to_string(),
    }
}

struct Grouper<'a, R> {
    rows: &'a [Arc<R>],
    columns: &'a ColumnRegistry<R>,
    group_by: &'a [String],
    collapsed: &'a BTreeSet<String>,
    aggregations: &'a [AggregationConfig],
}

impl<R: RowData> Grouper<'_, R> {
    fn build(
        &self,
        indices: &[usize],
        level: usize,
        parent: Option<(&str, &[String])>,
        out: &mut Vec<PipelineItem<R>>,
    ) {
        let column_id = &self.group_by[level];
        let column = self.columns.get(column_id);

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for &index in indices {
            let value = column.map_or_else(String::new, |column| {
                column.get_value(&self.rows[index]).to_string()
            });
            match positions.get(&value) {
                Some(&position) => groups[position].1.push(index),
                None => {
                    positions.insert(value.clone(), groups.len());
                    groups.push((value, vec![index]));
                }
            }
        }

        let last_level = level + 1 == self.group_by.len();
        for (value, members) in groups {
            let key = composite_key(parent.map(|(key, _)| key), &value);
            let mut path = parent.map_or_else(Vec::new, |(_, path)| path.to_vec());
            path.push(value.clone());
            let expanded = !self.collapsed.contains(&key);

            out.push(PipelineItem::Group(Arc::new(GroupNode {
                aggregates: self.aggregate(&members),
                members: members.iter().map(|&index| self.rows[index].clone()).collect(),
                key: key.clone(),
                path: path.clone(),
                value,
                column_id: column_id.clone(),
                level,
                member_indices: members.clone(),
                expanded,
            })));

            if !expanded {
                continue;
            }
            if last_level {
                out.extend(members.into_iter().map(PipelineItem::Data));
            } else {
                self.build(&members, level + 1, Some((&key, &path)), out);
            }
        }
    }

    fn aggregate(&self, members: &[usize]) -> Vec<GroupAggregate> {
        self.aggregations
            .iter()
            .map(|config| GroupAggregate {
                column_id: config.column_id.clone(),
                function: config.function,
                value: aggregate_column(
                    self.rows,
                    self.columns.get(&config.column_id),
                    members,
                    config.function,
                ),
            })
            .collect()
    }
}

/// Computes one aggregate over the rows at `members`.
///
/// `sum`, `avg`, `min` and `max` use numeric coercion and skip values that
/// coerce to `NaN`; they are `Null` when nothing numeric remains. `count` is
/// the number of member rows.
fn aggregate_column<R: RowData>(
    rows: &[Arc<R>],
    column: Option<&Column<R>>,
    members: &[usize],
    function: AggregateFunction,
) -> CellValue {
    if function == AggregateFunction::Count {
        return CellValue::from(members.len());
    }
    let Some(column) = column else {
        return CellValue::Null;
    };

    let numbers: Vec<f64> = members
        .iter()
        .map(|&index| column.get_value(&rows[index]).to_number())
        .filter(|n| !n.is_nan())
        .collect();
    if numbers.is_empty() {
        return CellValue::Null;
    }

    let result = match function {
        AggregateFunction::Sum => numbers.iter().sum(),
        AggregateFunction::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
        AggregateFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Count => numbers.len() as f64,
    };
    CellValue::Number(result)
}

/// Groups `indices` (sorted raw data positions) by `group_by`.
///
/// With no grouping columns the indices pass through as data items.
pub fn group_rows<R: RowData>(
    rows: &[Arc<R>],
    columns: &ColumnRegistry<R>,
    group_by: &[String],
    collapsed: &BTreeSet<String>,
    aggregations: &[AggregationConfig],
    indices: &[usize],
) -> Vec<PipelineItem<R>> {
    if group_by.is_empty() {
        return indices.iter().copied().map(PipelineItem::Data).collect();
    }

    let grouper = Grouper {
        rows,
        columns,
        group_by,
        collapsed,
        aggregations,
    };
    let mut out = Vec::with_capacity(indices.len());
    grouper.build(indices, 0, None, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::data::Record;
    use crate::record;

    fn rows() -> Vec<Arc<Record>> {
        vec![
            Arc::new(record! { "dept" => "Eng", "active" => true, "salary" => 100 }),
            Arc::new(record! { "dept" => "Ops", "active" => false, "salary" => 50 }),
            Arc::new(record! { "dept" => "Eng", "active" => false, "salary" => 80 }),
            Arc::new(record! { "dept" => "Eng", "active" => true, "salary" => "n/a" }),
        ]
    }

    fn columns() -> ColumnRegistry<Record> {
        ColumnRegistry::new([
            ColumnDef::field("dept"),
            ColumnDef::field("active"),
            ColumnDef::field("salary"),
        ])
    }

    fn describe(items: &[PipelineItem<Record>]) -> Vec<String> {
        items
            .iter()
            .map(|item| match item {
                PipelineItem::Data(index) => format!("row {index}"),
                PipelineItem::Group(node) => format!("group {} @{}", node.key, node.level),
            })
            .collect()
    }

    #[test]
    fn test_no_grouping_passes_through() {
        let items = group_rows(&rows(), &columns(), &[], &BTreeSet::new(), &[], &[2, 0]);
        assert_eq!(describe(&items), vec!["row 2", "row 0"]);
    }

    #[test]
    fn test_single_level_first_seen_order() {
        let items = group_rows(
            &rows(),
            &columns(),
            &["dept".to_string()],
            &BTreeSet::new(),
            &[],
            &[1, 0, 2, 3],
        );
        assert_eq!(
            describe(&items),
            vec!["group Ops @0", "row 1", "group Eng @0", "row 0", "row 2", "row 3"]
        );
    }

    #[test]
    fn test_nested_groups_and_composite_keys() {
        let group_by = ["dept".to_string(), "active".to_string()];
        let items = group_rows(&rows(), &columns(), &group_by, &BTreeSet::new(), &[], &[0, 1, 2, 3]);
        assert_eq!(
            describe(&items),
            vec![
                "group Eng @0",
                "group Eng|true @1",
                "row 0",
                "row 3",
                "group Eng|false @1",
                "row 2",
                "group Ops @0",
                "group Ops|false @1",
                "row 1",
            ]
        );
    }

    #[test]
    fn test_paths_stay_distinct_when_keys_collide() {
        let rows = vec![
            Arc::new(record! { "dept" => "x|y", "active" => "1" }),
            Arc::new(record! { "dept" => "x", "active" => "y" }),
        ];
        let group_by = ["dept".to_string(), "active".to_string()];
        let items = group_rows(&rows, &columns(), &group_by, &BTreeSet::new(), &[], &[0, 1]);

        let paths: Vec<(&str, Vec<String>)> = items
            .iter()
            .filter_map(|item| match item {
                PipelineItem::Group(node) => Some((node.key.as_str(), node.path.clone())),
                PipelineItem::Data(_) => None,
            })
            .collect();
        assert_eq!(
            paths,
            vec![
                ("x|y", vec!["x|y".to_string()]),
                ("x|y|1", vec!["x|y".to_string(), "1".to_string()]),
                ("x", vec!["x".to_string()]),
                ("x|y", vec!["x".to_string(), "y".to_string()]),
            ]
        );
    }

    #[test]
    fn test_collapsed_group_hides_descendants() {
        let group_by = ["dept".to_string(), "active".to_string()];
        let collapsed = BTreeSet::from(["Eng".to_string(), "Ops|false".to_string()]);
        let items = group_rows(&rows(), &columns(), &group_by, &collapsed, &[], &[0, 1, 2, 3]);
        assert_eq!(
            describe(&items),
            vec!["group Eng @0", "group Ops @0", "group Ops|false @1"]
        );

        let PipelineItem::Group(eng) = &items[0] else {
            panic!("expected a group header");
        };
        assert!(!eng.expanded);
        assert_eq!(eng.member_indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_unknown_group_column_groups_under_empty_value() {
        let items = group_rows(
            &rows(),
            &columns(),
            &["nope".to_string()],
            &BTreeSet::new(),
            &[],
            &[0, 1],
        );
        assert_eq!(describe(&items), vec!["group  @0", "row 0", "row 1"]);
    }

    #[test]
    fn test_aggregates() {
        let aggregations = [
            AggregationConfig::new("salary", AggregateFunction::Sum),
            AggregationConfig::new("salary", AggregateFunction::Avg),
            AggregationConfig::new("salary", AggregateFunction::Min),
            AggregationConfig::new("salary", AggregateFunction::Max),
            AggregationConfig::new("salary", AggregateFunction::Count),
            AggregationConfig::new("missing", AggregateFunction::Sum),
        ];
        let items = group_rows(
            &rows(),
            &columns(),
            &["dept".to_string()],
            &BTreeSet::new(),
            &aggregations,
            &[0, 1, 2, 3],
        );
        let PipelineItem::Group(eng) = &items[0] else {
            panic!("expected a group header");
        };
        assert_eq!(eng.aggregate("salary", AggregateFunction::Sum), Some(&CellValue::from(180)));
        assert_eq!(eng.aggregate("salary", AggregateFunction::Avg), Some(&CellValue::from(90)));
        assert_eq!(eng.aggregate("salary", AggregateFunction::Min), Some(&CellValue::from(80)));
        assert_eq!(eng.aggregate("salary", AggregateFunction::Max), Some(&CellValue::from(100)));
        assert_eq!(eng.aggregate("salary", AggregateFunction::Count), Some(&CellValue::from(3)));
        assert_eq!(eng.aggregate("missing", AggregateFunction::Sum), Some(&CellValue::Null));
    }

    #[test]
    fn test_composite_key() {
        assert_eq!(composite_key(None, "Eng"), "Eng");
        assert_eq!(composite_key(Some("Eng"), "true"), "Eng|true");
    }
}

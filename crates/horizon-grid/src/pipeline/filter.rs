//! Filter stage.
//!
//! A row passes when it satisfies every active condition. Conditions on
//! unknown columns, and conditions with an operator this build does not
//! recognise, are vacuously true.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::ColumnRegistry;
use crate::data::RowData;
use crate::value::CellValue;

/// Comparison applied by a [`FilterCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Strict equality on the resolved value.
    Equals,
    /// Case-insensitive substring match on the stringified values.
    Contains,
    /// Numeric `>` after coercion.
    GreaterThan,
    /// Numeric `<` after coercion.
    LessThan,
    /// Case-insensitive prefix match.
    StartsWith,
    /// Case-insensitive suffix match.
    EndsWith,
    /// Any operator name not listed above; always passes.
    #[serde(other)]
    Unknown,
}

/// `(column_id, operator, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Column the condition applies to.
    pub column_id: String,
    /// Comparison.
    pub operator: FilterOperator,
    /// Operand.
    #[serde(default)]
    pub value: CellValue,
}

impl FilterCondition {
    /// Creates a condition.
    pub fn new(
        column_id: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<CellValue>,
    ) -> Self {
        Self {
            column_id: column_id.into(),
            operator,
            value: value.into(),
        }
    }

    /// `column == value`.
    pub fn equals(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::Equals, value)
    }

    /// `column` contains `value`, ignoring case.
    pub fn contains(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::Contains, value)
    }

    /// `column > value`.
    pub fn greater_than(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::GreaterThan, value)
    }

    /// `column < value`.
    pub fn less_than(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::LessThan, value)
    }

    /// `column` starts with `value`, ignoring case.
    pub fn starts_with(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::StartsWith, value)
    }

    /// `column` ends with `value`, ignoring case.
    pub fn ends_with(column_id: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self::new(column_id, FilterOperator::EndsWith, value)
    }

    /// Tests a resolved cell value against this condition.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self.operator {
            FilterOperator::Equals => *value == self.value,
            FilterOperator::Contains => lowercase(value).contains(&lowercase(&self.value)),
            FilterOperator::StartsWith => lowercase(value).starts_with(&lowercase(&self.value)),
            FilterOperator::EndsWith => lowercase(value).ends_with(&lowercase(&self.value)),
            FilterOperator::GreaterThan => value.to_number() > self.value.to_number(),
            FilterOperator::LessThan => value.to_number() < self.value.to_number(),
            FilterOperator::Unknown => true,
        }
    }
}

fn lowercase(value: &CellValue) -> String {
    value.to_string().to_lowercase()
}

/// Returns the raw data positions of the rows passing every condition, in
/// input order.
pub fn filter_rows<R: RowData>(
    rows: &[Arc<R>],
    columns: &ColumnRegistry<R>,
    conditions: &[FilterCondition],
) -> Vec<usize> {
    let active: Vec<_> = conditions
        .iter()
        .filter(|condition| condition.operator != FilterOperator::Unknown)
        .filter_map(|condition| {
            columns
                .get(&condition.column_id)
                .map(|column| (column, condition))
        })
        .collect();

    if active.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(column, condition)| condition.matches(&column.get_value(row)))
        })
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::data::Record;
    use crate::record;

    fn people() -> Vec<Arc<Record>> {
        vec![
            Arc::new(record! { "name" => "Alice", "age" => 34, "city" => "Oslo" }),
            Arc::new(record! { "name" => "bob", "age" => 28, "city" => "Bergen" }),
            Arc::new(record! { "name" => "Carol", "age" => "41", "city" => "Oslo" }),
            Arc::new(record! { "name" => "Dave" }),
        ]
    }

    fn columns() -> ColumnRegistry<Record> {
        ColumnRegistry::new([
            ColumnDef::field("name"),
            ColumnDef::field("age"),
            ColumnDef::field("city"),
        ])
    }

    #[test]
    fn test_no_conditions_passes_everything() {
        assert_eq!(filter_rows(&people(), &columns(), &[]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_equals_is_strict() {
        let rows = people();
        let cols = columns();
        assert_eq!(filter_rows(&rows, &cols, &[FilterCondition::equals("age", 34)]), vec![0]);
        // "41" is text, not a number
        assert!(filter_rows(&rows, &cols, &[FilterCondition::equals("age", 41)]).is_empty());
    }

    #[test]
    fn test_string_operators_ignore_case() {
        let rows = people();
        let cols = columns();
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::contains("name", "O")]),
            vec![1, 2]
        );
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::starts_with("name", "B")]),
            vec![1]
        );
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::ends_with("city", "LO")]),
            vec![0, 2]
        );
    }

    #[test]
    fn test_numeric_operators_coerce() {
        let rows = people();
        let cols = columns();
        // text "41" coerces; the row without an age never matches
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::greater_than("age", 30)]),
            vec![0, 2]
        );
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::less_than("age", "30")]),
            vec![1]
        );
        assert!(filter_rows(&rows, &cols, &[FilterCondition::greater_than("name", 0)]).is_empty());
    }

    #[test]
    fn test_conditions_are_anded() {
        let conditions = [
            FilterCondition::equals("city", "Oslo"),
            FilterCondition::greater_than("age", 35),
        ];
        assert_eq!(filter_rows(&people(), &columns(), &conditions), vec![2]);
    }

    #[test]
    fn test_unknown_column_and_operator_pass() {
        let rows = people();
        let cols = columns();
        assert_eq!(
            filter_rows(&rows, &cols, &[FilterCondition::equals("salary", 1)]).len(),
            4
        );
        let unknown: FilterCondition =
            serde_json::from_str(r#"{"columnId": "age", "operator": "between", "value": 3}"#).unwrap();
        assert_eq!(unknown.operator, FilterOperator::Unknown);
        assert_eq!(filter_rows(&rows, &cols, &[unknown]).len(), 4);
    }

    #[test]
    fn test_null_stringifies_for_contains() {
        let condition = FilterCondition::contains("x", "nul");
        assert!(condition.matches(&CellValue::Null));
        assert!(FilterCondition::contains("x", "").matches(&CellValue::from("anything")));
    }
}

//! Sort stage.
//!
//! A stable multi-key sort. Keys apply in sort-state order; the first key
//! that distinguishes two rows decides, and rows equal under every key keep
//! their relative input order.
//!
//! Values are resolved once per row and key before sorting. Two numbers
//! compare numerically and two texts compare in locale order. In a column
//! that mixes both, every number sorts before every text value, which keeps
//! the order total. Booleans compare as text. Nulls sort last in either
//! direction.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::collation::compare_text;
use crate::column::ColumnRegistry;
use crate::data::RowData;
use crate::value::CellValue;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison.
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// One entry of the sort state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    /// Column being sorted.
    pub column_id: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Creates a sort entry.
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// A resolved non-null sort value. Numbers rank before text.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn resolve(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Null => None,
            CellValue::Number(n) => Some(Self::Number(n)),
            other => Some(Self::Text(other.to_string())),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => compare_numbers(*a, *b),
            (Self::Text(a), Self::Text(b)) => compare_text(a, b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

struct SortKey {
    direction: SortDirection,
    values: Vec<Option<SortValue>>,
}

impl SortKey {
    fn resolve(direction: SortDirection, values: Vec<CellValue>) -> Self {
        Self {
            direction,
            values: values.into_iter().map(SortValue::resolve).collect(),
        }
    }

    /// Nulls go last whatever the direction.
    fn compare(&self, a: usize, b: usize) -> Ordering {
        match (&self.values[a], &self.values[b]) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => self.direction.apply(a.compare(b)),
        }
    }
}

/// Numeric order with `NaN` after every number, so the order stays total.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Sorts `indices` (raw data positions) in place.
///
/// Sort entries naming unknown columns are skipped.
pub fn sort_indices<R: RowData>(
    rows: &[Arc<R>],
    columns: &ColumnRegistry<R>,
    sorts: &[SortState],
    indices: &mut Vec<usize>,
) {
    let keys: Vec<SortKey> = sorts
        .iter()
        .filter_map(|sort| {
            let column = columns.get(&sort.column_id)?;
            let values = indices
                .iter()
                .map(|&index| column.get_value(&rows[index]))
                .collect();
            Some(SortKey::resolve(sort.direction, values))
        })
        .collect();

    if keys.is_empty() || indices.len() < 2 {
        return;
    }

    let mut order: Vec<usize> = (0..indices.len()).collect();
    // `sort_by` is stable.
    order.sort_by(|&a, &b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    *indices = order.into_iter().map(|position| indices[position]).collect();
}

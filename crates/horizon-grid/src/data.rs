//! Row data access.
//!
//! The grid never assumes a concrete row type. Anything implementing
//! [`RowData`] can be displayed: the trait only has to resolve a field by its
//! accessor key and produce an updated copy when a cell is edited.
//!
//! Implementations are provided for [`Record`] (an ordered string map of
//! [`CellValue`]s) and for `serde_json` objects, so JSON payloads can be fed
//! to the grid without an intermediate type.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{record, CellValue, RowData};
//!
//! let row = record! { "name" => "Alice", "age" => 30 };
//! assert_eq!(row.field("age"), Some(CellValue::from(30)));
//!
//! let older = row.with_field("age", CellValue::from(31));
//! assert_eq!(older.field("age"), Some(CellValue::from(31)));
//! assert_eq!(row.field("age"), Some(CellValue::from(30)));
//! ```

use std::collections::BTreeMap;

use crate::value::CellValue;

/// A row the grid can read cell values from and write edited values into.
pub trait RowData: Clone + Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if the row has no
    /// such field.
    fn field(&self, key: &str) -> Option<CellValue>;

    /// Returns a copy of this row with `key` set to `value`.
    ///
    /// The original row is left untouched.
    fn with_field(&self, key: &str, value: CellValue) -> Self;
}

/// A generic row: field name to value.
pub type Record = BTreeMap<String, CellValue>;

impl RowData for Record {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.get(key).cloned()
    }

    fn with_field(&self, key: &str, value: CellValue) -> Self {
        let mut row = self.clone();
        row.insert(key.to_string(), value);
        row
    }
}

impl RowData for serde_json::Map<String, serde_json::Value> {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.get(key).map(CellValue::from)
    }

    fn with_field(&self, key: &str, value: CellValue) -> Self {
        let mut row = self.clone();
        row.insert(key.to_string(), value.into());
        row
    }
}

impl RowData for serde_json::Value {
    fn field(&self, key: &str) -> Option<CellValue> {
        self.as_object()?.get(key).map(CellValue::from)
    }

    /// Non-object values have no fields to replace and are returned unchanged.
    fn with_field(&self, key: &str, value: CellValue) -> Self {
        let mut row = self.clone();
        if let Some(object) = row.as_object_mut() {
            object.insert(key.to_string(), value.into());
        }
        row
    }
}

/// Builds a [`Record`] from `key => value` pairs.
///
/// Values go through `CellValue::from`, so literals of any supported type
/// can be mixed.
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert(::std::string::String::from($key), $crate::CellValue::from($value));
        )+
        record
    }};
}

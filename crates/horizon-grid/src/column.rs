//! Column schema and the column registry.
//!
//! A [`ColumnDef`] is the serializable schema entry supplied by the caller.
//! The grid wraps every definition into a [`Column`], which owns the mutable
//! width, the visibility flag and the optional value getter/setter closures,
//! and resolves cell values out of rows.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{record, CellValue, Column, ColumnDef};
//! use horizon_grid::data::Record;
//!
//! let mut column: Column<Record> = Column::new(
//!     ColumnDef::new("age").with_field("age").with_min_width(80.0),
//! );
//!
//! let row = record! { "age" => 42 };
//! assert_eq!(column.get_value(&row), CellValue::from(42));
//!
//! column.set_width(10.0);
//! assert_eq!(column.width(), 80.0);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::RowData;
use crate::error::{Error, Result};
use crate::value::CellValue;

/// Width of a column that declares neither `width` nor `flex`.
pub const DEFAULT_COLUMN_WIDTH: f64 = 200.0;

/// Lower width bound used when a column does not declare `minWidth`.
pub const DEFAULT_MIN_COLUMN_WIDTH: f64 = 50.0;

/// Custom value getter: resolves a cell value from a row.
pub type ValueGetter<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Custom value setter: returns a new row with the edited value applied.
pub type ValueSetter<R> = Arc<dyn Fn(&R, CellValue) -> R + Send + Sync>;

/// Side a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinSide {
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
    /// Scrolls with the body (default).
    #[default]
    None,
}

/// Declared data type of a column. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Free text.
    String,
    /// Numbers.
    Number,
    /// Dates (stored however the row type stores them).
    Date,
    /// Booleans.
    Boolean,
}

/// Serializable column schema entry.
///
/// Every field except `id` is optional. The builder-style `with_*` methods
/// make programmatic construction read like the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Unique, stable column id.
    pub id: String,
    /// Accessor key used to read/write the row field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Header text. Falls back to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    /// Initial width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Flex weight. Flex sizing happens in the rendering layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<f64>,
    /// Lower width bound (default 50).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    /// Upper width bound (default unbounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Whether the column can be resized (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    /// Whether the column can be sorted (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    /// Whether the column can be filtered (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    /// Whether the column is offered for row grouping (default false).
    #[serde(default, alias = "enableRowGroup", skip_serializing_if = "Option::is_none")]
    pub groupable: Option<bool>,
    /// Whether cells of this column can be edited (default false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    /// Pin side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<PinSide>,
    /// Declared data type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Start hidden.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
}

impl ColumnDef {
    /// Creates a definition with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Creates a definition whose accessor key equals its id.
    pub fn field(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            field: Some(id.clone()),
            id,
            ..Default::default()
        }
    }

    /// Sets the accessor key.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the header text.
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = Some(name.into());
        self
    }

    /// Sets the initial width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the flex weight.
    pub fn with_flex(mut self, flex: f64) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Sets the lower width bound.
    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min_width = Some(min_width);
        self
    }

    /// Sets the upper width bound.
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Sets the resizable flag.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    /// Sets the sortable flag.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Sets the filterable flag.
    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = Some(filterable);
        self
    }

    /// Sets the groupable flag.
    pub fn with_groupable(mut self, groupable: bool) -> Self {
        self.groupable = Some(groupable);
        self
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Sets the pin side.
    pub fn with_pinned(mut self, side: PinSide) -> Self {
        self.pinned = Some(side);
        self
    }

    /// Sets the declared data type.
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Sets whether the column starts hidden.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hide = hidden;
        self
    }
}

/// A column of a live grid.
pub struct Column<R> {
    def: ColumnDef,
    width: f64,
    visible: bool,
    value_getter: Option<ValueGetter<R>>,
    value_setter: Option<ValueSetter<R>>,
}

impl<R: RowData> Column<R> {
    /// Wraps a schema entry.
    ///
    /// The initial width is the declared width, or `0` for flex columns
    /// (the renderer distributes flex space), or [`DEFAULT_COLUMN_WIDTH`].
    pub fn new(def: ColumnDef) -> Self {
        let has_flex = def.flex.is_some_and(|flex| flex != 0.0);
        let width = def
            .width
            .unwrap_or(if has_flex { 0.0 } else { DEFAULT_COLUMN_WIDTH });
        Self {
            visible: !def.hide,
            def,
            width,
            value_getter: None,
            value_setter: None,
        }
    }

    /// Attaches a custom value getter.
    pub fn with_value_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.value_getter = Some(Arc::new(getter));
        self
    }

    /// Attaches a custom value setter.
    pub fn with_value_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&R, CellValue) -> R + Send + Sync + 'static,
    {
        self.value_setter = Some(Arc::new(setter));
        self
    }

    pub(crate) fn set_value_getter(&mut self, getter: ValueGetter<R>) {
        self.value_getter = Some(getter);
    }

    pub(crate) fn set_value_setter(&mut self, setter: ValueSetter<R>) {
        self.value_setter = Some(setter);
    }

    /// The column id.
    pub fn id(&self) -> &str {
        &self.def.id
    }

    /// The accessor key, if any.
    pub fn field(&self) -> Option<&str> {
        self.def.field.as_deref()
    }

    /// Header text, falling back to the id.
    pub fn header_name(&self) -> &str {
        self.def.header_name.as_deref().unwrap_or(&self.def.id)
    }

    /// The schema entry this column was built from.
    pub fn definition(&self) -> &ColumnDef {
        &self.def
    }

    /// Current width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Lower width bound.
    pub fn min_width(&self) -> f64 {
        self.def.min_width.unwrap_or(DEFAULT_MIN_COLUMN_WIDTH)
    }

    /// Upper width bound.
    pub fn max_width(&self) -> f64 {
        self.def.max_width.unwrap_or(f64::INFINITY)
    }

    /// Sets the width, clamped to `[min_width, max_width]`.
    ///
    /// Returns the width actually applied. A `NaN` request resolves to the
    /// lower bound.
    pub fn set_width(&mut self, width: f64) -> f64 {
        self.width = width.min(self.max_width()).max(self.min_width());
        self.width
    }

    /// Flex weight, if declared.
    pub fn flex(&self) -> Option<f64> {
        self.def.flex
    }

    /// Returns `true` if the column declares a positive flex weight.
    pub fn has_flex(&self) -> bool {
        self.def.flex.is_some_and(|flex| flex > 0.0)
    }

    /// Whether the column can be resized.
    pub fn is_resizable(&self) -> bool {
        self.def.resizable.unwrap_or(true)
    }

    /// Whether the column can be sorted.
    pub fn is_sortable(&self) -> bool {
        self.def.sortable.unwrap_or(true)
    }

    /// Whether the column can be filtered.
    pub fn is_filterable(&self) -> bool {
        self.def.filterable.unwrap_or(true)
    }

    /// Whether the column is offered for grouping.
    pub fn is_groupable(&self) -> bool {
        self.def.groupable.unwrap_or(false)
    }

    /// Whether cells of this column can be edited.
    pub fn is_editable(&self) -> bool {
        self.def.editable.unwrap_or(false)
    }

    /// Pin side.
    pub fn pinned(&self) -> PinSide {
        self.def.pinned.unwrap_or_default()
    }

    /// Declared data type.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.def.column_type
    }

    /// Whether the column is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the column.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Resolves this column's value out of `row`.
    ///
    /// The custom getter wins; otherwise the accessor key is read. A row
    /// without the field, or a column without getter and key, reads as
    /// `Null`.
    pub fn get_value(&self, row: &R) -> CellValue {
        if let Some(getter) = &self.value_getter {
            return getter(row);
        }
        match &self.def.field {
            Some(field) => row.field(field).unwrap_or_default(),
            None => CellValue::Null,
        }
    }

    /// Returns a new row with `value` written into this column.
    ///
    /// The custom setter wins; otherwise the accessor key is replaced in a
    /// copy of the row. A column without setter and key returns the row
    /// unchanged.
    pub fn set_value(&self, row: &R, value: CellValue) -> R {
        if let Some(setter) = &self.value_setter {
            return setter(row, value);
        }
        match &self.def.field {
            Some(field) => row.with_field(field, value),
            None => row.clone(),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            width: self.width,
            visible: self.visible,
            value_getter: self.value_getter.clone(),
            value_setter: self.value_setter.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.def.id)
            .field("width", &self.width)
            .field("visible", &self.visible)
            .field("has_getter", &self.value_getter.is_some())
            .field("has_setter", &self.value_setter.is_some())
            .finish()
    }
}

/// Checks a schema for empty and duplicate ids.
pub fn validate_column_defs(defs: &[ColumnDef]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(defs.len());
    for (position, def) in defs.iter().enumerate() {
        if def.id.is_empty() {
            return Err(Error::EmptyColumnId(position));
        }
        if !seen.insert(def.id.as_str()) {
            return Err(Error::DuplicateColumnId(def.id.clone()));
        }
    }
    Ok(())
}

/// Ordered set of the grid's columns, looked up by id.
///
/// Lookups return the first column with a matching id.
pub struct ColumnRegistry<R> {
    columns: Vec<Column<R>>,
}

impl<R: RowData> ColumnRegistry<R> {
    /// Builds a registry from schema entries, in order.
    pub fn new(defs: impl IntoIterator<Item = ColumnDef>) -> Self {
        Self {
            columns: defs.into_iter().map(Column::new).collect(),
        }
    }

    /// Number of columns, hidden ones included.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter()
    }

    /// All columns as a slice.
    pub fn as_slice(&self) -> &[Column<R>] {
        &self.columns
    }

    /// Columns currently shown, in schema order.
    pub fn visible(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter().filter(|column| column.is_visible())
    }

    /// Columns pinned to `side`, in schema order.
    pub fn pinned(&self, side: PinSide) -> impl Iterator<Item = &Column<R>> {
        self.columns
            .iter()
            .filter(move |column| column.pinned() == side)
    }

    /// Looks up a column by id.
    pub fn get(&self, id: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|column| column.id() == id)
    }

    /// Looks up a column by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Column<R>> {
        self.columns.iter_mut().find(|column| column.id() == id)
    }

    /// Position of a column in schema order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.id() == id)
    }

    /// Returns `true` if a column with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Resolves the value of column `id` in `row`; `Null` for an unknown id.
    pub fn value_of(&self, id: &str, row: &R) -> CellValue {
        self.get(id)
            .map_or(CellValue::Null, |column| column.get_value(row))
    }
}

impl<R> Clone for ColumnRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.columns.iter()).finish()
    }
}

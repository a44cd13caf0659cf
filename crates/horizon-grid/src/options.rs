//! Grid configuration.
//!
//! [`GridOptions`] holds the feature flags and geometry of a grid. Every field
//! has a default, so a configuration only needs to name what it changes.
//! [`GridConfig`] adds the column schema and group aggregations and can be
//! loaded from JSON or TOML.
//!
//! # Example
//!
//! ```
//! use horizon_grid::GridConfig;
//!
//! let config = GridConfig::from_json_str(r#"{
//!     "enablePagination": true,
//!     "pageSize": 25,
//!     "columns": [{"id": "name", "field": "name"}]
//! }"#).unwrap();
//!
//! assert_eq!(config.options.page_size, 25);
//! assert_eq!(config.options.row_height, 30.0);
//! assert_eq!(config.columns.len(), 1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::column::ColumnDef;
use crate::error::{Error, Result};
use horizon_grid_core::logging::targets;

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// At most one selected row.
    Single,
    /// Any number of selected rows.
    #[default]
    Multiple,
}

/// Feature flags and geometry of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    /// Height of every body row in pixels.
    pub row_height: f64,
    /// Height of the header band in pixels.
    pub header_height: f64,
    /// Initial viewport width.
    pub viewport_width: f64,
    /// Initial viewport height, header included.
    pub viewport_height: f64,
    /// Rows rendered beyond each edge of the visible window.
    pub overscan: usize,
    /// Allow sort commands.
    pub enable_sorting: bool,
    /// Allow filter commands.
    pub enable_filtering: bool,
    /// Slice the displayed sequence into pages.
    pub enable_pagination: bool,
    /// Rows per page.
    pub page_size: usize,
    /// Allow row grouping.
    pub enable_grouping: bool,
    /// Allow selection commands.
    pub enable_selection: bool,
    /// Selection mode.
    pub selection_type: SelectionType,
    /// Allow cell edits.
    pub enable_cell_editing: bool,
    /// Allow column resizing.
    pub enable_column_resize: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_height: 30.0,
            header_height: 40.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            overscan: 5,
            enable_sorting: true,
            enable_filtering: true,
            enable_pagination: false,
            page_size: 100,
            enable_grouping: false,
            enable_selection: false,
            selection_type: SelectionType::Multiple,
            enable_cell_editing: false,
            enable_column_resize: true,
        }
    }
}

impl GridOptions {
    /// Checks geometry and pagination values.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_option("pageSize", "must be greater than zero"));
        }
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(Error::invalid_option(
                "rowHeight",
                format!("must be a positive finite number, got {}", self.row_height),
            ));
        }
        if !(self.header_height.is_finite() && self.header_height >= 0.0) {
            return Err(Error::invalid_option(
                "headerHeight",
                format!("must be a non-negative finite number, got {}", self.header_height),
            ));
        }
        for (name, value) in [
            ("viewportWidth", self.viewport_width),
            ("viewportHeight", self.viewport_height),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::invalid_option(
                    name,
                    format!("must be a non-negative finite number, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Aggregation function applied to a group's member rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    /// Sum of numeric values.
    Sum,
    /// Mean of numeric values.
    Avg,
    /// Smallest numeric value.
    Min,
    /// Largest numeric value.
    Max,
    /// Number of member rows.
    Count,
}

/// Aggregate `function` over column `column_id` in every group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationConfig {
    /// Column to aggregate.
    pub column_id: String,
    /// Aggregation function.
    pub function: AggregateFunction,
}

impl AggregationConfig {
    /// Creates an aggregation.
    pub fn new(column_id: impl Into<String>, function: AggregateFunction) -> Self {
        Self {
            column_id: column_id.into(),
            function,
        }
    }
}

/// A complete, serializable grid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Feature flags and geometry.
    #[serde(flatten)]
    pub options: GridOptions,
    /// Column schema.
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    /// Group aggregations.
    #[serde(default)]
    pub aggregations: Vec<AggregationConfig>,
}

impl GridConfig {
    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file, choosing the format by extension
    /// (`.json` or `.toml`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
        };

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = parse(&content)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            columns = config.columns.len(),
            "loaded grid configuration"
        );
        Ok(config)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! Horizon Grid - a headless tabular data engine.
//!
//! The engine turns a flat list of rows into the sequence a table renders:
//! rows are filtered, sorted, grouped under collapsible headers and paged,
//! and a viewport computes which of the resulting rows need rendering at the
//! current scroll offset. Rendering itself is left to the caller.
//!
//! - [`ColumnRegistry`] holds the schema and resolves cell values
//! - [`GridEngine`] runs the pipeline and owns selection, editing and
//!   pagination state
//! - [`Viewport`] and [`visible_range`](viewport::visible_range) do the
//!   virtualization math
//! - [`GridSignals`] publish every change synchronously
//!
//! # Example
//!
//! ```
//! use horizon_grid::{record, AggregateFunction, ColumnDef, GridEngine};
//!
//! let mut grid = GridEngine::builder()
//!     .columns([ColumnDef::field("dept"), ColumnDef::field("salary")])
//!     .rows([
//!         record! { "dept" => "Eng", "salary" => 120 },
//!         record! { "dept" => "Ops", "salary" => 80 },
//!         record! { "dept" => "Eng", "salary" => 100 },
//!     ])
//!     .configure(|options| options.enable_grouping = true)
//!     .aggregate("salary", AggregateFunction::Avg)
//!     .build()?;
//!
//! grid.group_by_columns(["dept"]);
//!
//! let eng = grid.row(0).and_then(|row| row.group()).unwrap();
//! assert_eq!(eng.key, "Eng");
//! assert_eq!(eng.member_count(), 2);
//! assert_eq!(eng.aggregate("salary", AggregateFunction::Avg), Some(&110.into()));
//! # Ok::<(), horizon_grid::Error>(())
//! ```
//!
//! # Features
//!
//! - `localization`: compare text with the ICU root collator instead of the
//!   built-in case-insensitive comparison.

pub mod collation;
pub mod column;
pub mod data;
pub mod error;
pub mod grid;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod row;
pub mod selection;
pub mod signals;
pub mod value;
pub mod viewport;

pub use column::{Column, ColumnDef, ColumnRegistry, ColumnType, PinSide};
pub use data::{Record, RowData};
pub use error::{Error, Result};
pub use grid::{GridBuilder, GridEngine};
pub use options::{AggregateFunction, AggregationConfig, GridConfig, GridOptions, SelectionType};
pub use pipeline::{
    FilterCondition, FilterOperator, PaginationState, SortDirection, SortState,
};
pub use registry::{GridRegistry, SharedGrid};
pub use row::{DisplayRow, GroupAggregate, GroupNode, RowKind};
pub use selection::{RowKey, SelectionModel};
pub use signals::{CellValueChange, GridSignals};
pub use value::CellValue;
pub use viewport::{Viewport, VirtualScroll, VisibleRange};

pub use horizon_grid_core::{ConnectionGuard, ConnectionId, Signal};

//! The grid engine.
//!
//! [`GridEngine`] owns the row data, the column registry and every piece of
//! transformation state. Each mutator that changes a pipeline input re-runs
//! the whole filter → sort → group → paginate pipeline before it returns,
//! rebuilds the displayed rows, updates the viewport's row count and emits
//! its notifications.
//!
//! Runtime commands never fail. A disabled feature, an unknown column or an
//! out-of-range index turns the command into a no-op, logged at `trace`.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{record, ColumnDef, FilterCondition, GridEngine, SortDirection};
//!
//! let mut grid = GridEngine::builder()
//!     .column(ColumnDef::field("name"))
//!     .column(ColumnDef::field("age"))
//!     .rows([
//!         record! { "name" => "Ada", "age" => 36 },
//!         record! { "name" => "Linus", "age" => 21 },
//!         record! { "name" => "Grace", "age" => 45 },
//!     ])
//!     .build()
//!     .unwrap();
//!
//! grid.filter_column("age", Some(FilterCondition::greater_than("age", 30)));
//! grid.sort_column("age", Some(SortDirection::Desc));
//!
//! let names: Vec<String> = (0..grid.row_count())
//!     .filter_map(|index| grid.cell_value(index, "name"))
//!     .map(|value| value.to_string())
//!     .collect();
//! assert_eq!(names, ["Grace", "Ada"]);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::column::{Column, ColumnDef, ColumnRegistry, ValueGetter, ValueSetter, validate_column_defs};
use crate::data::RowData;
use crate::error::{Error, Result};
use crate::options::{AggregateFunction, AggregationConfig, GridConfig, GridOptions, SelectionType};
use crate::pipeline::{
    self, FilterCondition, PaginationState, PipelineItem, PipelineState, SortDirection, SortState,
};
use crate::row::{DisplayRow, RowKind};
use crate::selection::{RowIdFn, RowKey, RowSelectableFn, SelectionModel};
use crate::signals::{CellValueChange, GridSignals};
use crate::value::CellValue;
use crate::viewport::{Viewport, VisibleRange};

/// A tabular data engine over rows of type `R`.
pub struct GridEngine<R: RowData> {
    options: GridOptions,
    columns: ColumnRegistry<R>,
    row_data: Vec<Arc<R>>,
    aggregations: Vec<AggregationConfig>,
    pipeline: PipelineState,
    selection: SelectionModel,
    row_id: Option<RowIdFn<R>>,
    row_selectable: Option<RowSelectableFn<R>>,
    viewport: Viewport,
    /// Displayed rows of the last pipeline run.
    rows: Arc<[DisplayRow<R>]>,
    /// Selection keys of `rows`, parallel to it.
    row_keys: Vec<RowKey>,
    processed_count: usize,
    signals: GridSignals<R>,
}

impl<R: RowData> GridEngine<R> {
    /// Starts building a grid.
    pub fn builder() -> GridBuilder<R> {
        GridBuilder::new()
    }

    /// Builds a grid from a configuration with no rows.
    pub fn from_config(config: GridConfig) -> Result<Self> {
        GridBuilder::from_config(config).build()
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Replaces the row data and re-runs the pipeline.
    ///
    /// Selections keyed by row id survive when the id is still present.
    /// Selections keyed by data position are cleared, since positions in the
    /// new data are unrelated to the old ones.
    pub fn set_row_data<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = R>,
    {
        self.row_data = rows.into_iter().map(Arc::new).collect();

        let selection_changed = match &self.row_id {
            Some(row_id) => {
                let ids: HashSet<String> = self.row_data.iter().map(|row| row_id(row)).collect();
                self.selection.retain(|key| match key {
                    RowKey::Id(id) => ids.contains(id),
                    RowKey::Source(_) => false,
                    RowKey::Group(_) => true,
                })
            }
            None => self.selection.retain(|key| matches!(key, RowKey::Group(_))),
        };
        self.selection.set_last_selected_index(None);

        tracing::debug!(target: targets::PIPELINE, rows = self.row_data.len(), "row data replaced");
        self.run_pipeline();
        self.signals.row_data_changed.emit(self.row_data.len());
        if selection_changed {
            self.emit_selection_changed();
        }
    }

    /// The raw row data, in input order.
    pub fn row_data(&self) -> &[Arc<R>] {
        &self.row_data
    }

    /// Re-runs the pipeline without changing any input.
    pub fn refresh(&mut self) {
        self.run_pipeline();
    }

    // =========================================================================
    // Displayed rows
    // =========================================================================

    /// The displayed rows of the last pipeline run.
    pub fn rows(&self) -> Arc<[DisplayRow<R>]> {
        Arc::clone(&self.rows)
    }

    /// The displayed row at `index`.
    pub fn row(&self, index: usize) -> Option<&DisplayRow<R>> {
        self.rows.get(index)
    }

    /// Number of displayed rows (after pagination).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the sequence after grouping and before pagination.
    pub fn processed_row_count(&self) -> usize {
        self.processed_count
    }

    /// Resolved value of `column_id` in the displayed data row at
    /// `row_index`. `None` for group headers, unknown columns and
    /// out-of-range indices.
    pub fn cell_value(&self, row_index: usize, column_id: &str) -> Option<CellValue> {
        let item = self.rows.get(row_index)?.data()?;
        let column = self.columns.get(column_id)?;
        Some(column.get_value(item))
    }

    /// Header names of the visible columns.
    pub fn export_headers(&self) -> Vec<String> {
        self.columns
            .visible()
            .map(|column| column.header_name().to_string())
            .collect()
    }

    /// Resolved values of every displayed data row over the visible columns.
    pub fn export_values(&self) -> Vec<Vec<CellValue>> {
        let visible: Vec<&Column<R>> = self.columns.visible().collect();
        self.rows
            .iter()
            .filter_map(DisplayRow::data)
            .map(|item| visible.iter().map(|column| column.get_value(item)).collect())
            .collect()
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// The column registry.
    pub fn columns(&self) -> &ColumnRegistry<R> {
        &self.columns
    }

    /// Looks up a column.
    pub fn column(&self, column_id: &str) -> Option<&Column<R>> {
        self.columns.get(column_id)
    }

    /// Columns currently shown, in schema order.
    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns.visible().collect()
    }

    /// Resizes a column, clamped to its bounds.
    ///
    /// No-op when resizing is disabled, the column is unknown or the column
    /// is not resizable. Does not re-run the pipeline.
    pub fn resize_column(&mut self, column_id: &str, width: f64) {
        if !self.options.enable_column_resize {
            tracing::trace!(target: targets::COLUMN, column_id, "resize ignored: resizing disabled");
            return;
        }
        let Some(column) = self.columns.get_mut(column_id) else {
            tracing::trace!(target: targets::COLUMN, column_id, "resize ignored: unknown column");
            return;
        };
        if !column.is_resizable() {
            tracing::trace!(target: targets::COLUMN, column_id, "resize ignored: column not resizable");
            return;
        }

        let applied = column.set_width(width);
        tracing::debug!(target: targets::COLUMN, column_id, requested = width, applied, "column resized");
        self.signals
            .column_resized
            .emit((column_id.to_string(), applied));
    }

    /// Shows or hides a column.
    ///
    /// Hidden columns still take part in filtering, sorting and grouping.
    pub fn set_column_visible(&mut self, column_id: &str, visible: bool) {
        let Some(column) = self.columns.get_mut(column_id) else {
            tracing::trace!(target: targets::COLUMN, column_id, "visibility ignored: unknown column");
            return;
        };
        if column.is_visible() == visible {
            return;
        }
        column.set_visible(visible);
        self.signals
            .column_visibility_changed
            .emit((column_id.to_string(), visible));
    }

    /// Flips a column's visibility.
    pub fn toggle_column_visibility(&mut self, column_id: &str) {
        if let Some(visible) = self.columns.get(column_id).map(Column::is_visible) {
            self.set_column_visible(column_id, !visible);
        }
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sets the direction of `column_id`, or removes it from the sort state
    /// with `None`.
    ///
    /// No-op when sorting is disabled, the column is unknown or the column is
    /// not sortable.
    pub fn sort_column(&mut self, column_id: &str, direction: Option<SortDirection>) {
        if !self.options.enable_sorting {
            tracing::trace!(target: targets::PIPELINE, column_id, "sort ignored: sorting disabled");
            return;
        }
        if !self.columns.get(column_id).is_some_and(Column::is_sortable) {
            tracing::trace!(target: targets::PIPELINE, column_id, "sort ignored: column missing or not sortable");
            return;
        }

        self.pipeline.set_sort(column_id, direction);
        self.run_pipeline();
        self.signals
            .sort_changed
            .emit((column_id.to_string(), direction));
    }

    /// Removes every sort entry.
    pub fn clear_sorting(&mut self) {
        if self.pipeline.sorts().is_empty() {
            return;
        }
        let cleared: Vec<String> = self
            .pipeline
            .sorts()
            .iter()
            .map(|sort| sort.column_id.clone())
            .collect();
        self.pipeline.clear_sorts();
        self.run_pipeline();
        for column_id in cleared {
            self.signals.sort_changed.emit((column_id, None));
        }
    }

    /// Direction of `column_id` in the sort state.
    pub fn sort_state(&self, column_id: &str) -> Option<SortDirection> {
        self.pipeline.sort_direction(column_id)
    }

    /// Every sort entry, in precedence order.
    pub fn sort_states(&self) -> &[SortState] {
        self.pipeline.sorts()
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Replaces the filter on `column_id`, or removes it with `None`.
    ///
    /// No-op when filtering is disabled. A condition on an unknown column is
    /// stored but passes every row.
    pub fn filter_column(&mut self, column_id: &str, condition: Option<FilterCondition>) {
        if !self.options.enable_filtering {
            tracing::trace!(target: targets::PIPELINE, column_id, "filter ignored: filtering disabled");
            return;
        }

        self.pipeline.set_filter(column_id, condition);
        self.run_pipeline();
        let stored = self.pipeline.filter_for(column_id).cloned();
        self.signals
            .filter_changed
            .emit((column_id.to_string(), stored));
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        if self.pipeline.filters().is_empty() {
            return;
        }
        let cleared: Vec<String> = self
            .pipeline
            .filters()
            .iter()
            .map(|condition| condition.column_id.clone())
            .collect();
        self.pipeline.clear_filters();
        self.run_pipeline();
        for column_id in cleared {
            self.signals.filter_changed.emit((column_id, None));
        }
    }

    /// The filter on `column_id`.
    pub fn filter_condition(&self, column_id: &str) -> Option<&FilterCondition> {
        self.pipeline.filter_for(column_id)
    }

    /// Every active filter.
    pub fn active_filters(&self) -> &[FilterCondition] {
        self.pipeline.filters()
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Groups by `column_ids`, outermost first. Repeated ids are dropped and
    /// an empty list removes grouping.
    ///
    /// No-op when grouping is disabled.
    pub fn group_by_columns<I, S>(&mut self, column_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.options.enable_grouping {
            tracing::trace!(target: targets::PIPELINE, "grouping ignored: grouping disabled");
            return;
        }

        let group_by = self.pipeline.set_group_by(column_ids).to_vec();
        self.run_pipeline();
        self.signals.grouping_changed.emit(group_by);
    }

    /// Grouping columns, outermost first.
    pub fn group_by(&self) -> &[String] {
        self.pipeline.group_by()
    }

    /// Collapses an expanded group or expands a collapsed one.
    ///
    /// The collapsed state is kept by composite key, so it survives sorting,
    /// filtering and paging. No-op when grouping is disabled.
    pub fn toggle_group(&mut self, group_key: &str) {
        if !self.options.enable_grouping {
            tracing::trace!(target: targets::PIPELINE, group_key, "toggle ignored: grouping disabled");
            return;
        }

        let expanded = self.pipeline.toggle_group(group_key);
        self.run_pipeline();
        self.signals
            .group_toggled
            .emit((group_key.to_string(), expanded));
    }

    /// Expands every collapsed group.
    pub fn expand_all_groups(&mut self) {
        let collapsed: Vec<String> = self.pipeline.collapsed().iter().cloned().collect();
        if !self.pipeline.expand_all() {
            return;
        }
        self.run_pipeline();
        for key in collapsed {
            self.signals.group_toggled.emit((key, true));
        }
    }

    /// Returns `true` unless `group_key` is collapsed.
    pub fn is_group_expanded(&self, group_key: &str) -> bool {
        self.pipeline.is_expanded(group_key)
    }

    /// Collapsed group keys, sorted.
    pub fn collapsed_groups(&self) -> Vec<String> {
        self.pipeline.collapsed().iter().cloned().collect()
    }

    /// Configured group aggregations.
    pub fn aggregations(&self) -> &[AggregationConfig] {
        &self.aggregations
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Moves to `page` (1-based), clamped into range.
    ///
    /// No-op when pagination is disabled.
    pub fn set_page(&mut self, page: usize) {
        let Some(pagination) = self.pipeline.pagination_mut() else {
            tracing::trace!(target: targets::PIPELINE, page, "page change ignored: pagination disabled");
            return;
        };
        pagination.set_page(page);
        self.run_pipeline();
        let current = self.current_page();
        self.signals.page_changed.emit(current);
    }

    /// Changes the page size and returns to the first page.
    ///
    /// No-op when pagination is disabled or `page_size` is zero.
    pub fn set_page_size(&mut self, page_size: usize) {
        let Some(pagination) = self.pipeline.pagination_mut() else {
            tracing::trace!(target: targets::PIPELINE, page_size, "page size ignored: pagination disabled");
            return;
        };
        if !pagination.set_page_size(page_size) {
            tracing::warn!(target: targets::PIPELINE, "page size ignored: must be greater than zero");
            return;
        }
        self.options.page_size = page_size;
        self.run_pipeline();
        self.signals.page_size_changed.emit(page_size);
    }

    /// Pagination state, when pagination is enabled.
    pub fn pagination_state(&self) -> Option<PaginationState> {
        self.pipeline.pagination().copied()
    }

    fn current_page(&self) -> usize {
        self.pipeline
            .pagination()
            .map_or(1, |pagination| pagination.current_page)
    }

    // =========================================================================
    // Selection and highlight
    // =========================================================================

    /// Selects or deselects the displayed row at `index`.
    ///
    /// In single mode every other row is deselected first. No-op when
    /// selection is disabled, the index is out of range or the selectability
    /// predicate rejects the row.
    pub fn select_row(&mut self, index: usize, selected: bool) {
        if !self.options.enable_selection {
            tracing::trace!(target: targets::SELECTION, index, "select ignored: selection disabled");
            return;
        }
        let Some(row) = self.rows.get(index) else {
            tracing::trace!(target: targets::SELECTION, index, "select ignored: index out of range");
            return;
        };
        if !self.is_selectable(row) {
            tracing::trace!(target: targets::SELECTION, index, "select ignored: row not selectable");
            return;
        }

        let key = self.row_keys[index].clone();
        self.selection.set_last_selected_index(Some(index));
        if self.selection.select(key, selected) {
            self.remark_rows();
            self.emit_selection_changed();
        }
    }

    /// Selects every displayed selectable row, or clears the whole
    /// selection.
    ///
    /// No-op when selection is disabled or in single mode.
    pub fn select_all(&mut self, selected: bool) {
        if !self.options.enable_selection || self.selection.mode() == SelectionType::Single {
            tracing::trace!(target: targets::SELECTION, "select all ignored: selection disabled or single mode");
            return;
        }

        let changed = if selected {
            let keys: Vec<RowKey> = self
                .rows
                .iter()
                .zip(&self.row_keys)
                .filter(|(row, _)| self.is_selectable(row))
                .map(|(_, key)| key.clone())
                .collect();
            self.selection.select_keys(keys)
        } else {
            self.selection.clear_selection()
        };

        if changed {
            self.remark_rows();
            self.emit_selection_changed();
        }
    }

    /// Displayed rows that are selected.
    pub fn selected_rows(&self) -> Vec<DisplayRow<R>> {
        self.rows.iter().filter(|row| row.selected).cloned().collect()
    }

    /// Display indices of the selected rows, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|row| row.selected)
            .map(|row| row.index)
            .collect()
    }

    /// Every selected key, including rows not currently displayed.
    pub fn selected_keys(&self) -> &[RowKey] {
        self.selection.selected_keys()
    }

    /// Selection mode.
    pub fn selection_type(&self) -> SelectionType {
        self.selection.mode()
    }

    /// Highlights the displayed row at `index`, or clears the highlight if
    /// `highlighted` is `false` and that row holds it.
    pub fn set_row_highlighted(&mut self, index: usize, highlighted: bool) {
        let Some(key) = self.row_keys.get(index).cloned() else {
            tracing::trace!(target: targets::SELECTION, index, "highlight ignored: index out of range");
            return;
        };
        let target = if highlighted {
            Some(key)
        } else if self.selection.highlighted() == Some(&key) {
            None
        } else {
            return;
        };

        if self.selection.set_highlighted(target) {
            self.remark_rows();
            let index = self.highlighted_index();
            self.signals.highlight_changed.emit(index);
        }
    }

    /// Display index of the highlighted row, if it is displayed.
    pub fn highlighted_index(&self) -> Option<usize> {
        self.rows.iter().find(|row| row.highlighted).map(|row| row.index)
    }

    fn is_selectable(&self, row: &DisplayRow<R>) -> bool {
        match (&self.row_selectable, row.data()) {
            (Some(predicate), Some(item)) => predicate(item, row.index),
            _ => true,
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Writes `value` into `column_id` of the displayed data row at
    /// `row_index` and re-runs the pipeline.
    ///
    /// The edited row replaces the original at its raw data position. No-op
    /// when editing is disabled, the index does not name a data row, or the
    /// column is unknown or not editable.
    pub fn set_cell_value(&mut self, row_index: usize, column_id: &str, value: impl Into<CellValue>) {
        if !self.options.enable_cell_editing {
            tracing::trace!(target: targets::PIPELINE, row_index, column_id, "edit ignored: editing disabled");
            return;
        }
        let Some((source_index, item)) = self.rows.get(row_index).and_then(|row| match &row.kind {
            RowKind::Data { source_index, item } => Some((*source_index, Arc::clone(item))),
            RowKind::Group(_) => None,
        }) else {
            tracing::trace!(target: targets::PIPELINE, row_index, "edit ignored: not a data row");
            return;
        };
        let Some(column) = self.columns.get(column_id).filter(|column| column.is_editable()) else {
            tracing::trace!(target: targets::PIPELINE, column_id, "edit ignored: column missing or not editable");
            return;
        };

        let value = value.into();
        let updated = Arc::new(column.set_value(&item, value.clone()));
        self.row_data[source_index] = Arc::clone(&updated);

        if let Some(row_id) = &self.row_id {
            let old_key = self.row_keys[row_index].clone();
            self.selection.rename(&old_key, RowKey::Id(row_id(&updated)));
        }

        tracing::debug!(target: targets::PIPELINE, row_index, source_index, column_id, "cell value written");
        self.run_pipeline();
        self.signals.cell_value_changed.emit(CellValueChange {
            row_index,
            source_index,
            column_id: column_id.to_string(),
            value,
            row: updated,
        });
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resizes the viewport.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.set_size(width, height);
        self.signals
            .viewport_changed
            .emit((self.viewport.width(), self.viewport.height()));
    }

    /// Sets the vertical scroll offset (clamped to `>= 0`).
    pub fn set_scroll_top(&mut self, scroll_top: f64) {
        let before = self.viewport.scroll_top();
        self.viewport.set_scroll_top(scroll_top);
        if self.viewport.scroll_top() != before {
            self.emit_scroll_changed();
        }
    }

    /// Sets the horizontal scroll offset (clamped to `>= 0`).
    pub fn set_scroll_left(&mut self, scroll_left: f64) {
        let before = self.viewport.scroll_left();
        self.viewport.set_scroll_left(scroll_left);
        if self.viewport.scroll_left() != before {
            self.emit_scroll_changed();
        }
    }

    /// Scrolls the minimum distance that brings the displayed row at `index`
    /// into view.
    pub fn scroll_to_row(&mut self, index: usize) {
        if self.viewport.scroll_to_row(index) {
            self.emit_scroll_changed();
        }
    }

    /// Rows to render at the current scroll offset.
    pub fn visible_range(&self) -> VisibleRange {
        self.viewport.visible_range()
    }

    /// The displayed rows inside [`visible_range`](Self::visible_range).
    pub fn visible_rows(&self) -> &[DisplayRow<R>] {
        self.rows
            .get(self.viewport.visible_range().indices())
            .unwrap_or(&[])
    }

    // =========================================================================
    // Misc
    // =========================================================================

    /// The options the grid runs with.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// The grid's notifications.
    pub fn signals(&self) -> &GridSignals<R> {
        &self.signals
    }

    fn run_pipeline(&mut self) {
        let output = pipeline::run(
            &self.row_data,
            &self.columns,
            &mut self.pipeline,
            &self.aggregations,
        );
        self.processed_count = output.processed_count;

        let mut rows: Vec<DisplayRow<R>> = output
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let kind = match item {
                    PipelineItem::Data(source_index) => RowKind::Data {
                        source_index,
                        item: Arc::clone(&self.row_data[source_index]),
                    },
                    PipelineItem::Group(node) => RowKind::Group(node),
                };
                DisplayRow::new(index, kind)
            })
            .collect();
        let keys: Vec<RowKey> = rows
            .iter()
            .map(|row| RowKey::of(row, self.row_id.as_ref()))
            .collect();
        self.selection.apply(&mut rows, &keys);

        self.row_keys = keys;
        self.rows = rows.into();
        self.viewport.set_total_rows(self.rows.len());
        self.signals.data_changed.emit(Arc::clone(&self.rows));
    }

    /// Rebuilds the row snapshot with fresh selection and highlight flags.
    fn remark_rows(&mut self) {
        let mut rows = self.rows.to_vec();
        self.selection.apply(&mut rows, &self.row_keys);
        self.rows = rows.into();
    }

    fn emit_selection_changed(&self) {
        let indices = self.selected_indices();
        tracing::debug!(target: targets::SELECTION, selected = indices.len(), "selection changed");
        self.signals.selection_changed.emit(indices);
    }

    fn emit_scroll_changed(&self) {
        self.signals
            .scroll_changed
            .emit((self.viewport.scroll_top(), self.viewport.scroll_left()));
    }
}

impl<R: RowData> fmt::Debug for GridEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("columns", &self.columns.len())
            .field("row_data", &self.row_data.len())
            .field("rows", &self.rows.len())
            .field("pipeline", &self.pipeline)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(GridEngine<crate::data::Record>: Send, Sync);

/// Builder for [`GridEngine`].
///
/// Validation happens in [`build`](Self::build): column ids must be non-empty
/// and unique, options must be in range, and getters, setters and
/// aggregations must reference existing columns.
pub struct GridBuilder<R: RowData> {
    options: GridOptions,
    columns: Vec<ColumnDef>,
    rows: Vec<R>,
    getters: Vec<(String, ValueGetter<R>)>,
    setters: Vec<(String, ValueSetter<R>)>,
    aggregations: Vec<AggregationConfig>,
    row_id: Option<RowIdFn<R>>,
    row_selectable: Option<RowSelectableFn<R>>,
}

impl<R: RowData> Default for GridBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RowData> GridBuilder<R> {
    /// Creates a builder with default options and no columns.
    pub fn new() -> Self {
        Self {
            options: GridOptions::default(),
            columns: Vec::new(),
            rows: Vec::new(),
            getters: Vec::new(),
            setters: Vec::new(),
            aggregations: Vec::new(),
            row_id: None,
            row_selectable: None,
        }
    }

    /// Creates a builder from a configuration.
    pub fn from_config(config: GridConfig) -> Self {
        Self {
            options: config.options,
            columns: config.columns,
            aggregations: config.aggregations,
            ..Self::new()
        }
    }

    /// Sets the options.
    pub fn options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    /// Adjusts the options in place.
    pub fn configure(mut self, f: impl FnOnce(&mut GridOptions)) -> Self {
        f(&mut self.options);
        self
    }

    /// Appends a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Sets the initial row data.
    pub fn rows(mut self, rows: impl IntoIterator<Item = R>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    /// Attaches a custom value getter to `column_id`.
    pub fn value_getter<F>(mut self, column_id: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.getters.push((column_id.into(), Arc::new(getter)));
        self
    }

    /// Attaches a custom value setter to `column_id`.
    pub fn value_setter<F>(mut self, column_id: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&R, CellValue) -> R + Send + Sync + 'static,
    {
        self.setters.push((column_id.into(), Arc::new(setter)));
        self
    }

    /// Adds a group aggregation.
    pub fn aggregate(mut self, column_id: impl Into<String>, function: AggregateFunction) -> Self {
        self.aggregations
            .push(AggregationConfig::new(column_id, function));
        self
    }

    /// Sets the stable row identity used to key selection.
    pub fn row_id<F>(mut self, row_id: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.row_id = Some(Arc::new(row_id));
        self
    }

    /// Sets the selectability predicate, called with the row and its display
    /// index.
    pub fn row_selectable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R, usize) -> bool + Send + Sync + 'static,
    {
        self.row_selectable = Some(Arc::new(predicate));
        self
    }

    /// Validates the configuration and builds the grid.
    pub fn build(self) -> Result<GridEngine<R>> {
        self.options.validate()?;
        validate_column_defs(&self.columns)?;

        let mut columns = ColumnRegistry::new(self.columns);
        for (column_id, getter) in self.getters {
            columns
                .get_mut(&column_id)
                .ok_or_else(|| Error::UnknownColumn(column_id.clone()))?
                .set_value_getter(getter);
        }
        for (column_id, setter) in self.setters {
            columns
                .get_mut(&column_id)
                .ok_or_else(|| Error::UnknownColumn(column_id.clone()))?
                .set_value_setter(setter);
        }
        if let Some(aggregation) = self
            .aggregations
            .iter()
            .find(|aggregation| !columns.contains(&aggregation.column_id))
        {
            return Err(Error::UnknownColumn(aggregation.column_id.clone()));
        }

        let options = self.options;
        let page_size = options.enable_pagination.then_some(options.page_size);
        let mut engine = GridEngine {
            pipeline: PipelineState::new(page_size),
            selection: SelectionModel::new(options.selection_type),
            viewport: Viewport::from_options(&options),
            columns,
            row_data: self.rows.into_iter().map(Arc::new).collect(),
            aggregations: self.aggregations,
            row_id: self.row_id,
            row_selectable: self.row_selectable,
            rows: Arc::from(Vec::new()),
            row_keys: Vec::new(),
            processed_count: 0,
            signals: GridSignals::new(),
            options,
        };
        engine.run_pipeline();

        tracing::debug!(
            target: targets::PIPELINE,
            columns = engine.columns.len(),
            rows = engine.row_data.len(),
            "grid built"
        );
        Ok(engine)
    }
}

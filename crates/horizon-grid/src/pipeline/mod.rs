//! The filter → sort → group → paginate pipeline.
//!
//! Stages work on raw data positions (`usize` indices into the row data) so
//! no row is cloned until the grid wraps the final sequence into display
//! rows. Each stage is skipped when its input state is empty.
//!
//! [`PipelineState`] owns the transformation state and the edit rules for it
//! (sort upsert, one filter per column, deduplicated grouping columns,
//! collapsed-key toggling). [`run`] applies it to a row set.

pub mod filter;
pub mod group;
pub mod paginate;
pub mod sort;

use std::collections::BTreeSet;
use std::sync::Arc;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use crate::column::ColumnRegistry;
use crate::data::RowData;
use crate::options::AggregationConfig;
use crate::row::GroupNode;

pub use filter::{FilterCondition, FilterOperator, filter_rows};
pub use group::{GROUP_KEY_SEPARATOR, composite_key, group_rows};
pub use paginate::{PaginationState, paginate};
pub use sort::{SortDirection, SortState, sort_indices};

/// An entry of the pipeline's output sequence.
#[derive(Debug, Clone)]
pub enum PipelineItem<R> {
    /// Raw data position of a data row.
    Data(usize),
    /// Synthetic group header.
    Group(Arc<GroupNode<R>>),
}

/// Transformation state applied on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    filters: Vec<FilterCondition>,
    sorts: Vec<SortState>,
    group_by: Vec<String>,
    collapsed: BTreeSet<String>,
    pagination: Option<PaginationState>,
}

impl PipelineState {
    /// Creates an empty state, paginated when `page_size` is given.
    pub fn new(page_size: Option<usize>) -> Self {
        Self {
            pagination: page_size.map(PaginationState::new),
            ..Default::default()
        }
    }

    /// Active filter conditions, in the order they were first set.
    pub fn filters(&self) -> &[FilterCondition] {
        &self.filters
    }

    /// The condition on `column_id`, if any.
    pub fn filter_for(&self, column_id: &str) -> Option<&FilterCondition> {
        self.filters
            .iter()
            .find(|condition| condition.column_id == column_id)
    }

    /// Replaces the condition on `column_id`, or removes it with `None`.
    ///
    /// The stored condition always carries `column_id`. A replaced condition
    /// moves to the end of the list.
    pub fn set_filter(&mut self, column_id: &str, condition: Option<FilterCondition>) {
        self.filters
            .retain(|existing| existing.column_id != column_id);
        if let Some(mut condition) = condition {
            condition.column_id = column_id.to_string();
            self.filters.push(condition);
        }
    }

    /// Removes every filter condition.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Sort entries in precedence order.
    pub fn sorts(&self) -> &[SortState] {
        &self.sorts
    }

    /// Direction of `column_id` in the sort state.
    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.sorts
            .iter()
            .find(|sort| sort.column_id == column_id)
            .map(|sort| sort.direction)
    }

    /// Upserts `column_id` with `direction`, or removes it with `None`.
    ///
    /// An existing entry keeps its precedence; a new one is appended.
    pub fn set_sort(&mut self, column_id: &str, direction: Option<SortDirection>) {
        let existing = self
            .sorts
            .iter()
            .position(|sort| sort.column_id == column_id);
        match (direction, existing) {
            (Some(direction), Some(position)) => self.sorts[position].direction = direction,
            (Some(direction), None) => self.sorts.push(SortState::new(column_id, direction)),
            (None, Some(position)) => {
                self.sorts.remove(position);
            }
            (None, None) => {}
        }
    }

    /// Removes every sort entry.
    pub fn clear_sorts(&mut self) {
        self.sorts.clear();
    }

    /// Grouping columns, outermost first.
    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    /// Sets the grouping columns, dropping repeated ids. Returns the stored
    /// list.
    pub fn set_group_by<I, S>(&mut self, column_ids: I) -> &[String]
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        self.group_by = column_ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();
        &self.group_by
    }

    /// Collapsed group keys.
    pub fn collapsed(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    /// Returns `true` unless `key` is collapsed.
    pub fn is_expanded(&self, key: &str) -> bool {
        !self.collapsed.contains(key)
    }

    /// Flips `key` between collapsed and expanded. Returns `true` if the
    /// group is now expanded.
    pub fn toggle_group(&mut self, key: &str) -> bool {
        if self.collapsed.remove(key) {
            true
        } else {
            self.collapsed.insert(key.to_string());
            false
        }
    }

    /// Expands every group. Returns `false` if nothing was collapsed.
    pub fn expand_all(&mut self) -> bool {
        let changed = !self.collapsed.is_empty();
        self.collapsed.clear();
        changed
    }

    /// Pagination state, when pagination is enabled.
    pub fn pagination(&self) -> Option<&PaginationState> {
        self.pagination.as_ref()
    }

    /// Mutable pagination state, when pagination is enabled.
    pub fn pagination_mut(&mut self) -> Option<&mut PaginationState> {
        self.pagination.as_mut()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput<R> {
    /// The displayed sequence.
    pub items: Vec<PipelineItem<R>>,
    /// Length of the sequence after grouping and before pagination.
    pub processed_count: usize,
    /// Number of rows that passed the filter stage.
    pub filtered_count: usize,
}

/// Runs every stage over `rows`.
///
/// Updates the pagination totals in `state` as a side effect.
pub fn run<R: RowData>(
    rows: &[Arc<R>],
    columns: &ColumnRegistry<R>,
    state: &mut PipelineState,
    aggregations: &[AggregationConfig],
) -> PipelineOutput<R> {
    let _span = PerfSpan::with_rows("pipeline", rows.len());

    let mut indices = if state.filters.is_empty() {
        (0..rows.len()).collect()
    } else {
        filter_rows(rows, columns, &state.filters)
    };
    let filtered_count = indices.len();
    tracing::trace!(target: targets::PIPELINE, input = rows.len(), output = filtered_count, "filter stage");

    if !state.sorts.is_empty() {
        let _span = PerfSpan::new("sort");
        sort_indices(rows, columns, &state.sorts, &mut indices);
        tracing::trace!(target: targets::PIPELINE, keys = state.sorts.len(), "sort stage");
    }

    let mut items = group_rows(
        rows,
        columns,
        &state.group_by,
        &state.collapsed,
        aggregations,
        &indices,
    );
    let processed_count = items.len();
    tracing::trace!(target: targets::PIPELINE, levels = state.group_by.len(), output = processed_count, "group stage");

    if let Some(pagination) = state.pagination.as_mut() {
        paginate(&mut items, pagination);
        tracing::trace!(
            target: targets::PIPELINE,
            page = pagination.current_page,
            total_pages = pagination.total_pages,
            output = items.len(),
            "paginate stage"
        );
    }

    tracing::debug!(
        target: targets::PIPELINE,
        input = rows.len(),
        filtered = filtered_count,
        processed = processed_count,
        displayed = items.len(),
        "pipeline run complete"
    );

    PipelineOutput {
        items,
        processed_count,
        filtered_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;
    use crate::data::Record;
    use crate::record;

    fn rows() -> Vec<Arc<Record>> {
        (0..12)
            .map(|n| {
                Arc::new(record! {
                    "n" => n,
                    "parity" => if n % 2 == 0 { "even" } else { "odd" },
                })
            })
            .collect()
    }

    fn columns() -> ColumnRegistry<Record> {
        ColumnRegistry::new([ColumnDef::field("n"), ColumnDef::field("parity")])
    }

    fn data_indices(items: &[PipelineItem<Record>]) -> Vec<usize> {
        items
            .iter()
            .filter_map(|item| match item {
                PipelineItem::Data(index) => Some(*index),
                PipelineItem::Group(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_sort_upsert_keeps_precedence() {
        let mut state = PipelineState::default();
        state.set_sort("a", Some(SortDirection::Asc));
        state.set_sort("b", Some(SortDirection::Desc));
        state.set_sort("a", Some(SortDirection::Desc));
        assert_eq!(
            state.sorts(),
            &[
                SortState::new("a", SortDirection::Desc),
                SortState::new("b", SortDirection::Desc),
            ]
        );
        state.set_sort("a", None);
        assert_eq!(state.sorts(), &[SortState::new("b", SortDirection::Desc)]);
        state.set_sort("zzz", None);
        assert_eq!(state.sorts().len(), 1);
        assert_eq!(state.sort_direction("b"), Some(SortDirection::Desc));
        assert_eq!(state.sort_direction("a"), None);
    }

    #[test]
    fn test_one_filter_per_column() {
        let mut state = PipelineState::default();
        state.set_filter("a", Some(FilterCondition::equals("a", 1)));
        state.set_filter("b", Some(FilterCondition::equals("b", 2)));
        state.set_filter("a", Some(FilterCondition::equals("other", 3)));
        assert_eq!(state.filters().len(), 2);
        assert_eq!(state.filters()[1], FilterCondition::equals("a", 3));
        assert_eq!(state.filter_for("a").map(|c| &c.value), Some(&3.into()));

        state.set_filter("a", None);
        assert!(state.filter_for("a").is_none());
    }

    #[test]
    fn test_group_by_deduplicates() {
        let mut state = PipelineState::default();
        assert_eq!(state.set_group_by(["a", "b", "a"]), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_toggle_group_twice_restores() {
        let mut state = PipelineState::default();
        assert!(!state.toggle_group("x"));
        assert!(!state.is_expanded("x"));
        assert!(state.toggle_group("x"));
        assert!(state.collapsed().is_empty());
        state.toggle_group("y");
        assert!(state.expand_all());
        assert!(!state.expand_all());
    }

    #[test]
    fn test_run_filter_sort_paginate() {
        let rows = rows();
        let mut state = PipelineState::new(Some(4));
        state.set_filter("n", Some(FilterCondition::greater_than("n", 2)));
        state.set_sort("n", Some(SortDirection::Desc));

        let output = run(&rows, &columns(), &mut state, &[]);
        assert_eq!(output.filtered_count, 9);
        assert_eq!(output.processed_count, 9);
        assert_eq!(data_indices(&output.items), vec![11, 10, 9, 8]);

        let pagination = state.pagination().copied().unwrap();
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.total_items, 9);

        state.pagination_mut().unwrap().set_page(3);
        let output = run(&rows, &columns(), &mut state, &[]);
        assert_eq!(data_indices(&output.items), vec![3]);
    }

    #[test]
    fn test_run_groups_before_paginating() {
        let rows = rows();
        let mut state = PipelineState::new(Some(5));
        state.set_group_by(["parity"]);

        let output = run(&rows, &columns(), &mut state, &[]);
        assert_eq!(output.processed_count, 14);
        assert_eq!(output.items.len(), 5);
        assert!(matches!(&output.items[0], PipelineItem::Group(node) if node.key == "even"));
        assert_eq!(data_indices(&output.items), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_run_without_state_is_identity() {
        let rows = rows();
        let mut state = PipelineState::new(None);
        let output = run(&rows, &columns(), &mut state, &[]);
        assert_eq!(data_indices(&output.items), (0..12).collect::<Vec<_>>());
        assert!(state.pagination().is_none());
    }
}

//! Change notifications published by the grid engine.

use std::sync::Arc;

use horizon_grid_core::Signal;

use crate::pipeline::{FilterCondition, SortDirection};
use crate::row::DisplayRow;
use crate::value::CellValue;

/// Payload of [`GridSignals::cell_value_changed`].
#[derive(Debug, Clone)]
pub struct CellValueChange<R> {
    /// Display index of the edited row at the time of the edit.
    pub row_index: usize,
    /// Raw data position of the edited row.
    pub source_index: usize,
    /// Edited column.
    pub column_id: String,
    /// Value written.
    pub value: CellValue,
    /// The row after the edit.
    pub row: Arc<R>,
}

/// The engine's named events.
///
/// Every signal is emitted synchronously from inside the mutator that caused
/// it, after the pipeline has been re-run, so slots always observe the new
/// state.
pub struct GridSignals<R> {
    // -------------------------------------------------------------------------
    // Data signals
    // -------------------------------------------------------------------------
    /// Emitted after the row data was replaced.
    /// Args: number of rows
    pub row_data_changed: Signal<usize>,

    /// Emitted after every pipeline run.
    /// Args: the displayed rows
    pub data_changed: Signal<Arc<[DisplayRow<R>]>>,

    /// Emitted after a cell edit was written back.
    pub cell_value_changed: Signal<CellValueChange<R>>,

    // -------------------------------------------------------------------------
    // Pipeline state signals
    // -------------------------------------------------------------------------
    /// Emitted after a sort command.
    /// Args: (column id, direction; `None` when the column was removed)
    pub sort_changed: Signal<(String, Option<SortDirection>)>,

    /// Emitted after a filter command.
    /// Args: (column id, condition; `None` when the filter was removed)
    pub filter_changed: Signal<(String, Option<FilterCondition>)>,

    /// Emitted after the grouping columns changed.
    /// Args: grouping column ids
    pub grouping_changed: Signal<Vec<String>>,

    /// Emitted after a group was collapsed or expanded.
    /// Args: (group key, expanded)
    pub group_toggled: Signal<(String, bool)>,

    /// Emitted after a page change.
    /// Args: current page (1-based)
    pub page_changed: Signal<usize>,

    /// Emitted after a page size change.
    /// Args: new page size
    pub page_size_changed: Signal<usize>,

    // -------------------------------------------------------------------------
    // Selection signals
    // -------------------------------------------------------------------------
    /// Emitted after the selection changed.
    /// Args: selected display indices, ascending
    pub selection_changed: Signal<Vec<usize>>,

    /// Emitted after the highlighted row changed.
    /// Args: highlighted display index
    pub highlight_changed: Signal<Option<usize>>,

    // -------------------------------------------------------------------------
    // Column and viewport signals
    // -------------------------------------------------------------------------
    /// Emitted after a column was resized.
    /// Args: (column id, applied width)
    pub column_resized: Signal<(String, f64)>,

    /// Emitted after a column was shown or hidden.
    /// Args: (column id, visible)
    pub column_visibility_changed: Signal<(String, bool)>,

    /// Emitted after the viewport was resized.
    /// Args: (width, height)
    pub viewport_changed: Signal<(f64, f64)>,

    /// Emitted after the viewport scrolled.
    /// Args: (scroll top, scroll left)
    pub scroll_changed: Signal<(f64, f64)>,
}

impl<R: Send + Sync + 'static> GridSignals<R> {
    /// Creates a bundle with no connections.
    pub fn new() -> Self {
        Self {
            row_data_changed: Signal::new(),
            data_changed: Signal::new(),
            cell_value_changed: Signal::new(),
            sort_changed: Signal::new(),
            filter_changed: Signal::new(),
            grouping_changed: Signal::new(),
            group_toggled: Signal::new(),
            page_changed: Signal::new(),
            page_size_changed: Signal::new(),
            selection_changed: Signal::new(),
            highlight_changed: Signal::new(),
            column_resized: Signal::new(),
            column_visibility_changed: Signal::new(),
            viewport_changed: Signal::new(),
            scroll_changed: Signal::new(),
        }
    }

    /// Blocks or unblocks every signal.
    pub fn set_blocked(&self, blocked: bool) {
        self.row_data_changed.set_blocked(blocked);
        self.data_changed.set_blocked(blocked);
        self.cell_value_changed.set_blocked(blocked);
        self.sort_changed.set_blocked(blocked);
        self.filter_changed.set_blocked(blocked);
        self.grouping_changed.set_blocked(blocked);
        self.group_toggled.set_blocked(blocked);
        self.page_changed.set_blocked(blocked);
        self.page_size_changed.set_blocked(blocked);
        self.selection_changed.set_blocked(blocked);
        self.highlight_changed.set_blocked(blocked);
        self.column_resized.set_blocked(blocked);
        self.column_visibility_changed.set_blocked(blocked);
        self.viewport_changed.set_blocked(blocked);
        self.scroll_changed.set_blocked(blocked);
    }

    /// Disconnects every slot from every signal.
    pub fn disconnect_all(&self) {
        self.row_data_changed.disconnect_all();
        self.data_changed.disconnect_all();
        self.cell_value_changed.disconnect_all();
        self.sort_changed.disconnect_all();
        self.filter_changed.disconnect_all();
        self.grouping_changed.disconnect_all();
        self.group_toggled.disconnect_all();
        self.page_changed.disconnect_all();
        self.page_size_changed.disconnect_all();
        self.selection_changed.disconnect_all();
        self.highlight_changed.disconnect_all();
        self.column_resized.disconnect_all();
        self.column_visibility_changed.disconnect_all();
        self.viewport_changed.disconnect_all();
        self.scroll_changed.disconnect_all();
    }

    /// Total number of connected slots across all signals.
    pub fn connection_count(&self) -> usize {
        self.row_data_changed.connection_count()
            + self.data_changed.connection_count()
            + self.cell_value_changed.connection_count()
            + self.sort_changed.connection_count()
            + self.filter_changed.connection_count()
            + self.grouping_changed.connection_count()
            + self.group_toggled.connection_count()
            + self.page_changed.connection_count()
            + self.page_size_changed.connection_count()
            + self.selection_changed.connection_count()
            + self.highlight_changed.connection_count()
            + self.column_resized.connection_count()
            + self.column_visibility_changed.connection_count()
            + self.viewport_changed.connection_count()
            + self.scroll_changed.connection_count()
    }
}

impl<R: Send + Sync + 'static> Default for GridSignals<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use parking_lot::Mutex;

    #[test]
    fn test_disconnect_all() {
        let signals: GridSignals<Record> = GridSignals::new();
        signals.page_changed.connect(|_| {});
        signals.sort_changed.connect(|_| {});
        signals.data_changed.connect(|_| {});
        assert_eq!(signals.connection_count(), 3);

        signals.disconnect_all();
        assert_eq!(signals.connection_count(), 0);
    }

    #[test]
    fn test_blocking_applies_to_every_signal() {
        let signals: GridSignals<Record> = GridSignals::new();
        let pages = Arc::new(Mutex::new(Vec::new()));

        let pages_clone = pages.clone();
        signals.page_changed.connect(move |&page| pages_clone.lock().push(page));

        signals.set_blocked(true);
        signals.page_changed.emit(2);
        assert!(signals.group_toggled.is_blocked());
        signals.set_blocked(false);
        signals.page_changed.emit(3);

        assert_eq!(*pages.lock(), vec![3]);
    }
}

//! Scroll position and container geometry.
//!
//! A [`Viewport`] owns the grid's geometry and scroll offsets and delegates
//! the visible range computation to [`virtual_scroll`]. The body height
//! available for rows is the viewport height minus the header height.

pub mod virtual_scroll;

use horizon_grid_core::logging::targets;

use crate::options::GridOptions;

pub use virtual_scroll::{DEFAULT_OVERSCAN, VirtualScroll, VisibleRange, visible_range};

/// Geometry and scroll state of the grid body.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    row_height: f64,
    header_height: f64,
    scroll_top: f64,
    scroll_left: f64,
    total_rows: usize,
    overscan: usize,
}

impl Viewport {
    /// Creates a viewport with no rows and no scroll.
    pub fn new(width: f64, height: f64, row_height: f64, header_height: f64) -> Self {
        Self {
            width: non_negative(width),
            height: non_negative(height),
            row_height,
            header_height: non_negative(header_height),
            scroll_top: 0.0,
            scroll_left: 0.0,
            total_rows: 0,
            overscan: DEFAULT_OVERSCAN,
        }
    }

    /// Creates a viewport from the grid options.
    pub fn from_options(options: &GridOptions) -> Self {
        Self::new(
            options.viewport_width,
            options.viewport_height,
            options.row_height,
            options.header_height,
        )
        .with_overscan(options.overscan)
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Viewport width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Viewport height, header included.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Row height.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Header height.
    pub fn header_height(&self) -> f64 {
        self.header_height
    }

    /// Overscan in rows.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Height available for body rows.
    pub fn container_height(&self) -> f64 {
        non_negative(self.height - self.header_height)
    }

    /// Resizes the viewport. Negative sizes become zero.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = non_negative(width);
        self.height = non_negative(height);
        tracing::trace!(target: targets::VIEWPORT, width = self.width, height = self.height, "viewport resized");
    }

    /// Changes the row height.
    pub fn set_row_height(&mut self, row_height: f64) {
        self.row_height = row_height;
    }

    /// Changes the header height.
    pub fn set_header_height(&mut self, header_height: f64) {
        self.header_height = non_negative(header_height);
    }

    /// Vertical scroll offset.
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Horizontal scroll offset.
    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    /// Sets the vertical scroll offset, clamped to `>= 0`.
    pub fn set_scroll_top(&mut self, value: f64) {
        self.scroll_top = non_negative(value);
    }

    /// Sets the horizontal scroll offset, clamped to `>= 0`.
    pub fn set_scroll_left(&mut self, value: f64) {
        self.scroll_left = non_negative(value);
    }

    /// Number of rows in the displayed sequence.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Updates the row count. The grid calls this after every pipeline run.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
    }

    /// Total height of all rows.
    pub fn content_height(&self) -> f64 {
        self.calculator().content_height()
    }

    /// Largest scroll offset that still fills the container.
    pub fn max_scroll_top(&self) -> f64 {
        non_negative(self.content_height() - self.container_height())
    }

    /// Rows to render at the current scroll offset.
    pub fn visible_range(&self) -> VisibleRange {
        self.calculator().calculate(self.scroll_top)
    }

    /// Scrolls the minimum distance that brings row `index` fully into view.
    ///
    /// Rows past the end scroll to the last row. Returns `true` if the
    /// offset changed.
    pub fn scroll_to_row(&mut self, index: usize) -> bool {
        if self.total_rows == 0 || !(self.row_height.is_finite() && self.row_height > 0.0) {
            return false;
        }
        let index = index.min(self.total_rows - 1);
        let row_top = index as f64 * self.row_height;
        let row_bottom = row_top + self.row_height;
        let container = self.container_height();

        let target = if row_top < self.scroll_top {
            row_top
        } else if row_bottom > self.scroll_top + container {
            non_negative(row_bottom - container)
        } else {
            return false;
        };
        self.scroll_top = target;
        tracing::trace!(target: targets::VIEWPORT, index, scroll_top = target, "scrolled to row");
        true
    }

    fn calculator(&self) -> VirtualScroll {
        VirtualScroll::new(self.row_height, self.container_height(), self.total_rows)
            .with_overscan(self.overscan)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_options(&GridOptions::default())
    }
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

static_assertions::assert_impl_all!(Viewport: Send, Sync);

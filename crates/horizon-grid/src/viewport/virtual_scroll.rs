//! Virtualization math for fixed-height rows.
//!
//! Maps a vertical scroll offset to the inclusive range of row indices that
//! must be rendered, padded by `overscan` rows on each side.

use std::ops::Range;

use serde::Serialize;

/// Rows rendered beyond each edge of the visible window by default.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Inclusive range of rows to render.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRange {
    /// First index to render.
    pub start_index: usize,
    /// Last index to render (inclusive).
    pub end_index: usize,
    /// Number of rows to render; `0` for an empty range.
    pub visible_count: usize,
    /// Pixel offset of `start_index` from the top of the content.
    pub offset: f64,
}

impl VisibleRange {
    /// The empty range.
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
        visible_count: 0,
        offset: 0.0,
    };

    /// Returns `true` if no row is to be rendered.
    pub fn is_empty(&self) -> bool {
        self.visible_count == 0
    }

    /// Returns `true` if `index` is within the range.
    pub fn contains(&self, index: usize) -> bool {
        !self.is_empty() && (self.start_index..=self.end_index).contains(&index)
    }

    /// The range as a half-open `Range`, empty when nothing is visible.
    pub fn indices(&self) -> Range<usize> {
        if self.is_empty() {
            0..0
        } else {
            self.start_index..self.end_index + 1
        }
    }
}

/// Geometry of a virtualized list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualScroll {
    /// Height of one row.
    pub item_height: f64,
    /// Height of the scrollable area.
    pub container_height: f64,
    /// Number of rows.
    pub total_items: usize,
    /// Rows of padding on each side.
    pub overscan: usize,
}

impl VirtualScroll {
    /// Creates a calculator with the default overscan.
    pub fn new(item_height: f64, container_height: f64, total_items: usize) -> Self {
        Self {
            item_height,
            container_height,
            total_items,
            overscan: DEFAULT_OVERSCAN,
        }
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Total content height.
    pub fn content_height(&self) -> f64 {
        if self.item_height.is_finite() && self.item_height > 0.0 {
            self.total_items as f64 * self.item_height
        } else {
            0.0
        }
    }

    /// Range to render at `scroll_offset`.
    pub fn calculate(&self, scroll_offset: f64) -> VisibleRange {
        visible_range(
            scroll_offset,
            self.item_height,
            self.container_height,
            self.total_items,
            self.overscan,
        )
    }
}

/// Computes the range of rows to render.
///
/// The padded pixel window `[offset - overscan·h, offset + container +
/// overscan·h]` is clamped to the content, converted to row indices by
/// flooring, and the last index is clamped to `total_items - 1`.
///
/// An empty range is returned when there are no rows or the row height is
/// not a positive finite number. Negative or `NaN` offsets and heights are
/// treated as zero.
pub fn visible_range(
    scroll_offset: f64,
    item_height: f64,
    container_height: f64,
    total_items: usize,
    overscan: usize,
) -> VisibleRange {
    if total_items == 0 || !(item_height.is_finite() && item_height > 0.0) {
        return VisibleRange::EMPTY;
    }

    let scroll_offset = non_negative(scroll_offset);
    let container_height = non_negative(container_height);
    let content_height = total_items as f64 * item_height;
    let padding = overscan as f64 * item_height;

    let first_pixel = (scroll_offset - padding).clamp(0.0, content_height);
    let last_pixel = (scroll_offset + container_height + padding).clamp(0.0, content_height);

    let last = total_items - 1;
    let end_index = ((last_pixel / item_height).floor() as usize).min(last);
    let start_index = ((first_pixel / item_height).floor() as usize).min(end_index);

    VisibleRange {
        start_index,
        end_index,
        visible_count: end_index - start_index + 1,
        offset: start_index as f64 * item_height,
    }
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

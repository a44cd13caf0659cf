//! Paginate stage.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Pagination bookkeeping.
///
/// `current_page` is 1-based and always within `[1, max(1, total_pages)]`
/// once totals have been recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// Current page, 1-based.
    pub current_page: usize,
    /// Rows per page; never zero.
    pub page_size: usize,
    /// `ceil(total_items / page_size)`, at least 1.
    pub total_pages: usize,
    /// Length of the sequence before slicing.
    pub total_items: usize,
}

impl PaginationState {
    /// Creates the state for an empty sequence. A zero size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 1,
            total_items: 0,
        }
    }

    /// Recomputes the totals for a sequence of `total_items` and clamps the
    /// current page into range.
    pub fn update_totals(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.total_pages = total_items.div_ceil(self.page_size).max(1);
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }

    /// Moves to `page`, clamped into `[1, total_pages]`. Returns the page
    /// actually applied.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages);
        self.current_page
    }

    /// Changes the page size and returns to the first page. A zero size is
    /// ignored and returns `false`.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        if page_size == 0 {
            return false;
        }
        self.page_size = page_size;
        self.current_page = 1;
        self.update_totals(self.total_items);
        true
    }

    /// Range of the current page within the unsliced sequence.
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(self.total_items);
        let end = start.saturating_add(self.page_size).min(self.total_items);
        start..end
    }

    /// Returns `true` if there is a page after the current one.
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Returns `true` if there is a page before the current one.
    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Slices `items` down to the current page after recomputing the totals
/// from its full length.
pub fn paginate<T>(items: &mut Vec<T>, state: &mut PaginationState) {
    state.update_totals(items.len());
    let range = state.page_range();
    items.truncate(range.end);
    items.drain(..range.start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_and_clamp() {
        let mut state = PaginationState::new(10);
        state.update_totals(25);
        assert_eq!(state.total_pages, 3);

        state.set_page(3);
        state.update_totals(12);
        assert_eq!(state.total_pages, 2);
        assert_eq!(state.current_page, 2);

        state.update_totals(0);
        assert_eq!(state.total_pages, 1);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.page_range(), 0..0);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut state = PaginationState::new(10);
        state.update_totals(25);
        assert_eq!(state.set_page(0), 1);
        assert_eq!(state.set_page(99), 3);
        assert!(!state.has_next_page());
        assert!(state.has_previous_page());
    }

    #[test]
    fn test_set_page_size_resets_page() {
        let mut state = PaginationState::new(10);
        state.update_totals(25);
        state.set_page(3);
        assert!(state.set_page_size(5));
        assert_eq!(state.current_page, 1);
        assert_eq!(state.total_pages, 5);

        assert!(!state.set_page_size(0));
        assert_eq!(state.page_size, 5);
    }

    #[test]
    fn test_paginate_slices_last_partial_page() {
        let mut state = PaginationState::new(10);
        state.update_totals(25);
        state.set_page(3);

        let mut items: Vec<usize> = (0..25).collect();
        paginate(&mut items, &mut state);
        assert_eq!(items, (20..25).collect::<Vec<_>>());
        assert_eq!(state.total_items, 25);
    }

    #[test]
    fn test_paginate_reclamps_after_shrink() {
        let mut state = PaginationState::new(10);
        state.update_totals(100);
        state.set_page(10);

        let mut items: Vec<usize> = (0..15).collect();
        paginate(&mut items, &mut state);
        assert_eq!(state.current_page, 2);
        assert_eq!(items, (10..15).collect::<Vec<_>>());
    }
}

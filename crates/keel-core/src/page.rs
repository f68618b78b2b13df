//! Pagination cursor shared by column row-windowing and dropdown lists.
//!
//! A [`Page`] stores the current page and the index of the last page
//! (`total`). Both are zero-based, so a list that fits on a single page
//! has `total == 0`. The invariant `current <= total` holds after every
//! operation.
//!
//! Stepping past either end wraps around, jumping to an absolute page
//! clamps, and [`Page::recompute`] refreshes `total` from a row count
//! before each render.
//!
//! # Example
//!
//! ```
//! use keel_core::Page;
//!
//! let mut page = Page::default();
//! page.recompute(25, 19);
//! assert_eq!(page.total(), 1);
//!
//! page.next();
//! assert_eq!(page.current(), 1);
//! assert_eq!(page.window(25, 19), 19..25);
//!
//! page.next();
//! assert_eq!(page.current(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Pagination operations understood by the column pager.
///
/// The numeric codes match the `changecolumnpage` wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOp {
    /// Step back one page, wrapping to the last page.
    Previous,
    /// Step forward one page, wrapping to the first page.
    Next,
    /// Go to the first page.
    First,
    /// Go to the last page.
    Last,
    /// Jump to a 1-based page number typed by the viewer (clamped).
    Jump(i64),
}

impl PageOp {
    /// Wire code for this operation.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            PageOp::Previous => 0,
            PageOp::Next => 1,
            PageOp::First => 2,
            PageOp::Last => 3,
            PageOp::Jump(_) => 4,
        }
    }
}

/// Pagination cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    current: usize,
    total: usize,
}

impl Page {
    /// Creates a page cursor, wrapping `current` to 0 when it exceeds `total`.
    #[must_use]
    pub fn new(current: usize, total: usize) -> Self {
        let mut page = Page { current, total };
        page.check();
        page
    }

    /// Zero-based index of the page being shown.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Zero-based index of the last page.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns `true` when there is more than one page.
    #[must_use]
    pub fn is_paged(&self) -> bool {
        self.total > 0
    }

    /// Steps back one page; from the first page this wraps to the last.
    pub fn previous(&mut self) {
        self.current = if self.current == 0 {
            self.total
        } else {
            self.current - 1
        };
    }

    /// Steps forward one page; from the last page this wraps to the first.
    pub fn next(&mut self) {
        self.current = if self.current >= self.total {
            0
        } else {
            self.current + 1
        };
    }

    /// Moves to the first page.
    pub fn first(&mut self) {
        self.current = 0;
    }

    /// Moves to the last page.
    pub fn last(&mut self) {
        self.current = self.total;
    }

    /// Moves to a zero-based page, clamped into `[0, total]` without wrapping.
    pub fn jump(&mut self, page: i64) {
        let clamped = page.clamp(0, self.total as i64);
        self.current = clamped as usize;
    }

    /// Applies a [`PageOp`]. `Jump` carries a 1-based page number.
    pub fn apply(&mut self, op: PageOp) {
        match op {
            PageOp::Previous => self.previous(),
            PageOp::Next => self.next(),
            PageOp::First => self.first(),
            PageOp::Last => self.last(),
            PageOp::Jump(number) => self.jump(number.saturating_sub(1)),
        }
    }

    /// Resets the cursor to the first page without touching `total`.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Recomputes `total` for `len` rows at `capacity` rows per page.
    ///
    /// If the stored cursor no longer fits, it wraps back to the first page.
    pub fn recompute(&mut self, len: usize, capacity: usize) {
        self.total = last_page(len, capacity);
        self.check();
    }

    /// Range of row indices visible on the current page.
    #[must_use]
    pub fn window(&self, len: usize, capacity: usize) -> Range<usize> {
        let capacity = capacity.max(1);
        let start = capacity.saturating_mul(self.current).min(len);
        let end = start.saturating_add(capacity).min(len);
        start..end
    }

    fn check(&mut self) {
        if self.current > self.total {
            self.current = 0;
        }
    }
}

/// Index of the last page for `len` rows at `capacity` rows per page.
///
/// `ceil(len / capacity) - 1`, floored at zero.
#[must_use]
pub fn last_page(len: usize, capacity: usize) -> usize {
    let capacity = capacity.max(1);
    len.div_ceil(capacity).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Construction ====================

    #[test]
    fn test_default_is_single_page() {
        let page = Page::default();
        assert_eq!(page.current(), 0);
        assert_eq!(page.total(), 0);
        assert!(!page.is_paged());
    }

    #[test]
    fn test_new_wraps_out_of_range_cursor() {
        let page = Page::new(5, 2);
        assert_eq!(page.current(), 0);
        assert_eq!(page.total(), 2);
    }

    // ==================== Total computation ====================

    #[test]
    fn test_last_page_counts() {
        assert_eq!(last_page(0, 19), 0);
        assert_eq!(last_page(1, 19), 0);
        assert_eq!(last_page(19, 19), 0);
        assert_eq!(last_page(20, 19), 1);
        assert_eq!(last_page(25, 19), 1);
        assert_eq!(last_page(39, 19), 2);
    }

    #[test]
    fn test_last_page_zero_capacity_is_treated_as_one() {
        assert_eq!(last_page(3, 0), 2);
    }

    #[test]
    fn test_recompute_wraps_when_rows_shrink() {
        let mut page = Page::new(2, 2);
        page.recompute(10, 19);
        assert_eq!(page.total(), 0);
        assert_eq!(page.current(), 0);
    }

    // ==================== Stepping ====================

    #[test]
    fn test_previous_wraps_to_last() {
        let mut page = Page::new(0, 3);
        page.previous();
        assert_eq!(page.current(), 3);
    }

    #[test]
    fn test_next_wraps_to_first() {
        let mut page = Page::new(3, 3);
        page.next();
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_first_and_last() {
        let mut page = Page::new(1, 4);
        page.last();
        assert_eq!(page.current(), 4);
        page.first();
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_jump_clamps_without_wrapping() {
        let mut page = Page::new(0, 4);
        page.jump(10);
        assert_eq!(page.current(), 4);
        page.jump(-3);
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_apply_jump_is_one_based() {
        let mut page = Page::new(0, 4);
        page.apply(PageOp::Jump(3));
        assert_eq!(page.current(), 2);
        page.apply(PageOp::Jump(0));
        assert_eq!(page.current(), 0);
    }

    #[test]
    fn test_op_codes() {
        assert_eq!(PageOp::Previous.code(), 0);
        assert_eq!(PageOp::Next.code(), 1);
        assert_eq!(PageOp::First.code(), 2);
        assert_eq!(PageOp::Last.code(), 3);
        assert_eq!(PageOp::Jump(7).code(), 4);
    }

    // ==================== Windowing ====================

    #[test]
    fn test_window_second_page_of_twenty_five() {
        let mut page = Page::default();
        page.recompute(25, 19);
        page.next();
        let window = page.window(25, 19);
        assert_eq!(window, 19..25);
        assert_eq!(window.len(), 6);
    }

    #[test]
    fn test_window_empty_list() {
        let page = Page::default();
        assert_eq!(page.window(0, 19), 0..0);
    }

    // ==================== Properties ====================

    proptest! {
        #[test]
        fn prop_next_past_total_wraps_to_zero(total in 0usize..50) {
            let mut page = Page::new(total, total);
            page.next();
            prop_assert_eq!(page.current(), 0);
        }

        #[test]
        fn prop_previous_past_zero_wraps_to_total(total in 0usize..50) {
            let mut page = Page::new(0, total);
            page.previous();
            prop_assert_eq!(page.current(), total);
        }

        #[test]
        fn prop_jump_stays_in_range(total in 0usize..50, target in -100i64..100) {
            let mut page = Page::new(0, total);
            page.jump(target);
            prop_assert!(page.current() <= total);
            if target >= 0 && (target as usize) <= total {
                prop_assert_eq!(page.current(), target as usize);
            }
        }

        #[test]
        fn prop_window_never_exceeds_capacity(len in 0usize..500, capacity in 1usize..40, steps in 0usize..30) {
            let mut page = Page::default();
            page.recompute(len, capacity);
            for _ in 0..steps {
                page.next();
            }
            let window = page.window(len, capacity);
            prop_assert!(window.len() <= capacity);
            prop_assert!(window.end <= len);
            prop_assert!(page.current() <= page.total());
        }
    }
}

//! # Page Break Decisions
//!
//! Parts are unbreakable: a part either fits below the cursor or moves to
//! the next page as a whole. The one exception is a part taller than the
//! page's content area, which can never fit; it is placed where it is on a
//! fresh page and allowed to run past the bottom margin.

/// What to do with a part at the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// The part fits on the current page.
    Place,
    /// Start a new page and place the part at its top.
    MoveToNextPage,
    /// The part does not fit, but the page is still empty; place it anyway.
    Overflow,
}

/// Decide where a part of `part_height` goes when the cursor is at
/// `cursor_y` on a page whose content area spans `page_top..content_bottom`.
pub fn decide_break(cursor_y: f64, part_height: f64, page_top: f64, content_bottom: f64) -> BreakDecision {
    if cursor_y + part_height <= content_bottom {
        return BreakDecision::Place;
    }

    // Moving off an empty page would only leave a blank page behind.
    if cursor_y <= page_top {
        return BreakDecision::Overflow;
    }

    BreakDecision::MoveToNextPage
}

/// True when a part can never fit between the margins.
pub fn is_oversized(part_height: f64, page_top: f64, content_bottom: f64) -> bool {
    part_height > content_bottom - page_top
}

//! Read-only view of the host waterfall.
//!
//! The navigator never measures anything itself. Row geometry, the visible row
//! window, collapse and search state all come from the host through the
//! [`Accessors`] trait, which is attached once the host has laid out its rows.

use crate::trace::SpanId;
use std::collections::HashSet;

/// Vertical placement of a row, in the host's height units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPosition {
    /// Offset of the row's top edge from the top of the scrollable content
    pub y: f64,
    /// Height of the row
    pub height: f64,
}

impl RowPosition {
    pub fn new(y: f64, height: f64) -> Self {
        Self { y, height }
    }

    /// Whether the geometry can be used to compute a scroll target.
    pub fn is_valid(&self) -> bool {
        self.y.is_finite() && self.height.is_finite() && self.height >= 0.0
    }
}

/// Visible fraction of the trace duration, `0.0..=1.0` on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRange {
    pub start: f64,
    pub end: f64,
}

impl ViewRange {
    /// The whole trace.
    pub const FULL: ViewRange = ViewRange { start: 0.0, end: 1.0 };

    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns `true` when only part of the trace duration is shown.
    pub fn is_zoomed(&self) -> bool {
        self.start != 0.0 || self.end != 1.0
    }
}

impl Default for ViewRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<(f64, f64)> for ViewRange {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

/// Host state the navigator reads on every call.
///
/// Implementations must answer from live view state; the navigator caches
/// nothing between calls. Row indices refer to displayed rows, span indices to
/// positions in the trace's span list.
pub trait Accessors {
    /// Fraction of the trace duration currently visible.
    fn view_range(&self) -> ViewRange;

    /// Ids of spans matching the active text search, if a search is active.
    fn searched_span_ids(&self) -> Option<HashSet<SpanId>>;

    /// Ids of spans whose children are collapsed, if any.
    fn collapsed_children(&self) -> Option<HashSet<SpanId>>;

    /// Height of the scroll viewport.
    fn view_height(&self) -> f64;

    /// First row at least partly inside the viewport.
    fn top_row_index_visible(&self) -> usize;

    /// Last row at least partly inside the viewport.
    fn bottom_row_index_visible(&self) -> usize;

    /// Geometry of the given row, `None` if the row is unknown.
    fn row_position(&self, row_index: usize) -> Option<RowPosition>;

    fn map_row_index_to_span_index(&self, row_index: usize) -> usize;

    fn map_span_index_to_row_index(&self, span_index: usize) -> usize;
}

//! In-memory waterfall host with uniform row height.
//!
//! [`UniformRowView`] is the smallest host the navigator can drive: every
//! displayed span occupies one row of fixed height, rows are the spans not
//! hidden under a collapsed ancestor, and the view owns its scroll offset.
//! It implements both [`Accessors`] and [`Scroller`], so one `Rc` handle serves
//! as both capabilities.
//!
//! State lives in `Cell`/`RefCell` because the navigator and the host share the
//! same handle on a single thread.

use crate::accessors::{Accessors, RowPosition, ViewRange};
use crate::scroller::Scroller;
use crate::trace::{SpanId, Trace};
use crate::visibility::visible_span_indices;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Default row height in pixels.
pub const ROW_HEIGHT: f64 = 22.0;

/// Returns the ids of spans whose operation name contains `query`, ignoring case.
pub fn filter_spans(trace: &Trace, query: &str) -> HashSet<SpanId> {
    let query = query.to_lowercase();
    trace
        .spans()
        .iter()
        .filter(|span| span.operation_name.to_lowercase().contains(&query))
        .map(|span| span.span_id.clone())
        .collect()
}

pub struct UniformRowView {
    trace: Rc<Trace>,
    row_height: f64,
    view_height: Cell<f64>,
    scroll_top: Cell<f64>,
    view_range: Cell<ViewRange>,
    collapsed: RefCell<HashSet<SpanId>>,
    searched: RefCell<Option<HashSet<SpanId>>>,
    /// Row index -> span index, ascending
    rows: RefCell<Vec<usize>>,
}

impl UniformRowView {
    pub fn new(trace: Rc<Trace>, row_height: f64, view_height: f64) -> Self {
        let rows = (0..trace.len()).collect();
        Self {
            trace,
            row_height,
            view_height: Cell::new(view_height),
            scroll_top: Cell::new(0.0),
            view_range: Cell::new(ViewRange::FULL),
            collapsed: RefCell::new(HashSet::new()),
            searched: RefCell::new(None),
            rows: RefCell::new(rows),
        }
    }

    pub fn trace(&self) -> &Rc<Trace> {
        &self.trace
    }

    // ===== Geometry =====

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn content_height(&self) -> f64 {
        self.row_count() as f64 * self.row_height
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    pub fn set_view_height(&self, height: f64) {
        self.view_height.set(height.max(0.0));
        self.scroll_to(self.scroll_top());
    }

    /// Span displayed at the given row, if any.
    pub fn span_index_for_row(&self, row_index: usize) -> Option<usize> {
        self.rows.borrow().get(row_index).copied()
    }

    fn max_scroll_top(&self) -> f64 {
        (self.content_height() - self.view_height.get()).max(0.0)
    }

    fn last_row(&self) -> usize {
        self.row_count().saturating_sub(1)
    }

    // ===== Collapse, Search, Zoom =====

    /// Collapses or expands the children of a span. Returns `true` when now collapsed.
    pub fn toggle_collapsed(&self, span_id: &str) -> bool {
        let now_collapsed = {
            let mut collapsed = self.collapsed.borrow_mut();
            if collapsed.remove(span_id) {
                false
            } else {
                collapsed.insert(span_id.to_string());
                true
            }
        };
        self.refresh_rows();
        now_collapsed
    }

    pub fn set_collapsed(&self, ids: HashSet<SpanId>) {
        *self.collapsed.borrow_mut() = ids;
        self.refresh_rows();
    }

    /// Sets the text search; `None` or an empty query clears it.
    pub fn set_search_query(&self, query: Option<&str>) {
        let matches = query
            .filter(|q| !q.is_empty())
            .map(|q| filter_spans(&self.trace, q));
        *self.searched.borrow_mut() = matches;
    }

    pub fn set_searched_span_ids(&self, ids: Option<HashSet<SpanId>>) {
        *self.searched.borrow_mut() = ids;
    }

    pub fn set_view_range(&self, range: ViewRange) {
        self.view_range.set(range);
    }

    fn refresh_rows(&self) {
        let rows = visible_span_indices(&self.trace, &self.collapsed.borrow());
        *self.rows.borrow_mut() = rows;
        // Content may have shrunk under the current offset
        self.scroll_to(self.scroll_top());
    }
}

impl Accessors for UniformRowView {
    fn view_range(&self) -> ViewRange {
        self.view_range.get()
    }

    fn searched_span_ids(&self) -> Option<HashSet<SpanId>> {
        self.searched.borrow().clone()
    }

    fn collapsed_children(&self) -> Option<HashSet<SpanId>> {
        let collapsed = self.collapsed.borrow();
        (!collapsed.is_empty()).then(|| collapsed.clone())
    }

    fn view_height(&self) -> f64 {
        self.view_height.get()
    }

    fn top_row_index_visible(&self) -> usize {
        let row = (self.scroll_top() / self.row_height).floor() as usize;
        row.min(self.last_row())
    }

    fn bottom_row_index_visible(&self) -> usize {
        let bottom_edge = self.scroll_top() + self.view_height.get();
        let row = ((bottom_edge / self.row_height).ceil() as usize).saturating_sub(1);
        row.clamp(self.top_row_index_visible(), self.last_row())
    }

    fn row_position(&self, row_index: usize) -> Option<RowPosition> {
        (row_index < self.row_count())
            .then(|| RowPosition::new(row_index as f64 * self.row_height, self.row_height))
    }

    fn map_row_index_to_span_index(&self, row_index: usize) -> usize {
        let rows = self.rows.borrow();
        rows.get(row_index).or(rows.last()).copied().unwrap_or(0)
    }

    /// Hidden spans map to the closest displayed row above them, which in
    /// depth-first order is their collapsed ancestor.
    fn map_span_index_to_row_index(&self, span_index: usize) -> usize {
        match self.rows.borrow().binary_search(&span_index) {
            Ok(row) => row,
            Err(insert_at) => insert_at.saturating_sub(1),
        }
    }
}

impl Scroller for UniformRowView {
    /// Scrolls apply immediately, so there is never a move in flight for
    /// `append_to_history` to chain onto.
    fn scroll_by(&self, amount: f64, _append_to_history: bool) {
        self.scroll_to(self.scroll_top() + amount);
    }

    fn scroll_to(&self, offset: f64) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.scroll_top.set(offset.clamp(0.0, self.max_scroll_top()));
    }
}

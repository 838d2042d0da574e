//! Keyboard and programmatic scroll navigation across waterfall rows.
//!
//! The [`ScrollNavigator`] decides which row to bring into view next and hands
//! the resulting offset to the host's [`Scroller`]. It owns no view state:
//! every call re-reads the trace and the host [`Accessors`], so the outcome
//! always reflects the view as it is at call time.

use crate::accessors::Accessors;
use crate::config::NavigatorConfig;
use crate::error::NavError;
use crate::scroller::Scroller;
use crate::trace::{SpanId, Trace};
use crate::visibility::is_span_hidden;
use std::collections::HashSet;
use std::rc::Rc;

/// Direction of travel through the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward earlier rows (-1)
    Up,
    /// Toward later rows (+1)
    Down,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Walks span indices from `next` toward one end of the trace, inclusive.
struct SpanWalk {
    next: Option<usize>,
    last: usize,
    direction: Direction,
}

impl SpanWalk {
    fn new(from: Option<usize>, direction: Direction, last: usize) -> Self {
        Self {
            next: from.filter(|&index| index <= last),
            last,
            direction,
        }
    }
}

impl Iterator for SpanWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = match self.direction {
            Direction::Up => current.checked_sub(1),
            Direction::Down => Some(current + 1).filter(|&index| index <= self.last),
        };
        Some(current)
    }
}

/// Filters that decide whether a span is worth navigating to.
struct SpanFilter {
    /// Visible time window in trace time units, when zoomed in
    time_window: Option<(f64, f64)>,
    searched: Option<HashSet<SpanId>>,
    collapsed: Option<HashSet<SpanId>>,
}

impl SpanFilter {
    fn read(accessors: &dyn Accessors, trace: &Trace) -> Self {
        let view_range = accessors.view_range();
        let time_window = view_range.is_zoomed().then(|| {
            let start = trace.start_time() as f64;
            let duration = trace.duration() as f64;
            (start + duration * view_range.start, start + duration * view_range.end)
        });

        Self {
            time_window,
            searched: accessors.searched_span_ids().filter(|ids| !ids.is_empty()),
            collapsed: accessors.collapsed_children().filter(|ids| !ids.is_empty()),
        }
    }

    fn is_hidden(&self, trace: &Trace, index: usize) -> bool {
        self.collapsed
            .as_ref()
            .is_some_and(|collapsed| is_span_hidden(trace, index, collapsed))
    }

    fn matches(&self, trace: &Trace, index: usize) -> bool {
        let Some(span) = trace.span(index) else {
            return false;
        };

        if let Some((start, end)) = self.time_window {
            if span.start_time as f64 > end || (span.end_time() as f64) < start {
                tracing::trace!(index, "outside the visible time window");
                return false;
            }
        }
        if let Some(searched) = &self.searched {
            if !searched.contains(&span.span_id) {
                tracing::trace!(index, "not a search match");
                return false;
            }
        }
        !self.is_hidden(trace, index)
    }
}

/// Computes scroll targets for page and span navigation.
///
/// Lifecycle:
/// - constructed with a trace and the host's scroller
/// - accessors attached once the host has laid out its rows
/// - [`destroy`](Self::destroy) releases everything on teardown
pub struct ScrollNavigator {
    trace: Option<Rc<Trace>>,
    accessors: Option<Rc<dyn Accessors>>,
    scroller: Option<Rc<dyn Scroller>>,
    config: NavigatorConfig,
}

impl ScrollNavigator {
    /// Creates a navigator with default settings and no accessors.
    pub fn new(trace: Option<Rc<Trace>>, scroller: Rc<dyn Scroller>) -> Self {
        Self::with_config(trace, scroller, NavigatorConfig::default())
    }

    pub fn with_config(trace: Option<Rc<Trace>>, scroller: Rc<dyn Scroller>, config: NavigatorConfig) -> Self {
        Self {
            trace,
            accessors: None,
            scroller: Some(scroller),
            config,
        }
    }

    // ===== State =====

    pub fn trace(&self) -> Option<&Rc<Trace>> {
        self.trace.as_ref()
    }

    pub fn accessors(&self) -> Option<&Rc<dyn Accessors>> {
        self.accessors.as_ref()
    }

    pub fn has_scroller(&self) -> bool {
        self.scroller.is_some()
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Replaces the trace. Nothing else changes.
    pub fn set_trace(&mut self, trace: Option<Rc<Trace>>) {
        self.trace = trace;
    }

    /// Replaces the accessors. They are not validated until used.
    pub fn set_accessors(&mut self, accessors: Option<Rc<dyn Accessors>>) {
        self.accessors = accessors;
    }

    /// Replaces the scroller.
    pub fn set_scroller(&mut self, scroller: Option<Rc<dyn Scroller>>) {
        self.scroller = scroller;
    }

    /// Releases the trace, accessors and scroller.
    pub fn destroy(&mut self) {
        self.trace = None;
        self.accessors = None;
        self.scroller = None;
    }

    // ===== Page Navigation =====

    /// Scrolls down by most of a viewport. No-op until accessors and a scroller are set.
    pub fn scroll_page_down(&self) {
        self.scroll_page(Direction::Down);
    }

    /// Scrolls up by most of a viewport. No-op until accessors and a scroller are set.
    pub fn scroll_page_up(&self) {
        self.scroll_page(Direction::Up);
    }

    fn scroll_page(&self, direction: Direction) {
        let (Some(accessors), Some(scroller)) = (&self.accessors, &self.scroller) else {
            return;
        };
        let amount = direction.sign() * (self.config.page_fraction * accessors.view_height());
        scroller.scroll_by(amount, true);
    }

    // ===== Span Navigation =====

    pub fn scroll_to_next_visible_span(&self) -> Result<(), NavError> {
        self.scroll_to_visible_span(Direction::Down, None)
    }

    pub fn scroll_to_prev_visible_span(&self) -> Result<(), NavError> {
        self.scroll_to_visible_span(Direction::Up, None)
    }

    /// Scans downward from the first row, inclusive, rather than from the visible window.
    pub fn scroll_to_first_visible_span(&self) -> Result<(), NavError> {
        self.scroll_to_visible_span(Direction::Down, Some(0))
    }

    /// Scrolls past the next span in `direction` that is displayed and matches
    /// the active time window and search.
    ///
    /// The scan starts at `start_row` itself when given, otherwise from the top
    /// row (`Up`) or bottom row (`Down`) of the viewport. A viewport boundary
    /// inside the trace is itself the first candidate since it is only partly
    /// in view; at either end of the trace the scan steps one row inward.
    /// When nothing matches, the navigator falls back to the last span on that
    /// side of the trace, stepping back past spans hidden under a collapsed
    /// ancestor.
    ///
    /// # Errors
    /// [`NavError::AccessorsNotReady`] when no accessors are attached. A missing
    /// trace is not an error; the call does nothing.
    pub fn scroll_to_visible_span(&self, direction: Direction, start_row: Option<usize>) -> Result<(), NavError> {
        let accessors = self.accessors.as_ref().ok_or(NavError::AccessorsNotReady)?;
        let Some(trace) = self.trace.as_ref() else {
            return Ok(());
        };
        let Some(last) = trace.len().checked_sub(1) else {
            return Ok(());
        };

        let first_candidate = match start_row {
            // An explicit start row is scanned itself
            Some(row) => Some(accessors.map_row_index_to_span_index(row).min(last)),
            None => {
                let boundary_row = match direction {
                    Direction::Up => accessors.top_row_index_visible(),
                    Direction::Down => accessors.bottom_row_index_visible(),
                };
                let boundary = accessors.map_row_index_to_span_index(boundary_row).min(last);
                match (direction, boundary) {
                    (Direction::Up, 0) => return Ok(()),
                    (Direction::Down, b) if b == last => return Ok(()),
                    (Direction::Up, b) if b == last => Some(b - 1),
                    (Direction::Down, 0) => Some(1),
                    (_, b) => Some(b),
                }
            }
        };

        let filter = SpanFilter::read(accessors.as_ref(), trace);
        let best_match = SpanWalk::new(first_candidate, direction, last).find(|&index| filter.matches(trace, index));

        let target = match best_match {
            Some(index) => index,
            None => {
                let edge = match direction {
                    Direction::Up => 0,
                    Direction::Down => last,
                };
                SpanWalk::new(Some(edge), direction.reverse(), last)
                    .find(|&index| !filter.is_hidden(trace, index))
                    .unwrap_or(edge)
            }
        };

        let row = accessors.map_span_index_to_row_index(target);
        tracing::debug!(?direction, first_candidate = ?first_candidate, target, row, matched = best_match.is_some(), "navigating to span");
        self.scroll_past(row, direction)
    }

    // ===== Scroll Primitive =====

    /// Scrolls so the near edge of `row_index` lands mid-viewport.
    ///
    /// Moving `Up` places the row's top edge there, moving `Down` its bottom
    /// edge. Unknown or malformed geometry is logged and ignored.
    ///
    /// # Errors
    /// [`NavError::AccessorsNotReady`] when no accessors are attached.
    pub fn scroll_past(&self, row_index: usize, direction: Direction) -> Result<(), NavError> {
        let accessors = self.accessors.as_ref().ok_or(NavError::AccessorsNotReady)?;

        let position = match accessors.row_position(row_index) {
            Some(position) if position.is_valid() => position,
            other => {
                tracing::warn!(row_index, position = ?other, "invalid row position, not scrolling");
                return Ok(());
            }
        };

        let center = self.config.center_fraction * accessors.view_height();
        let target = match direction {
            Direction::Up => position.y - center,
            Direction::Down => position.y + position.height - center,
        };

        if let Some(scroller) = &self.scroller {
            scroller.scroll_to(target);
        }
        Ok(())
    }
}

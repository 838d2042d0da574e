//! Collapsed-ancestor visibility.
//!
//! A span is displayed as a row unless one of its ancestors has its children
//! collapsed. Ancestry follows `CHILD_OF` references only, resolved through the
//! trace's id index, so each check costs O(depth) rather than a scan of the
//! whole trace.

use crate::trace::{SpanId, Trace};
use std::collections::HashSet;

/// Returns `true` if the span at `span_index` is hidden by a collapsed ancestor.
///
/// The walk is permissive: a parent id that does not resolve to a span in the
/// trace ends that branch, as does a reference cycle. Such a span is treated as
/// visible unless another branch reaches a collapsed ancestor.
pub fn is_span_hidden(trace: &Trace, span_index: usize, collapsed: &HashSet<SpanId>) -> bool {
    if collapsed.is_empty() {
        return false;
    }
    let Some(span) = trace.span(span_index) else {
        return false;
    };

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(span.span_id.as_str());
    let mut pending: Vec<&str> = span.parent_ids().collect();

    while let Some(parent_id) = pending.pop() {
        if collapsed.contains(parent_id) {
            return true;
        }
        if !visited.insert(parent_id) {
            continue;
        }
        if let Some(parent) = trace.span_by_id(parent_id) {
            pending.extend(parent.parent_ids());
        }
    }

    false
}

/// Returns the indices of all spans that are displayed as rows, in order.
///
/// Row `n` of the waterfall shows span `visible_span_indices(..)[n]`.
pub fn visible_span_indices(trace: &Trace, collapsed: &HashSet<SpanId>) -> Vec<usize> {
    (0..trace.len())
        .filter(|&index| !is_span_hidden(trace, index, collapsed))
        .collect()
}

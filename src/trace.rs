//! Trace and span data model.
//!
//! A [`Trace`] is a flat, ordered list of spans. Array order is the order in
//! which rows are displayed when nothing is collapsed, so span index and row
//! index coincide until the host hides rows. Parent links are expressed
//! through [`SpanReference`]s and resolved with the trace's id index.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Type alias for span identifiers (hex strings in Jaeger traces)
pub type SpanId = String;

/// Type alias for trace identifiers
pub type TraceId = String;

/// Kind of a span reference.
///
/// Only `ChildOf` links a span to its parent row in the waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RefType {
    ChildOf,
    FollowsFrom,
    /// Any reference kind not known to this crate; kept verbatim.
    Other(String),
}

impl RefType {
    pub fn as_str(&self) -> &str {
        match self {
            RefType::ChildOf => "CHILD_OF",
            RefType::FollowsFrom => "FOLLOWS_FROM",
            RefType::Other(kind) => kind,
        }
    }
}

impl From<&str> for RefType {
    fn from(kind: &str) -> Self {
        match kind {
            "CHILD_OF" => RefType::ChildOf,
            "FOLLOWS_FROM" => RefType::FollowsFrom,
            other => RefType::Other(other.to_string()),
        }
    }
}

impl Serialize for RefType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RefType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = String::deserialize(deserializer)?;
        Ok(RefType::from(kind.as_str()))
    }
}

/// A link from one span to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanReference {
    #[serde(rename = "refType")]
    pub ref_type: RefType,
    #[serde(rename = "traceID", default)]
    pub trace_id: TraceId,
    #[serde(rename = "spanID")]
    pub span_id: SpanId,
}

impl SpanReference {
    /// Creates a `CHILD_OF` reference to the given parent.
    pub fn child_of(trace_id: impl Into<TraceId>, parent_id: impl Into<SpanId>) -> Self {
        Self {
            ref_type: RefType::ChildOf,
            trace_id: trace_id.into(),
            span_id: parent_id.into(),
        }
    }
}

/// A single span. Times are in microseconds, as in Jaeger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "traceID", default)]
    pub trace_id: TraceId,
    #[serde(rename = "spanID")]
    pub span_id: SpanId,
    #[serde(rename = "operationName", default)]
    pub operation_name: String,
    #[serde(default)]
    pub references: Vec<SpanReference>,
    #[serde(rename = "startTime")]
    pub start_time: i64,
    #[serde(default)]
    pub duration: i64,
}

impl Span {
    pub fn end_time(&self) -> i64 {
        self.start_time + self.duration
    }

    /// Iterates over the ids of the spans this span is a `CHILD_OF`.
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.references
            .iter()
            .filter(|r| r.ref_type == RefType::ChildOf)
            .map(|r| r.span_id.as_str())
    }
}

/// An ordered, immutable list of spans with an id index.
///
/// Once built the span order cannot change, which keeps indices stable for the
/// duration of any navigation call holding the trace.
#[derive(Debug, Clone)]
pub struct Trace {
    trace_id: TraceId,
    spans: Vec<Span>,
    index_by_id: HashMap<SpanId, usize>,
    start_time: i64,
    duration: i64,
}

impl Trace {
    /// Builds a trace from spans already in display order.
    ///
    /// Start time and duration are derived from the spans' extent. When a span
    /// id occurs more than once, the id index points at its first occurrence.
    pub fn new(trace_id: impl Into<TraceId>, spans: Vec<Span>) -> Self {
        let mut index_by_id = HashMap::with_capacity(spans.len());
        for (index, span) in spans.iter().enumerate() {
            index_by_id.entry(span.span_id.clone()).or_insert(index);
        }

        let (start_time, end_time) = calculate_trace_extent(&spans);

        Self {
            trace_id: trace_id.into(),
            spans,
            index_by_id,
            start_time,
            duration: end_time - start_time,
        }
    }

    /// Builds a trace from spans in any order, arranging them depth first.
    ///
    /// A span's parent is its first `CHILD_OF` reference that resolves within
    /// the trace. Roots and siblings are ordered by start time, ties keeping
    /// input order. Spans reachable only through a reference cycle go last.
    pub fn depth_first(trace_id: impl Into<TraceId>, spans: Vec<Span>) -> Self {
        let order = depth_first_order(&spans);
        let mut slots: Vec<Option<Span>> = spans.into_iter().map(Some).collect();
        let ordered = order.into_iter().filter_map(|index| slots[index].take()).collect();
        Self::new(trace_id, ordered)
    }

    /// Overrides the derived start time and duration.
    pub fn with_timing(mut self, start_time: i64, duration: i64) -> Self {
        self.start_time = start_time;
        self.duration = duration;
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Returns the index of the span with the given id.
    pub fn index_of(&self, span_id: &str) -> Option<usize> {
        self.index_by_id.get(span_id).copied()
    }

    /// Returns the span with the given id.
    pub fn span_by_id(&self, span_id: &str) -> Option<&Span> {
        self.index_of(span_id).map(|index| &self.spans[index])
    }
}

/// Returns span positions in pre-order, children sorted by start time.
fn depth_first_order(spans: &[Span]) -> Vec<usize> {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(spans.len());
    for (index, span) in spans.iter().enumerate() {
        position.entry(span.span_id.as_str()).or_insert(index);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); spans.len()];
    let mut roots = Vec::new();
    for (index, span) in spans.iter().enumerate() {
        let parent = span
            .parent_ids()
            .filter_map(|id| position.get(id).copied())
            .find(|&parent| parent != index);
        match parent {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let by_start = |a: &usize, b: &usize| {
        spans[*a].start_time.cmp(&spans[*b].start_time).then(a.cmp(b))
    };
    roots.sort_by(by_start);
    for siblings in &mut children {
        siblings.sort_by(by_start);
    }
    let mut leftovers: Vec<usize> = (0..spans.len()).collect();
    leftovers.sort_by(by_start);

    let mut order = Vec::with_capacity(spans.len());
    let mut visited = vec![false; spans.len()];
    for start in roots.into_iter().chain(leftovers) {
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            if visited[index] {
                continue;
            }
            visited[index] = true;
            order.push(index);
            stack.extend(children[index].iter().rev().copied());
        }
    }
    order
}

/// Computes `(min start, max end)` across all spans, `(0, 0)` when empty.
fn calculate_trace_extent(spans: &[Span]) -> (i64, i64) {
    let min_start = spans.iter().map(|s| s.start_time).min();
    let max_end = spans.iter().map(Span::end_time).max();

    match (min_start, max_end) {
        (Some(start), Some(end)) => (start, end),
        _ => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(id: &str, start: i64, duration: i64, parent: Option<&str>) -> Span {
        Span {
            trace_id: "t1".to_string(),
            span_id: id.to_string(),
            operation_name: format!("op-{}", id),
            references: parent
                .map(|p| vec![SpanReference::child_of("t1", p)])
                .unwrap_or_default(),
            start_time: start,
            duration,
        }
    }

    #[test]
    fn test_extent_and_index() {
        let trace = Trace::new(
            "t1",
            vec![
                span("a", 100, 50, None),
                span("b", 120, 100, Some("a")),
                span("c", 90, 5, Some("a")),
            ],
        );

        assert_eq!(trace.start_time(), 90);
        assert_eq!(trace.duration(), 130);
        assert_eq!(trace.index_of("b"), Some(1));
        assert_eq!(trace.index_of("zz"), None);
        assert_eq!(trace.span_by_id("c").map(|s| s.start_time), Some(90));
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new("t1", Vec::new());
        assert!(trace.is_empty());
        assert_eq!(trace.start_time(), 0);
        assert_eq!(trace.duration(), 0);
    }

    #[test]
    fn test_with_timing_overrides_extent() {
        let trace = Trace::new("t1", vec![span("a", 1000, 1, None)]).with_timing(1000, 2000);
        assert_eq!(trace.start_time(), 1000);
        assert_eq!(trace.duration(), 2000);
    }

    #[test]
    fn test_depth_first_ordering() {
        let trace = Trace::depth_first(
            "t1",
            vec![
                span("b2", 40, 5, Some("b")),
                span("a", 10, 10, Some("root")),
                span("b", 30, 20, Some("root")),
                span("root", 0, 100, None),
                span("a1", 12, 2, Some("a")),
                span("b1", 31, 5, Some("b")),
            ],
        );
        let ids: Vec<&str> = trace.spans().iter().map(|s| s.span_id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b", "b1", "b2"]);
        assert_eq!(trace.index_of("b1"), Some(4));
    }

    #[test]
    fn test_depth_first_keeps_orphans_and_cycles() {
        let trace = Trace::depth_first(
            "t1",
            vec![
                span("x", 5, 1, Some("y")),
                span("y", 6, 1, Some("x")),
                span("orphan", 3, 1, Some("missing")),
                span("root", 0, 10, None),
            ],
        );
        let ids: Vec<&str> = trace.spans().iter().map(|s| s.span_id.as_str()).collect();
        assert_eq!(ids, vec!["root", "orphan", "x", "y"]);
    }

    #[test]
    fn test_ref_type_round_trip_keeps_unknown_kinds() {
        let json = r#"{"refType":"SOMETHING_ELSE","traceID":"t1","spanID":"a"}"#;
        let reference: SpanReference = serde_json::from_str(json).unwrap();
        assert_eq!(reference.ref_type, RefType::Other("SOMETHING_ELSE".to_string()));
        assert_eq!(serde_json::to_string(&reference).unwrap(), json);
    }

    #[test]
    fn test_parent_ids_only_follow_child_of() {
        let mut s = span("b", 0, 1, Some("a"));
        s.references.push(SpanReference {
            ref_type: RefType::FollowsFrom,
            trace_id: "t1".to_string(),
            span_id: "x".to_string(),
        });
        assert_eq!(s.parent_ids().collect::<Vec<_>>(), vec!["a"]);
    }
}

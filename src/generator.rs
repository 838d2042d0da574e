//! Deterministic random trace generation for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::trace::{Span, SpanReference, Trace};

const DEFAULT_NUM_SPANS: usize = 10;
const DEFAULT_MAX_FANOUT: usize = 4;
const DEFAULT_SEED: u64 = 42;

/// Start of every generated trace, in microseconds.
const BASE_START_TIME: i64 = 1_000_000;

const OPERATIONS: &[&str] = &[
    "HTTP GET /dispatch",
    "HTTP POST /order",
    "FindDriverIDs",
    "GetDriver",
    "SQL SELECT",
    "SQL UPDATE",
    "redis GET",
    "redis SET",
    "grpc route.Route/FindRoute",
    "render",
];

/// Builds random but reproducible traces.
///
/// Every span except the first has a `CHILD_OF` reference to another span,
/// no span has more than `max_fanout` children, and children lie within their
/// parent's time range. The result is in depth-first order.
#[derive(Debug, Clone)]
pub struct TraceGenerator {
    num_spans: usize,
    max_fanout: usize,
    seed: u64,
}

impl Default for TraceGenerator {
    fn default() -> Self {
        Self::with_config(DEFAULT_NUM_SPANS, DEFAULT_MAX_FANOUT, DEFAULT_SEED)
    }
}

impl TraceGenerator {
    pub fn new(num_spans: usize) -> Self {
        Self::with_config(num_spans, DEFAULT_MAX_FANOUT, DEFAULT_SEED)
    }

    pub fn with_config(num_spans: usize, max_fanout: usize, seed: u64) -> Self {
        Self {
            num_spans,
            max_fanout: max_fanout.max(1),
            seed,
        }
    }

    pub fn generate(&self) -> Trace {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let trace_id = format!("{:032x}", rng.gen::<u128>());

        let mut spans: Vec<Span> = Vec::with_capacity(self.num_spans);
        let mut child_counts: Vec<usize> = Vec::with_capacity(self.num_spans);
        // Spans that can still take another child
        let mut open_parents: Vec<usize> = Vec::new();

        for index in 0..self.num_spans {
            let span_id = span_id_for(index);
            let operation_name = OPERATIONS[rng.gen_range(0..OPERATIONS.len())].to_string();

            let span = if open_parents.is_empty() {
                Span {
                    trace_id: trace_id.clone(),
                    span_id,
                    operation_name,
                    references: Vec::new(),
                    start_time: BASE_START_TIME,
                    duration: rng.gen_range(100_000..=1_000_000),
                }
            } else {
                let slot = rng.gen_range(0..open_parents.len());
                let parent_index = open_parents[slot];
                child_counts[parent_index] += 1;
                if child_counts[parent_index] >= self.max_fanout {
                    open_parents.swap_remove(slot);
                }

                let parent = &spans[parent_index];
                let start_time = parent.start_time + rng.gen_range(0..=parent.duration / 2);
                let max_duration = (parent.end_time() - start_time).max(1);
                Span {
                    trace_id: trace_id.clone(),
                    span_id,
                    operation_name,
                    references: vec![SpanReference::child_of(trace_id.clone(), parent.span_id.clone())],
                    start_time,
                    duration: rng.gen_range(1..=max_duration),
                }
            };

            spans.push(span);
            child_counts.push(0);
            open_parents.push(index);
        }

        Trace::depth_first(trace_id, spans)
    }
}

/// Unique 16-digit hex id; multiplying by an odd constant is a bijection on u64.
fn span_id_for(index: usize) -> String {
    format!("{:016x}", (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

use anyhow::{anyhow, bail, Context, Result};
use brotli::Decompressor;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use crate::trace::{Span, Trace};

/// A trace as it appears in Jaeger JSON.
#[derive(Debug, Deserialize)]
struct RawTrace {
    #[serde(rename = "traceID", default)]
    trace_id: String,
    #[serde(default)]
    spans: Vec<Span>,
}

/// Either the Jaeger API envelope (`{"data": [...]}`) or a bare trace object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceDocument {
    Envelope { data: Vec<RawTrace> },
    Single(RawTrace),
}

/// Parses every trace in a Jaeger JSON file.
///
/// Files ending in `.br` are decompressed with Brotli on the fly. Spans are
/// reordered depth first so that span index matches display row.
///
/// # Examples
///
/// ```no_run
/// # use spanscroll::parse_traces;
/// # fn main() -> anyhow::Result<()> {
/// let traces = parse_traces("trace.json")?;
///
/// // Compressed trace (automatic decompression)
/// let traces = parse_traces("trace.json.br")?;
/// # Ok(())
/// # }
/// ```
pub fn parse_traces(file_path: &str) -> Result<Vec<Trace>> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path))?;

    let mut reader: Box<dyn Read> = if file_path.ends_with(".br") {
        // Brotli decompression enabled
        Box::new(Decompressor::new(file, 4096))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read file: {}", file_path))?;

    parse_traces_str(&text).with_context(|| format!("Failed to parse trace file: {}", file_path))
}

/// Parses the first trace in a Jaeger JSON file.
pub fn parse_trace(file_path: &str) -> Result<Trace> {
    parse_traces(file_path)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No trace found in {}", file_path))
}

/// Parses Jaeger JSON text.
pub fn parse_traces_str(text: &str) -> Result<Vec<Trace>> {
    let document: TraceDocument = serde_json::from_str(text).context("Failed to parse JSON")?;
    let raw_traces = match document {
        TraceDocument::Envelope { data } => data,
        TraceDocument::Single(raw) => vec![raw],
    };

    raw_traces
        .into_iter()
        .enumerate()
        .map(|(index, raw)| build_trace(raw).with_context(|| format!("Invalid trace at position {}", index)))
        .collect()
}

fn build_trace(raw: RawTrace) -> Result<Trace> {
    if raw.spans.is_empty() {
        bail!("Trace '{}' has no spans", raw.trace_id);
    }

    {
        let mut seen = HashSet::with_capacity(raw.spans.len());
        for span in &raw.spans {
            if !seen.insert(span.span_id.as_str()) {
                bail!("Duplicate span ID '{}'", span.span_id);
            }
        }
    }

    let trace_id = if raw.trace_id.is_empty() {
        raw.spans[0].trace_id.clone()
    } else {
        raw.trace_id
    };

    Ok(Trace::depth_first(trace_id, raw.spans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::RefType;

    const ENVELOPE: &str = r#"{
        "data": [{
            "traceID": "abc",
            "spans": [
                {"traceID": "abc", "spanID": "child", "operationName": "db",
                 "references": [{"refType": "CHILD_OF", "traceID": "abc", "spanID": "root"}],
                 "startTime": 1500, "duration": 100, "processID": "p1", "tags": []},
                {"traceID": "abc", "spanID": "root", "operationName": "GET /",
                 "references": [], "startTime": 1000, "duration": 2000, "processID": "p1"}
            ],
            "processes": {"p1": {"serviceName": "frontend"}}
        }],
        "total": 0, "limit": 0, "offset": 0, "errors": null
    }"#;

    #[test]
    fn test_parse_envelope() {
        let traces = parse_traces_str(ENVELOPE).unwrap();
        assert_eq!(traces.len(), 1);

        let trace = &traces[0];
        assert_eq!(trace.trace_id(), "abc");
        assert_eq!(trace.len(), 2);
        // Reordered so the root comes first
        assert_eq!(trace.spans()[0].span_id, "root");
        assert_eq!(trace.spans()[1].references[0].ref_type, RefType::ChildOf);
        assert_eq!(trace.start_time(), 1000);
        assert_eq!(trace.duration(), 2000);
    }

    #[test]
    fn test_parse_bare_trace_takes_id_from_spans() {
        let text = r#"{"spans": [{"traceID": "t9", "spanID": "a", "startTime": 5, "duration": 1}]}"#;
        let traces = parse_traces_str(text).unwrap();
        assert_eq!(traces[0].trace_id(), "t9");
        assert_eq!(traces[0].spans()[0].operation_name, "");
    }

    #[test]
    fn test_duplicate_span_ids_are_rejected() {
        let text = r#"{"traceID": "t", "spans": [
            {"spanID": "a", "startTime": 0, "duration": 1},
            {"spanID": "a", "startTime": 1, "duration": 1}
        ]}"#;
        let err = parse_traces_str(text).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate span ID 'a'"));
    }

    #[test]
    fn test_empty_trace_is_rejected() {
        assert!(parse_traces_str(r#"{"traceID": "t", "spans": []}"#).is_err());
        assert!(parse_traces_str("not json").is_err());
    }
}

use anyhow::{Context, Result};
use brotli::enc::BrotliEncoderParams;
use brotli::CompressorWriter;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use crate::trace::{Span, Trace};

#[derive(Serialize)]
struct TraceRef<'a> {
    #[serde(rename = "traceID")]
    trace_id: &'a str,
    spans: &'a [Span],
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    data: Vec<TraceRef<'a>>,
}

/// Writes traces as a Jaeger JSON envelope.
///
/// Automatically enables Brotli compression if the file path ends with `.br`
/// (e.g., `trace.json.br`).
///
/// # Compression
///
/// Brotli compression uses quality level 6 (balanced speed/ratio).
///
/// # Examples
///
/// ```no_run
/// # use spanscroll::{write_traces, TraceGenerator};
/// # fn main() -> anyhow::Result<()> {
/// let trace = TraceGenerator::new(50).generate();
/// write_traces("trace.json.br", &[trace])?;
/// # Ok(())
/// # }
/// ```
pub fn write_traces(file_path: &str, traces: &[Trace]) -> Result<()> {
    let file = File::create(file_path)
        .with_context(|| format!("Failed to create file: {}", file_path))?;

    let mut writer: Box<dyn Write> = if file_path.ends_with(".br") {
        // Brotli compression enabled
        let buf_writer = BufWriter::new(file);
        let params = BrotliEncoderParams {
            quality: 6,  // Balanced compression
            lgwin: 22,   // Window size
            ..Default::default()
        };
        Box::new(CompressorWriter::with_params(buf_writer, 4096, &params))
    } else {
        Box::new(BufWriter::new(file))
    };

    let envelope = EnvelopeRef {
        data: traces
            .iter()
            .map(|trace| TraceRef {
                trace_id: trace.trace_id(),
                spans: trace.spans(),
            })
            .collect(),
    };

    serde_json::to_writer(&mut writer, &envelope)
        .with_context(|| format!("Failed to write JSON to {}", file_path))?;
    writer.flush()
        .with_context(|| format!("Failed to flush {}", file_path))?;
    Ok(())
}

/// Writes a single trace as a Jaeger JSON envelope.
pub fn write_trace(file_path: &str, trace: &Trace) -> Result<()> {
    write_traces(file_path, std::slice::from_ref(trace))
}

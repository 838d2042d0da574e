use spanscroll::{write_trace, TraceGenerator};
use anyhow::Result;
use std::env;

struct Config {
    num_spans: usize,
    max_fanout: usize,
    seed: u64,
    output_file: Option<String>,
    use_brotli: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_spans: 100,
            max_fanout: 4,
            seed: 42,
            output_file: None,
            use_brotli: false,
        }
    }
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-spans" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-spans requires an argument");
                }
                config.num_spans = args[i].parse()?;
            }
            "-fanout" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-fanout requires an argument");
                }
                config.max_fanout = args[i].parse()?;
            }
            "-seed" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-seed requires an argument");
                }
                config.seed = args[i].parse()?;
            }
            "-out" => {
                i += 1;
                if i >= args.len() {
                    anyhow::bail!("-out requires a file path argument");
                }
                config.output_file = Some(args[i].clone());
            }
            "-brotli" => {
                config.use_brotli = true;
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    Ok(config)
}

fn print_help() {
    println!("Jaeger Trace Generator");
    println!("Usage: spanscroll-tracegen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -spans <N>             Number of spans (default: 100)");
    println!("  -fanout <N>            Maximum children per span (default: 4)");
    println!("  -seed <N>              Random seed (default: 42)");
    println!("  -out <FILE>            Output file path (default: trace.json)");
    println!("  -brotli                Write compressed trace using Brotli (output: *.json.br)");
    println!("  -h, -help, --help      Show this help message");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = parse_args()?;

    let output_path = config.output_file.clone().unwrap_or_else(|| {
        if config.use_brotli {
            "trace.json.br".to_string()
        } else {
            "trace.json".to_string()
        }
    });

    let trace = TraceGenerator::with_config(config.num_spans, config.max_fanout, config.seed).generate();
    write_trace(&output_path, &trace)?;

    tracing::info!(spans = trace.len(), trace_id = trace.trace_id(), "trace generated");
    println!("Trace written to: {}", output_path);

    Ok(())
}

//! Replays waterfall keyboard navigation over a trace file.
//!
//! Loads a Jaeger trace, lays it out in a fixed-height row view and feeds the
//! given key names through the configured shortcuts, printing the scroll
//! position after each one. Useful for checking key bindings and navigation
//! behaviour without a GUI.

use anyhow::{anyhow, Result};
use egui::{Key, Modifiers};
use spanscroll::view::ROW_HEIGHT;
use spanscroll::{
    handle_key, load_config_or_default, parse_trace, Accessors, KeyBindings, ScrollNavigator, SpanId, Trace,
    UniformRowView,
};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

const DEFAULT_VIEW_HEIGHT: f64 = 600.0;

struct Config {
    trace_file: Option<String>,
    config_file: Option<PathBuf>,
    view_height: f64,
    row_height: f64,
    collapsed: Vec<String>,
    search: Option<String>,
    keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trace_file: None,
            config_file: None,
            view_height: DEFAULT_VIEW_HEIGHT,
            row_height: ROW_HEIGHT,
            collapsed: Vec::new(),
            search: None,
            keys: Vec::new(),
        }
    }
}

fn next_value(args: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| anyhow!("{} requires an argument", flag))
}

fn parse_args() -> Result<Config> {
    let args: Vec<String> = env::args().collect();
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => config.config_file = Some(PathBuf::from(next_value(&args, &mut i, "--config")?)),
            "--height" => config.view_height = next_value(&args, &mut i, "--height")?.parse()?,
            "--row-height" => config.row_height = next_value(&args, &mut i, "--row-height")?.parse()?,
            "--collapse" => config.collapsed.push(next_value(&args, &mut i, "--collapse")?),
            "--search" => config.search = Some(next_value(&args, &mut i, "--search")?),
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if config.trace_file.is_none() => config.trace_file = Some(arg.to_string()),
            key => config.keys.push(key.to_string()),
        }
        i += 1;
    }

    if config.row_height <= 0.0 {
        anyhow::bail!("--row-height must be positive");
    }

    Ok(config)
}

fn print_help() {
    println!("Waterfall Navigation Replay");
    println!("Usage: spanscroll-nav <TRACE_FILE> [OPTIONS] [KEY]...");
    println!();
    println!("OPTIONS:");
    println!("  --config <FILE>        Navigator config (default: platform config dir)");
    println!("  --height <PX>          Viewport height (default: {})", DEFAULT_VIEW_HEIGHT);
    println!("  --row-height <PX>      Row height (default: {})", ROW_HEIGHT);
    println!("  --collapse <SPAN_ID>   Collapse the children of a span (repeatable)");
    println!("  --search <TEXT>        Only stop at spans whose operation name contains TEXT");
    println!("  -h, --help             Show this help message");
    println!();
    println!("KEYS are egui key names, e.g. S W F B Home.");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = parse_args()?;
    let trace_file = config
        .trace_file
        .clone()
        .ok_or_else(|| anyhow!("No trace file given (see --help)"))?;

    let nav_config = load_config_or_default(config.config_file.as_deref());
    let bindings = KeyBindings::from_config(&nav_config.keys)?;

    let trace = Rc::new(parse_trace(&trace_file)?);
    println!("Loaded trace {} ({} spans)", trace.trace_id(), trace.len());

    let view = Rc::new(UniformRowView::new(trace.clone(), config.row_height, config.view_height));
    view.set_collapsed(collapsed_ids(&trace, &config.collapsed));
    view.set_search_query(config.search.as_deref());

    let mut navigator = ScrollNavigator::with_config(Some(trace), view.clone(), nav_config);
    navigator.set_accessors(Some(view.clone() as Rc<dyn Accessors>));

    print_position("start", &view);
    for name in &config.keys {
        let Some(key) = Key::from_name(name) else {
            tracing::warn!("Unknown key name: {}", name);
            continue;
        };
        match handle_key(&navigator, &bindings, key, Modifiers::NONE)? {
            Some(action) => print_position(action.name(), &view),
            None => println!("{:<20} (unbound)", name),
        }
    }

    Ok(())
}

/// Unique ids passed with `--collapse`; repeating an id keeps it collapsed.
fn collapsed_ids(trace: &Trace, ids: &[String]) -> HashSet<SpanId> {
    let mut collapsed = HashSet::with_capacity(ids.len());
    for id in ids {
        if trace.index_of(id).is_none() {
            tracing::warn!("--collapse: no span with id {}", id);
        }
        collapsed.insert(id.clone());
    }
    collapsed
}

fn print_position(label: &str, view: &UniformRowView) {
    println!(
        "{:<20} offset={:>10.1} rows={}..={}",
        label,
        view.scroll_top(),
        view.top_row_index_visible(),
        view.bottom_row_index_visible()
    );
}

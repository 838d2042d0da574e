pub mod trace;
pub mod visibility;
pub mod accessors;
pub mod scroller;
pub mod error;
pub mod config;
pub mod navigator;
pub mod view;
pub mod shortcuts;
pub mod parser;
pub mod writer;
pub mod generator;

// Export data model
pub use trace::{Trace, Span, SpanReference, RefType, SpanId, TraceId};
pub use visibility::{is_span_hidden, visible_span_indices};

// Export navigator and its host capabilities
pub use accessors::{Accessors, RowPosition, ViewRange};
pub use scroller::Scroller;
pub use error::NavError;
pub use navigator::{Direction, ScrollNavigator};

// Export settings
pub use config::{
    NavigatorConfig, KeyBindingConfig,
    default_config_path, load_config, load_config_or_default, save_config
};

// Export hosts and shortcuts
pub use view::{UniformRowView, filter_spans};
pub use shortcuts::{KeyBindings, NavAction, dispatch, handle_key};

// Export trace file support
pub use parser::{parse_trace, parse_traces, parse_traces_str};
pub use writer::{write_trace, write_traces};
pub use generator::TraceGenerator;

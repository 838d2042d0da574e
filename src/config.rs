//! Navigator settings.
//!
//! Settings are plain serde structs stored as JSON. Every field has a default,
//! so a config file only needs to name what it changes. Loading falls back to
//! defaults when no file is present, the same way persisted viewer settings do.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fraction of the viewport height moved by one page scroll.
pub const DEFAULT_PAGE_FRACTION: f64 = 0.95;

/// Where inside the viewport a navigated-to row edge is placed (0 = top, 1 = bottom).
pub const DEFAULT_CENTER_FRACTION: f64 = 0.5;

const CONFIG_DIR_NAME: &str = "spanscroll";
const CONFIG_FILE_NAME: &str = "config.json";

/// Tunable navigator behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub page_fraction: f64,
    pub center_fraction: f64,
    pub keys: KeyBindingConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            page_fraction: DEFAULT_PAGE_FRACTION,
            center_fraction: DEFAULT_CENTER_FRACTION,
            keys: KeyBindingConfig::default(),
        }
    }
}

impl NavigatorConfig {
    /// Checks that the fractions describe a usable scroll step.
    pub fn validate(&self) -> Result<()> {
        if !self.page_fraction.is_finite() || self.page_fraction <= 0.0 {
            bail!("page_fraction must be a positive number, got {}", self.page_fraction);
        }
        if !(0.0..=1.0).contains(&self.center_fraction) {
            bail!("center_fraction must be within [0, 1], got {}", self.center_fraction);
        }
        Ok(())
    }
}

/// Key names bound to each navigation action.
///
/// Names are parsed with `egui::Key::from_name`, so both `"S"` and `"s"` work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindingConfig {
    pub page_down: Vec<String>,
    pub page_up: Vec<String>,
    pub next_visible_span: Vec<String>,
    pub prev_visible_span: Vec<String>,
    pub first_visible_span: Vec<String>,
}

impl Default for KeyBindingConfig {
    fn default() -> Self {
        Self {
            page_down: vec!["S".to_string()],
            page_up: vec!["W".to_string()],
            next_visible_span: vec!["F".to_string()],
            prev_visible_span: vec!["B".to_string()],
            first_visible_span: vec!["Home".to_string()],
        }
    }
}

/// Returns `<config dir>/spanscroll/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Reads and validates a config file.
pub fn load_config(path: &Path) -> Result<NavigatorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: NavigatorConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Loads the config at `path` (or the default location), falling back to defaults.
///
/// A missing file is silent; a file that exists but cannot be used is logged.
pub fn load_config_or_default(path: Option<&Path>) -> NavigatorConfig {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => return NavigatorConfig::default(),
    };
    if !path.exists() {
        return NavigatorConfig::default();
    }

    match load_config(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("using default navigator config: {:#}", err);
            NavigatorConfig::default()
        }
    }
}

/// Writes a config file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &NavigatorConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config)?;
    fs::write(path, text).with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

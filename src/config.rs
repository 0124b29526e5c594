//! Daemon configuration.
//!
//! Settings can come from a JSON file
//! (`$XDG_CONFIG_HOME/swaykbdd/config.json`) and from the command line; the
//! command line wins.  Every field is optional, a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "default_layout": 0,
//!   "switch_timeout_ms": 50,
//!   "tab_apps": ["firefox", "chromium"]
//! }
//! ```
//!
//! `"default_layout": null` disables the default layout: windows without a
//! remembered layout keep whatever is active.

use crate::identity::TabApps;
use crate::store::LayoutIndex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Layout requested for windows that have none remembered.
pub const DEFAULT_LAYOUT: LayoutIndex = 0;

/// Time after a layout switch during which focus loss does not save it.
pub const DEFAULT_SWITCH_TIMEOUT_MS: u64 = 50;

/// Largest accepted layout index.
pub const MAX_LAYOUT: LayoutIndex = 0xffff;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout for windows without a remembered one; `None` disables it.
    pub default_layout: Option<LayoutIndex>,
    /// Debounce between a layout switch and a focus change (ms).  `0`
    /// disables debouncing.
    pub switch_timeout_ms: u64,
    /// Application ids whose tabs get separate layouts.
    pub tab_apps: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_layout: Some(DEFAULT_LAYOUT),
            switch_timeout_ms: DEFAULT_SWITCH_TIMEOUT_MS,
            tab_apps: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the daemon cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.default_layout {
            Some(l) if l > MAX_LAYOUT => Err(ConfigError(format!("invalid default layout: {}", l))),
            _ => Ok(()),
        }
    }

    pub fn switch_timeout(&self) -> Duration {
        Duration::from_millis(self.switch_timeout_ms)
    }

    pub fn tab_apps(&self) -> TabApps {
        TabApps::new(self.tab_apps.iter().map(|a| a.trim()).filter(|a| !a.is_empty()))
    }
}

/// Interpret a command-line default layout, where `-1` means "none".
pub fn parse_default_layout(value: i64) -> Result<Option<LayoutIndex>, ConfigError> {
    match value {
        -1 => Ok(None),
        v if (0..=i64::from(MAX_LAYOUT)).contains(&v) => Ok(Some(v as LayoutIndex)),
        v => Err(ConfigError(format!("invalid default layout: {}", v))),
    }
}

/// Split a comma-separated application list.
pub fn parse_tab_apps(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

/// Error from loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

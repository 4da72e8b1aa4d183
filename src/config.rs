//! Configuration loading
//!
//! Every setting has a default; the environment (or the host's settings
//! store) may override any of them.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::drag::DragConfig;
use crate::shortcut::{self, Shortcut};
use crate::store::SettingsStore;

pub const JIGGLE_SENSITIVITY: &str = "SHELF_JIGGLE_SENSITIVITY";
pub const JIGGLE_ENABLED: &str = "SHELF_JIGGLE_ENABLED";
pub const INSTANT_REVEAL_MS: &str = "SHELF_INSTANT_REVEAL_MS";
pub const REVEAL_SHORTCUT: &str = "SHELF_REVEAL_SHORTCUT";
pub const ALLOW_LOW_LEVEL: &str = "SHELF_ALLOW_LOW_LEVEL";
pub const DRAG_ENABLED: &str = "SHELF_DRAG_ENABLED";
pub const HOTKEY_ENABLED: &str = "SHELF_HOTKEY_ENABLED";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: expected a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: expected a boolean, got {value:?}")]
    InvalidBool { key: &'static str, value: String },
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub drag: DragConfig,
    /// Global shortcut that reveals the shelf; disables jiggle when set
    pub reveal_shortcut: Option<Shortcut>,
    pub allow_low_level_fallback: bool,
    pub drag_enabled: bool,
    pub hotkey_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drag: DragConfig::default(),
            reveal_shortcut: None,
            allow_low_level_fallback: true,
            drag_enabled: true,
            hotkey_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the same keys from the host's settings
    pub fn from_store(store: &dyn SettingsStore) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| store.get(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(JIGGLE_SENSITIVITY) {
            config.drag.sensitivity = parse_number(JIGGLE_SENSITIVITY, &value)?;
        }
        if let Some(value) = get(JIGGLE_ENABLED) {
            config.drag.jiggle_enabled = parse_bool(JIGGLE_ENABLED, &value)?;
        }
        if let Some(value) = get(INSTANT_REVEAL_MS) {
            let ms: f64 = parse_number(INSTANT_REVEAL_MS, &value)?;
            config.drag.instant_reveal =
                (ms > 0.0).then(|| Duration::from_millis(ms.round() as u64));
        }
        if let Some(value) = get(REVEAL_SHORTCUT) {
            // An unreadable shortcut means none is configured
            config.reveal_shortcut = shortcut::decode(&value);
            if config.reveal_shortcut.is_none() {
                warn!(key = REVEAL_SHORTCUT, %value, "ignoring malformed reveal shortcut");
            }
        }
        if let Some(value) = get(ALLOW_LOW_LEVEL) {
            config.allow_low_level_fallback = parse_bool(ALLOW_LOW_LEVEL, &value)?;
        }
        if let Some(value) = get(DRAG_ENABLED) {
            config.drag_enabled = parse_bool(DRAG_ENABLED, &value)?;
        }
        if let Some(value) = get(HOTKEY_ENABLED) {
            config.hotkey_enabled = parse_bool(HOTKEY_ENABLED, &value)?;
        }

        config.drag.reveal_shortcut_configured = config.reveal_shortcut.is_some();
        Ok(config)
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

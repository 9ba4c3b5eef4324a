//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [backend]
//! # Backends to probe, first available wins.
//! # Known ids: graphicsmagick (gmagick), imagemagick (imagick), raster (gd, gd2)
//! preferred_order = ["graphicsmagick", "imagemagick", "raster"]
//!
//! [watermark]
//! # Oversized watermarks are shrunk into this fraction of the source size.
//! shrink_factor = 0.9
//! ```
//!
//! Unknown keys and unknown backend ids are rejected to catch typos early.

use crate::imaging::{BackendKind, DEFAULT_SHRINK_FACTOR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbConfig {
    /// Backend discovery settings.
    pub backend: BackendConfig,
    /// Watermark placement settings.
    pub watermark: WatermarkConfig,
}

impl ThumbConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.preferred_order.is_empty() {
            return Err(ConfigError::Validation(
                "backend.preferred_order must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for kind in &self.backend.preferred_order {
            if !seen.insert(kind) {
                return Err(ConfigError::Validation(format!(
                    "backend.preferred_order lists {kind} more than once"
                )));
            }
        }
        let factor = self.watermark.shrink_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::Validation(
                "watermark.shrink_factor must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Backend discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Probe order; the first available backend is used for the whole process.
    pub preferred_order: Vec<BackendKind>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            preferred_order: BackendKind::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Watermark placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Fraction of the source size an oversized watermark is shrunk into.
    pub shrink_factor: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            shrink_factor: DEFAULT_SHRINK_FACTOR,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ThumbConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ThumbConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ThumbConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ThumbConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), ?config, "loaded config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbplan configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

[backend]
# Image backends to probe, in order. The first one available is used for
# the rest of the process.
#   graphicsmagick  (alias: gmagick)  `gm` on PATH
#   imagemagick     (alias: imagick)  `magick` or `convert` on PATH
#   raster          (alias: gd, gd2)  built in, always available
preferred_order = ["graphicsmagick", "imagemagick", "raster"]

[watermark]
# A watermark larger than the image on either axis is shrunk, keeping its
# aspect ratio, into this fraction of the image's width and height.
shrink_factor = 0.9
"##
}

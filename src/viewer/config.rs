//! Session configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::zoom::ZoomPolicy;

fn default_min_scale() -> f32 {
    ZoomPolicy::DEFAULT_MIN_SCALE
}

fn default_max_scale() -> f32 {
    ZoomPolicy::DEFAULT_MAX_SCALE
}

fn default_scale() -> f32 {
    ZoomPolicy::DEFAULT_SCALE
}

fn default_zoom_step() -> f32 {
    ZoomPolicy::DEFAULT_STEP
}

fn default_cache_pages() -> usize {
    8
}

/// Tunable parameters for a viewing session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum allowed zoom scale
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,

    /// Maximum allowed zoom scale
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,

    /// Scale applied on open when `reset_scale_on_open` is set
    #[serde(default = "default_scale")]
    pub default_scale: f32,

    /// Additive step for zoom in/out controls
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Reset the scale to `default_scale` whenever a document is opened;
    /// otherwise the scale carries over from the previous document
    #[serde(default)]
    pub reset_scale_on_open: bool,

    /// Number of rendered pages the engine keeps in its cache
    #[serde(default = "default_cache_pages")]
    pub cache_pages: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            default_scale: default_scale(),
            zoom_step: default_zoom_step(),
            reset_scale_on_open: false,
            cache_pages: default_cache_pages(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Zoom policy derived from the configured scale range
    #[must_use]
    pub fn zoom_policy(&self) -> ZoomPolicy {
        ZoomPolicy {
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            default_scale: self.default_scale,
        }
    }
}

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

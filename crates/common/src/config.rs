//! Composer configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ComposerError, ComposerResult};

/// Global composer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Size of the composited output frame in pixels.
    pub resolution: OutputResolution,

    /// Target draw-loop rate.
    pub fps: u32,

    /// Cadence of the stroke auto-erase sweep, in milliseconds.
    pub sweep_interval_ms: u64,

    /// Half-width of the edge/annulus band used for resize handles.
    pub hit_band_px: f64,

    /// Initial freehand drawing style.
    pub drawing: DrawingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Output frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputResolution {
    pub width: u32,
    pub height: u32,
}

/// Default freehand drawing style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingDefaults {
    /// CSS-style color string.
    pub color: String,

    /// Stroke width in pixels.
    pub line_width: f64,

    /// Seconds before a stroke is erased (0 = never).
    pub auto_erase_delay_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "composer_interaction=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            resolution: OutputResolution::default(),
            fps: 25,
            sweep_interval_ms: 1000,
            hit_band_px: 10.0,
            drawing: DrawingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputResolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for DrawingDefaults {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            line_width: 2.0,
            auto_erase_delay_secs: 0.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ComposerConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> ComposerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject values the draw loop cannot run with.
    pub fn validate(&self) -> ComposerResult<()> {
        if self.fps == 0 {
            return Err(ComposerError::config("fps must be greater than zero"));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ComposerError::config(
                "sweep_interval_ms must be greater than zero",
            ));
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ComposerError::config("output resolution must be non-empty"));
        }
        if !(self.hit_band_px >= 0.0) {
            return Err(ComposerError::config("hit_band_px must be non-negative"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("media-composer").join("config.json")
}

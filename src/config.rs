//! Configuration file format.
//!
//! Every section is optional; missing keys fall back to defaults.
//!
//! ```toml
//! [attributes]
//! camera_position = "front"
//! resolution = "hd1920x1080"
//!
//! [gestures]
//! back_max_zoom = 20.0
//! front_max_zoom = 10.0
//!
//! [session]
//! queue_name = "camera-session-config"
//!
//! [metrics]
//! port = 9090
//! ```

use crate::attributes::Attributes;
use crate::gesture::ZoomLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Thread name of the serialized session configuration queue.
    pub queue_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_name: "camera-session-config".to_string(),
        }
    }
}

/// Metrics exporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metrics server port (0 to disable).
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { port: 9090 }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zoom limits: {0}")]
    InvalidZoomLimits(String),
    #[error("invalid frame rate (must be 1-240 fps)")]
    InvalidFrameRate,
    #[error("session queue name must not be empty")]
    EmptyQueueName,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Initial attributes before the device reports its live values.
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub gestures: ZoomLimits,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gestures.validate()?;
        if self.attributes.frame_rate == 0 || self.attributes.frame_rate > 240 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.session.queue_name.trim().is_empty() {
            return Err(ConfigError::EmptyQueueName);
        }
        Ok(())
    }
}

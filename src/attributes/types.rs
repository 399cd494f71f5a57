//! User-observable camera parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Which physical camera is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    #[default]
    Back,
}

impl CameraPosition {
    /// Returns the opposite camera.
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// What a capture request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    #[default]
    Photo,
    Video,
}

/// Device exposure behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureMode {
    Locked,
    AutoExpose,
    #[default]
    ContinuousAutoExposure,
    Custom,
}

/// Exposure parameters as last confirmed by the device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraExposure {
    pub mode: ExposureMode,
    pub duration: Duration,
    pub iso: f32,
    pub target_bias: f32,
}

/// Torch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightMode {
    #[default]
    Off,
    On,
    Auto,
}

/// Video HDR state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrMode {
    #[default]
    Off,
    On,
    Auto,
}

/// Flash used by the photo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

/// Session resolution preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Low,
    Medium,
    High,
    Photo,
    Vga640x480,
    Hd1280x720,
    Hd1920x1080,
    #[default]
    Hd4k3840x2160,
}

impl Resolution {
    /// Frame dimensions for presets with a fixed size.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Vga640x480 => Some((640, 480)),
            Self::Hd1280x720 => Some((1280, 720)),
            Self::Hd1920x1080 => Some((1920, 1080)),
            Self::Hd4k3840x2160 => Some((3840, 2160)),
            Self::Low | Self::Medium | Self::High | Self::Photo => None,
        }
    }
}

/// A filter applied to the preview and captured output, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFilter {
    pub name: String,
    pub intensity: f32,
}

impl CameraFilter {
    /// Creates a filter descriptor.
    pub fn new(name: impl Into<String>, intensity: f32) -> Self {
        Self {
            name: name.into(),
            intensity,
        }
    }
}

/// Result handed back by the photo or video output.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedMedia {
    Image {
        data: Vec<u8>,
        width: u32,
        height: u32,
        captured_at: DateTime<Utc>,
    },
    Video {
        path: PathBuf,
        duration: Duration,
        captured_at: DateTime<Utc>,
    },
}

impl CapturedMedia {
    /// Returns when the media was produced.
    pub fn captured_at(&self) -> DateTime<Utc> {
        match self {
            Self::Image { captured_at, .. } | Self::Video { captured_at, .. } => *captured_at,
        }
    }

    /// Returns the output type that produced this media.
    pub fn output_type(&self) -> OutputType {
        match self {
            Self::Image { .. } => OutputType::Photo,
            Self::Video { .. } => OutputType::Video,
        }
    }
}

/// The single source of truth for user-visible camera parameters.
///
/// Device-derived fields always hold the value the device reported after
/// the last change, never the value that was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub camera_position: CameraPosition,
    pub output_type: OutputType,
    pub zoom_factor: f64,
    pub camera_exposure: CameraExposure,
    pub frame_rate: u32,
    pub light_mode: LightMode,
    pub hdr_mode: HdrMode,
    pub flash_mode: FlashMode,
    pub mirror_output: bool,
    pub is_grid_visible: bool,
    pub resolution: Resolution,
    pub camera_filters: Vec<CameraFilter>,
    /// Gates the microphone input and its permission request.
    pub is_audio_source_available: bool,
    #[serde(skip)]
    pub captured_media: Option<CapturedMedia>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            camera_position: CameraPosition::Back,
            output_type: OutputType::Photo,
            zoom_factor: 1.0,
            camera_exposure: CameraExposure::default(),
            frame_rate: 30,
            light_mode: LightMode::Off,
            hdr_mode: HdrMode::Off,
            flash_mode: FlashMode::Off,
            mirror_output: false,
            is_grid_visible: true,
            resolution: Resolution::Hd4k3840x2160,
            camera_filters: Vec::new(),
            is_audio_source_available: true,
            captured_media: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attributes() {
        let attributes = Attributes::default();
        assert_eq!(attributes.camera_position, CameraPosition::Back);
        assert_eq!(attributes.zoom_factor, 1.0);
        assert!(attributes.captured_media.is_none());
    }

    #[test]
    fn test_position_flip() {
        assert_eq!(CameraPosition::Front.flipped(), CameraPosition::Back);
        assert_eq!(CameraPosition::Back.flipped(), CameraPosition::Front);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let attributes: Attributes = toml::from_str(
            r#"
            camera_position = "front"
            resolution = "hd1920x1080"
            "#,
        )
        .unwrap();

        assert_eq!(attributes.camera_position, CameraPosition::Front);
        assert_eq!(attributes.resolution, Resolution::Hd1920x1080);
        assert_eq!(attributes.frame_rate, 30);
    }
}

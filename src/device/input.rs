//! Bound device inputs and hardware discovery.

use super::CaptureDevice;
use crate::attributes::CameraPosition;
use std::fmt;
use std::sync::Arc;

/// The kind of media an input produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A device bound as a session input.
///
/// Inputs are immutable once obtained; switching cameras swaps the whole
/// input rather than reconfiguring one.
pub trait CaptureDeviceInput: Send + Sync {
    fn media_kind(&self) -> MediaKind;

    /// Camera side for video inputs, `None` for microphones.
    fn position(&self) -> Option<CameraPosition>;

    /// Handle used for parameter configuration.
    ///
    /// Audio inputs have no configurable device.
    fn device(&self) -> Option<Arc<dyn CaptureDevice>>;
}

/// Default input that binds a camera or a microphone.
#[derive(Clone)]
pub struct DeviceInput {
    kind: MediaKind,
    position: Option<CameraPosition>,
    device: Option<Arc<dyn CaptureDevice>>,
}

impl DeviceInput {
    /// Binds a camera device as a video input.
    pub fn camera(device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            kind: MediaKind::Video,
            position: Some(device.position()),
            device: Some(device),
        }
    }

    /// Creates a microphone input.
    pub fn microphone() -> Self {
        Self {
            kind: MediaKind::Audio,
            position: None,
            device: None,
        }
    }
}

impl CaptureDeviceInput for DeviceInput {
    fn media_kind(&self) -> MediaKind {
        self.kind
    }

    fn position(&self) -> Option<CameraPosition> {
        self.position
    }

    fn device(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.device.clone()
    }
}

impl fmt::Debug for DeviceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceInput")
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("device", &self.device.as_ref().map(|d| d.unique_id().to_owned()))
            .finish()
    }
}

/// Summary of an attached input, used for session inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputDescriptor {
    pub kind: MediaKind,
    pub position: Option<CameraPosition>,
}

impl InputDescriptor {
    /// Describes an input.
    pub fn of(input: &dyn CaptureDeviceInput) -> Self {
        Self {
            kind: input.media_kind(),
            position: input.position(),
        }
    }
}

/// Looks up available hardware.
///
/// Choosing among physical camera variants is the implementation's
/// concern; the manager only asks for one input per slot.
pub trait DeviceDiscovery: Send + Sync {
    /// Returns the camera input for a position, if that camera exists.
    fn camera_input(&self, position: CameraPosition) -> Option<Arc<dyn CaptureDeviceInput>>;

    /// Returns the microphone input, if one exists.
    fn audio_input(&self) -> Option<Arc<dyn CaptureDeviceInput>>;
}

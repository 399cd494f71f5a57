//! Capture device abstraction and the configuration lock protocol.
//!
//! Devices are shared between the manager and the session configuration
//! queue, so every method takes `&self`; implementations use interior
//! mutability. Mutating methods may only be called between
//! `lock_for_configuration` and `unlock_for_configuration`; use
//! [`configure`] rather than calling the pair directly.

use crate::attributes::{CameraPosition, ExposureMode, HdrMode, LightMode};
use crate::geometry::Point;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a capture device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("configuration lock unavailable: {0}")]
    LockUnavailable(String),
}

/// A physical camera with live configurable parameters.
///
/// Setters are expected to clamp to the supported range; callers read the
/// getter afterwards to learn the value the device actually applied.
pub trait CaptureDevice: Send + Sync {
    /// Stable identifier for logging.
    fn unique_id(&self) -> &str;

    /// Which side of the device the camera faces.
    fn position(&self) -> CameraPosition;

    /// Acquires exclusive configuration access.
    fn lock_for_configuration(&self) -> Result<(), DeviceError>;

    /// Releases configuration access.
    fn unlock_for_configuration(&self);

    fn has_flash(&self) -> bool;
    fn has_torch(&self) -> bool;

    fn zoom_factor(&self) -> f64;
    fn set_zoom_factor(&self, factor: f64);

    fn exposure_mode(&self) -> ExposureMode;
    fn exposure_duration(&self) -> Duration;
    fn iso(&self) -> f32;
    /// Sets mode, duration and ISO as one triple.
    fn set_exposure(&self, mode: ExposureMode, duration: Duration, iso: f32);

    fn exposure_target_bias(&self) -> f32;
    fn set_exposure_target_bias(&self, bias: f32);

    fn frame_rate(&self) -> u32;
    fn set_frame_rate(&self, frame_rate: u32);

    fn light_mode(&self) -> LightMode;
    fn set_light_mode(&self, mode: LightMode);

    fn hdr_mode(&self) -> HdrMode;
    fn set_hdr_mode(&self, mode: HdrMode);

    fn set_focus_point_of_interest(&self, point: Point);
    fn set_exposure_point_of_interest(&self, point: Point);
}

/// Scoped configuration lock. Unlocks the device when dropped.
pub struct ConfigurationLock<'a> {
    device: &'a dyn CaptureDevice,
}

impl<'a> ConfigurationLock<'a> {
    /// Locks the device for configuration.
    pub fn acquire(device: &'a dyn CaptureDevice) -> Result<Self, DeviceError> {
        device.lock_for_configuration()?;
        Ok(Self { device })
    }
}

impl Drop for ConfigurationLock<'_> {
    fn drop(&mut self) {
        self.device.unlock_for_configuration();
    }
}

/// Runs `f` inside exactly one lock/unlock pair.
pub fn configure<R>(
    device: &dyn CaptureDevice,
    f: impl FnOnce(&dyn CaptureDevice) -> R,
) -> Result<R, DeviceError> {
    let _lock = ConfigurationLock::acquire(device)?;
    Ok(f(device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, MockCaptureDevice};

    #[test]
    fn test_configure_brackets_mutation() {
        let device = MockCaptureDevice::back();
        configure(&device, |d| d.set_zoom_factor(2.0)).unwrap();

        assert_eq!(
            device.calls(),
            vec![DeviceCall::Lock, DeviceCall::SetZoomFactor(2.0), DeviceCall::Unlock]
        );
        assert!(!device.mutated_while_unlocked());
    }

    #[test]
    fn test_configure_fails_without_lock() {
        let device = MockCaptureDevice::back();
        device.set_lock_available(false);

        let result = configure(&device, |d| d.set_zoom_factor(2.0));
        assert!(matches!(result, Err(DeviceError::LockUnavailable(_))));
        assert_eq!(device.zoom_factor(), 1.0);
        assert!(device.calls().is_empty());
    }
}

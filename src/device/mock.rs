//! In-memory capture hardware for tests and demos.
//!
//! The mock device clamps values like real hardware, records every call
//! and flags mutations made outside a configuration lock.

use super::{CaptureDevice, CaptureDeviceInput, DeviceDiscovery, DeviceError, DeviceInput};
use crate::attributes::{CameraPosition, ExposureMode, HdrMode, LightMode};
use crate::geometry::Point;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call observed by [`MockCaptureDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Lock,
    Unlock,
    SetZoomFactor(f64),
    SetExposure {
        mode: ExposureMode,
        duration: Duration,
        iso: f32,
    },
    SetExposureTargetBias(f32),
    SetFrameRate(u32),
    SetLightMode(LightMode),
    SetHdrMode(HdrMode),
    SetFocusPoint(Point),
    SetExposurePoint(Point),
}

/// Capabilities and live values of a mock device.
#[derive(Debug, Clone, PartialEq)]
pub struct MockDeviceSettings {
    pub has_flash: bool,
    pub has_torch: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub min_iso: f32,
    pub max_iso: f32,
    pub min_frame_rate: u32,
    pub max_frame_rate: u32,
    pub zoom_factor: f64,
    pub exposure_mode: ExposureMode,
    pub exposure_duration: Duration,
    pub iso: f32,
    pub exposure_target_bias: f32,
    pub frame_rate: u32,
    pub light_mode: LightMode,
    pub hdr_mode: HdrMode,
}

impl MockDeviceSettings {
    /// A wide virtual multi-lens back camera.
    pub fn back() -> Self {
        Self {
            has_flash: true,
            has_torch: true,
            min_zoom: 1.0,
            max_zoom: 123.75,
            min_iso: 34.0,
            max_iso: 3264.0,
            min_frame_rate: 1,
            max_frame_rate: 60,
            zoom_factor: 1.0,
            exposure_mode: ExposureMode::ContinuousAutoExposure,
            exposure_duration: Duration::from_micros(16_667),
            iso: 100.0,
            exposure_target_bias: 0.0,
            frame_rate: 30,
            light_mode: LightMode::Off,
            hdr_mode: HdrMode::Off,
        }
    }

    /// A single-lens front camera without flash or torch.
    pub fn front() -> Self {
        Self {
            has_flash: false,
            has_torch: false,
            max_zoom: 16.0,
            min_iso: 25.0,
            max_iso: 2000.0,
            max_frame_rate: 30,
            iso: 200.0,
            exposure_duration: Duration::from_micros(33_333),
            ..Self::back()
        }
    }
}

#[derive(Debug)]
struct MockDeviceState {
    settings: MockDeviceSettings,
    locked: bool,
    lock_available: bool,
    focus_point: Option<Point>,
    exposure_point: Option<Point>,
    calls: Vec<DeviceCall>,
    mutated_while_unlocked: bool,
}

/// Mock camera device.
#[derive(Debug)]
pub struct MockCaptureDevice {
    id: String,
    position: CameraPosition,
    state: Mutex<MockDeviceState>,
}

impl MockCaptureDevice {
    /// Creates a device with explicit settings.
    pub fn new(id: impl Into<String>, position: CameraPosition, settings: MockDeviceSettings) -> Self {
        Self {
            id: id.into(),
            position,
            state: Mutex::new(MockDeviceState {
                settings,
                locked: false,
                lock_available: true,
                focus_point: None,
                exposure_point: None,
                calls: Vec::new(),
                mutated_while_unlocked: false,
            }),
        }
    }

    /// Default back camera.
    pub fn back() -> Self {
        Self::new("mock-back-camera", CameraPosition::Back, MockDeviceSettings::back())
    }

    /// Default front camera.
    pub fn front() -> Self {
        Self::new("mock-front-camera", CameraPosition::Front, MockDeviceSettings::front())
    }

    fn state(&self) -> MutexGuard<'_, MockDeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, call: DeviceCall, f: impl FnOnce(&mut MockDeviceSettings)) {
        let mut state = self.state();
        if !state.locked {
            state.mutated_while_unlocked = true;
        }
        state.calls.push(call);
        f(&mut state.settings);
    }

    /// Makes subsequent lock attempts fail (or succeed again).
    pub fn set_lock_available(&self, available: bool) {
        self.state().lock_available = available;
    }

    /// Returns every call recorded so far.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state().calls.clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// True if any setter ran outside a configuration lock.
    pub fn mutated_while_unlocked(&self) -> bool {
        self.state().mutated_while_unlocked
    }

    /// True while a configuration lock is held.
    pub fn is_locked(&self) -> bool {
        self.state().locked
    }

    /// Last focus point of interest.
    pub fn focus_point(&self) -> Option<Point> {
        self.state().focus_point
    }

    /// Last exposure point of interest.
    pub fn exposure_point(&self) -> Option<Point> {
        self.state().exposure_point
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> MockDeviceSettings {
        self.state().settings.clone()
    }
}

impl CaptureDevice for MockCaptureDevice {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> CameraPosition {
        self.position
    }

    fn lock_for_configuration(&self) -> Result<(), DeviceError> {
        let mut state = self.state();
        if !state.lock_available {
            return Err(DeviceError::LockUnavailable(format!("{} is not available", self.id)));
        }
        state.locked = true;
        state.calls.push(DeviceCall::Lock);
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        let mut state = self.state();
        state.locked = false;
        state.calls.push(DeviceCall::Unlock);
    }

    fn has_flash(&self) -> bool {
        self.state().settings.has_flash
    }

    fn has_torch(&self) -> bool {
        self.state().settings.has_torch
    }

    fn zoom_factor(&self) -> f64 {
        self.state().settings.zoom_factor
    }

    fn set_zoom_factor(&self, factor: f64) {
        self.mutate(DeviceCall::SetZoomFactor(factor), |s| {
            s.zoom_factor = factor.clamp(s.min_zoom, s.max_zoom);
        });
    }

    fn exposure_mode(&self) -> ExposureMode {
        self.state().settings.exposure_mode
    }

    fn exposure_duration(&self) -> Duration {
        self.state().settings.exposure_duration
    }

    fn iso(&self) -> f32 {
        self.state().settings.iso
    }

    fn set_exposure(&self, mode: ExposureMode, duration: Duration, iso: f32) {
        self.mutate(DeviceCall::SetExposure { mode, duration, iso }, |s| {
            s.exposure_mode = mode;
            s.exposure_duration = duration;
            s.iso = iso.clamp(s.min_iso, s.max_iso);
        });
    }

    fn exposure_target_bias(&self) -> f32 {
        self.state().settings.exposure_target_bias
    }

    fn set_exposure_target_bias(&self, bias: f32) {
        self.mutate(DeviceCall::SetExposureTargetBias(bias), |s| {
            s.exposure_target_bias = bias.clamp(-8.0, 8.0);
        });
    }

    fn frame_rate(&self) -> u32 {
        self.state().settings.frame_rate
    }

    fn set_frame_rate(&self, frame_rate: u32) {
        self.mutate(DeviceCall::SetFrameRate(frame_rate), |s| {
            s.frame_rate = frame_rate.clamp(s.min_frame_rate, s.max_frame_rate);
        });
    }

    fn light_mode(&self) -> LightMode {
        self.state().settings.light_mode
    }

    fn set_light_mode(&self, mode: LightMode) {
        self.mutate(DeviceCall::SetLightMode(mode), |s| {
            if s.has_torch {
                s.light_mode = mode;
            }
        });
    }

    fn hdr_mode(&self) -> HdrMode {
        self.state().settings.hdr_mode
    }

    fn set_hdr_mode(&self, mode: HdrMode) {
        self.mutate(DeviceCall::SetHdrMode(mode), |s| s.hdr_mode = mode);
    }

    fn set_focus_point_of_interest(&self, point: Point) {
        self.mutate(DeviceCall::SetFocusPoint(point), |_| {});
        self.state().focus_point = Some(point);
    }

    fn set_exposure_point_of_interest(&self, point: Point) {
        self.mutate(DeviceCall::SetExposurePoint(point), |_| {});
        self.state().exposure_point = Some(point);
    }
}

/// Mock hardware exposing up to two cameras and a microphone.
#[derive(Default)]
pub struct MockDeviceDiscovery {
    front: Option<Arc<MockCaptureDevice>>,
    back: Option<Arc<MockCaptureDevice>>,
    microphone: bool,
}

impl MockDeviceDiscovery {
    /// Hardware with no devices at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hardware with default front and back cameras and a microphone.
    pub fn with_defaults() -> Self {
        Self::empty()
            .with_camera(Arc::new(MockCaptureDevice::front()))
            .with_camera(Arc::new(MockCaptureDevice::back()))
            .with_microphone(true)
    }

    /// Installs a camera in the slot matching its position.
    pub fn with_camera(mut self, device: Arc<MockCaptureDevice>) -> Self {
        match device.position() {
            CameraPosition::Front => self.front = Some(device),
            CameraPosition::Back => self.back = Some(device),
        }
        self
    }

    /// Enables or disables the microphone.
    pub fn with_microphone(mut self, available: bool) -> Self {
        self.microphone = available;
        self
    }

    /// Returns the mock camera for a position.
    pub fn camera(&self, position: CameraPosition) -> Option<Arc<MockCaptureDevice>> {
        match position {
            CameraPosition::Front => self.front.clone(),
            CameraPosition::Back => self.back.clone(),
        }
    }
}

impl DeviceDiscovery for MockDeviceDiscovery {
    fn camera_input(&self, position: CameraPosition) -> Option<Arc<dyn CaptureDeviceInput>> {
        self.camera(position).map(|device| {
            let device: Arc<dyn CaptureDevice> = device;
            Arc::new(DeviceInput::camera(device)) as Arc<dyn CaptureDeviceInput>
        })
    }

    fn audio_input(&self) -> Option<Arc<dyn CaptureDeviceInput>> {
        self.microphone
            .then(|| Arc::new(DeviceInput::microphone()) as Arc<dyn CaptureDeviceInput>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::configure;

    #[test]
    fn test_zoom_clamped_to_device_range() {
        let device = MockCaptureDevice::front();
        configure(&device, |d| d.set_zoom_factor(50.0)).unwrap();
        assert_eq!(device.zoom_factor(), 16.0);
    }

    #[test]
    fn test_unlocked_mutation_flagged() {
        let device = MockCaptureDevice::back();
        device.set_frame_rate(24);
        assert!(device.mutated_while_unlocked());
    }

    #[test]
    fn test_torchless_device_ignores_light_mode() {
        let device = MockCaptureDevice::front();
        configure(&device, |d| d.set_light_mode(LightMode::On)).unwrap();
        assert_eq!(device.light_mode(), LightMode::Off);
    }

    #[test]
    fn test_discovery_slots() {
        let discovery = MockDeviceDiscovery::with_defaults();
        let front = discovery.camera_input(CameraPosition::Front).unwrap();
        assert_eq!(front.position(), Some(CameraPosition::Front));
        assert!(discovery.audio_input().is_some());

        let empty = MockDeviceDiscovery::empty();
        assert!(empty.camera_input(CameraPosition::Back).is_none());
        assert!(empty.audio_input().is_none());
    }
}

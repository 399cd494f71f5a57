//! Per-parameter setters.
//!
//! Every setter follows the same contract: a value equal to the current
//! attribute, a busy manager or a missing device/capability makes the call
//! a silent no-op. Device-backed setters take the configuration lock once,
//! apply the single parameter, then store whatever the device confirms.

use super::{lock_session, CameraManager};
use crate::attributes::{
    Attributes, CameraExposure, CameraFilter, ExposureMode, FlashMode, HdrMode, LightMode,
    OutputType, Resolution,
};
use crate::device::{configure, CaptureDevice};
use crate::error::CameraError;
use crate::geometry::{touch_to_point_of_interest, Point};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Why a setter did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Unchanged,
    Busy,
    Unavailable,
}

impl CameraManager {
    /// Checks the common guards and returns the active device.
    fn device_for_change(&self, unchanged: bool) -> Result<Arc<dyn CaptureDevice>, Skip> {
        self.guard(unchanged)?;
        self.active_device().ok_or(Skip::Unavailable)
    }

    fn guard(&self, unchanged: bool) -> Result<(), Skip> {
        if unchanged {
            return Err(Skip::Unchanged);
        }
        if self.is_changing() {
            return Err(Skip::Busy);
        }
        Ok(())
    }

    fn skipped(&self, setting: &'static str, skip: Skip) {
        if skip == Skip::Busy {
            self.stats.record_ignored_while_busy();
        }
        debug!(setting, reason = ?skip, "Setting change skipped");
    }

    /// Runs `apply` under the device's configuration lock.
    fn configure_device(
        &self,
        setting: &'static str,
        device: &dyn CaptureDevice,
        apply: impl FnOnce(&dyn CaptureDevice),
    ) -> Result<(), CameraError> {
        configure(device, apply).map_err(|err| {
            self.stats.record_configuration_failure();
            warn!(setting, device = device.unique_id(), error = %err, "Device configuration failed");
            CameraError::from(err)
        })
    }

    /// Stores a device-confirmed value.
    fn confirm(&self, f: impl FnOnce(&mut Attributes)) {
        if self.attributes.update(f) {
            self.stats.record_attribute_update();
        }
    }

    /// Sets the zoom factor. The device clamps it to its supported range.
    pub fn set_camera_zoom_factor(&self, factor: f64) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.zoom_factor);
        let device = match self.device_for_change(factor == current) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("zoom_factor", skip);
                return Ok(());
            }
        };

        self.configure_device("zoom_factor", device.as_ref(), |d| d.set_zoom_factor(factor))?;
        let confirmed = device.zoom_factor();
        self.confirm(|a| a.zoom_factor = confirmed);
        Ok(())
    }

    /// Focuses and meters at a touch point in render surface coordinates.
    ///
    /// The preview is rendered from a portrait sensor, so the touch point is
    /// rotated into device coordinates. A zero-size surface does nothing.
    pub fn set_camera_focus(&self, touch: Point) -> Result<(), CameraError> {
        let device = match self.device_for_change(false) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("focus", skip);
                return Ok(());
            }
        };
        let Some(point) = touch_to_point_of_interest(touch, self.render_surface.size()) else {
            debug!(x = touch.x, y = touch.y, "Focus skipped, render surface has no size");
            return Ok(());
        };

        self.configure_device("focus", device.as_ref(), |d| {
            d.set_focus_point_of_interest(point);
            d.set_exposure_point_of_interest(point);
        })?;
        self.render_surface.perform_focus_animation(touch);
        Ok(())
    }

    /// Applies an exposure triple built from the stored exposure.
    ///
    /// Returns the device so the caller can confirm its own field, or
    /// `None` if the change was skipped.
    fn apply_exposure(
        &self,
        setting: &'static str,
        unchanged: bool,
        build: impl FnOnce(&CameraExposure) -> (ExposureMode, Duration, f32),
    ) -> Result<Option<Arc<dyn CaptureDevice>>, CameraError> {
        let device = match self.device_for_change(unchanged) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped(setting, skip);
                return Ok(None);
            }
        };

        let (mode, duration, iso) = self.attributes.read(|a| build(&a.camera_exposure));
        self.configure_device(setting, device.as_ref(), |d| d.set_exposure(mode, duration, iso))?;
        Ok(Some(device))
    }

    pub fn set_exposure_mode(&self, mode: ExposureMode) -> Result<(), CameraError> {
        let unchanged = self.attributes.read(|a| a.camera_exposure.mode == mode);
        if let Some(device) =
            self.apply_exposure("exposure_mode", unchanged, |e| (mode, e.duration, e.iso))?
        {
            let confirmed = device.exposure_mode();
            self.confirm(|a| a.camera_exposure.mode = confirmed);
        }
        Ok(())
    }

    pub fn set_exposure_duration(&self, duration: Duration) -> Result<(), CameraError> {
        let unchanged = self.attributes.read(|a| a.camera_exposure.duration == duration);
        if let Some(device) =
            self.apply_exposure("exposure_duration", unchanged, |e| (e.mode, duration, e.iso))?
        {
            let confirmed = device.exposure_duration();
            self.confirm(|a| a.camera_exposure.duration = confirmed);
        }
        Ok(())
    }

    /// Sets the sensor gain. The device clamps it to its supported range.
    pub fn set_iso(&self, iso: f32) -> Result<(), CameraError> {
        let unchanged = self.attributes.read(|a| a.camera_exposure.iso == iso);
        if let Some(device) = self.apply_exposure("iso", unchanged, |e| (e.mode, e.duration, iso))? {
            let confirmed = device.iso();
            self.confirm(|a| a.camera_exposure.iso = confirmed);
        }
        Ok(())
    }

    pub fn set_exposure_target_bias(&self, bias: f32) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.camera_exposure.target_bias);
        let device = match self.device_for_change(bias == current) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("exposure_target_bias", skip);
                return Ok(());
            }
        };

        self.configure_device("exposure_target_bias", device.as_ref(), |d| {
            d.set_exposure_target_bias(bias)
        })?;
        let confirmed = device.exposure_target_bias();
        self.confirm(|a| a.camera_exposure.target_bias = confirmed);
        Ok(())
    }

    pub fn set_frame_rate(&self, frame_rate: u32) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.frame_rate);
        let device = match self.device_for_change(frame_rate == current) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("frame_rate", skip);
                return Ok(());
            }
        };

        self.configure_device("frame_rate", device.as_ref(), |d| d.set_frame_rate(frame_rate))?;
        let confirmed = device.frame_rate();
        self.confirm(|a| a.frame_rate = confirmed);
        Ok(())
    }

    pub fn set_hdr_mode(&self, mode: HdrMode) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.hdr_mode);
        let device = match self.device_for_change(mode == current) {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("hdr_mode", skip);
                return Ok(());
            }
        };

        self.configure_device("hdr_mode", device.as_ref(), |d| d.set_hdr_mode(mode))?;
        let confirmed = device.hdr_mode();
        self.confirm(|a| a.hdr_mode = confirmed);
        Ok(())
    }

    /// Switches the torch. Cameras without a torch ignore this.
    pub fn set_light_mode(&self, mode: LightMode) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.light_mode);
        let device = match self
            .device_for_change(mode == current)
            .and_then(|d| if d.has_torch() { Ok(d) } else { Err(Skip::Unavailable) })
        {
            Ok(device) => device,
            Err(skip) => {
                self.skipped("light_mode", skip);
                return Ok(());
            }
        };

        self.configure_device("light_mode", device.as_ref(), |d| d.set_light_mode(mode))?;
        let confirmed = device.light_mode();
        self.confirm(|a| a.light_mode = confirmed);
        Ok(())
    }

    /// Sets the flash used for the next photo. Applied at capture time, so
    /// no configuration lock is taken.
    pub fn set_flash_mode(&self, mode: FlashMode) {
        let current = self.attributes.read(|a| a.flash_mode);
        let result = self
            .device_for_change(mode == current)
            .and_then(|d| if d.has_flash() { Ok(()) } else { Err(Skip::Unavailable) });
        match result {
            Ok(()) => self.confirm(|a| a.flash_mode = mode),
            Err(skip) => self.skipped("flash_mode", skip),
        }
    }

    pub fn set_mirror_output(&self, mirror: bool) {
        let current = self.attributes.read(|a| a.mirror_output);
        match self.guard(mirror == current) {
            Ok(()) => self.confirm(|a| a.mirror_output = mirror),
            Err(skip) => self.skipped("mirror_output", skip),
        }
    }

    /// Shows or hides the grid overlay.
    pub fn set_grid_visibility(&self, visible: bool) {
        let current = self.attributes.read(|a| a.is_grid_visible);
        match self.guard(visible == current) {
            Ok(()) => {
                self.grid.set_visibility(visible);
                self.confirm(|a| a.is_grid_visible = visible);
            }
            Err(skip) => self.skipped("grid_visibility", skip),
        }
    }

    pub fn set_camera_filters(&self, filters: Vec<CameraFilter>) {
        let unchanged = self.attributes.read(|a| a.camera_filters == filters);
        match self.guard(unchanged) {
            Ok(()) => self.confirm(|a| a.camera_filters = filters),
            Err(skip) => self.skipped("camera_filters", skip),
        }
    }

    /// Chooses whether `capture_output` takes photos or records video.
    pub fn set_output_type(&self, output_type: OutputType) {
        let current = self.attributes.read(|a| a.output_type);
        match self.guard(output_type == current) {
            Ok(()) => self.confirm(|a| a.output_type = output_type),
            Err(skip) => self.skipped("output_type", skip),
        }
    }

    /// Changes the session's resolution preset.
    pub fn set_resolution(&self, resolution: Resolution) {
        let current = self.attributes.read(|a| a.resolution);
        if let Err(skip) = self.guard(resolution == current) {
            self.skipped("resolution", skip);
            return;
        }

        let confirmed = {
            let mut session = lock_session(&self.session);
            session.set_resolution(resolution);
            session.resolution()
        };
        self.confirm(|a| a.resolution = confirmed);
    }
}

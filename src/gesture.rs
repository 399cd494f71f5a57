//! Translates tap and pinch input into manager calls.
//!
//! Pinch zoom is multiplicative against the zoom factor captured when the
//! gesture began, then clamped to a practical range per camera. Virtual
//! multi-lens back cameras report internal zoom ranges far beyond what is
//! useful on screen, hence the separate limits.
//!
//! Gesture handlers have no error channel: failures are logged and dropped.

use crate::attributes::CameraPosition;
use crate::config::ConfigError;
use crate::geometry::Point;
use crate::manager::CameraManager;
use serde::{Deserialize, Serialize};

/// Zoom range reachable through pinch gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min_zoom: f64,
    pub back_max_zoom: f64,
    pub front_max_zoom: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            back_max_zoom: 20.0,
            front_max_zoom: 10.0,
        }
    }
}

impl ZoomLimits {
    /// Upper zoom bound for a camera.
    pub fn max_for(&self, position: CameraPosition) -> f64 {
        match position {
            CameraPosition::Back => self.back_max_zoom,
            CameraPosition::Front => self.front_max_zoom,
        }
    }

    /// Clamps a desired zoom factor into `[min_zoom, max_for(position)]`.
    ///
    /// A NaN request resolves to `min_zoom`.
    pub fn clamp(&self, desired: f64, position: CameraPosition) -> f64 {
        desired.max(self.min_zoom).min(self.max_for(position))
    }

    /// Checks the limits are positive and ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(ConfigError::InvalidZoomLimits(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        for (name, max) in [
            ("back_max_zoom", self.back_max_zoom),
            ("front_max_zoom", self.front_max_zoom),
        ] {
            if !max.is_finite() || max < self.min_zoom {
                return Err(ConfigError::InvalidZoomLimits(format!(
                    "{name} ({max}) must be >= min_zoom ({})",
                    self.min_zoom
                )));
            }
        }
        Ok(())
    }
}

/// Zoom factor for a pinch update.
///
/// `scale` is the cumulative gesture scale since the pinch began: 2.0
/// doubles the starting zoom, 0.5 halves it.
pub fn pinch_zoom_factor(
    last_pinch_zoom: f64,
    scale: f64,
    position: CameraPosition,
    limits: &ZoomLimits,
) -> f64 {
    limits.clamp(last_pinch_zoom * scale, position)
}

/// Phase of a pinch gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchState {
    Began,
    Changed,
    Ended,
}

/// A pinch gesture update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    pub state: PinchState,
    pub scale: f64,
}

impl PinchEvent {
    pub fn began() -> Self {
        Self {
            state: PinchState::Began,
            scale: 1.0,
        }
    }

    pub fn changed(scale: f64) -> Self {
        Self {
            state: PinchState::Changed,
            scale,
        }
    }

    pub fn ended(scale: f64) -> Self {
        Self {
            state: PinchState::Ended,
            scale,
        }
    }
}

/// Routes gestures from the preview to the manager.
#[derive(Debug, Clone)]
pub struct GestureBridge {
    limits: ZoomLimits,
    last_pinch_zoom: f64,
}

impl GestureBridge {
    /// Creates a bridge with the given zoom limits.
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            last_pinch_zoom: limits.min_zoom,
            limits,
        }
    }

    /// Zoom factor captured at the start of the current pinch.
    pub fn last_pinch_zoom(&self) -> f64 {
        self.last_pinch_zoom
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    /// Focuses at a point in the render surface's coordinate space.
    pub fn handle_tap(&self, manager: &CameraManager, point: Point) {
        if let Err(err) = manager.set_camera_focus(point) {
            tracing::warn!(x = point.x, y = point.y, error = %err, "Tap to focus failed");
        }
    }

    /// Applies a pinch update.
    pub fn handle_pinch(&mut self, manager: &CameraManager, event: PinchEvent) {
        match event.state {
            PinchState::Began => {
                self.last_pinch_zoom = manager.attributes().read(|a| a.zoom_factor);
                tracing::trace!(zoom = self.last_pinch_zoom, "Pinch began");
            }
            PinchState::Changed => {
                if !(event.scale.is_finite() && event.scale > 0.0) {
                    tracing::debug!(scale = event.scale, "Ignoring invalid pinch scale");
                    return;
                }
                let position = manager.attributes().read(|a| a.camera_position);
                let zoom = pinch_zoom_factor(self.last_pinch_zoom, event.scale, position, &self.limits);
                if let Err(err) = manager.set_camera_zoom_factor(zoom) {
                    tracing::warn!(zoom, error = %err, "Pinch to zoom failed");
                }
            }
            PinchState::Ended => {}
        }
    }
}

impl Default for GestureBridge {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scale_is_multiplicative() {
        let limits = ZoomLimits::default();
        assert_eq!(pinch_zoom_factor(2.0, 3.0, CameraPosition::Back, &limits), 6.0);
        assert_eq!(pinch_zoom_factor(4.0, 0.5, CameraPosition::Back, &limits), 2.0);
    }

    #[test]
    fn test_clamped_to_minimum() {
        let limits = ZoomLimits::default();
        assert_eq!(pinch_zoom_factor(1.0, 0.1, CameraPosition::Back, &limits), 1.0);
    }

    #[test]
    fn test_front_and_back_maxima() {
        let limits = ZoomLimits::default();
        assert_eq!(pinch_zoom_factor(5.0, 10.0, CameraPosition::Back, &limits), 20.0);
        assert_eq!(pinch_zoom_factor(5.0, 10.0, CameraPosition::Front, &limits), 10.0);
    }

    #[test]
    fn test_limits_validation() {
        assert!(ZoomLimits::default().validate().is_ok());

        let zero_min = ZoomLimits {
            min_zoom: 0.0,
            ..Default::default()
        };
        assert!(zero_min.validate().is_err());

        let inverted = ZoomLimits {
            back_max_zoom: 0.5,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    fn position() -> impl Strategy<Value = CameraPosition> {
        prop_oneof![Just(CameraPosition::Front), Just(CameraPosition::Back)]
    }

    proptest! {
        #[test]
        fn prop_pinch_sequences_stay_in_bounds(
            position in position(),
            start in 1.0f64..20.0,
            scales in proptest::collection::vec(0.01f64..50.0, 1..20),
        ) {
            let limits = ZoomLimits::default();
            let mut zoom = limits.clamp(start, position);
            for scale in scales {
                zoom = pinch_zoom_factor(zoom, scale, position, &limits);
                prop_assert!(zoom >= 1.0);
                prop_assert!(zoom <= limits.max_for(position));
            }
        }
    }
}

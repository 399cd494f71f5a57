//! Metrics collection and registry.

use crate::manager::{CameraManager, StatsSnapshot};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of manager state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Operation counters.
    pub stats: StatsSnapshot,
    /// Whether the capture session is running.
    pub session_running: bool,
    /// Whether a movie is being recorded.
    pub recording: bool,
    /// Confirmed zoom factor.
    pub zoom_factor: f64,
    /// Confirmed frame rate.
    pub frame_rate: u32,
}

impl MetricsSnapshot {
    /// Reads the current state of a manager.
    pub fn from_manager(manager: &CameraManager) -> Self {
        let (zoom_factor, frame_rate) = manager.attributes().read(|a| (a.zoom_factor, a.frame_rate));
        Self {
            stats: manager.stats(),
            session_running: manager.is_session_running(),
            recording: manager.is_recording(),
            zoom_factor,
            frame_rate,
        }
    }
}

/// Prometheus metrics registry for the camera session.
pub struct MetricsRegistry {
    registry: Registry,

    // Session state
    session_running: IntGauge,
    recording: IntGauge,
    zoom_factor: Gauge,
    frame_rate: IntGauge,

    // Operation counters
    setups: IntCounter,
    setup_failures: IntCounter,
    startup_failures: IntCounter,
    camera_switches: IntCounter,
    attribute_updates: IntCounter,
    ignored_while_busy: IntCounter,
    configuration_failures: IntCounter,
    cancels: IntCounter,
}

/// Advances a counter to a monotonic total.
fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all session metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let session_running = IntGauge::new(
            "camera_session_running",
            "Whether the capture session is running (1=running, 0=stopped)",
        )?;
        let recording = IntGauge::new(
            "camera_session_recording",
            "Whether a movie is being recorded (1=recording, 0=idle)",
        )?;
        let zoom_factor = Gauge::new(
            "camera_session_zoom_factor",
            "Zoom factor last confirmed by the device",
        )?;
        let frame_rate = IntGauge::new(
            "camera_session_frame_rate",
            "Frame rate last confirmed by the device",
        )?;

        let setups = IntCounter::new("camera_session_setups_total", "Total setup attempts")?;
        let setup_failures = IntCounter::new(
            "camera_session_setup_failures_total",
            "Setup attempts that returned an error",
        )?;
        let startup_failures = IntCounter::new(
            "camera_session_startup_failures_total",
            "Background session starts that failed",
        )?;
        let camera_switches = IntCounter::new(
            "camera_session_camera_switches_total",
            "Successful camera position switches",
        )?;
        let attribute_updates = IntCounter::new(
            "camera_session_attribute_updates_total",
            "Attribute changes confirmed by the device",
        )?;
        let ignored_while_busy = IntCounter::new(
            "camera_session_ignored_while_busy_total",
            "Calls dropped while an animation was in flight",
        )?;
        let configuration_failures = IntCounter::new(
            "camera_session_configuration_failures_total",
            "Device configuration locks that could not be acquired",
        )?;
        let cancels = IntCounter::new("camera_session_cancels_total", "Session teardowns")?;

        registry.register(Box::new(session_running.clone()))?;
        registry.register(Box::new(recording.clone()))?;
        registry.register(Box::new(zoom_factor.clone()))?;
        registry.register(Box::new(frame_rate.clone()))?;
        registry.register(Box::new(setups.clone()))?;
        registry.register(Box::new(setup_failures.clone()))?;
        registry.register(Box::new(startup_failures.clone()))?;
        registry.register(Box::new(camera_switches.clone()))?;
        registry.register(Box::new(attribute_updates.clone()))?;
        registry.register(Box::new(ignored_while_busy.clone()))?;
        registry.register(Box::new(configuration_failures.clone()))?;
        registry.register(Box::new(cancels.clone()))?;

        Ok(Self {
            registry,
            session_running,
            recording,
            zoom_factor,
            frame_rate,
            setups,
            setup_failures,
            startup_failures,
            camera_switches,
            attribute_updates,
            ignored_while_busy,
            configuration_failures,
            cancels,
        })
    }

    /// Updates all metrics from a snapshot of manager state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.session_running.set(i64::from(snapshot.session_running));
        self.recording.set(i64::from(snapshot.recording));
        self.zoom_factor.set(snapshot.zoom_factor);
        self.frame_rate.set(i64::from(snapshot.frame_rate));

        // Counters only move forward
        let stats = &snapshot.stats;
        advance(&self.setups, stats.setups);
        advance(&self.setup_failures, stats.setup_failures);
        advance(&self.startup_failures, stats.startup_failures);
        advance(&self.camera_switches, stats.camera_switches);
        advance(&self.attribute_updates, stats.attribute_updates);
        advance(&self.ignored_while_busy, stats.ignored_while_busy);
        advance(&self.configuration_failures, stats.configuration_failures);
        advance(&self.cancels, stats.cancels);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            stats: StatsSnapshot {
                setups: 2,
                camera_switches: 3,
                ..Default::default()
            },
            session_running: true,
            recording: false,
            zoom_factor: 2.5,
            frame_rate: 60,
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("camera_session_running 1"));
        assert!(output.contains("camera_session_setups_total 2"));
        assert!(output.contains("camera_session_camera_switches_total 3"));
        assert!(output.contains("camera_session_zoom_factor 2.5"));
        assert!(output.contains("camera_session_frame_rate 60"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot::default();
        snapshot.stats.cancels = 4;
        registry.update(&snapshot);

        snapshot.stats.cancels = 1;
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("camera_session_cancels_total 4"));
    }
}

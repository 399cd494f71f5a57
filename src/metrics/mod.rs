//! Prometheus metrics exporter for the camera session.
//!
//! # Metrics Exposed
//!
//! ## Session State
//! - `camera_session_running` - 1 while the capture session runs
//! - `camera_session_recording` - 1 while a movie is recorded
//! - `camera_session_zoom_factor` - Zoom factor confirmed by the device
//! - `camera_session_frame_rate` - Frame rate confirmed by the device
//!
//! ## Operation Counters
//! - `camera_session_setups_total` / `camera_session_setup_failures_total`
//! - `camera_session_startup_failures_total`
//! - `camera_session_camera_switches_total`
//! - `camera_session_attribute_updates_total`
//! - `camera_session_ignored_while_busy_total`
//! - `camera_session_configuration_failures_total`
//! - `camera_session_cancels_total`
//!
//! The HTTP endpoint is only built with the `metrics` feature.
//!
//! # Example
//!
//! ```no_run
//! use camera_session::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.update(&MetricsSnapshot {
//!     session_running: true,
//!     zoom_factor: 2.0,
//!     frame_rate: 30,
//!     ..Default::default()
//! });
//! print!("{}", registry.encode().expect("Failed to encode"));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};

//! Camera Session Library
//!
//! Manages a camera capture session: configures inputs and outputs, keeps
//! an observable set of camera attributes in sync with the hardware, and
//! translates user gestures into device parameter changes.
//!
//! # Architecture
//!
//! ```text
//! gesture → manager → device / session → attributes → observers
//!              ↓
//!     session queue (topology changes)
//! ```
//!
//! # Design Principles
//!
//! - **Single writer**: only the manager mutates attributes and topology
//! - **Serialized topology**: input/output changes run on one dedicated thread
//! - **Device-confirmed state**: attributes store what the device reports,
//!   not what was requested
//! - **Cooperative busy flag**: calls made during an animation are dropped
//!
//! # Example
//!
//! ```no_run
//! use camera_session::{
//!     collaborators::MockCollaborators,
//!     device::MockDeviceDiscovery,
//!     session::MockCaptureSession,
//!     CameraManager, GestureBridge, PinchEvent,
//! };
//!
//! # async fn run() -> Result<(), camera_session::CameraError> {
//! let mocks = MockCollaborators::new();
//! let mut manager = CameraManager::new(
//!     &MockDeviceDiscovery::with_defaults(),
//!     Box::new(MockCaptureSession::new()),
//!     mocks.build(),
//! )?;
//!
//! manager.setup().await?;
//! manager.wait_for_startup().await?;
//!
//! let mut gestures = GestureBridge::default();
//! gestures.handle_pinch(&manager, PinchEvent::began());
//! gestures.handle_pinch(&manager, PinchEvent::changed(2.0));
//!
//! let mut observer = manager.attributes().subscribe();
//! println!("zoom: {}", observer.borrow_and_update().zoom_factor);
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod attributes;
pub mod collaborators;
pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod manager;
pub mod metrics;
pub mod session;

// Re-export commonly used types at crate root
pub use attributes::{Attributes, AttributesStore, CameraPosition, OutputType};
pub use config::{ConfigError, FileConfig, SessionConfig};
pub use error::CameraError;
pub use geometry::{Point, Size};
pub use gesture::{GestureBridge, PinchEvent, PinchState, ZoomLimits};
pub use manager::{CameraManager, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

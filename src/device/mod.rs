//! Capture devices and the inputs that bind them to a session.
//!
//! The manager only sees these traits. Real hardware backends and the
//! bundled mocks implement them.

mod capture_device;
mod input;
mod mock;

pub use capture_device::{configure, CaptureDevice, ConfigurationLock, DeviceError};
pub use input::{CaptureDeviceInput, DeviceDiscovery, DeviceInput, InputDescriptor, MediaKind};
pub use mock::{DeviceCall, MockCaptureDevice, MockDeviceDiscovery, MockDeviceSettings};

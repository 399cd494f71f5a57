//! Camera attributes and their observable store.
//!
//! Attributes are plain values. Only the session manager writes them;
//! UI code observes them through [`AttributesStore::subscribe`].

mod store;
mod types;

pub use store::AttributesStore;
pub use types::{
    Attributes, CameraExposure, CameraFilter, CameraPosition, CapturedMedia, ExposureMode,
    FlashMode, HdrMode, LightMode, OutputType, Resolution,
};

//! Interfaces of the components the manager drives but does not own the
//! logic of: preview rendering, permission prompts, sensors, overlays and
//! media outputs.

mod mock;

pub use mock::{
    MockCollaborators, MockGridOverlay, MockPermissions, MockPhotoOutput, MockRenderSurface,
    MockVideoOutput, RecordingHook,
};

use crate::attributes::AttributesStore;
use crate::device::MediaKind;
use crate::error::CameraError;
use crate::geometry::{Point, Size};
use async_trait::async_trait;
use std::sync::Arc;

/// The preview surface and its animations.
///
/// `is_animating` doubles as the manager's busy flag: while it is true,
/// mutating manager calls are ignored.
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Attaches the preview and confirms the render surface is ready.
    fn setup(&self) -> Result<(), CameraError>;

    /// Current size of the preview in view coordinates.
    fn size(&self) -> Size;

    fn is_animating(&self) -> bool;

    fn perform_entrance_animation(&self);

    /// Starts the camera flip transition; resolves once it is visible.
    async fn begin_flip_animation(&self);

    /// Completes the flip transition; resolves once it has finished.
    async fn finish_flip_animation(&self);

    /// Shows the focus indicator at a view-local touch point.
    fn perform_focus_animation(&self, touch: Point);
}

/// Grants access to the camera and microphone.
#[async_trait]
pub trait PermissionsManager: Send + Sync {
    /// Suspends until every requested kind is granted.
    ///
    /// Fails with [`CameraError::PermissionDenied`] if any is refused.
    async fn request_access(&self, kinds: &[MediaKind]) -> Result<(), CameraError>;
}

/// A component with a setup/reset lifecycle tied to the session
/// (motion sensing, system notification hooks).
pub trait LifecycleHook: Send {
    fn setup(&mut self, attributes: &AttributesStore);
    fn reset(&mut self);
}

/// On-screen grid overlay.
pub trait GridOverlay: LifecycleHook {
    fn set_visibility(&self, visible: bool);
}

/// Still photo output.
pub trait PhotoOutput: Send {
    /// Gives the output the store it reports captured media into.
    fn assign_parent(&mut self, attributes: AttributesStore);
    fn capture(&mut self);
}

/// Movie recording output.
pub trait VideoOutput: Send {
    /// Gives the output the store it reports captured media into.
    fn assign_parent(&mut self, attributes: AttributesStore);
    fn toggle_recording(&mut self);
    fn is_recording(&self) -> bool;
    /// Abandons any recording in progress.
    fn reset(&mut self);
}

/// Everything the manager needs besides hardware.
pub struct Collaborators {
    pub render_surface: Arc<dyn RenderSurface>,
    pub permissions: Arc<dyn PermissionsManager>,
    pub motion: Box<dyn LifecycleHook>,
    pub notifications: Box<dyn LifecycleHook>,
    pub grid: Box<dyn GridOverlay>,
    pub photo_output: Box<dyn PhotoOutput>,
    pub video_output: Box<dyn VideoOutput>,
}

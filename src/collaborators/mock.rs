//! Recording test doubles for every collaborator.
//!
//! Each mock is cheap to clone and clones share state, so a test can keep
//! one copy for inspection while the manager owns the other.

use super::{
    Collaborators, GridOverlay, LifecycleHook, PermissionsManager, PhotoOutput, RenderSurface,
    VideoOutput,
};
use crate::attributes::{AttributesStore, CapturedMedia};
use crate::device::MediaKind;
use crate::error::CameraError;
use crate::geometry::{Point, Size};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Render surface that tracks animations instead of drawing.
#[derive(Debug)]
pub struct MockRenderSurface {
    size: Mutex<Size>,
    animating: AtomicBool,
    attached: AtomicBool,
    fail_setup: AtomicBool,
    entrance_animations: AtomicUsize,
    flips_started: AtomicUsize,
    flips_finished: AtomicUsize,
    focus_animations: Mutex<Vec<Point>>,
}

impl MockRenderSurface {
    /// Creates a surface of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size: Mutex::new(size),
            animating: AtomicBool::new(false),
            attached: AtomicBool::new(false),
            fail_setup: AtomicBool::new(false),
            entrance_animations: AtomicUsize::new(0),
            flips_started: AtomicUsize::new(0),
            flips_finished: AtomicUsize::new(0),
            focus_animations: Mutex::new(Vec::new()),
        }
    }

    /// Forces the busy flag, as an in-flight animation would.
    pub fn set_animating(&self, animating: bool) {
        self.animating.store(animating, Ordering::SeqCst);
    }

    /// Makes `setup` fail.
    pub fn set_fail_setup(&self, fail: bool) {
        self.fail_setup.store(fail, Ordering::SeqCst);
    }

    pub fn set_size(&self, size: Size) {
        *lock(&self.size) = size;
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn entrance_animations(&self) -> usize {
        self.entrance_animations.load(Ordering::SeqCst)
    }

    /// Returns (started, finished) flip animation counts.
    pub fn flip_animations(&self) -> (usize, usize) {
        (
            self.flips_started.load(Ordering::SeqCst),
            self.flips_finished.load(Ordering::SeqCst),
        )
    }

    pub fn focus_animations(&self) -> Vec<Point> {
        lock(&self.focus_animations).clone()
    }
}

impl Default for MockRenderSurface {
    fn default() -> Self {
        Self::new(Size::new(390.0, 844.0))
    }
}

#[async_trait]
impl RenderSurface for MockRenderSurface {
    fn setup(&self) -> Result<(), CameraError> {
        if self.fail_setup.load(Ordering::SeqCst) {
            return Err(CameraError::CannotSetupOutput(
                "render surface not attached".into(),
            ));
        }
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn size(&self) -> Size {
        *lock(&self.size)
    }

    fn is_animating(&self) -> bool {
        self.animating.load(Ordering::SeqCst)
    }

    fn perform_entrance_animation(&self) {
        self.entrance_animations.fetch_add(1, Ordering::SeqCst);
    }

    async fn begin_flip_animation(&self) {
        self.animating.store(true, Ordering::SeqCst);
        self.flips_started.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }

    async fn finish_flip_animation(&self) {
        tokio::task::yield_now().await;
        self.flips_finished.fetch_add(1, Ordering::SeqCst);
        self.animating.store(false, Ordering::SeqCst);
    }

    fn perform_focus_animation(&self, touch: Point) {
        lock(&self.focus_animations).push(touch);
    }
}

/// Permission prompt with a fixed answer.
#[derive(Debug)]
pub struct MockPermissions {
    granted: AtomicBool,
    requests: Mutex<Vec<Vec<MediaKind>>>,
}

impl MockPermissions {
    pub fn granting() -> Self {
        Self {
            granted: AtomicBool::new(true),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn denying() -> Self {
        let permissions = Self::granting();
        permissions.granted.store(false, Ordering::SeqCst);
        permissions
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }

    /// Every request made so far, with the kinds asked for.
    pub fn requests(&self) -> Vec<Vec<MediaKind>> {
        lock(&self.requests).clone()
    }
}

impl Default for MockPermissions {
    fn default() -> Self {
        Self::granting()
    }
}

#[async_trait]
impl PermissionsManager for MockPermissions {
    async fn request_access(&self, kinds: &[MediaKind]) -> Result<(), CameraError> {
        lock(&self.requests).push(kinds.to_vec());
        if self.granted.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CameraError::PermissionDenied)
        }
    }
}

#[derive(Debug, Default)]
struct HookCounts {
    setups: usize,
    resets: usize,
}

/// Lifecycle hook that counts setup and reset calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingHook {
    counts: Arc<Mutex<HookCounts>>,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setups(&self) -> usize {
        lock(&self.counts).setups
    }

    pub fn resets(&self) -> usize {
        lock(&self.counts).resets
    }
}

impl LifecycleHook for RecordingHook {
    fn setup(&mut self, _attributes: &AttributesStore) {
        lock(&self.counts).setups += 1;
    }

    fn reset(&mut self) {
        lock(&self.counts).resets += 1;
    }
}

/// Grid overlay that remembers its visibility.
#[derive(Debug, Clone, Default)]
pub struct MockGridOverlay {
    hook: RecordingHook,
    visible: Arc<Mutex<Option<bool>>>,
}

impl MockGridOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visibility last applied, `None` before setup.
    pub fn visible(&self) -> Option<bool> {
        *lock(&self.visible)
    }

    pub fn hook(&self) -> &RecordingHook {
        &self.hook
    }
}

impl LifecycleHook for MockGridOverlay {
    fn setup(&mut self, attributes: &AttributesStore) {
        self.hook.setup(attributes);
        *lock(&self.visible) = Some(attributes.read(|a| a.is_grid_visible));
    }

    fn reset(&mut self) {
        self.hook.reset();
    }
}

impl GridOverlay for MockGridOverlay {
    fn set_visibility(&self, visible: bool) {
        *lock(&self.visible) = Some(visible);
    }
}

/// Photo output that reports a tiny placeholder image.
#[derive(Debug, Clone, Default)]
pub struct MockPhotoOutput {
    parent: Arc<Mutex<Option<AttributesStore>>>,
    captures: Arc<AtomicUsize>,
}

impl MockPhotoOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn has_parent(&self) -> bool {
        lock(&self.parent).is_some()
    }
}

impl PhotoOutput for MockPhotoOutput {
    fn assign_parent(&mut self, attributes: AttributesStore) {
        *lock(&self.parent) = Some(attributes);
    }

    fn capture(&mut self) {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = lock(&self.parent).as_ref() {
            parent.set_captured_media(CapturedMedia::Image {
                data: vec![0x80; 4],
                width: 1,
                height: 1,
                captured_at: Utc::now(),
            });
        }
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    parent: Option<AttributesStore>,
    started_at: Option<chrono::DateTime<Utc>>,
    recordings: usize,
    resets: usize,
}

/// Video output that toggles a fake recording.
#[derive(Debug, Clone, Default)]
pub struct MockVideoOutput {
    state: Arc<Mutex<RecorderState>>,
}

impl MockVideoOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed recordings.
    pub fn recordings(&self) -> usize {
        lock(&self.state).recordings
    }

    pub fn resets(&self) -> usize {
        lock(&self.state).resets
    }
}

impl VideoOutput for MockVideoOutput {
    fn assign_parent(&mut self, attributes: AttributesStore) {
        lock(&self.state).parent = Some(attributes);
    }

    fn toggle_recording(&mut self) {
        let mut state = lock(&self.state);
        match state.started_at.take() {
            None => state.started_at = Some(Utc::now()),
            Some(started_at) => {
                state.recordings += 1;
                let finished_at = Utc::now();
                let media = CapturedMedia::Video {
                    path: PathBuf::from(format!("mock-recording-{}.mov", state.recordings)),
                    duration: (finished_at - started_at).to_std().unwrap_or_default(),
                    captured_at: finished_at,
                };
                if let Some(parent) = state.parent.as_ref() {
                    parent.set_captured_media(media);
                }
            }
        }
    }

    fn is_recording(&self) -> bool {
        lock(&self.state).started_at.is_some()
    }

    fn reset(&mut self) {
        let mut state = lock(&self.state);
        state.started_at = None;
        state.resets += 1;
    }
}

/// A full set of mocks plus the handles to inspect them.
#[derive(Clone, Default)]
pub struct MockCollaborators {
    pub render_surface: Arc<MockRenderSurface>,
    pub permissions: Arc<MockPermissions>,
    pub motion: RecordingHook,
    pub notifications: RecordingHook,
    pub grid: MockGridOverlay,
    pub photo_output: MockPhotoOutput,
    pub video_output: MockVideoOutput,
}

impl MockCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collaborator set handed to the manager.
    pub fn build(&self) -> Collaborators {
        Collaborators {
            render_surface: self.render_surface.clone(),
            permissions: self.permissions.clone(),
            motion: Box::new(self.motion.clone()),
            notifications: Box::new(self.notifications.clone()),
            grid: Box::new(self.grid.clone()),
            photo_output: Box::new(self.photo_output.clone()),
            video_output: Box::new(self.video_output.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flip_animation_toggles_busy() {
        let surface = MockRenderSurface::default();
        surface.begin_flip_animation().await;
        assert!(surface.is_animating());
        surface.finish_flip_animation().await;
        assert!(!surface.is_animating());
        assert_eq!(surface.flip_animations(), (1, 1));
    }

    #[tokio::test]
    async fn test_denied_permission() {
        let permissions = MockPermissions::denying();
        let result = permissions.request_access(&[MediaKind::Video]).await;
        assert_eq!(result, Err(CameraError::PermissionDenied));
        assert_eq!(permissions.requests(), vec![vec![MediaKind::Video]]);
    }

    #[test]
    fn test_video_toggle_reports_media() {
        let store = AttributesStore::default();
        let mut output = MockVideoOutput::new();
        output.assign_parent(store.clone());

        output.toggle_recording();
        assert!(output.is_recording());
        output.toggle_recording();
        assert!(!output.is_recording());

        assert_eq!(output.recordings(), 1);
        assert!(matches!(
            store.read(|a| a.captured_media.clone()),
            Some(CapturedMedia::Video { .. })
        ));
    }
}

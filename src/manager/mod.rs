//! Camera session manager.
//!
//! The manager is the only writer of session topology and attributes.
//!
//! # Execution model
//!
//! - Public methods are called from a single owning context (the UI side).
//! - Topology changes (attaching inputs/outputs, starting the session,
//!   switching cameras) run on a dedicated [`SessionQueue`] thread; the
//!   caller awaits them without blocking.
//! - Per-parameter setters lock the already-attached device directly.
//!   The device's configuration lock is their serialization point.
//! - While the render surface animates (camera flip, entrance) mutating
//!   calls are silently ignored. This is cooperative: nothing blocks.
//!
//! ```text
//! gesture → manager → device / session → attributes → observers
//! ```

mod setters;
mod stats;

pub use stats::{ManagerStats, StatsSnapshot};

use crate::attributes::{Attributes, AttributesStore, CameraExposure, CameraPosition, OutputType};
use crate::collaborators::{
    Collaborators, GridOverlay, LifecycleHook, PermissionsManager, PhotoOutput, RenderSurface,
    VideoOutput,
};
use crate::config::SessionConfig;
use crate::device::{CaptureDevice, CaptureDeviceInput, DeviceDiscovery, InputDescriptor, MediaKind};
use crate::error::CameraError;
use crate::session::{CaptureSession, OutputKind, SessionError, SessionId, SessionQueue};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Outputs attached during setup, in order.
const SESSION_OUTPUTS: [OutputKind; 3] =
    [OutputKind::Photo, OutputKind::Video, OutputKind::FrameStream];

type SharedSession = Arc<Mutex<Box<dyn CaptureSession>>>;

fn lock_session(
    session: &Mutex<Box<dyn CaptureSession>>,
) -> MutexGuard<'_, Box<dyn CaptureSession>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the capture session and mediates every change to it.
pub struct CameraManager {
    attributes: AttributesStore,
    session: SharedSession,
    queue: SessionQueue,
    front_camera_input: Option<Arc<dyn CaptureDeviceInput>>,
    back_camera_input: Option<Arc<dyn CaptureDeviceInput>>,
    audio_input: Option<Arc<dyn CaptureDeviceInput>>,
    render_surface: Arc<dyn RenderSurface>,
    permissions: Arc<dyn PermissionsManager>,
    motion: Box<dyn LifecycleHook>,
    notifications: Box<dyn LifecycleHook>,
    grid: Box<dyn GridOverlay>,
    photo_output: Box<dyn PhotoOutput>,
    video_output: Box<dyn VideoOutput>,
    startup: Option<JoinHandle<Result<(), CameraError>>>,
    /// Result of a startup that a camera switch had to wait for.
    settled_startup: Option<Result<(), CameraError>>,
    stats: Arc<ManagerStats>,
}

impl CameraManager {
    /// Creates a manager with default attributes and session settings.
    pub fn new(
        discovery: &dyn DeviceDiscovery,
        session: Box<dyn CaptureSession>,
        collaborators: Collaborators,
    ) -> Result<Self, CameraError> {
        Self::with_config(
            discovery,
            session,
            collaborators,
            Attributes::default(),
            &SessionConfig::default(),
        )
    }

    /// Creates a manager.
    ///
    /// Camera and microphone inputs are resolved once here and reused for
    /// the manager's lifetime. The session configuration thread is started.
    pub fn with_config(
        discovery: &dyn DeviceDiscovery,
        session: Box<dyn CaptureSession>,
        collaborators: Collaborators,
        attributes: Attributes,
        config: &SessionConfig,
    ) -> Result<Self, CameraError> {
        let queue = SessionQueue::spawn(&config.queue_name).map_err(|e| {
            error!(error = %e, "Failed to start session configuration queue");
            CameraError::QueueClosed
        })?;

        let front_camera_input = discovery.camera_input(CameraPosition::Front);
        let back_camera_input = discovery.camera_input(CameraPosition::Back);
        let audio_input = discovery.audio_input();

        info!(
            front = front_camera_input.is_some(),
            back = back_camera_input.is_some(),
            audio = audio_input.is_some(),
            queue = %queue.label(),
            "Camera manager created"
        );

        let Collaborators {
            render_surface,
            permissions,
            motion,
            notifications,
            grid,
            photo_output,
            video_output,
        } = collaborators;

        Ok(Self {
            attributes: AttributesStore::new(attributes),
            session: Arc::new(Mutex::new(session)),
            queue,
            front_camera_input,
            back_camera_input,
            audio_input,
            render_surface,
            permissions,
            motion,
            notifications,
            grid,
            photo_output,
            video_output,
            startup: None,
            settled_startup: None,
            stats: Arc::new(ManagerStats::default()),
        })
    }

    /// The observable attributes.
    pub fn attributes(&self) -> &AttributesStore {
        &self.attributes
    }

    /// True while an animation-gated operation is in flight.
    pub fn is_changing(&self) -> bool {
        self.render_surface.is_animating()
    }

    /// Operation counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Identity of the current session instance.
    pub fn session_id(&self) -> SessionId {
        lock_session(&self.session).id()
    }

    pub fn is_session_running(&self) -> bool {
        lock_session(&self.session).is_running()
    }

    /// Inputs currently attached to the session.
    pub fn session_inputs(&self) -> Vec<InputDescriptor> {
        lock_session(&self.session).inputs()
    }

    /// Outputs currently attached to the session.
    pub fn session_outputs(&self) -> Vec<OutputKind> {
        lock_session(&self.session).outputs()
    }

    pub fn is_recording(&self) -> bool {
        self.video_output.is_recording()
    }

    fn camera_input(&self, position: CameraPosition) -> Option<&Arc<dyn CaptureDeviceInput>> {
        match position {
            CameraPosition::Front => self.front_camera_input.as_ref(),
            CameraPosition::Back => self.back_camera_input.as_ref(),
        }
    }

    /// Device behind the camera at the current position.
    fn active_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        let position = self.attributes.read(|a| a.camera_position);
        self.camera_input(position).and_then(|input| input.device())
    }

    /// Requests permissions, attaches inputs and outputs, and launches the
    /// session start in the background.
    ///
    /// Returns once everything is attached; the session itself starts
    /// running shortly after. Use [`CameraManager::wait_for_startup`] to
    /// await that.
    pub async fn setup(&mut self) -> Result<(), CameraError> {
        self.stats.record_setup();
        info!("Setting up camera session");

        let result = self.setup_session().await;
        if let Err(err) = &result {
            self.stats.record_setup_failure();
            warn!(error = %err, "Camera session setup failed");
        }
        result
    }

    async fn setup_session(&mut self) -> Result<(), CameraError> {
        let (position, audio_enabled) = self
            .attributes
            .read(|a| (a.camera_position, a.is_audio_source_available));
        let audio_input = self.audio_input.clone().filter(|_| audio_enabled);

        let mut kinds = vec![MediaKind::Video];
        if audio_input.is_some() {
            kinds.push(MediaKind::Audio);
        }
        self.permissions.request_access(&kinds).await?;

        self.render_surface.setup()?;

        let camera_input = self
            .camera_input(position)
            .cloned()
            .ok_or_else(|| SessionError::MissingInput(format!("no {position} camera")))?;

        self.photo_output.assign_parent(self.attributes.clone());
        self.video_output.assign_parent(self.attributes.clone());

        let mut inputs = vec![camera_input];
        inputs.extend(audio_input);
        let session = Arc::clone(&self.session);
        let session_id = self
            .queue
            .run(move || {
                let mut session = lock_session(&session);
                attach(&mut **session, &inputs, &SESSION_OUTPUTS).map(|()| session.id())
            })
            .await
            .and_then(|attached| attached)
            .map_err(CameraError::into_setup_error)?;

        self.motion.setup(&self.attributes);
        self.notifications.setup(&self.attributes);
        self.grid.setup(&self.attributes);

        self.spawn_startup(session_id);
        info!(session = %session_id, %position, "Camera session configured");
        Ok(())
    }

    /// Starts the session, pulls the active device's live configuration and
    /// plays the entrance animation, without holding up `setup`.
    ///
    /// The device is looked up when the session is running, so a camera
    /// switch made in the meantime is respected.
    fn spawn_startup(&mut self, session_id: SessionId) {
        let queue = self.queue.clone();
        let front = self.front_camera_input.clone();
        let back = self.back_camera_input.clone();
        let session = Arc::clone(&self.session);
        let attributes = self.attributes.clone();
        let render_surface = Arc::clone(&self.render_surface);
        let stats = Arc::clone(&self.stats);

        if let Some(previous) = self.startup.take() {
            previous.abort();
        }
        self.settled_startup = None;

        self.startup = Some(tokio::spawn(async move {
            let result = async move {
                queue
                    .run(move || {
                        let mut session = lock_session(&session);
                        if session.id() != session_id {
                            return Err(CameraError::StartupFailed(format!(
                                "{session_id} was replaced before it started"
                            )));
                        }
                        session.start_running();
                        Ok(())
                    })
                    .await??;

                let input = match attributes.read(|a| a.camera_position) {
                    CameraPosition::Front => front,
                    CameraPosition::Back => back,
                };
                if let Some(device) = input.and_then(|input| input.device()) {
                    sync_from_device(&attributes, device.as_ref());
                }
                render_surface.perform_entrance_animation();
                Ok::<(), CameraError>(())
            }
            .await;

            match &result {
                Ok(()) => info!(session = %session_id, "Capture session running"),
                Err(err) => {
                    stats.record_startup_failure();
                    error!(session = %session_id, error = %err, "Capture session startup failed");
                }
            }
            result
        }));
    }

    /// Awaits the background startup launched by the last `setup`.
    ///
    /// Returns `Ok(())` immediately if nothing is pending. If a camera
    /// switch already waited for the startup, its result is returned here.
    pub async fn wait_for_startup(&mut self) -> Result<(), CameraError> {
        match self.startup.take() {
            Some(startup) => startup
                .await
                .map_err(|e| CameraError::StartupFailed(e.to_string()))?,
            None => self.settled_startup.take().unwrap_or(Ok(())),
        }
    }

    /// Lets a pending startup finish before the session is reconfigured.
    async fn settle_startup(&mut self) {
        if let Some(startup) = self.startup.take() {
            debug!("Waiting for capture session startup before reconfiguring");
            let result = startup
                .await
                .map_err(|e| CameraError::StartupFailed(e.to_string()))
                .and_then(|result| result);
            self.settled_startup = Some(result);
        }
    }

    /// Stops the session and replaces it with a fresh, unstarted one.
    ///
    /// Motion sensing, recording state and notification hooks are reset.
    /// Calling it again before the next `setup` does nothing.
    pub fn cancel(&mut self) {
        if let Some(startup) = self.startup.take() {
            startup.abort();
        }
        self.settled_startup = None;

        {
            let mut session = lock_session(&self.session);
            if session.is_pristine() {
                debug!(session = %session.id(), "Cancel ignored, session already torn down");
                return;
            }
            let replacement = session.renewed();
            let stopped = std::mem::replace(&mut *session, replacement);
            info!(stopped = %stopped.id(), replacement = %session.id(), "Capture session cancelled");
        }

        self.motion.reset();
        self.video_output.reset();
        self.notifications.reset();
        self.stats.record_cancel();
    }

    /// Takes a photo or toggles recording, depending on the output type.
    pub fn capture_output(&mut self) {
        if self.is_changing() {
            self.stats.record_ignored_while_busy();
            debug!("Capture ignored while changing");
            return;
        }

        match self.attributes.read(|a| a.output_type) {
            OutputType::Photo => self.photo_output.capture(),
            OutputType::Video => self.video_output.toggle_recording(),
        }
    }

    /// Switches to the camera at `position`.
    ///
    /// The current camera input is detached and the new one attached on the
    /// configuration queue. If the new input cannot be attached the previous
    /// one is re-attached and the error returned. The flip animation always
    /// completes. A startup still pending from `setup` is finished first.
    pub async fn set_camera_position(&mut self, position: CameraPosition) -> Result<(), CameraError> {
        let current = self.attributes.read(|a| a.camera_position);
        if current == position {
            debug!(%position, "Camera position unchanged");
            return Ok(());
        }
        if self.is_changing() {
            self.stats.record_ignored_while_busy();
            debug!(%position, "Camera switch ignored while changing");
            return Ok(());
        }

        self.settle_startup().await;
        self.render_surface.begin_flip_animation().await;

        let result = self.swap_camera_input(current, position).await;
        match &result {
            Ok(()) => {
                if let Some(device) = self.camera_input(position).and_then(|input| input.device()) {
                    self.reset_attributes(device.as_ref());
                }
                self.attributes.update(|a| a.camera_position = position);
                self.stats.record_camera_switch();
                info!(from = %current, to = %position, "Camera switched");
            }
            Err(err) => {
                warn!(from = %current, to = %position, error = %err, "Camera switch failed")
            }
        }

        self.render_surface.finish_flip_animation().await;
        result
    }

    async fn swap_camera_input(
        &self,
        from: CameraPosition,
        to: CameraPosition,
    ) -> Result<(), CameraError> {
        let previous = self.camera_input(from).cloned();
        let next = self.camera_input(to).cloned();
        let session = Arc::clone(&self.session);

        self.queue
            .run(move || {
                let mut session = lock_session(&session);
                if let Some(previous) = &previous {
                    session.remove_input(previous.as_ref());
                }

                let added = match next {
                    Some(next) => session.add_input(next),
                    None => Err(SessionError::MissingInput(format!("no {to} camera"))),
                };
                if let Err(err) = added {
                    if let Some(previous) = previous {
                        match session.add_input(previous) {
                            Ok(()) => info!(position = %from, "Previous camera input restored"),
                            Err(rollback) => {
                                error!(error = %rollback, "Failed to restore previous camera input")
                            }
                        }
                    }
                    return Err(CameraError::from(err));
                }
                Ok(())
            })
            .await?
    }

    /// Re-reads every device-derived attribute from `device` in one update.
    pub fn reset_attributes(&self, device: &dyn CaptureDevice) {
        if sync_from_device(&self.attributes, device) {
            self.stats.record_attribute_update();
        }
    }
}

impl std::fmt::Debug for CameraManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraManager")
            .field("attributes", &self.attributes)
            .field("queue", &self.queue)
            .field("session", &self.session_id())
            .field("startup_pending", &self.startup.is_some())
            .finish()
    }
}

/// Attaches inputs then outputs. On failure everything attached so far is
/// detached again.
fn attach(
    session: &mut dyn CaptureSession,
    inputs: &[Arc<dyn CaptureDeviceInput>],
    outputs: &[OutputKind],
) -> Result<(), CameraError> {
    for (index, input) in inputs.iter().enumerate() {
        if let Err(err) = session.add_input(Arc::clone(input)) {
            detach(session, &inputs[..index], &[]);
            return Err(CameraError::CannotSetupInput(err.to_string()));
        }
    }
    for (index, output) in outputs.iter().enumerate() {
        if let Err(err) = session.add_output(*output) {
            detach(session, inputs, &outputs[..index]);
            return Err(CameraError::CannotSetupOutput(err.to_string()));
        }
    }
    Ok(())
}

fn detach(
    session: &mut dyn CaptureSession,
    inputs: &[Arc<dyn CaptureDeviceInput>],
    outputs: &[OutputKind],
) {
    for input in inputs {
        session.remove_input(input.as_ref());
    }
    for output in outputs {
        session.remove_output(*output);
    }
}

/// Copies the device's live values into the attributes as one change.
fn sync_from_device(attributes: &AttributesStore, device: &dyn CaptureDevice) -> bool {
    let exposure = CameraExposure {
        mode: device.exposure_mode(),
        duration: device.exposure_duration(),
        iso: device.iso(),
        target_bias: device.exposure_target_bias(),
    };
    let frame_rate = device.frame_rate();
    let zoom_factor = device.zoom_factor();
    let light_mode = device.light_mode();
    let hdr_mode = device.hdr_mode();

    attributes.update(|a| {
        a.camera_exposure = exposure;
        a.frame_rate = frame_rate;
        a.zoom_factor = zoom_factor;
        a.light_mode = light_mode;
        a.hdr_mode = hdr_mode;
    })
}

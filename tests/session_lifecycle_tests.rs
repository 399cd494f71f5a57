//! Integration tests for session setup, camera switching and teardown

use camera_session::attributes::{CapturedMedia, OutputType};
use camera_session::collaborators::MockCollaborators;
use camera_session::device::{MediaKind, MockCaptureDevice, MockDeviceDiscovery};
use camera_session::session::{MockCaptureSession, OutputKind};
use camera_session::{Attributes, CameraError, CameraManager, CameraPosition, SessionConfig};
use std::sync::Arc;

struct Harness {
    manager: CameraManager,
    mocks: MockCollaborators,
    front: Arc<MockCaptureDevice>,
    back: Arc<MockCaptureDevice>,
}

fn harness_with(session: MockCaptureSession, attributes: Attributes) -> Harness {
    let front = Arc::new(MockCaptureDevice::front());
    let back = Arc::new(MockCaptureDevice::back());
    let discovery = MockDeviceDiscovery::empty()
        .with_camera(Arc::clone(&front))
        .with_camera(Arc::clone(&back))
        .with_microphone(true);
    let mocks = MockCollaborators::new();
    let manager = CameraManager::with_config(
        &discovery,
        Box::new(session),
        mocks.build(),
        attributes,
        &SessionConfig::default(),
    )
    .expect("manager should be created");

    Harness {
        manager,
        mocks,
        front,
        back,
    }
}

fn harness() -> Harness {
    harness_with(MockCaptureSession::new(), Attributes::default())
}

async fn started(mut h: Harness) -> Harness {
    h.manager.setup().await.expect("setup should succeed");
    h.manager
        .wait_for_startup()
        .await
        .expect("session should start");
    h
}

#[tokio::test]
async fn test_setup_requests_video_and_audio() {
    let h = started(harness()).await;

    assert_eq!(
        h.mocks.permissions.requests(),
        vec![vec![MediaKind::Video, MediaKind::Audio]]
    );
    assert!(h.mocks.render_surface.is_attached());
    assert_eq!(
        h.manager.session_outputs(),
        vec![OutputKind::Photo, OutputKind::Video, OutputKind::FrameStream]
    );
    assert_eq!(h.mocks.motion.setups(), 1);
    assert_eq!(h.mocks.notifications.setups(), 1);
    assert_eq!(h.mocks.grid.hook().setups(), 1);
}

#[tokio::test]
async fn test_startup_pulls_live_device_values() {
    let attributes = Attributes {
        frame_rate: 60,
        zoom_factor: 4.0,
        ..Default::default()
    };
    let h = started(harness_with(MockCaptureSession::new(), attributes)).await;

    let attributes = h.manager.attributes().get();
    assert_eq!(attributes.frame_rate, 30);
    assert_eq!(attributes.zoom_factor, 1.0);
    assert_eq!(attributes.camera_exposure.iso, h.back.settings().iso);
    assert!(h.manager.is_session_running());
    assert_eq!(h.mocks.render_surface.entrance_animations(), 1);
}

#[tokio::test]
async fn test_permission_denied_aborts_setup() {
    let mut h = harness();
    h.mocks.permissions.set_granted(false);

    assert_eq!(h.manager.setup().await, Err(CameraError::PermissionDenied));
    assert!(!h.mocks.render_surface.is_attached());
    assert!(h.manager.session_inputs().is_empty());
    assert!(!h.manager.is_session_running());
    assert_eq!(h.mocks.motion.setups(), 0);
}

#[tokio::test]
async fn test_render_surface_failure_is_output_error() {
    let mut h = harness();
    h.mocks.render_surface.set_fail_setup(true);

    let result = h.manager.setup().await;
    assert!(matches!(result, Err(CameraError::CannotSetupOutput(_))));
    assert!(h.manager.session_inputs().is_empty());
}

#[tokio::test]
async fn test_rejected_camera_fails_setup_without_partial_session() {
    let mut h = harness_with(
        MockCaptureSession::new().rejecting_camera(CameraPosition::Back),
        Attributes::default(),
    );

    let result = h.manager.setup().await;
    assert!(matches!(result, Err(CameraError::CannotSetupInput(_))));
    assert!(h.manager.session_inputs().is_empty());
    assert!(h.manager.session_outputs().is_empty());
    assert_eq!(h.manager.stats().setup_failures, 1);
}

#[tokio::test]
async fn test_cancel_then_setup_uses_fresh_session() {
    let mut h = started(harness()).await;
    let first = h.manager.session_id();

    h.manager.cancel();
    assert_ne!(h.manager.session_id(), first);
    assert!(!h.manager.is_session_running());
    assert!(h.manager.session_inputs().is_empty());
    assert_eq!(h.mocks.motion.resets(), 1);
    assert_eq!(h.mocks.notifications.resets(), 1);
    assert_eq!(h.mocks.video_output.resets(), 1);

    let mut h = started(h).await;
    assert!(h.manager.is_session_running());
    assert_eq!(h.manager.session_inputs().len(), 2);

    h.manager.cancel();
    assert_eq!(h.manager.stats().cancels, 2);
}

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let mut h = started(harness()).await;
    h.manager.cancel();
    let after_first = h.manager.session_id();

    h.manager.cancel();
    assert_eq!(h.manager.session_id(), after_first);
    assert_eq!(h.manager.stats().cancels, 1);
    assert_eq!(h.mocks.motion.resets(), 1);
}

#[tokio::test]
async fn test_cancel_before_setup_does_nothing() {
    let mut h = harness();
    let id = h.manager.session_id();
    h.manager.cancel();

    assert_eq!(h.manager.session_id(), id);
    assert_eq!(h.manager.stats().cancels, 0);
}

#[tokio::test]
async fn test_flip_rederives_attributes_from_new_camera() {
    let mut h = started(harness()).await;
    h.manager.set_camera_zoom_factor(3.0).unwrap();

    h.manager
        .set_camera_position(CameraPosition::Front)
        .await
        .unwrap();

    let attributes = h.manager.attributes().get();
    assert_eq!(attributes.camera_position, CameraPosition::Front);
    assert_eq!(attributes.zoom_factor, h.front.settings().zoom_factor);
    assert_eq!(attributes.camera_exposure.iso, 200.0);
    assert_eq!(
        attributes.camera_exposure.duration,
        h.front.settings().exposure_duration
    );

    let inputs = h.manager.session_inputs();
    assert!(inputs
        .iter()
        .any(|i| i.position == Some(CameraPosition::Front)));
    assert!(!inputs
        .iter()
        .any(|i| i.position == Some(CameraPosition::Back)));
    assert_eq!(h.mocks.render_surface.flip_animations(), (1, 1));
    assert!(!h.manager.is_changing());
    assert_eq!(h.manager.stats().camera_switches, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_flip_right_after_setup_keeps_new_camera_values() {
    for _ in 0..25 {
        let mut h = harness();
        h.manager.setup().await.unwrap();
        h.manager
            .set_camera_position(CameraPosition::Front)
            .await
            .unwrap();

        // Startup finished before the switch began
        assert_eq!(h.mocks.render_surface.entrance_animations(), 1);
        h.manager.wait_for_startup().await.unwrap();

        let attributes = h.manager.attributes().get();
        assert_eq!(attributes.camera_position, CameraPosition::Front);
        assert_eq!(attributes.camera_exposure.iso, 200.0);
        assert_eq!(attributes.frame_rate, h.front.settings().frame_rate);
        assert!(h.manager.is_session_running());
        assert_eq!(h.mocks.render_surface.entrance_animations(), 1);
    }
}

#[tokio::test]
async fn test_failed_flip_restores_previous_camera() {
    let mut h = started(harness_with(
        MockCaptureSession::new().rejecting_camera(CameraPosition::Front),
        Attributes::default(),
    ))
    .await;

    let result = h.manager.set_camera_position(CameraPosition::Front).await;
    assert!(matches!(result, Err(CameraError::CannotSetupInput(_))));

    assert_eq!(
        h.manager.attributes().read(|a| a.camera_position),
        CameraPosition::Back
    );
    assert!(h
        .manager
        .session_inputs()
        .iter()
        .any(|i| i.position == Some(CameraPosition::Back)));
    assert_eq!(h.mocks.render_surface.flip_animations(), (1, 1));
    assert!(!h.manager.is_changing());
    assert_eq!(h.manager.stats().camera_switches, 0);
}

#[tokio::test]
async fn test_flip_to_same_position_or_while_busy_is_noop() {
    let mut h = started(harness()).await;

    h.manager
        .set_camera_position(CameraPosition::Back)
        .await
        .unwrap();
    assert_eq!(h.mocks.render_surface.flip_animations(), (0, 0));

    h.mocks.render_surface.set_animating(true);
    h.manager
        .set_camera_position(CameraPosition::Front)
        .await
        .unwrap();
    assert_eq!(h.mocks.render_surface.flip_animations(), (0, 0));
    assert_eq!(
        h.manager.attributes().read(|a| a.camera_position),
        CameraPosition::Back
    );
}

#[tokio::test]
async fn test_capture_routes_by_output_type() {
    let mut h = started(harness()).await;

    h.manager.capture_output();
    assert_eq!(h.mocks.photo_output.captures(), 1);
    assert!(matches!(
        h.manager.attributes().read(|a| a.captured_media.clone()),
        Some(CapturedMedia::Image { .. })
    ));

    h.manager.set_output_type(OutputType::Video);
    h.manager.capture_output();
    assert!(h.manager.is_recording());
    h.manager.capture_output();
    assert!(!h.manager.is_recording());
    assert_eq!(h.mocks.video_output.recordings(), 1);
    assert_eq!(h.mocks.photo_output.captures(), 1);
}

#[tokio::test]
async fn test_capture_ignored_while_busy() {
    let mut h = started(harness()).await;
    h.mocks.render_surface.set_animating(true);

    h.manager.capture_output();
    assert_eq!(h.mocks.photo_output.captures(), 0);
    assert_eq!(h.manager.stats().ignored_while_busy, 1);
}

#[tokio::test]
async fn test_cancel_abandons_recording() {
    let mut h = started(harness()).await;
    h.manager.set_output_type(OutputType::Video);
    h.manager.capture_output();
    assert!(h.manager.is_recording());

    h.manager.cancel();
    assert!(!h.manager.is_recording());
    assert_eq!(h.mocks.video_output.recordings(), 0);
}

#[tokio::test]
async fn test_observers_see_confirmed_changes() {
    let h = started(harness()).await;
    let mut observer = h.manager.attributes().subscribe();

    h.manager.set_frame_rate(500).unwrap();

    observer.changed().await.unwrap();
    assert_eq!(observer.borrow_and_update().frame_rate, 60);
    assert!(!h.back.mutated_while_unlocked());
}

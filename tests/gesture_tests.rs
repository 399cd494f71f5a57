//! Integration tests for gesture routing through the manager

use camera_session::collaborators::MockCollaborators;
use camera_session::device::{DeviceCall, MockCaptureDevice, MockDeviceDiscovery};
use camera_session::session::MockCaptureSession;
use camera_session::{
    CameraManager, CameraPosition, GestureBridge, PinchEvent, Point, Size, ZoomLimits,
};
use std::sync::Arc;

async fn started() -> (CameraManager, MockCollaborators, Arc<MockCaptureDevice>) {
    let back = Arc::new(MockCaptureDevice::back());
    let discovery = MockDeviceDiscovery::empty()
        .with_camera(Arc::new(MockCaptureDevice::front()))
        .with_camera(Arc::clone(&back))
        .with_microphone(true);
    let mocks = MockCollaborators::new();
    let mut manager =
        CameraManager::new(&discovery, Box::new(MockCaptureSession::new()), mocks.build())
            .unwrap();
    manager.setup().await.unwrap();
    manager.wait_for_startup().await.unwrap();
    (manager, mocks, back)
}

#[tokio::test]
async fn test_pinch_is_relative_to_gesture_start() {
    let (manager, _mocks, _back) = started().await;
    let mut gestures = GestureBridge::default();

    manager.set_camera_zoom_factor(2.0).unwrap();
    gestures.handle_pinch(&manager, PinchEvent::began());
    assert_eq!(gestures.last_pinch_zoom(), 2.0);

    gestures.handle_pinch(&manager, PinchEvent::changed(1.5));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 3.0);

    // Scale is cumulative, not incremental
    gestures.handle_pinch(&manager, PinchEvent::changed(2.0));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 4.0);
    gestures.handle_pinch(&manager, PinchEvent::ended(2.0));
}

#[tokio::test]
async fn test_pinch_clamped_per_camera() {
    let (mut manager, _mocks, _back) = started().await;
    let mut gestures = GestureBridge::default();

    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(100.0));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 20.0);

    manager
        .set_camera_position(CameraPosition::Front)
        .await
        .unwrap();
    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(100.0));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 10.0);

    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(0.01));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 1.0);
}

#[tokio::test]
async fn test_custom_zoom_limits() {
    let (manager, _mocks, _back) = started().await;
    let mut gestures = GestureBridge::new(ZoomLimits {
        back_max_zoom: 5.0,
        ..Default::default()
    });

    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(8.0));
    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 5.0);
}

#[tokio::test]
async fn test_pinch_ignored_while_busy() {
    let (manager, mocks, back) = started().await;
    let mut gestures = GestureBridge::default();
    back.clear_calls();

    mocks.render_surface.set_animating(true);
    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(3.0));

    assert_eq!(manager.attributes().read(|a| a.zoom_factor), 1.0);
    assert!(back.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_pinch_scale_ignored() {
    let (manager, _mocks, back) = started().await;
    let mut gestures = GestureBridge::default();
    back.clear_calls();

    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(f64::NAN));
    gestures.handle_pinch(&manager, PinchEvent::changed(-2.0));

    assert!(back.calls().is_empty());
}

#[tokio::test]
async fn test_tap_focuses_with_rotated_mapping() {
    let (manager, mocks, back) = started().await;
    mocks.render_surface.set_size(Size::new(200.0, 400.0));
    back.clear_calls();

    GestureBridge::default().handle_tap(&manager, Point::new(0.0, 0.0));

    assert_eq!(
        back.calls(),
        vec![
            DeviceCall::Lock,
            DeviceCall::SetFocusPoint(Point::new(0.0, 1.0)),
            DeviceCall::SetExposurePoint(Point::new(0.0, 1.0)),
            DeviceCall::Unlock,
        ]
    );
    assert_eq!(
        mocks.render_surface.focus_animations(),
        vec![Point::new(0.0, 0.0)]
    );
}

#[tokio::test]
async fn test_tap_failure_is_swallowed() {
    let (manager, mocks, back) = started().await;
    back.set_lock_available(false);

    GestureBridge::default().handle_tap(&manager, Point::new(100.0, 100.0));

    assert!(back.focus_point().is_none());
    assert!(mocks.render_surface.focus_animations().is_empty());
    assert_eq!(manager.stats().configuration_failures, 1);
}

use camera_session::collaborators::MockCollaborators;
use camera_session::device::{MockCaptureDevice, MockDeviceDiscovery};
use camera_session::gesture::pinch_zoom_factor;
use camera_session::geometry::touch_to_point_of_interest;
use camera_session::session::MockCaptureSession;
use camera_session::{CameraManager, CameraPosition, Point, Size, ZoomLimits};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

// Benchmark: pinch zoom computation per gesture update
fn bench_pinch_zoom(c: &mut Criterion) {
    let limits = ZoomLimits::default();
    c.bench_function("pinch_zoom_factor", |b| {
        b.iter(|| {
            pinch_zoom_factor(
                black_box(2.5),
                black_box(1.75),
                black_box(CameraPosition::Back),
                &limits,
            )
        })
    });
}

// Benchmark: touch point rotation for tap to focus
fn bench_touch_mapping(c: &mut Criterion) {
    let view = Size::new(390.0, 844.0);
    c.bench_function("touch_to_point_of_interest", |b| {
        b.iter(|| touch_to_point_of_interest(black_box(Point::new(120.0, 300.0)), view))
    });
}

// Benchmark: re-deriving every device attribute after a camera switch
fn bench_reset_attributes(c: &mut Criterion) {
    let mocks = MockCollaborators::new();
    let manager = match CameraManager::new(
        &MockDeviceDiscovery::with_defaults(),
        Box::new(MockCaptureSession::new()),
        mocks.build(),
    ) {
        Ok(manager) => manager,
        Err(e) => panic!("failed to create manager: {e}"),
    };
    let front = MockCaptureDevice::front();
    let back = MockCaptureDevice::back();

    c.bench_function("reset_attributes", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let device = if flip { &front } else { &back };
            manager.reset_attributes(black_box(device));
        })
    });
}

criterion_group!(
    benches,
    bench_pinch_zoom,
    bench_touch_mapping,
    bench_reset_attributes
);
criterion_main!(benches);

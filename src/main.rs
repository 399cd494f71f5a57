//! Camera Session CLI
//!
//! Drives a camera session against mock hardware: sets it up, applies a
//! pinch and a tap, optionally flips cameras, captures once, then runs
//! until interrupted.

use camera_session::{
    collaborators::{MockCollaborators, RenderSurface},
    device::MockDeviceDiscovery,
    metrics::{MetricsRegistry, MetricsSnapshot},
    session::MockCaptureSession,
    CameraManager, CameraPosition, FileConfig, GestureBridge, PinchEvent, Point,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Position {
    Front,
    Back,
}

impl From<Position> for CameraPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::Front => CameraPosition::Front,
            Position::Back => CameraPosition::Back,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "camera-session", version, about = "Camera capture session demo")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera to start with (overrides the configuration file)
    #[arg(long, value_enum)]
    position: Option<Position>,

    /// Pinch scale applied after startup
    #[arg(long, default_value_t = 2.0)]
    pinch: f64,

    /// Switch to the other camera after the pinch
    #[arg(long)]
    flip: bool,

    /// Seconds to keep the session running (until Ctrl-C if omitted)
    #[arg(long)]
    duration: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Camera Session v{}", camera_session::VERSION);
    info!("This is a demonstration using mock camera hardware");

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(position) = args.position {
        config.attributes.camera_position = position.into();
    }

    let mocks = MockCollaborators::new();
    let mut manager = match CameraManager::with_config(
        &MockDeviceDiscovery::with_defaults(),
        Box::new(MockCaptureSession::new()),
        mocks.build(),
        config.attributes.clone(),
        &config.session,
    ) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Failed to create camera manager: {}", e);
            std::process::exit(1);
        }
    };

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };
    #[cfg(feature = "metrics")]
    let metrics_state = start_metrics_server(config.metrics.port);

    let mut observer = manager.attributes().subscribe();
    tokio::spawn(async move {
        while observer.changed().await.is_ok() {
            let attributes = observer.borrow_and_update().clone();
            debug!(
                position = %attributes.camera_position,
                zoom = attributes.zoom_factor,
                fps = attributes.frame_rate,
                "Attributes changed"
            );
        }
    });

    if let Err(e) = manager.setup().await {
        error!("Camera setup failed: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = manager.wait_for_startup().await {
        error!("Camera session did not start: {}", e);
        std::process::exit(1);
    }
    info!(session = %manager.session_id(), "Session running");

    let mut gestures = GestureBridge::new(config.gestures);
    gestures.handle_pinch(&manager, PinchEvent::began());
    gestures.handle_pinch(&manager, PinchEvent::changed(args.pinch));
    gestures.handle_pinch(&manager, PinchEvent::ended(args.pinch));

    let size = mocks.render_surface.size();
    gestures.handle_tap(&manager, Point::new(size.width / 2.0, size.height / 2.0));

    if args.flip {
        let target = manager.attributes().read(|a| a.camera_position.flipped());
        if let Err(e) = manager.set_camera_position(target).await {
            warn!("Camera switch failed: {}", e);
        }
    }

    manager.capture_output();

    let attributes = manager.attributes().get();
    println!("Camera:      {}", attributes.camera_position);
    println!("Zoom:        {:.2}x", attributes.zoom_factor);
    println!("Frame rate:  {} fps", attributes.frame_rate);
    println!(
        "Exposure:    {:?}, {:?}, ISO {}",
        attributes.camera_exposure.mode,
        attributes.camera_exposure.duration,
        attributes.camera_exposure.iso
    );
    println!("Resolution:  {:?}", attributes.resolution);
    if let Some(media) = &attributes.captured_media {
        println!("Captured:    {:?} at {}", media.output_type(), media.captured_at());
    }

    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(true);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            Ok(()) = stop_rx.changed() => {
                info!("Interrupted");
                break;
            }
            _ = ticker.tick() => {
                let snapshot = MetricsSnapshot::from_manager(&manager);
                registry.update(&snapshot);
                #[cfg(feature = "metrics")]
                publish(&metrics_state, snapshot).await;
            }
        }
    }

    manager.cancel();

    let stats = manager.stats();
    info!(
        "Done. {} setup(s), {} camera switch(es), {} attribute update(s), {} ignored while busy",
        stats.setups, stats.camera_switches, stats.attribute_updates, stats.ignored_while_busy
    );
    match registry.encode() {
        Ok(text) => debug!("Final metrics:\n{}", text),
        Err(e) => warn!("Failed to encode metrics: {}", e),
    }
}

#[cfg(feature = "metrics")]
type SharedMetricsState = std::sync::Arc<tokio::sync::RwLock<camera_session::metrics::MetricsState>>;

#[cfg(feature = "metrics")]
async fn publish(state: &Option<SharedMetricsState>, snapshot: MetricsSnapshot) {
    if let Some(state) = state {
        state.write().await.update(snapshot);
    }
}

#[cfg(feature = "metrics")]
fn start_metrics_server(port: u16) -> Option<SharedMetricsState> {
    use camera_session::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return None;
    }
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics server disabled: {}", e);
            return None;
        }
    };

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Metrics server failed: {}", e);
        }
    });
    Some(state)
}

use anyhow::Result;
use clap::Parser;
use sleepair_recorder::{
    create_router, AppState, Config, DeviceFactory, EvaluationSubmitter, PlaybackController,
    PlaybackEvent, RecordingCatalog, RecordingLifecycle, Resolution, StorageLocationResolver,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sleepair-recorder", about = "Sleep-audio recording session manager")]
struct Args {
    /// Configuration file, without extension (config-rs resolves it)
    #[arg(long, default_value = "config/sleepair-recorder")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v0.1.0", cfg.service.name);

    let device = DeviceFactory::create(cfg.device.clone())?;

    let mut resolver = StorageLocationResolver::new(&cfg.storage.state_path);
    match resolver.resolve().await? {
        Resolution::Location(location) => {
            info!("recordings directory: {}", location.path.display())
        }
        Resolution::SelectionRequired => {
            warn!("no storage location selected yet; POST /storage/select to set one")
        }
    }

    let recorder = Arc::new(RecordingLifecycle::new(
        device.clone(),
        cfg.recorder.clone(),
    ));
    let catalog = Arc::new(RecordingCatalog::new(cfg.recorder.extension.clone()));
    let (playback, mut playback_events) = PlaybackController::new(device.clone());
    let submitter = Arc::new(EvaluationSubmitter::new(cfg.evaluation.clone()));

    // Surface auto-completions in the service log; progress ticks stay quiet.
    tokio::spawn(async move {
        while let Some(event) = playback_events.recv().await {
            if let PlaybackEvent::Completed { path } = event {
                info!("playback reached end of media: {}", path.display());
            }
        }
    });

    let state = AppState::new(resolver, recorder, catalog, Arc::new(playback), submitter);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

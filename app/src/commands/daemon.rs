//! The long-running bot: crawl, ingest and publish until stopped.

use crate::admin;
use crate::cli::RunArgs;
use crate::state::AppState;
use anyhow::Context;
use facebot_core::AppConfig;
use facebot_db::Database;
use facebot_pipeline::{
    Capabilities, CaptionRotation, JpegFileSink, Orchestrator, OrchestratorSettings,
};
use facebot_remote::{FaceService, GatewayApi, HttpImageSource};
use facebot_scheduler::TriggerMode;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Captions file read when none is configured.
pub const DEFAULT_CAPTIONS_FILE: &str = "captions.txt";

/// Fold command-line overrides into the configuration.
pub fn apply_overrides(config: &mut AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    if args.post_now {
        config.schedule.post_now = true;
    }
    if let Some(secs) = args.post_interval {
        config.schedule.post_interval_secs = Some(secs);
    }
    if !args.post_times.is_empty() {
        config.schedule.post_times.clone_from(&args.post_times);
    }
    if args.upload {
        config.publisher.upload = true;
    }
    if let Some(port) = args.http_port {
        let mut addr: SocketAddr = config
            .admin
            .bind
            .parse()
            .with_context(|| format!("invalid admin.bind '{}'", config.admin.bind))?;
        addr.set_port(port);
        config.admin.bind = addr.to_string();
        config.admin.enabled = true;
    }
    Ok(())
}

/// Resolve the publish trigger mode from the schedule section.
pub fn trigger_mode(config: &AppConfig) -> anyhow::Result<TriggerMode> {
    let schedule = &config.schedule;
    let mode = TriggerMode::resolve(
        schedule.post_now,
        schedule.post_interval_secs.map(Duration::from_secs),
        &schedule.post_times,
    )?;
    Ok(mode)
}

/// Load and shuffle captions.
///
/// A configured file must exist; the default file is optional.
pub fn load_captions(config: &AppConfig) -> anyhow::Result<CaptionRotation> {
    if let Some(path) = &config.publisher.captions_file {
        let captions = CaptionRotation::load(path)
            .with_context(|| format!("failed to read captions from {}", path.display()))?;
        return Ok(captions.shuffled());
    }

    let default = Path::new(DEFAULT_CAPTIONS_FILE);
    if !default.exists() {
        info!("No {} found; posts carry only the credit line", DEFAULT_CAPTIONS_FILE);
        return Ok(CaptionRotation::default());
    }
    let captions = CaptionRotation::load(default)
        .with_context(|| format!("failed to read captions from {DEFAULT_CAPTIONS_FILE}"))?;
    Ok(captions.shuffled())
}

/// Connect to the face service; an unreachable service is a startup error.
pub async fn connect_faces(config: &AppConfig) -> anyhow::Result<FaceService> {
    let faces = FaceService::new(&config.faces)?;
    faces.check_available().await.with_context(|| {
        format!(
            "face service at {} is not reachable",
            config.faces.service_url
        )
    })?;
    Ok(faces)
}

/// Build the HTTP-backed capabilities around a connected face service.
pub fn capabilities(config: &AppConfig, faces: FaceService) -> anyhow::Result<Capabilities> {
    Ok(Capabilities {
        api: Arc::new(GatewayApi::new(&config.api)?),
        images: Arc::new(HttpImageSource::new(config.api.timeout_secs)?),
        faces: Arc::new(faces),
        sink: Arc::new(JpegFileSink),
    })
}

/// Run the bot.
pub async fn run(mut config: AppConfig, args: RunArgs) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;
    config.validate()?;
    let mode = trigger_mode(&config)?;

    let faces = connect_faces(&config).await?;
    info!("Face service reachable at {}", config.faces.service_url);

    let db = Database::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open store {}", config.store.path.display()))?;
    let captions = load_captions(&config)?;

    let orchestrator = Orchestrator::new(
        db.clone(),
        capabilities(&config, faces)?,
        OrchestratorSettings::from(&config),
    );
    let running = orchestrator.start(captions);

    let admin_task = if config.admin.enabled {
        let addr: SocketAddr = config
            .admin
            .bind
            .parse()
            .with_context(|| format!("invalid admin.bind '{}'", config.admin.bind))?;
        let state = AppState::new(db.clone(), running.handle());
        Some(tokio::spawn(async move {
            if let Err(e) = admin::serve(addr, state).await {
                warn!("Admin server stopped: {}", e);
            }
        }))
    } else {
        None
    };

    tokio::select! {
        () = running.drive(&mode) => info!("Publish trigger finished"),
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutting down...");
        }
    }

    if let Some(task) = admin_task {
        task.abort();
    }
    running.shutdown();
    db.close().await;
    Ok(())
}

//! Orchestrator: wires the crawler, the ingestion consumer and the publish
//! control task, then drives publish triggers.
//!
//! Publish and demo requests from every source (timers, admin endpoint) go
//! through one bounded command queue read by a single control task. That
//! task owns the caption rotation, so attempts never overlap and the
//! caption cursor has exactly one writer.

use crate::captions::CaptionRotation;
use crate::error::{PipelineError, Result};
use crate::ingest::{IngestionHandler, DEFAULT_DELAY_SECS};
use crate::publish::{DemoRender, PublishOutcome, PublishSettings, Publisher};
use facebot_core::{AppConfig, FaceCapability, ImageSink, ImageSource, MediaApi};
use facebot_crawler::{rendezvous, Crawler, DEFAULT_INTERVAL};
use facebot_db::Database;
use facebot_scheduler::{TriggerMode, TriggerSource};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Pending requests the control task will queue before callers wait.
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Runtime settings for the background tasks.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Sleep between crawl iterations
    pub crawl_interval: Duration,
    /// Inclusive range of the random delay between ingested items, seconds
    pub ingest_delay_secs: RangeInclusive<u64>,
    /// Publisher switches
    pub publish: PublishSettings,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            crawl_interval: DEFAULT_INTERVAL,
            ingest_delay_secs: DEFAULT_DELAY_SECS,
            publish: PublishSettings::default(),
        }
    }
}

impl From<&AppConfig> for OrchestratorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            crawl_interval: Duration::from_secs(config.crawler.interval_secs),
            ingest_delay_secs: config.ingest.delay_min_secs..=config.ingest.delay_max_secs,
            publish: PublishSettings::from(&config.publisher),
        }
    }
}

/// The capabilities the pipeline is built from.
#[derive(Clone)]
pub struct Capabilities {
    /// Remote account/media API
    pub api: Arc<dyn MediaApi>,
    /// Image downloads
    pub images: Arc<dyn ImageSource>,
    /// Face detection and replacement
    pub faces: Arc<dyn FaceCapability>,
    /// Local image output
    pub sink: Arc<dyn ImageSink>,
}

enum Command {
    Publish {
        source: TriggerSource,
        reply: oneshot::Sender<Result<PublishOutcome>>,
    },
    Demo {
        reply: oneshot::Sender<Result<DemoRender>>,
    },
}

/// Cloneable entry point to the control task.
#[derive(Clone)]
pub struct OrchestratorHandle {
    tx: mpsc::Sender<Command>,
}

impl OrchestratorHandle {
    /// Queue a publish attempt and wait for its result.
    pub async fn publish(&self, source: TriggerSource) -> Result<PublishOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Publish { source, reply })
            .await
            .map_err(|_| PipelineError::OrchestratorStopped)?;
        rx.await.map_err(|_| PipelineError::OrchestratorStopped)?
    }

    /// Queue a demo render and wait for it.
    pub async fn demo(&self) -> Result<DemoRender> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Demo { reply })
            .await
            .map_err(|_| PipelineError::OrchestratorStopped)?;
        rx.await.map_err(|_| PipelineError::OrchestratorStopped)?
    }
}

/// Start the control task that serializes publish and demo requests.
#[must_use]
pub fn spawn_control(
    publisher: Publisher,
    captions: CaptionRotation,
) -> (OrchestratorHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let task = tokio::spawn(control_loop(publisher, captions, rx));
    (OrchestratorHandle { tx }, task)
}

async fn control_loop(
    publisher: Publisher,
    mut captions: CaptionRotation,
    mut rx: mpsc::Receiver<Command>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Publish { source, reply } => {
                info!("Publish attempt ({})", source);
                let result = publisher.publish(&mut captions).await;
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
            Command::Demo { reply } => {
                let _ = reply.send(publisher.demo().await);
            }
        }
    }
    info!("All orchestrator handles dropped; control task stopping");
}

/// Builds and starts the pipeline.
pub struct Orchestrator {
    db: Database,
    capabilities: Capabilities,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Create an orchestrator over a store and a set of capabilities.
    #[must_use]
    pub fn new(db: Database, capabilities: Capabilities, settings: OrchestratorSettings) -> Self {
        Self {
            db,
            capabilities,
            settings,
        }
    }

    /// A publisher sharing this orchestrator's store and capabilities.
    #[must_use]
    pub fn publisher(&self) -> Publisher {
        Publisher::new(
            self.db.clone(),
            Arc::clone(&self.capabilities.api),
            Arc::clone(&self.capabilities.images),
            Arc::clone(&self.capabilities.faces),
            Arc::clone(&self.capabilities.sink),
            self.settings.publish.clone(),
        )
    }

    /// Spawn the crawler, the ingestion consumer and the control task.
    #[must_use]
    pub fn start(self, captions: CaptionRotation) -> Running {
        let (tx, rx) = rendezvous();

        let crawler = Crawler::new(Arc::clone(&self.capabilities.api), tx)
            .with_interval(self.settings.crawl_interval)
            .spawn();

        let ingestion = IngestionHandler::new(
            self.db.clone(),
            Arc::clone(&self.capabilities.images),
            Arc::clone(&self.capabilities.faces),
        )
        .with_delay_secs(self.settings.ingest_delay_secs.clone());
        let ingest = tokio::spawn(ingestion.run(rx));

        info!("Loaded {} captions", captions.len());
        let (handle, control) = spawn_control(self.publisher(), captions);

        Running {
            handle,
            tasks: vec![crawler, ingest, control],
        }
    }
}

/// A started pipeline.
pub struct Running {
    handle: OrchestratorHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl Running {
    /// Handle for manual publish and demo requests.
    #[must_use]
    pub fn handle(&self) -> OrchestratorHandle {
        self.handle.clone()
    }

    /// Fire publish attempts according to `mode`.
    ///
    /// Returns after the single attempt for `Once`; never returns otherwise.
    /// Attempt failures are logged and do not stop the trigger.
    pub async fn drive(&self, mode: &TriggerMode) {
        facebot_scheduler::drive(mode, |source| {
            let handle = self.handle.clone();
            async move {
                match handle.publish(source).await {
                    Ok(outcome) => info!(
                        "Published {} to {}",
                        outcome.record,
                        outcome.output.display()
                    ),
                    Err(e) if e.is_no_eligible_record() => {
                        info!("Nothing eligible to publish ({})", source);
                    }
                    Err(e) => warn!("Publish attempt ({}) failed: {}", source, e),
                }
            }
        })
        .await;
    }

    /// Stop every background task.
    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{item, FakeApi, FakeFaces, FakeImages};
    use crate::JpegFileSink;
    use facebot_core::{MediaId, RecordState};
    use tempfile::TempDir;

    async fn setup(images: FakeImages) -> (Orchestrator, Database, FakeApi, TempDir) {
        let db = Database::open(":memory:").await.expect("open db");
        let api = FakeApi::default();
        let dir = TempDir::new().expect("temp dir");
        let capabilities = Capabilities {
            api: Arc::new(api.clone()),
            images: Arc::new(images),
            faces: Arc::new(FakeFaces::with_count(2)),
            sink: Arc::new(JpegFileSink),
        };
        let settings = OrchestratorSettings {
            crawl_interval: Duration::from_secs(600),
            ingest_delay_secs: 0..=0,
            publish: PublishSettings {
                min_faces: 1,
                upload: false,
                auto_follow: false,
                output_dir: dir.path().join("output"),
            },
        };
        (Orchestrator::new(db.clone(), capabilities, settings), db, api, dir)
    }

    #[tokio::test]
    async fn test_ingest_then_publish_end_to_end() {
        let (orchestrator, db, _api, dir) = setup(FakeImages::default()).await;

        let ingestion = IngestionHandler::new(
            db.clone(),
            Arc::new(FakeImages::default()),
            Arc::new(FakeFaces::with_count(2)),
        );
        ingestion.handle(item("m1", "bob")).await.expect("ingest");

        let available = db.stats(RecordState::Available).await.expect("stats");
        assert_eq!(available.total, 1);

        let (handle, _task) = spawn_control(orchestrator.publisher(), CaptionRotation::default());
        let outcome = handle
            .publish(TriggerSource::Manual)
            .await
            .expect("publish");

        assert_eq!(outcome.record.id().as_str(), "m1");
        assert!(dir.path().join("output").join("m1.jpeg").exists());
        let record = db
            .get(&MediaId::new("m1").expect("id"))
            .await
            .expect("get");
        assert_eq!(record.state, RecordState::Used);
    }

    #[tokio::test]
    async fn test_failed_publish_grows_rejected() {
        let (orchestrator, db, _api, _dir) = setup(FakeImages::failing()).await;
        db.put(&facebot_core::Record::available(item("m1", "bob"), 1))
            .await
            .expect("seed");
        let before = db.stats(RecordState::Rejected).await.expect("stats").total;

        let (handle, _task) = spawn_control(orchestrator.publisher(), CaptionRotation::default());
        assert!(handle.publish(TriggerSource::Manual).await.is_err());

        let after = db.stats(RecordState::Rejected).await.expect("stats").total;
        assert_eq!(after, before + 1);
    }

    #[tokio::test]
    async fn test_concurrent_triggers_share_one_caption_cursor() {
        let (mut orchestrator, db, api, _dir) = setup(FakeImages::default()).await;
        orchestrator.settings.publish.upload = true;
        for i in 0..4 {
            db.put(&facebot_core::Record::available(item(&format!("m{i}"), "bob"), 1))
                .await
                .expect("seed");
        }

        let captions = CaptionRotation::new(vec!["X".into(), "Y".into()]);
        let (handle, _task) = spawn_control(orchestrator.publisher(), captions);

        let mut joins = Vec::new();
        for _ in 0..4 {
            let handle = handle.clone();
            joins.push(tokio::spawn(async move {
                handle.publish(TriggerSource::Manual).await
            }));
        }
        for join in joins {
            join.await.expect("join").expect("publish");
        }

        let mut captions: Vec<String> = api
            .uploads()
            .into_iter()
            .map(|(_, c)| c.split("\n\n").next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(captions.len(), 4);
        // Each caption used exactly twice: no two attempts read the same cursor.
        captions.sort();
        assert_eq!(captions, vec!["X", "X", "Y", "Y"]);
    }

    #[tokio::test]
    async fn test_demo_through_handle() {
        let (orchestrator, db, _api, _dir) = setup(FakeImages::default()).await;
        let (handle, _task) = spawn_control(orchestrator.publisher(), CaptionRotation::default());

        let err = handle.demo().await.expect_err("empty store");
        assert!(err.is_no_eligible_record());

        db.put(&facebot_core::Record::available(item("m1", "bob"), 2))
            .await
            .expect("seed");
        let demo = handle.demo().await.expect("demo");
        assert_eq!(demo.record.state, RecordState::Available);
    }

    #[tokio::test]
    async fn test_handle_reports_stopped_control_task() {
        let (orchestrator, _db, _api, _dir) = setup(FakeImages::default()).await;
        let (handle, task) = spawn_control(orchestrator.publisher(), CaptionRotation::default());
        task.abort();
        let _ = task.await;

        assert!(matches!(
            handle.publish(TriggerSource::Manual).await,
            Err(PipelineError::OrchestratorStopped)
        ));
    }

    #[tokio::test]
    async fn test_crawled_media_is_ingested_in_order_then_published() {
        let images = FakeImages::default();
        let (orchestrator, db, api, _dir) = setup(images.clone()).await;
        api.set_feed("bob", &["m0", "m1", "m2"]);

        let running = orchestrator.start(CaptionRotation::default());
        let ingested = tokio::time::timeout(Duration::from_secs(5), async {
            while db.counts_by_state().await.expect("counts").available < 3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(ingested.is_ok(), "crawled media never reached the store");

        assert_eq!(
            images.fetched(),
            vec![
                "http://img.test/m0.jpg",
                "http://img.test/m1.jpg",
                "http://img.test/m2.jpg"
            ]
        );
        assert!(api.opened() >= 1);
        assert_eq!(api.opened(), api.closed());

        let outcome = running
            .handle()
            .publish(TriggerSource::Manual)
            .await
            .expect("publish");
        assert_eq!(outcome.record.state, RecordState::Used);

        let counts = db.counts_by_state().await.expect("counts");
        assert_eq!((counts.available, counts.used), (2, 1));
        running.shutdown();
    }

    #[tokio::test]
    async fn test_once_mode_publishes_single_attempt() {
        let (orchestrator, db, _api, _dir) = setup(FakeImages::default()).await;
        db.put(&facebot_core::Record::available(item("m1", "bob"), 1))
            .await
            .expect("seed");
        db.put(&facebot_core::Record::available(item("m2", "bob"), 1))
            .await
            .expect("seed");

        let running = orchestrator.start(CaptionRotation::default());
        running.drive(&TriggerMode::Once).await;

        let counts = db.counts_by_state().await.expect("counts");
        assert_eq!(counts.used, 1);
        assert_eq!(counts.available, 1);
        running.shutdown();
    }

    #[tokio::test]
    async fn test_interval_mode_keeps_publishing() {
        let (orchestrator, db, _api, _dir) = setup(FakeImages::default()).await;
        for i in 0..10 {
            db.put(&facebot_core::Record::available(item(&format!("m{i}"), "bob"), 1))
                .await
                .expect("seed");
        }

        let running = orchestrator.start(CaptionRotation::default());
        let mode = TriggerMode::Interval(Duration::from_millis(50));
        let stopped = tokio::time::timeout(Duration::from_millis(220), running.drive(&mode)).await;
        assert!(stopped.is_err(), "interval drive must not return");

        let used = db.counts_by_state().await.expect("counts").used;
        assert!(used >= 2, "expected repeated attempts, got {used}");
        running.shutdown();
    }
}

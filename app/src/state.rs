//! State shared by the admin handlers.

use facebot_db::Database;
use facebot_pipeline::OrchestratorHandle;

/// Handles the admin surface needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Record store, for statistics
    pub db: Database,
    /// Queue into the publish control task
    pub orchestrator: OrchestratorHandle,
}

impl AppState {
    /// Bundle a store and an orchestrator handle.
    pub fn new(db: Database, orchestrator: OrchestratorHandle) -> Self {
        Self { db, orchestrator }
    }
}

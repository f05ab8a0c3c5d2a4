//! Admin HTTP surface.
//!
//! - `GET /demo` renders a random eligible record without touching the store
//! - `GET /stats` reports `Available` records grouped by face count
//! - `GET /stats/all` reports record counts per state
//! - `POST /publish` runs one publish attempt through the control task

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use facebot_core::{spawn_encode_jpeg, RecordState};
use facebot_db::{StateCounts, StateStats};
use facebot_pipeline::PublishOutcome;
use facebot_scheduler::TriggerSource;
use std::net::SocketAddr;

/// Build the admin router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/demo", get(demo))
        .route("/stats", get(stats))
        .route("/stats/all", get(stats_all))
        .route("/publish", post(publish))
        .with_state(state)
}

/// Serve the admin router until the task is dropped.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Admin endpoints listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn demo(State(state): State<AppState>) -> Result<Response, ApiError> {
    let render = state.orchestrator.demo().await?;
    tracing::info!("Demo render of {}", render.record);

    let jpeg = spawn_encode_jpeg(render.image).await.map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_FAILED", e.to_string())
    })?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response())
}

async fn stats(State(state): State<AppState>) -> Result<Json<StateStats>, ApiError> {
    Ok(Json(state.db.stats(RecordState::Available).await?))
}

async fn stats_all(State(state): State<AppState>) -> Result<Json<StateCounts>, ApiError> {
    Ok(Json(state.db.counts_by_state().await?))
}

async fn publish(State(state): State<AppState>) -> Result<Json<PublishOutcome>, ApiError> {
    let outcome = state.orchestrator.publish(TriggerSource::Manual).await?;
    Ok(Json(outcome))
}

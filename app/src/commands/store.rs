//! Operator commands against the record store.

use anyhow::Context;
use facebot_core::{AppConfig, MediaId, RecordState};
use facebot_db::Database;

async fn open(config: &AppConfig) -> anyhow::Result<Database> {
    Database::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open store {}", config.store.path.display()))
}

/// Return every record to `Available`.
pub async fn reset(config: &AppConfig) -> anyhow::Result<()> {
    let db = open(config).await?;
    let changed = db.reset_states().await?;
    println!("Reset {changed} records to Available");
    db.close().await;
    Ok(())
}

/// Print counts per state and the face-count breakdown of available records.
pub async fn stats(config: &AppConfig) -> anyhow::Result<()> {
    let db = open(config).await?;
    println!(
        "Store {} (schema v{})",
        config.store.path.display(),
        db.get_schema_version().await?
    );
    let counts = db.counts_by_state().await?;
    for state in RecordState::ALL {
        println!("{:<10} {}", state.to_string(), counts.get(state));
    }

    let available = db.stats(RecordState::Available).await?;
    if !available.by_face_count.is_empty() {
        println!();
        println!("Available by face count:");
        for bucket in &available.by_face_count {
            println!("  {:>3} faces: {}", bucket.face_count, bucket.records);
        }
    }
    db.close().await;
    Ok(())
}

/// Print one record as JSON.
pub async fn show(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let id = MediaId::new(id)?;
    let db = open(config).await?;
    let record = db.get(&id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    db.close().await;
    Ok(())
}

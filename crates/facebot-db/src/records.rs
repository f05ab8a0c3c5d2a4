//! Record operations: the store's contract.
//!
//! Every operation is a single SQL statement, so each is atomic on its own
//! and `SQLite` serializes concurrent writers. State transitions are checked
//! inside the `UPDATE` itself: a row only moves if it is still `Available`.

use crate::error::{DatabaseError, Result};
use crate::Database;
use facebot_core::{AccountId, MediaId, MediaItem, Record, RecordState};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const SELECT_COLUMNS: &str = "SELECT id, url, account_id, username, face_count, state FROM records";

/// Aggregate counts for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStats {
    /// The state these counts describe
    pub state: RecordState,
    /// Number of records in the state
    pub total: u64,
    /// Records grouped by detected face count, ascending
    pub by_face_count: Vec<FaceCountBucket>,
}

/// Number of records with exactly `face_count` faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceCountBucket {
    /// Detected faces
    pub face_count: u32,
    /// Records with that many faces
    pub records: u64,
}

/// Totals for every state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Records still eligible for selection
    pub available: u64,
    /// Records that were rendered
    pub used: u64,
    /// Records whose publish attempt failed
    pub rejected: u64,
}

impl StateCounts {
    /// Count for a single state.
    #[must_use]
    pub fn get(&self, state: RecordState) -> u64 {
        match state {
            RecordState::Available => self.available,
            RecordState::Used => self.used,
            RecordState::Rejected => self.rejected,
        }
    }

    /// All records.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.available + self.used + self.rejected
    }
}

impl Database {
    /// True iff a record with this ID exists.
    pub async fn has(&self, id: &MediaId) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM records WHERE id = ?)")
            .bind(id.as_str())
            .fetch_one(self.pool())
            .await?;
        Ok(exists != 0)
    }

    /// Fetch one record.
    pub async fn get(&self, id: &MediaId) -> Result<Record> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(id.clone()))?;
        record_from_row(&row)
    }

    /// Insert a new record.
    ///
    /// # Errors
    /// `AlreadyExists` if the ID is taken (the stored row is left as is), and
    /// `Invalid` if the record is not `Available`.
    pub async fn put(&self, record: &Record) -> Result<()> {
        if record.state != RecordState::Available {
            return Err(DatabaseError::Invalid(format!(
                "new record {} must be Available, got {}",
                record.id(),
                record.state
            )));
        }

        let result = sqlx::query(
            "INSERT INTO records (id, url, account_id, username, face_count, state)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.media.id.as_str())
        .bind(&record.media.url)
        .bind(record.media.account_id.as_str())
        .bind(&record.media.username)
        .bind(i64::from(record.face_count))
        .bind(record.state.as_str())
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(DatabaseError::AlreadyExists(record.id().clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Pick one record uniformly at random among those that are `Available`
    /// with at least `min_faces` faces.
    ///
    /// # Errors
    /// `NoEligibleRecord` when nothing qualifies.
    pub async fn search_random(&self, min_faces: u32) -> Result<Record> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE state = ? AND face_count >= ? ORDER BY RANDOM() LIMIT 1"
        ))
        .bind(RecordState::Available.as_str())
        .bind(i64::from(min_faces))
        .fetch_optional(self.pool())
        .await?
        .ok_or(DatabaseError::NoEligibleRecord { min_faces })?;
        record_from_row(&row)
    }

    /// Move a record to `new_state`.
    ///
    /// Only `Available -> Used` and `Available -> Rejected` are accepted.
    ///
    /// # Errors
    /// `NotFound` if the ID is absent, `InvalidTransition` otherwise when the
    /// row is not in a state that may move to `new_state`.
    pub async fn set_state(&self, id: &MediaId, new_state: RecordState) -> Result<()> {
        if RecordState::Available.can_transition_to(new_state) {
            let result = sqlx::query(
                "UPDATE records SET state = ?, updated_at = datetime('now')
                 WHERE id = ? AND state = ?",
            )
            .bind(new_state.as_str())
            .bind(id.as_str())
            .bind(RecordState::Available.as_str())
            .execute(self.pool())
            .await?;

            if result.rows_affected() == 1 {
                tracing::debug!("Record {} -> {}", id, new_state);
                return Ok(());
            }
        }

        // Nothing moved: report why.
        let current = self.current_state(id).await?;
        Err(DatabaseError::InvalidTransition {
            id: id.clone(),
            from: current,
            to: new_state,
        })
    }

    async fn current_state(&self, id: &MediaId) -> Result<RecordState> {
        let state: Option<String> = sqlx::query_scalar("SELECT state FROM records WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(self.pool())
            .await?;
        match state {
            Some(state) => parse_state(&state),
            None => Err(DatabaseError::NotFound(id.clone())),
        }
    }

    /// Aggregate counts for one state, grouped by face count.
    pub async fn stats(&self, state: RecordState) -> Result<StateStats> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT face_count, COUNT(*) FROM records
             WHERE state = ?
             GROUP BY face_count
             ORDER BY face_count",
        )
        .bind(state.as_str())
        .fetch_all(self.pool())
        .await?;

        let mut total = 0;
        let mut by_face_count = Vec::with_capacity(rows.len());
        for (face_count, records) in rows {
            let records = to_u64(records)?;
            total += records;
            by_face_count.push(FaceCountBucket {
                face_count: to_face_count(face_count)?,
                records,
            });
        }

        Ok(StateStats {
            state,
            total,
            by_face_count,
        })
    }

    /// Totals for all states in one query.
    pub async fn counts_by_state(&self) -> Result<StateCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT state, COUNT(*) FROM records GROUP BY state")
                .fetch_all(self.pool())
                .await?;

        let mut counts = StateCounts::default();
        for (state, count) in rows {
            let count = to_u64(count)?;
            match parse_state(&state)? {
                RecordState::Available => counts.available = count,
                RecordState::Used => counts.used = count,
                RecordState::Rejected => counts.rejected = count,
            }
        }
        Ok(counts)
    }

    /// Return every record to `Available`. Operator maintenance only.
    ///
    /// Returns the number of records whose state changed.
    pub async fn reset_states(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE records SET state = ?, updated_at = datetime('now') WHERE state != ?",
        )
        .bind(RecordState::Available.as_str())
        .bind(RecordState::Available.as_str())
        .execute(self.pool())
        .await?;

        tracing::warn!("Reset {} records to Available", result.rows_affected());
        Ok(result.rows_affected())
    }
}

fn record_from_row(row: &SqliteRow) -> Result<Record> {
    let id: String = row.try_get("id")?;
    let state: String = row.try_get("state")?;
    let face_count: i64 = row.try_get("face_count")?;

    Ok(Record {
        media: MediaItem {
            id: MediaId::new(id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
            url: row.try_get("url")?,
            account_id: AccountId::new(row.try_get::<String, _>("account_id")?),
            username: row.try_get("username")?,
        },
        face_count: to_face_count(face_count)?,
        state: parse_state(&state)?,
    })
}

fn parse_state(state: &str) -> Result<RecordState> {
    state
        .parse()
        .map_err(|e: facebot_core::FacebotError| DatabaseError::Decode(e.to_string()))
}

fn to_face_count(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| DatabaseError::Decode(format!("invalid face_count {value}")))
}

fn to_u64(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| DatabaseError::Decode(format!("invalid count {value}")))
}

//! Participant database operations

use crate::db::models::Participant;
use crate::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Record a newly admitted participant
pub async fn create_participant(
    pool: &SqlitePool,
    guid: Uuid,
    access_code: &str,
) -> Result<()> {
    sqlx::query("INSERT INTO participants (guid, access_code) VALUES (?, ?)")
        .bind(guid.to_string())
        .bind(access_code)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load a participant by id
pub async fn load_participant(pool: &SqlitePool, guid: Uuid) -> Result<Option<Participant>> {
    let row = sqlx::query(
        "SELECT guid, access_code, started_at FROM participants WHERE guid = ?",
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let guid = Uuid::parse_str(&guid_str).map_err(|e| {
                crate::Error::Internal(format!("Failed to parse participant guid: {}", e))
            })?;

            Ok(Some(Participant {
                guid,
                access_code: row.get("access_code"),
                started_at: row.get("started_at"),
            }))
        }
        None => Ok(None),
    }
}

/// Number of participants admitted so far
pub async fn count_participants(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

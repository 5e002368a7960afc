//! Vote database operations
//!
//! Votes are keyed by (participant, component, champion, challenger), so a
//! client that retries a submission lands on the same row and only refreshes
//! the winner. `round` is assigned at first insert and never changes,
//! preserving history order across retries.

use crate::pairing::{Component, VoteOutcome};
use crate::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Record (or re-record) a preference vote
///
/// Returns the round the vote occupies in the participant's history.
pub async fn record_vote(
    pool: &SqlitePool,
    participant: Uuid,
    component: Component,
    champion: &str,
    challenger: &str,
    winner: &str,
) -> Result<i64> {
    let participant_str = participant.to_string();

    // Next free round; on conflict the stored round wins and this value is
    // discarded along with the rest of the inserted row.
    let next_round: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM votes WHERE participant = ? AND component = ?",
    )
    .bind(&participant_str)
    .bind(component.as_str())
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO votes (participant, component, round, champion, challenger, winner)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(participant, component, champion, challenger) DO UPDATE SET
            winner = excluded.winner,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&participant_str)
    .bind(component.as_str())
    .bind(next_round)
    .bind(champion)
    .bind(challenger)
    .bind(winner)
    .execute(pool)
    .await?;

    let round: i64 = sqlx::query_scalar(
        r#"
        SELECT round FROM votes
        WHERE participant = ? AND component = ? AND champion = ? AND challenger = ?
        "#,
    )
    .bind(&participant_str)
    .bind(component.as_str())
    .bind(champion)
    .bind(challenger)
    .fetch_one(pool)
    .await?;

    Ok(round)
}

/// A participant's vote history for one component, in submission order
pub async fn votes_for(
    pool: &SqlitePool,
    participant: Uuid,
    component: Component,
) -> Result<Vec<VoteOutcome>> {
    let rows = sqlx::query(
        r#"
        SELECT champion, challenger, winner FROM votes
        WHERE participant = ? AND component = ?
        ORDER BY round
        "#,
    )
    .bind(participant.to_string())
    .bind(component.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| VoteOutcome {
            champion: row.get("champion"),
            challenger: row.get("challenger"),
            winner: row.get("winner"),
        })
        .collect())
}

/// Per-component win counts, for the administrative tally report
///
/// Returns (component, method, wins) tuples ordered by component then wins.
pub async fn tally(pool: &SqlitePool) -> Result<Vec<(String, String, i64)>> {
    let rows = sqlx::query(
        r#"
        SELECT component, winner, COUNT(*) AS wins
        FROM votes
        GROUP BY component, winner
        ORDER BY component, wins DESC, winner
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("component"), row.get("winner"), row.get("wins")))
        .collect())
}

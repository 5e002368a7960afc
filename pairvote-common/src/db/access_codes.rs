//! Access code database operations
//!
//! Codes gate survey entry. Consumption is a single atomic UPDATE so two
//! concurrent starts cannot both claim the last use of a code.

use crate::db::models::AccessCode;
use crate::{Error, Result};
use rand::Rng;
use sqlx::{Row, SqlitePool};

/// Alphabet for generated codes; ambiguous glyphs (0/O, 1/I/L) are excluded
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Outcome of attempting to consume one use of an access code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// A use was claimed; the caller may admit the participant
    Admitted,
    /// The code exists but is spent or disabled
    Exhausted,
    /// No such code
    NotFound,
}

/// Mint a new access code with the given use budget
///
/// Generated codes look like `QK7M-2XWP`. Retries on the (unlikely) collision
/// with an existing code.
pub async fn mint_code(
    pool: &SqlitePool,
    max_uses: i64,
    label: Option<&str>,
) -> Result<String> {
    if max_uses < 1 {
        return Err(Error::InvalidInput(format!(
            "max_uses must be positive, got {}",
            max_uses
        )));
    }

    for _ in 0..8 {
        let code = random_code();

        let result = sqlx::query(
            "INSERT OR IGNORE INTO access_codes (code, label, max_uses) VALUES (?, ?, ?)",
        )
        .bind(&code)
        .bind(label)
        .bind(max_uses)
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(code);
        }
    }

    Err(Error::Internal(
        "Failed to mint a unique access code after 8 attempts".to_string(),
    ))
}

/// Fetch an access code row
pub async fn get_code(pool: &SqlitePool, code: &str) -> Result<Option<AccessCode>> {
    let row = sqlx::query(
        "SELECT code, label, max_uses, uses, disabled FROM access_codes WHERE code = ?",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| AccessCode {
        code: row.get("code"),
        label: row.get("label"),
        max_uses: row.get("max_uses"),
        uses: row.get("uses"),
        disabled: row.get::<i64, _>("disabled") != 0,
    }))
}

/// Atomically claim one use of an access code
///
/// The WHERE clause carries the gate, so the check and the increment are one
/// statement; `rows_affected` tells us whether the claim landed.
pub async fn consume_code(pool: &SqlitePool, code: &str) -> Result<ConsumeOutcome> {
    let result = sqlx::query(
        r#"
        UPDATE access_codes
        SET uses = uses + 1,
            last_used_at = CURRENT_TIMESTAMP
        WHERE code = ? AND disabled = 0 AND uses < max_uses
        "#,
    )
    .bind(code)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(ConsumeOutcome::Admitted);
    }

    // The claim missed: distinguish unknown codes from spent/disabled ones
    match get_code(pool, code).await? {
        Some(_) => Ok(ConsumeOutcome::Exhausted),
        None => Ok(ConsumeOutcome::NotFound),
    }
}

/// List all access codes (for the administrative tally report)
pub async fn list_codes(pool: &SqlitePool) -> Result<Vec<AccessCode>> {
    let rows = sqlx::query(
        "SELECT code, label, max_uses, uses, disabled FROM access_codes ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| AccessCode {
            code: row.get("code"),
            label: row.get("label"),
            max_uses: row.get("max_uses"),
            uses: row.get("uses"),
            disabled: row.get::<i64, _>("disabled") != 0,
        })
        .collect())
}

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    let mut pick = |n: usize| -> String {
        (0..n)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    };
    let head = pick(4);
    let tail = pick(4);
    format!("{}-{}", head, tail)
}

//! Settings table accessors
//!
//! The `settings` table is the authoritative source for runtime parameters:
//! HTTP port, CORS allow-list, token lifetime, method catalogs, and the
//! session signing secret. Defaults are seeded by
//! [`crate::db::init::init_database`]; everything here reads or writes
//! individual keys.

use crate::pairing::Component;
use crate::{Error, Result};
use rand::RngCore;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

const SIGNING_SECRET_KEY: &str = "session_signing_secret";
const SIGNING_SECRET_BYTES: usize = 32;

/// Read a single setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Write a single setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the session signing secret, generating one on first run
///
/// The secret is 32 cryptographically random bytes, stored hex-encoded.
pub async fn load_or_init_signing_secret(pool: &SqlitePool) -> Result<Vec<u8>> {
    if let Some(stored) = get_setting(pool, SIGNING_SECRET_KEY).await? {
        return decode_hex(&stored)
            .ok_or_else(|| Error::Internal("Stored signing secret is not valid hex".to_string()));
    }

    let mut secret = vec![0u8; SIGNING_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut secret);

    set_setting(pool, SIGNING_SECRET_KEY, &encode_hex(&secret)).await?;
    info!("Generated new session signing secret");

    Ok(secret)
}

/// Token lifetime in seconds (default 86400)
pub async fn session_ttl_seconds(pool: &SqlitePool) -> Result<i64> {
    parse_setting(pool, "session_timeout_seconds", 86_400).await
}

/// HTTP listen port (default 5730)
pub async fn http_port(pool: &SqlitePool) -> Result<u16> {
    let port: i64 = parse_setting(pool, "http_port", 5730).await?;
    u16::try_from(port).map_err(|_| Error::Config(format!("Invalid http_port: {}", port)))
}

/// Default use budget for newly minted access codes
pub async fn access_code_default_uses(pool: &SqlitePool) -> Result<i64> {
    parse_setting(pool, "access_code_default_uses", 1).await
}

/// CORS allow-list, as stored origin strings
pub async fn cors_allowed_origins(pool: &SqlitePool) -> Result<Vec<String>> {
    let raw = get_setting(pool, "cors_allowed_origins").await?.unwrap_or_default();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("Invalid cors_allowed_origins: {}", e)))
}

/// Method catalog for every survey component
///
/// Keys follow `methods_<component>`, each a JSON array of method identifiers.
pub async fn method_catalog(pool: &SqlitePool) -> Result<HashMap<Component, Vec<String>>> {
    let mut catalog = HashMap::new();

    for component in Component::ALL {
        let key = format!("methods_{}", component.as_str());
        let raw = get_setting(pool, &key)
            .await?
            .ok_or_else(|| Error::Config(format!("Missing setting: {}", key)))?;
        let methods: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid {}: {}", key, e)))?;
        catalog.insert(component, methods);
    }

    Ok(catalog)
}

async fn parse_setting(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    match get_setting(pool, key).await? {
        Some(value) => value
            .parse::<i64>()
            .map_err(|e| Error::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

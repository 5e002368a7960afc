//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Survey entry credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCode {
    pub code: String,
    pub label: Option<String>,
    pub max_uses: i64,
    pub uses: i64,
    pub disabled: bool,
}

/// One issued survey session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub guid: Uuid,
    pub access_code: String,
    pub started_at: DateTime<Utc>,
}

//! Shared API request/response types
//!
//! Wire shapes exchanged by the survey frontend and the pairvote API. Both
//! endpoints speak JSON over POST; errors are a flat `{"error": "..."}` body
//! with the HTTP status carrying the category.

use crate::pairing::Matchup;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// /api/start
// ========================================

/// Request body for `POST /api/start`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartRequest {
    /// Survey entry credential
    pub code: String,
}

/// Per-component state handed to a participant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Assignment {
    /// Component identifier (`macro_actions`, ...)
    pub component: String,
    /// Next comparison to present, absent once the component is complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matchup: Option<Matchup>,
    /// True when every method has been shown for this component
    pub complete: bool,
}

/// Response body for `POST /api/start`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StartResponse {
    /// Signed session token, passed back with every vote
    pub token: String,
    /// Participant identity embedded in the token
    pub participant: Uuid,
    /// Unix epoch seconds after which the token is rejected
    pub expires_at: i64,
    /// Opening matchup for every component
    pub assignments: Vec<Assignment>,
}

// ========================================
// /api/vote
// ========================================

/// Request body for `POST /api/vote`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoteRequest {
    /// Session token from `/api/start`
    pub token: String,
    /// Component the comparison belongs to
    pub component: String,
    /// Champion the frontend presented
    pub champion: String,
    /// Challenger the frontend presented
    pub challenger: String,
    /// Preferred method; must be one of champion/challenger
    pub winner: String,
}

/// Response body for `POST /api/vote`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoteResponse {
    /// Round the vote occupies in this component's history
    pub round: i64,
    /// Next comparison to present, absent once the component is complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Matchup>,
    /// True when every method has been shown for this component
    pub complete: bool,
}

// ========================================
// Errors
// ========================================

/// Flat error body returned with any non-2xx status
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ========================================
// Tests
// ========================================

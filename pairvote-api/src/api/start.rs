//! Survey entry endpoint
//!
//! `POST /api/start` exchanges an access code for a signed session token and
//! the opening matchup of every component. One use of the code is claimed
//! atomically; a fresh participant identity is created per successful start.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pairvote_common::api::types::{Assignment, ErrorResponse, StartRequest, StartResponse};
use pairvote_common::db::access_codes::{self, ConsumeOutcome};
use pairvote_common::db::participants;
use pairvote_common::pairing::{self, Component};
use pairvote_common::token::{encode_token, SessionToken};
use pairvote_common::{time, uuid_utils};
use tracing::info;

use crate::AppState;

/// POST /api/start
///
/// Status mapping: unknown code 404, spent or disabled code 403, malformed
/// request 400, storage/signing failure 500.
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartResponse>, StartError> {
    let code = request.code.trim();
    if code.is_empty() {
        return Err(StartError::EmptyCode);
    }

    match access_codes::consume_code(&state.db, code)
        .await
        .map_err(|e| StartError::Database(e.to_string()))?
    {
        ConsumeOutcome::Admitted => {}
        ConsumeOutcome::Exhausted => return Err(StartError::CodeSpent),
        ConsumeOutcome::NotFound => return Err(StartError::UnknownCode),
    }

    let participant = uuid_utils::generate();
    participants::create_participant(&state.db, participant, code)
        .await
        .map_err(|e| StartError::Database(e.to_string()))?;

    let claims = SessionToken::issue(participant, code, time::epoch_secs(), state.session_ttl);
    let token = encode_token(&claims, &state.secret)
        .map_err(|e| StartError::Internal(e.to_string()))?;

    // Opening matchup for every component; an empty history means the
    // presentation order alone decides the pair.
    let assignments = Component::ALL
        .iter()
        .map(|component| {
            let methods = state.catalog.get(component).map(Vec::as_slice).unwrap_or(&[]);
            let matchup = pairing::next_matchup(methods, participant, *component, &[]);
            Assignment {
                component: component.as_str().to_string(),
                complete: matchup.is_none(),
                matchup,
            }
        })
        .collect();

    info!("Admitted participant {} via code {}", participant, code);

    Ok(Json(StartResponse {
        token,
        participant,
        expires_at: claims.expires_at,
        assignments,
    }))
}

/// Start endpoint error types
#[derive(Debug)]
pub enum StartError {
    EmptyCode,
    UnknownCode,
    CodeSpent,
    Database(String),
    Internal(String),
}

impl IntoResponse for StartError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            StartError::EmptyCode => (StatusCode::BAD_REQUEST, "Missing access code".to_string()),
            StartError::UnknownCode => {
                (StatusCode::NOT_FOUND, "Unknown access code".to_string())
            }
            StartError::CodeSpent => (
                StatusCode::FORBIDDEN,
                "Access code is spent or disabled".to_string(),
            ),
            StartError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            StartError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", msg),
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

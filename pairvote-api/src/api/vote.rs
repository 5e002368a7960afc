//! Vote submission endpoint
//!
//! `POST /api/vote` verifies the session token, validates the presented pair
//! against the component's method catalog, upserts the vote, and returns the
//! next matchup. Re-submitting the same comparison is idempotent.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pairvote_common::api::types::{ErrorResponse, VoteRequest, VoteResponse};
use pairvote_common::db::{participants, votes};
use pairvote_common::pairing::{self, Component};
use pairvote_common::time;
use pairvote_common::token::{decode_token, TokenError};
use tracing::warn;

use crate::AppState;

/// POST /api/vote
///
/// Status mapping: invalid or expired token 403, malformed vote 400, vanished
/// participant 404, storage failure 500.
pub async fn submit_vote(
    State(state): State<AppState>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, VoteError> {
    let claims = decode_token(&request.token, &state.secret, time::epoch_secs()).map_err(|e| {
        match e {
            TokenError::Expired { .. } => VoteError::SessionExpired,
            other => {
                warn!("Rejected session token: {}", other);
                VoteError::InvalidToken
            }
        }
    })?;

    let component = Component::parse(&request.component)
        .ok_or_else(|| VoteError::UnknownComponent(request.component.clone()))?;

    let methods = state
        .catalog
        .get(&component)
        .ok_or_else(|| VoteError::Internal(format!("No catalog for {}", component)))?;

    if request.champion == request.challenger {
        return Err(VoteError::InvalidPair(
            "champion and challenger must differ".to_string(),
        ));
    }
    for method in [&request.champion, &request.challenger] {
        if !methods.contains(method) {
            return Err(VoteError::InvalidPair(format!("unknown method: {}", method)));
        }
    }
    if request.winner != request.champion && request.winner != request.challenger {
        return Err(VoteError::InvalidWinner(request.winner.clone()));
    }

    // The token is self-contained, but the row must still exist: votes
    // reference participants and the database may have been reset since
    // issuance.
    let participant = claims.participant;
    if participants::load_participant(&state.db, participant)
        .await
        .map_err(|e| VoteError::Database(e.to_string()))?
        .is_none()
    {
        return Err(VoteError::UnknownParticipant);
    }

    let round = votes::record_vote(
        &state.db,
        participant,
        component,
        &request.champion,
        &request.challenger,
        &request.winner,
    )
    .await
    .map_err(|e| VoteError::Database(e.to_string()))?;

    let history = votes::votes_for(&state.db, participant, component)
        .await
        .map_err(|e| VoteError::Database(e.to_string()))?;
    let next = pairing::next_matchup(methods, participant, component, &history);

    Ok(Json(VoteResponse {
        round,
        complete: next.is_none(),
        next,
    }))
}

/// Vote endpoint error types
#[derive(Debug)]
pub enum VoteError {
    InvalidToken,
    SessionExpired,
    UnknownComponent(String),
    InvalidPair(String),
    InvalidWinner(String),
    UnknownParticipant,
    Database(String),
    Internal(String),
}

impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            VoteError::InvalidToken => {
                (StatusCode::FORBIDDEN, "Invalid session token".to_string())
            }
            VoteError::SessionExpired => (StatusCode::FORBIDDEN, "Session expired".to_string()),
            VoteError::UnknownComponent(name) => {
                (StatusCode::BAD_REQUEST, format!("Unknown component: {}", name))
            }
            VoteError::InvalidPair(reason) => {
                (StatusCode::BAD_REQUEST, format!("Invalid pair: {}", reason))
            }
            VoteError::InvalidWinner(winner) => (
                StatusCode::BAD_REQUEST,
                format!("Winner must be one of the presented pair, got: {}", winner),
            ),
            VoteError::UnknownParticipant => {
                (StatusCode::NOT_FOUND, "Unknown participant".to_string())
            }
            VoteError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            VoteError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", msg),
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

//! pairvote-api library - survey HTTP service
//!
//! Gates survey entry by access code, issues signed session tokens, and
//! records pairwise preference votes. Two POST endpoints carry the whole
//! protocol; everything else is health/build plumbing.

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::Router;
use pairvote_common::pairing::Component;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

pub mod admin;
pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// HMAC key for session tokens
    pub secret: Arc<Vec<u8>>,
    /// Method catalog per survey component, loaded once at startup
    pub catalog: Arc<HashMap<Component, Vec<String>>>,
    /// Token lifetime in seconds
    pub session_ttl: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        secret: Vec<u8>,
        catalog: HashMap<Component, Vec<String>>,
        session_ttl: i64,
    ) -> Self {
        Self {
            db,
            secret: Arc::new(secret),
            catalog: Arc::new(catalog),
            session_ttl,
        }
    }
}

/// Build application router
///
/// `/api/start` and `/api/vote` accept POST only; axum's method router
/// answers 405 for anything else on those paths. Health and build info stay
/// open for monitoring.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/start", post(api::start::start_session))
        .route("/api/vote", post(api::vote::submit_vote))
        .route("/build_info", get(api::buildinfo::get_build_info))
        .merge(api::health::health_routes())
        .with_state(state)
        .layer(cors_layer(allowed_origins))
}

/// CORS allow-list layer
///
/// Origins come from the `cors_allowed_origins` setting; entries that fail to
/// parse are skipped with a warning rather than taking the service down.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Skipping unparseable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

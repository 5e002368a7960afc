//! Integration tests for database initialization and queries
//!
//! Covers automatic schema creation, default settings, atomic access-code
//! consumption, and vote upsert idempotence.

use pairvote_common::db::access_codes::{self, ConsumeOutcome};
use pairvote_common::db::init::init_database;
use pairvote_common::db::{participants, settings, votes};
use pairvote_common::pairing::Component;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// Test helper: fresh database in a throwaway directory
async fn setup_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = init_database(&dir.path().join("pairvote.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

// =============================================================================
// Schema and defaults
// =============================================================================

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pairvote.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pairvote.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Open database second time (should succeed)
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let (_dir, pool) = setup_db().await;

    let ttl = settings::session_ttl_seconds(&pool).await.unwrap();
    assert_eq!(ttl, 86_400);

    let port = settings::http_port(&pool).await.unwrap();
    assert_eq!(port, 5730);

    let origins = settings::cors_allowed_origins(&pool).await.unwrap();
    assert!(!origins.is_empty(), "cors_allowed_origins not initialized");

    // Every component has a method catalog with at least two entries
    let catalog = settings::method_catalog(&pool).await.unwrap();
    for component in Component::ALL {
        let methods = catalog.get(&component).expect("catalog entry missing");
        assert!(methods.len() >= 2, "{} catalog too small", component);
    }
}

#[tokio::test]
async fn test_signing_secret_is_stable() {
    let (_dir, pool) = setup_db().await;

    let first = settings::load_or_init_signing_secret(&pool).await.unwrap();
    assert_eq!(first.len(), 32);

    // Second load returns the stored secret, not a fresh one
    let second = settings::load_or_init_signing_secret(&pool).await.unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Access codes
// =============================================================================

#[tokio::test]
async fn test_code_consumption_decrements_budget() {
    let (_dir, pool) = setup_db().await;

    let code = access_codes::mint_code(&pool, 2, Some("cardiology panel"))
        .await
        .unwrap();

    assert_eq!(
        access_codes::consume_code(&pool, &code).await.unwrap(),
        ConsumeOutcome::Admitted
    );
    assert_eq!(
        access_codes::consume_code(&pool, &code).await.unwrap(),
        ConsumeOutcome::Admitted
    );

    // Third use exceeds the budget
    assert_eq!(
        access_codes::consume_code(&pool, &code).await.unwrap(),
        ConsumeOutcome::Exhausted
    );

    let row = access_codes::get_code(&pool, &code).await.unwrap().unwrap();
    assert_eq!(row.uses, 2);
    assert_eq!(row.max_uses, 2);
}

#[tokio::test]
async fn test_unknown_code_not_found() {
    let (_dir, pool) = setup_db().await;

    assert_eq!(
        access_codes::consume_code(&pool, "ZZZZ-ZZZZ").await.unwrap(),
        ConsumeOutcome::NotFound
    );
}

#[tokio::test]
async fn test_disabled_code_refused() {
    let (_dir, pool) = setup_db().await;

    let code = access_codes::mint_code(&pool, 5, None).await.unwrap();
    sqlx::query("UPDATE access_codes SET disabled = 1 WHERE code = ?")
        .bind(&code)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(
        access_codes::consume_code(&pool, &code).await.unwrap(),
        ConsumeOutcome::Exhausted
    );
}

// =============================================================================
// Votes
// =============================================================================

#[tokio::test]
async fn test_vote_upsert_is_idempotent() {
    let (_dir, pool) = setup_db().await;

    let code = access_codes::mint_code(&pool, 1, None).await.unwrap();
    let participant = Uuid::new_v4();
    participants::create_participant(&pool, participant, &code)
        .await
        .unwrap();

    let round = votes::record_vote(
        &pool,
        participant,
        Component::MacroActions,
        "baseline",
        "guided",
        "guided",
    )
    .await
    .unwrap();
    assert_eq!(round, 0);

    // Retry with a different winner: same row, same round, winner refreshed
    let retry_round = votes::record_vote(
        &pool,
        participant,
        Component::MacroActions,
        "baseline",
        "guided",
        "baseline",
    )
    .await
    .unwrap();
    assert_eq!(retry_round, 0);

    let history = votes::votes_for(&pool, participant, Component::MacroActions)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].winner, "baseline");
}

#[tokio::test]
async fn test_vote_history_ordered_by_round() {
    let (_dir, pool) = setup_db().await;

    let code = access_codes::mint_code(&pool, 1, None).await.unwrap();
    let participant = Uuid::new_v4();
    participants::create_participant(&pool, participant, &code)
        .await
        .unwrap();

    votes::record_vote(&pool, participant, Component::KnowledgeGraph, "a", "b", "b")
        .await
        .unwrap();
    votes::record_vote(&pool, participant, Component::KnowledgeGraph, "b", "c", "b")
        .await
        .unwrap();

    // A second component does not interleave
    votes::record_vote(&pool, participant, Component::MacroActions, "a", "b", "a")
        .await
        .unwrap();

    let history = votes::votes_for(&pool, participant, Component::KnowledgeGraph)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].challenger, "b");
    assert_eq!(history[1].challenger, "c");
}

#[tokio::test]
async fn test_tally_counts_wins_per_component() {
    let (_dir, pool) = setup_db().await;

    let code = access_codes::mint_code(&pool, 3, None).await.unwrap();
    for _ in 0..2 {
        let participant = Uuid::new_v4();
        participants::create_participant(&pool, participant, &code)
            .await
            .unwrap();
        votes::record_vote(&pool, participant, Component::MacroActions, "a", "b", "b")
            .await
            .unwrap();
    }

    let tally = votes::tally(&pool).await.unwrap();
    assert_eq!(
        tally,
        vec![("macro_actions".to_string(), "b".to_string(), 2)]
    );
}

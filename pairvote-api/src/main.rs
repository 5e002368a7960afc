//! pairvote-api - Expert survey backend
//!
//! Gates survey entry by access code, issues signed session tokens, and
//! records pairwise preference votes over AI-generated clinical artifacts.
//! Two POST endpoints (`/api/start`, `/api/vote`) carry the protocol.

use anyhow::Result;
use clap::Parser;
use pairvote_api::{admin, build_router, AppState};
use pairvote_common::{config, db};
use std::net::SocketAddr;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pairvote-api", version, about = "Pairwise expert-survey backend")]
struct Args {
    /// Root folder holding the database (overrides PAIRVOTE_ROOT and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// Override the HTTP listen port from settings
    #[arg(long)]
    port: Option<u16>,

    /// Mint N access codes, print them, and exit
    #[arg(long, value_name = "N")]
    mint_codes: Option<u32>,

    /// Use budget for minted codes (defaults to the access_code_default_uses setting)
    #[arg(long)]
    code_uses: Option<i64>,

    /// Label recorded on minted codes
    #[arg(long)]
    code_label: Option<String>,

    /// Print participation figures and per-component win counts, then exit
    #[arg(long)]
    tally: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification IMMEDIATELY after tracing init
    info!(
        "Starting pairvote-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    // Resolve root folder: CLI > env > TOML config > OS default
    let root_folder = config::resolve_root_folder(args.root_folder.as_deref());
    config::ensure_root_folder(&root_folder)?;

    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = db::init::init_database(&db_path).await?;

    // Administrative modes run against the database and exit
    if let Some(count) = args.mint_codes {
        let max_uses = match args.code_uses {
            Some(uses) => uses,
            None => db::settings::access_code_default_uses(&pool).await?,
        };
        admin::mint_codes(&pool, count, max_uses, args.code_label.as_deref()).await?;
        return Ok(());
    }
    if args.tally {
        admin::print_tally(&pool).await?;
        return Ok(());
    }

    // Load runtime parameters from settings
    let secret = db::settings::load_or_init_signing_secret(&pool).await?;
    let session_ttl = db::settings::session_ttl_seconds(&pool).await?;
    let catalog = db::settings::method_catalog(&pool).await?;
    let origins = db::settings::cors_allowed_origins(&pool).await?;
    let port = match args.port {
        Some(port) => port,
        None => db::settings::http_port(&pool).await?,
    };

    info!("CORS allow-list: {:?}", origins);

    // Create application state and router
    let state = AppState::new(pool, secret, catalog, session_ttl);
    let app = build_router(state, &origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("pairvote-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

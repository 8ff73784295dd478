//! Document numbering server.
//!
//! Serves collision-free document numbers to back-office document-creation
//! workflows over HTTP, backed by Postgres row-locked counters (or the
//! in-memory store in dev mode).

use std::sync::Arc;

use anyhow::Result;
use backoffice_numbering::{Allocator, MemoryStore};
use backoffice_numbering_server::{api, config, db::Database, state::AppState};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to DOCNUM_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting numbering server");
    info!(listen_addr = %config.listen_addr, "Configuration loaded");

    let period_offset = config.period_offset()?;

    // Dev mode keeps counters in process memory; otherwise they live in
    // Postgres behind row locks.
    let (allocator, db) = if config.dev_mode {
        info!("Using in-memory counter store (dev mode)");
        let allocator = Allocator::with_utc_offset(Arc::new(MemoryStore::new()), period_offset);
        (allocator, None)
    } else {
        let db = match Database::connect(&config.database).await {
            Ok(db) => {
                info!("Database connection established");
                db
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to database");
                return Err(e.into());
            }
        };

        if let Err(e) = db.run_migrations().await {
            error!(error = %e, "Failed to run migrations");
            return Err(e.into());
        }

        let store = Arc::new(db.sequence_store());
        let allocator = Allocator::with_utc_offset(store, period_offset);
        (allocator, Some(db))
    };

    // Create application state
    let state = AppState::new(allocator, db);

    // Build and run the server
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}

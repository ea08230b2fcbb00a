//! PR Reviewer - reviewer assignment service for pull requests.
//!
//! This is the main library for the service: the assignment engine and its
//! storage, exposed over an HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use api::AppState;
use config::Config;
use db::{DirectoryStore, InMemoryStore, SqliteStore};
use error::AppError;
use services::{OsRandom, Services};

/// Open the store selected by `config`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn DirectoryStore>, AppError> {
    if config.in_memory {
        log::warn!("[app] Using in-memory store; state is lost on exit");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let pool = db::initialize(&config.database).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

/// Build the HTTP application over a store, drawing randomness from the OS.
pub fn app(store: Arc<dyn DirectoryStore>) -> axum::Router {
    let services = Services::new(store, Arc::new(OsRandom));
    api::router(AppState::new(services))
}

/// Run the service until Ctrl-C or SIGTERM.
pub async fn run(config: Config) -> Result<(), AppError> {
    let store = open_store(&config).await?;
    let router = app(store);

    let listener = server::bind(config.listen_addr())
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", config.listen_addr(), e)))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(server::watch_signals(shutdown.clone()));

    server::serve(listener, router, shutdown)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}

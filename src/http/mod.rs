//! HTTP server and client for Sterne.
//!
//! The server is the stateless facade between rating clients and Airtable;
//! the client lets CLI commands proxy through a remote facade instead of
//! talking to Airtable directly.

pub mod client;
mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::airtable::Airtable;
use crate::config::Config;

/// Shared application state for HTTP handlers
pub struct AppState {
    pub store: Airtable,
    pub config: Config,
}

/// Run the HTTP facade on the given port
pub async fn run_server(root: PathBuf, port: u16) -> Result<()> {
    let config_path = Config::config_path(&root);
    if !config_path.exists() {
        anyhow::bail!(
            "Sterne not initialized in {}. Run `sterne init` first.",
            root.display()
        );
    }

    let config = Config::load(&config_path).context("Failed to load config")?;
    let store = Airtable::new(&config).context("Failed to build Airtable client")?;

    let state = Arc::new(AppState { store, config });
    let app = handlers::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Sterne HTTP facade listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}

//! HTTP server for refdocs.
//!
//! Serves versioned documentation over axum:
//! - `/docs/{lang}/{ref}/{*rest}`: a page with its navigation menu, after
//!   redirecting non-canonical paths to their canonical form
//! - `/api/menu/{lang}/{ref}`: the navigation menu alone
//! - `/api/versions`: known release tags and branches
//! - `POST /api/refresh`: drop cached versions (bearer token required)
//!
//! # Quick Start
//!
//! ```ignore
//! use refdocs_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 7979,
//!         refresh_token: None,
//!     };
//!
//!     run_server(config, docs).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (refdocs-server)
//!                        │
//!                        └─► Docs (refdocs-docs)
//!                               │
//!                               ├─► VersionRegistry ──► GitHub API (cached)
//!                               │
//!                               └─► DocStore ──► source directory
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use refdocs_docs::Docs;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Bearer token accepted by the refresh endpoint (`None` disables it).
    pub refresh_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            refresh_token: None,
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
/// * `docs` - Documentation lookups to serve
///
/// # Errors
///
/// Returns an error if the address is invalid or the listener cannot be
/// bound.
pub async fn run_server(config: ServerConfig, docs: Docs) -> Result<(), ServerError> {
    let state = Arc::new(AppState {
        docs,
        refresh_token: config.refresh_token,
    });
    let app = app::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", config.host, config.port)))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from refdocs config.
#[must_use]
pub fn server_config_from_config(config: &refdocs_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        refresh_token: config.refresh.token.clone(),
    }
}

//! Tempo Server — HTTP API for the time tracker.
//!
//! Wires the session authority, the settings store and the mail
//! dispatch queue into an axum router, then serves until Ctrl+C or
//! SIGTERM. Queued mail is drained before the process exits.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tempo_db::{DbError, DbManager};
use tempo_mail::{DispatchError, DispatchQueue, LogTransport};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info};

use crate::config::{Config, ConfigError};
use crate::state::AppState;

/// Failures that stop the server from starting or shutting down cleanly.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration, connect, serve, and drain mail on shutdown.
pub async fn run() -> Result<(), ServerError> {
    let config = Config::load()?;

    info!("Connecting to database...");
    let db = DbManager::connect(&config.db).await?;

    let dispatch = DispatchQueue::start(config.mail.clone(), LogTransport)?;
    let state = AppState::new(db.client(), config.auth.clone(), dispatch.handle());
    let app = routes::router(state);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    info!(%address, "Server running");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Drain mail even when serving failed.
    info!("Draining mail queue...");
    let stats = dispatch.shutdown().await?;
    info!(
        delivered = stats.delivered,
        dropped = stats.dropped,
        "Server shut down"
    );

    served.map_err(ServerError::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!(error = %err, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

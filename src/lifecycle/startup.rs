//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics once the configuration is known
//! - Build the server and bind the listener
//! - Install signal handling and run until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use tokio::net::TcpListener;

use super::shutdown::Shutdown;
use super::signals::spawn_signal_listener;
use crate::config::ApiConfig;
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::routing::RouteTableError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("route table is invalid: {0}")]
    Routes(#[from] RouteTableError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the API until SIGINT/SIGTERM.
pub async fn run(config: ApiConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        access_ttl_secs = config.auth.access_ttl_secs,
        refresh_ttl_secs = config.auth.refresh_ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    server.run(listener, &shutdown).await.map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}

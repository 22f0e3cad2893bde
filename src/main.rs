//! LiftLog API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server (request ID, trace, timeout, limits)
//!                        │
//!                        ▼
//!                    routing::Dispatcher ──▶ routing::Router (route table)
//!                        │
//!            ┌───────────┼─────────────────┐
//!            ▼           ▼                 ▼
//!        NotFound     Public           Private
//!         (404)          │          auth::AuthGate ──▶ auth::TokenService
//!                        │                 │
//!                        ▼                 ▼
//!                    api::Endpoints (session, health, resources)
//! ```

use std::path::PathBuf;

use clap::Parser;

use liftlog_api::config::{load_config, load_default_config, ApiConfig, ConfigError};
use liftlog_api::lifecycle::startup;
use liftlog_api::observability::logging;

#[derive(Parser)]
#[command(name = "liftlog-api")]
#[command(about = "LiftLog API server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load(args: &Args) -> Result<ApiConfig, ConfigError> {
    match &args.config {
        Some(path) => load_config(path),
        None => load_default_config(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("liftlog-api: refusing to start: {e}");
            return Err(e.into());
        }
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "liftlog-api starting");

    startup::run(config).await?;
    Ok(())
}

//! ursa platform user-role service.
//!
//! Serves the profile read surface and the bulk role reconciliation uploads.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use config::Config;
use tracing::info;

use ursa_api_roles::services::identity_resolver::HttpIdentityDirectory;
use ursa_api_roles::{user_roles_router, ReconcilerConfig, RolesState};
use ursa_db::DbPool;

/// Identity directory request timeout.
const IDENTITY_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.rust_log)),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting ursa user-role service"
    );

    let pool = match DbPool::connect(&config.database_url).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = ursa_db::run_migrations(&pool).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let identity_directory = match HttpIdentityDirectory::new(
        config.identity_directory_url.clone(),
        IDENTITY_DIRECTORY_TIMEOUT,
    ) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build identity directory client");
            std::process::exit(1);
        }
    };

    let state = RolesState::new(
        pool.inner().clone(),
        identity_directory,
        ReconcilerConfig {
            require_inline_user_id: config.require_inline_user_id,
        },
    );

    let app = Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(user_roles_router(state));

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "Invalid bind address");
            std::process::exit(1);
        }
    };

    info!(%addr, "Listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

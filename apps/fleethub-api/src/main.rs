//! fleethub API
//!
//! User management service for the machine fleet platform, built with Axum.
//! Wires the identity provider client, the relational store and the blob
//! store into the user management routes.

mod config;
mod logging;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::Config;
use fleethub_api_users::{users_router, UsersState};
use fleethub_blob::{BlobStore, FsBlobStore};
use fleethub_db::{FleetStore, PgFleetStore};
use fleethub_keycloak::{IdentityProvider, KeycloakAdminClient, KeycloakConfig};

#[tokio::main]
async fn main() {
    // Fail fast on missing required values.
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting fleethub API"
    );

    let pool = match PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    let keycloak = match KeycloakAdminClient::new(KeycloakConfig::new(
        &config.keycloak_base_url,
        &config.keycloak_realm,
        &config.keycloak_client_id,
        &config.keycloak_client_secret,
    )) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Failed to build identity provider client: {e}");
            std::process::exit(1);
        }
    };

    let provider: Arc<dyn IdentityProvider> = Arc::new(keycloak);
    let store: Arc<dyn FleetStore> = Arc::new(PgFleetStore::new(pool));
    let blob: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
        &config.blob_root,
        &config.blob_public_base_url,
    ));

    let state = UsersState::new(provider, store, blob);

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(users_router(state))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error: Invalid bind address: {e}");
            std::process::exit(1);
        }
    };

    info!(%addr, "Listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Error: Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Liveness probe.
async fn health_handler() -> &'static str {
    "ok"
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

//! Gate API
//!
//! Reference service that serves a router behind the peer gate.

mod config;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use peergate_axum::PeerGateLayer;
use peergate_core::{SecretBackend, SecretsManagerBackend};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Gate API");

    let config = Config::from_env()?;

    // Only talk to Secrets Manager when a coordinate needs it
    let backend: Option<Arc<dyn SecretBackend>> = if config.gate.needs_backend() {
        Some(Arc::new(SecretsManagerBackend::from_env().await))
    } else {
        None
    };

    let gate = PeerGateLayer::from_config(&config.gate, backend).await?;
    tracing::info!(
        realm = gate.realm(),
        cached = config.gate.cache_policy.is_some(),
        "Peer gate ready"
    );

    // Build router
    let app = Router::new()
        .route("/whoami", get(handlers::whoami))
        .layer(gate)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! MindOps control-plane HTTP server.

use mindops_api::config::ApiConfig;
use mindops_api::{build_router, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    let port = config.port;
    let state = Arc::new(AppState::from_config(config));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, "mindops control plane listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

mod config;
mod critique;
mod diagnostics;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::critique::credentials::validate_credentials;
use crate::llm_client::OpenRouterClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a bad PORT or timeout stops startup here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.log_directive())
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AI Resume Critiquer v{}", env!("CARGO_PKG_VERSION"));

    // The service still starts without a usable key so diagnostics stay reachable
    if let Err(e) = validate_credentials(&config.openrouter) {
        warn!("{e}");
    }

    let llm = OpenRouterClient::new(
        config.openrouter_base_url.clone(),
        config.openrouter.clone(),
        config.request_timeout,
    )?;
    info!(
        "OpenRouter client initialized (model: {}, site: {})",
        config.openrouter.model, config.openrouter.site_url
    );

    let state = AppState {
        config: config.clone(),
        llm: Arc::new(llm),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // local single-user tool; the UI may live on another port

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

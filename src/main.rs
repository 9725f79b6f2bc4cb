//! Switchboard - scripted call flows for a voice agent
//!
//! A webhook backend that drives multi-turn phone conversations: each call
//! runs one call-tree script, and function-call notifications from the
//! LLM service advance its state machine.

mod api;
mod call_tree;
mod dispatch;
mod language;
mod provider;
mod scripts;

use api::{create_router, AppState};
use provider::{DailyLauncher, ProviderConfig};
use scripts::ScriptLibrary;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let port: u16 = std::env::var("SWITCHBOARD_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    // Scripts are validated here; dispatch never sees a malformed one
    let scripts = ScriptLibrary::standard()?;
    tracing::info!(
        scripts = ?scripts.names(),
        default = %scripts.default_flow().script.name(),
        "Script library loaded"
    );

    let provider_config = ProviderConfig::from_env();
    if provider_config.api_key.is_none() {
        tracing::warn!("No provider API key configured. Set DAILY_API_KEY to start calls.");
    }
    let launcher = Arc::new(DailyLauncher::new(&provider_config)?);

    // Create application state
    let state = AppState::new(scripts, provider_config, launcher);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Switchboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

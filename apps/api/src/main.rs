mod agent;
mod application;
mod config;
mod documents;
mod errors;
mod llm_client;
mod routes;
mod session_store;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::claude::ClaudeAgent;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session_store::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobassist v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and the agent on top of it
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        &config.anthropic_base_url,
        config.ai_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());
    let agent = Arc::new(ClaudeAgent::new(llm, config.max_agent_steps));
    info!(
        "Agent ready: max {} steps, {}s timeout",
        config.max_agent_steps, config.agent_timeout_secs
    );

    let state = AppState {
        sessions: SessionStore::new(),
        agent,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

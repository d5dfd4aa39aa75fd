mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{ApiKey, GeminiClient, Tier, TieredGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing GOOGLE_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentFlow v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Gemini backend and the fallback tiers around it
    let api_key = ApiKey::new(config.google_api_key.clone())?;
    let gemini = GeminiClient::new(
        api_key,
        &config.gemini_api_base,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let tiers = vec![
        Tier::primary(config.primary_model.clone()),
        Tier::fallback(
            config.fallback_model.clone(),
            config.fallback_max_retries,
            Duration::from_millis(config.fallback_backoff_ms),
        ),
    ];
    for tier in &tiers {
        info!(
            tier = %tier.name,
            model = %tier.model,
            max_retries = tier.max_retries,
            "Model tier configured"
        );
    }
    let generator = TieredGenerator::new(Arc::new(gemini), tiers);

    let state = AppState {
        generator,
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

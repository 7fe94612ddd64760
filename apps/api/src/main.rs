mod batch;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod presenter;
mod routes;
mod scoring;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::{LlmMatchScorer, MatchScorer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // A missing key is not fatal: the UI stays up and batches report the problem.
    let scorer: Option<Arc<dyn MatchScorer>> = match &config.groq_api_key {
        Some(api_key) => {
            let llm = LlmClient::new(
                api_key.clone(),
                config.groq_api_url.clone(),
                config.model.clone(),
            )?;
            info!("LLM client initialized (model: {})", llm.model());
            Some(Arc::new(LlmMatchScorer(llm)))
        }
        None => {
            warn!("GROQ_API_KEY is not set; batch submissions will be rejected");
            None
        }
    };

    info!(
        "Batch settings: concurrency {}, upload limit {} bytes",
        config.scan_concurrency, config.max_upload_bytes
    );

    let state = AppState::new(config.clone(), scorer, Arc::new(PdfTextExtractor));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod config;
mod errors;
mod ingest;
mod llm_client;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::DocumentIngestor;
use crate::llm_client::GeminiClient;
use crate::resume::extraction::ExtractionService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing model credential)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Résumé Parser API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = GeminiClient::new(config.google_api_key.clone(), config.gemini_api_base.clone());
    let extraction = ExtractionService::new(Arc::new(llm));
    info!("LLM client initialized (model: {})", extraction.model());

    // Initialize document ingestor
    std::fs::create_dir_all(&config.scratch_dir)?;
    let ingestor = DocumentIngestor::new(config.scratch_dir.clone());
    info!("Scratch directory: {}", ingestor.scratch_dir().display());

    // Build app state
    let state = AppState {
        ingestor: Arc::new(ingestor),
        extraction: Arc::new(extraction),
        config: config.clone(),
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

use std::sync::Arc;

use crate::config::Config;
use crate::ingest::DocumentIngestor;
use crate::resume::extraction::ExtractionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Picks a loader per upload; runs on the blocking pool.
    pub ingestor: Arc<DocumentIngestor>,
    pub extraction: Arc<ExtractionService>,
    pub config: Config,
}

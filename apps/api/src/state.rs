use std::sync::Arc;

use crate::config::Config;
use crate::extraction::{Renderer, TextExtractor};
use crate::store::SubmissionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    /// Pluggable extractor. Default: PdfTextExtractor. Swap via EXTRACTION_BACKEND.
    pub extractor: Arc<dyn TextExtractor>,
    pub renderer: Arc<dyn Renderer>,
    pub config: Config,
}

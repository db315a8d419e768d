mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod plagiarism;
mod routes;
mod state;
mod store;
mod submissions;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ExtractionBackend};
use crate::extraction::{PassthroughRenderer, PdfTextExtractor, TextExtractor, VisionTextExtractor};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting plagcheck v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(JsonFileStore::new(&config.submissions_db_path));
    info!("Submission store: {}", store.path().display());

    let extractor = build_extractor(&config)?;
    info!("Text extraction backend: {}", extractor.backend());

    info!(
        "Plagiarism defaults: threshold {}%, mode {:?}",
        config.default_threshold, config.match_mode
    );

    let state = AppState {
        store,
        extractor,
        renderer: Arc::new(PassthroughRenderer),
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

fn build_extractor(config: &Config) -> Result<Arc<dyn TextExtractor>> {
    let extractor: Arc<dyn TextExtractor> = match config.extraction_backend {
        ExtractionBackend::PdfText => Arc::new(PdfTextExtractor),
        ExtractionBackend::Vision => {
            let api_key = config
                .anthropic_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("ANTHROPIC_API_KEY is required for the vision backend"))?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(VisionTextExtractor(LlmClient::new(api_key)?))
        }
    };
    Ok(extractor)
}

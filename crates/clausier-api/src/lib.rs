//! Clausier API
//!
//! HTTP surface for the clause extraction pipeline: submit a document,
//! fetch a stored result by id, list stored extractions, health check.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use clausier_extractor::ingest::PlainTextExtractor;
use clausier_extractor::ExtractionPipeline;
use clausier_model::OpenAiClient;
use clausier_store::SqliteStore;
use config::ApiConfig;
use handlers::{create_router, AppState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// API server error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Storage error during startup
    #[error("Storage error: {0}")]
    Store(#[from] clausier_store::StoreError),

    /// Pipeline construction error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] clausier_extractor::ExtractError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the API HTTP server
///
/// Opens the database, builds the extraction pipeline over the OpenAI
/// client, and starts the axum server.
pub async fn start_server(config: ApiConfig) -> Result<(), ApiError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Clausier API");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Model: {}", config.extractor.model_name);

    let api_key = config.resolve_api_key().ok_or_else(|| {
        config::ConfigError::Invalid(
            "No OpenAI API key: set openai_api_key or the OPENAI_API_KEY environment variable"
                .to_string(),
        )
    })?;

    let model = OpenAiClient::new(api_key, config.extractor.model_name.clone())
        .with_endpoint(config.openai_endpoint.clone())
        .with_generation(
            config.extractor.max_output_tokens,
            config.extractor.temperature,
        )
        .with_timeout(Duration::from_secs(config.extractor.chunk_timeout_secs));

    let store = Arc::new(Mutex::new(SqliteStore::open(&config.database_path)?));

    let pipeline = ExtractionPipeline::new(
        model,
        Arc::clone(&store),
        PlainTextExtractor,
        config.extractor.clone(),
    )?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        store,
        max_page_size: config.max_page_size,
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Server(e.to_string()))?;

    Ok(())
}

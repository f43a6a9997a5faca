//! Clausier CLI - One-shot contract clause extraction from a local file.

use anyhow::{Context, Result};
use clap::Parser;
use clausier_extractor::ingest::PlainTextExtractor;
use clausier_extractor::{ExtractionPipeline, ExtractionRequest, ExtractorConfig};
use clausier_model::{MockClient, OpenAiClient};
use clausier_store::SqliteStore;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Extract contract clauses from a local document.
#[derive(Debug, Parser)]
#[command(name = "clausier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the document to process
    file: PathBuf,

    /// Extractor configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database to persist the result into (in-memory if omitted)
    #[arg(long)]
    db: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible API endpoint
    #[arg(long, default_value = "https://api.openai.com/v1")]
    endpoint: String,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Run against a stub model that returns no clauses (offline smoke test)
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            ExtractorConfig::from_toml(&contents).map_err(anyhow::Error::msg)?
        }
        None => ExtractorConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.model_name = model.clone();
    }

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let filename = cli
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.txt".to_string());

    let request = ExtractionRequest {
        mime_type: mime_for(&cli.file).to_string(),
        filename,
        bytes,
    };

    let store = match &cli.db {
        Some(path) => SqliteStore::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?,
        None => SqliteStore::open_in_memory().context("Failed to open in-memory database")?,
    };
    let store = Arc::new(Mutex::new(store));

    let extraction = if cli.mock {
        let pipeline =
            ExtractionPipeline::new(MockClient::new("[]"), store, PlainTextExtractor, config)?;
        pipeline.extract(request).await?
    } else {
        let api_key = cli.api_key.clone().context(
            "No OpenAI API key: pass --api-key or set the OPENAI_API_KEY environment variable",
        )?;
        let model = OpenAiClient::new(api_key, config.model_name.clone())
            .with_endpoint(cli.endpoint.clone())
            .with_generation(config.max_output_tokens, config.temperature)
            .with_timeout(Duration::from_secs(config.chunk_timeout_secs));
        let pipeline = ExtractionPipeline::new(model, store, PlainTextExtractor, config)?;
        pipeline.extract(request).await?
    };

    let output = json!({
        "document_id": extraction.result.document_id,
        "filename": extraction.document.filename,
        "metadata": extraction.result.metadata,
        "clauses": extraction.result.clauses,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Map a file extension to the MIME type the ingest boundary understands.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("md") | Some("markdown") => "text/markdown",
        _ => "text/plain",
    }
}

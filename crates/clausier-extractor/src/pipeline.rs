//! The extraction orchestrator
//!
//! Drives one document through the pipeline state machine:
//!
//! ```text
//! EXTRACTING_TEXT → CHUNKING → EXTRACTING_CLAUSES
//!                 → ASSEMBLING → PERSISTING → COMPLETED | PARTIAL | FAILED
//! ```
//!
//! A `processing` document row is written before the chunk loop starts, so
//! a concurrent fetch or list sees the in-flight run; the terminal write
//! replaces it.
//!
//! Setup failures (format, size) abort immediately. Chunk failures are
//! isolated: the chunk contributes zero clauses and its index is recorded,
//! and processing continues with the next chunk. Nothing from the chunk
//! loop ever propagates as an `Err`.

use crate::assembler::{self, ClauseDraft};
use crate::chunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::parser;
use crate::prompt;
use crate::types::{DocumentExtraction, ExtractionRequest};
use clausier_domain::{
    Chunk, ClauseStore, Document, ExtractionMetadata, ExtractionResult, ExtractionStatus,
    ModelClient, TextExtractor,
};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Pipeline phases, logged as the orchestrator advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ExtractingText,
    Chunking,
    ExtractingClauses,
    Assembling,
    Persisting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExtractingText => "extracting_text",
            Self::Chunking => "chunking",
            Self::ExtractingClauses => "extracting_clauses",
            Self::Assembling => "assembling",
            Self::Persisting => "persisting",
        };
        write!(f, "{}", s)
    }
}

/// Why a single chunk contributed zero clauses.
#[derive(Debug, Error)]
enum ChunkError {
    /// Model invocation failed (transport, auth, rate limit, empty response)
    #[error("model error: {0}")]
    Model(String),

    /// The per-chunk or whole-document time budget ran out
    #[error("model call timed out")]
    Timeout,

    /// No recovery step produced a JSON array
    #[error("response was not parseable as a clause array")]
    Parse,
}

/// The extraction orchestrator.
///
/// One instance serves many documents; each `extract` call runs one
/// document's state machine. Chunk processing is strictly sequential with a
/// single in-flight model call, so clause order follows chunk order and the
/// orchestrator is the sole mutator of a run's in-progress state.
#[derive(Debug)]
pub struct ExtractionPipeline<M, S, T>
where
    M: ModelClient,
    S: ClauseStore,
    T: TextExtractor,
{
    model: M,
    store: Arc<Mutex<S>>,
    text_extractor: T,
    config: ExtractorConfig,
}

impl<M, S, T> ExtractionPipeline<M, S, T>
where
    M: ModelClient,
    M::Error: fmt::Display,
    S: ClauseStore,
    S::Error: fmt::Display,
    T: TextExtractor,
{
    /// Create a new pipeline over the given collaborators.
    ///
    /// The store is shared (the HTTP layer reads from it directly), so it
    /// arrives pre-wrapped. Fails when the configuration is invalid.
    pub fn new(
        model: M,
        store: Arc<Mutex<S>>,
        text_extractor: T,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractError> {
        config.validate().map_err(ExtractError::Config)?;
        Ok(Self {
            model,
            store,
            text_extractor,
            config,
        })
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the full extraction state machine for one document.
    pub async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<DocumentExtraction, ExtractError> {
        let started = Instant::now();

        // EXTRACTING_TEXT: fatal failures only, no partial output
        debug!(phase = %Phase::ExtractingText, filename = %request.filename, "Phase entered");
        if request.bytes.len() > self.config.max_file_size_bytes {
            return Err(ExtractError::DocumentTooLarge {
                size: request.bytes.len(),
                max: self.config.max_file_size_bytes,
            });
        }
        let raw_text = self
            .text_extractor
            .extract(&request.bytes, &request.mime_type)?;

        let byte_size = request.bytes.len();
        let document = Document::new(request.filename, raw_text, byte_size, unix_now());
        info!(
            document_id = %document.id,
            filename = %document.filename,
            text_chars = document.text_len(),
            "Starting extraction"
        );

        // CHUNKING
        debug!(phase = %Phase::Chunking, "Phase entered");
        let chunks = chunker::split(&document.raw_text, self.config.max_chunk_chars);
        info!(document_id = %document.id, chunks = chunks.len(), "Split document into chunks");

        // Record the in-flight run before any model call
        let in_flight = ExtractionResult {
            document_id: document.id,
            clauses: Vec::new(),
            metadata: ExtractionMetadata {
                total_clauses: 0,
                processing_time_seconds: 0.0,
                status: ExtractionStatus::Processing,
                failed_chunk_indices: BTreeSet::new(),
                repaired_chunk_indices: BTreeSet::new(),
                chunks_processed: chunks.len(),
                text_length: document.text_len(),
            },
        };
        {
            let mut store = self
                .store
                .lock()
                .map_err(|e| ExtractError::Persistence(format!("store lock poisoned: {}", e)))?;
            store
                .save(&document, &in_flight)
                .map_err(|e| ExtractError::Persistence(e.to_string()))?;
        }

        // EXTRACTING_CLAUSES: sequential chunk loop, failures isolated
        debug!(phase = %Phase::ExtractingClauses, "Phase entered");
        let mut drafts: Vec<ClauseDraft> = Vec::new();
        let mut failed_chunk_indices = BTreeSet::new();
        let mut repaired_chunk_indices = BTreeSet::new();

        for chunk in &chunks {
            if started.elapsed() >= self.config.document_timeout() {
                warn!(
                    document_id = %document.id,
                    chunk = chunk.index,
                    "Document time budget exhausted, remaining chunks recorded as failed"
                );
                failed_chunk_indices.insert(chunk.index);
                continue;
            }

            match self.process_chunk(chunk).await {
                Ok((chunk_drafts, repaired)) => {
                    debug!(
                        document_id = %document.id,
                        chunk = chunk.index,
                        clauses = chunk_drafts.len(),
                        repaired,
                        "Chunk processed"
                    );
                    if repaired {
                        repaired_chunk_indices.insert(chunk.index);
                    }
                    drafts.extend(chunk_drafts);
                }
                Err(e) => {
                    warn!(
                        document_id = %document.id,
                        chunk = chunk.index,
                        error = %e,
                        "Chunk failed, continuing with next chunk"
                    );
                    failed_chunk_indices.insert(chunk.index);
                }
            }
        }

        // ASSEMBLING: concatenation order is chunk order; ids assigned here
        debug!(phase = %Phase::Assembling, "Phase entered");
        let clauses = assembler::number_clauses(drafts);

        let status = if failed_chunk_indices.len() == chunks.len() {
            ExtractionStatus::Failed
        } else if !failed_chunk_indices.is_empty() {
            ExtractionStatus::Partial
        } else {
            ExtractionStatus::Completed
        };

        let metadata = ExtractionMetadata {
            total_clauses: clauses.len(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
            status,
            failed_chunk_indices,
            repaired_chunk_indices,
            chunks_processed: chunks.len(),
            text_length: document.text_len(),
        };
        let result = ExtractionResult {
            document_id: document.id,
            clauses,
            metadata,
        };

        // PERSISTING: failed runs are stored too, so fetch-by-id reflects them
        debug!(phase = %Phase::Persisting, "Phase entered");
        {
            let mut store = self
                .store
                .lock()
                .map_err(|e| ExtractError::Persistence(format!("store lock poisoned: {}", e)))?;
            store.save(&document, &result).map_err(|e| {
                error!(
                    document_id = %document.id,
                    clauses = result.clauses.len(),
                    error = %e,
                    "Persistence failed, extraction result lost"
                );
                ExtractError::Persistence(e.to_string())
            })?;
        }

        info!(
            document_id = %document.id,
            status = %result.metadata.status,
            clauses = result.metadata.total_clauses,
            failed_chunks = result.metadata.failed_chunk_indices.len(),
            seconds = result.metadata.processing_time_seconds,
            "Extraction finished"
        );

        Ok(DocumentExtraction {
            document,
            result,
            processed_at: unix_now(),
        })
    }

    /// Process one chunk: prompt, model call with timeout, repair/parse,
    /// anchor. Returns the anchored drafts and whether repair was needed.
    async fn process_chunk(&self, chunk: &Chunk) -> Result<(Vec<ClauseDraft>, bool), ChunkError> {
        let prompt = prompt::build_extraction_prompt(&chunk.text, &self.config.clause_types);
        debug!(chunk = chunk.index, prompt_chars = prompt.len(), "Invoking model");

        let raw = match timeout(self.config.chunk_timeout(), self.model.complete(&prompt)).await {
            Err(_) => return Err(ChunkError::Timeout),
            Ok(Err(e)) => return Err(ChunkError::Model(e.to_string())),
            Ok(Ok(raw)) => raw,
        };

        let outcome = parser::parse(&raw);
        if outcome.failed {
            return Err(ChunkError::Parse);
        }
        if outcome.dropped > 0 {
            warn!(
                chunk = chunk.index,
                dropped = outcome.dropped,
                "Dropped invalid clause records from model output"
            );
        }

        Ok((assembler::assemble_chunk(chunk, &outcome.records), outcome.repaired))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

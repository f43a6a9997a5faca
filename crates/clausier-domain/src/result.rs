//! Extraction results and run metadata

use crate::clause::Clause;
use crate::document::DocumentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a document's extraction.
///
/// `Processing` only appears on the persisted document row while a run is in
/// flight; every finished run ends in one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Extraction in progress
    Processing,
    /// Every chunk yielded usable clauses (or there were none to fail)
    Completed,
    /// At least one, but not all, chunks failed
    Partial,
    /// Fatal setup failure, or every chunk failed
    Failed,
}

impl ExtractionStatus {
    /// Whether this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Partial | Self::Failed)
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Metadata aggregated over one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Number of clauses in the final result
    pub total_clauses: usize,

    /// Wall-clock time from entry into text extraction to the terminal state
    pub processing_time_seconds: f64,

    /// Terminal status of the run
    pub status: ExtractionStatus,

    /// Indices of chunks that contributed zero clauses due to a model or
    /// parse failure
    pub failed_chunk_indices: BTreeSet<usize>,

    /// Indices of chunks whose model output needed the repair pipeline.
    /// Observability only; repaired chunks still count as successes.
    pub repaired_chunk_indices: BTreeSet<usize>,

    /// Total number of chunks the document was split into
    pub chunks_processed: usize,

    /// Length of the document text in characters
    pub text_length: usize,
}

/// The finished output of one extraction run.
///
/// Created once per run and immutable after the orchestrator finalizes it;
/// owned thereafter by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The document this result belongs to
    pub document_id: DocumentId,

    /// Clauses ordered by (chunk index, discovery order within chunk)
    pub clauses: Vec<Clause>,

    /// Run metadata
    pub metadata: ExtractionMetadata,
}

/// List-endpoint projection of a stored extraction, omitting clause bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// The document identifier
    pub document_id: DocumentId,

    /// Original filename
    pub filename: String,

    /// Size of the uploaded bytes
    pub byte_size: usize,

    /// Upload time (unix seconds)
    pub uploaded_at: u64,

    /// When the run reached a terminal state (unix seconds)
    pub processed_at: Option<u64>,

    /// Number of clauses extracted
    pub total_clauses: usize,

    /// Terminal status of the run
    pub status: ExtractionStatus,
}

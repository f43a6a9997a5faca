//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the extraction pipeline and
//! infrastructure. Implementations live in other crates and are passed
//! explicitly into the orchestrator constructor.

use crate::document::{Document, DocumentId};
use crate::result::{ExtractionResult, ExtractionSummary};
use async_trait::async_trait;
use thiserror::Error;

/// Trait for invoking the external language model.
///
/// Implemented by the infrastructure layer (`clausier-model`). Callers hold
/// exactly one in-flight request per document: the next chunk's prompt is
/// only sent after the previous chunk's response is resolved. Implementations
/// must not retry on their own; failure policy belongs to the orchestrator.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Error type for model operations
    type Error: Send;

    /// Send a prompt and return the model's raw text response.
    async fn complete(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Failure categories for raw text extraction from uploaded bytes.
#[derive(Debug, Clone, Error)]
pub enum TextExtractError {
    /// The declared format is not handled by this extractor
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The bytes do not decode as the declared format
    #[error("Corrupt file: {0}")]
    CorruptFile(String),
}

/// Trait for turning uploaded bytes into normalized document text.
///
/// Binary formats (PDF, DOCX) are handled by an external collaborator; this
/// seam only fixes the contract at the boundary.
pub trait TextExtractor: Send + Sync {
    /// Extract normalized Unicode text from `bytes`.
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, TextExtractError>;
}

/// A persisted extraction: the finished result plus its list-level summary.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredExtraction {
    /// List-level projection (filename, timestamps, status)
    pub summary: ExtractionSummary,

    /// The full result, clauses included
    pub result: ExtractionResult,
}

/// Trait for persisting and retrieving extraction results.
///
/// Implemented by the infrastructure layer (`clausier-store`).
pub trait ClauseStore: Send {
    /// Error type for store operations
    type Error;

    /// Persist a finished extraction run. Replaces any prior result for the
    /// same document id.
    fn save(&mut self, document: &Document, result: &ExtractionResult)
        -> Result<(), Self::Error>;

    /// Fetch a stored extraction by document id.
    fn get(&self, id: &DocumentId) -> Result<Option<StoredExtraction>, Self::Error>;

    /// List stored extractions, newest first. `page` is 1-based. Returns the
    /// page of summaries and the total number of stored documents.
    fn list(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<ExtractionSummary>, usize), Self::Error>;
}

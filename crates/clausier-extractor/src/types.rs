//! Request and result types for the extraction pipeline

use clausier_domain::{Document, ExtractionResult};
use serde::{Deserialize, Serialize};

/// Request to extract clauses from an uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Original filename as supplied by the caller
    pub filename: String,

    /// Raw uploaded bytes
    pub bytes: Vec<u8>,

    /// Declared MIME type of the upload
    pub mime_type: String,
}

/// A clause record as the model supplied it, before anchoring.
///
/// Transient and chunk-scoped: records are discarded once the assembler has
/// anchored them. No field is trusted; `content` is whatever substring the
/// model claims it extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClauseRecord {
    /// Clause category claimed by the model
    pub clause_type: String,

    /// Clause heading, empty when the model supplied none
    pub title: String,

    /// Verbatim substring the model claims it extracted
    pub content: String,

    /// Page number, when one was reported
    pub page_number: Option<u32>,
}

/// A finished extraction run: the document plus its finalized result.
#[derive(Debug, Clone)]
pub struct DocumentExtraction {
    /// The processed document (text included)
    pub document: Document,

    /// The finalized, persisted result
    pub result: ExtractionResult,

    /// When the run reached its terminal state (unix seconds)
    pub processed_at: u64,
}

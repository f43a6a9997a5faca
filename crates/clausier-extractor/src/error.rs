//! Error types for the extraction pipeline

use clausier_domain::TextExtractError;
use thiserror::Error;

/// Fatal, document-level extraction errors.
///
/// Chunk-level failures never appear here: they are isolated inside the
/// orchestrator's chunk loop and aggregated into the result metadata.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Unsupported or corrupt input; surfaced to the caller as a client error
    #[error("Document format error: {0}")]
    DocumentFormat(#[from] TextExtractError),

    /// Upload exceeds the configured size limit
    #[error("Document too large: {size} bytes (max: {max})")]
    DocumentTooLarge {
        /// Size of the rejected upload
        size: usize,
        /// Configured limit
        max: usize,
    },

    /// The finished result could not be persisted. The computed result is
    /// lost on this path; the orchestrator logs it before reporting.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

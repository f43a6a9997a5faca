//! Clausier Domain Layer
//!
//! This crate contains the core data model for Clausier and defines the
//! fundamental concepts, value objects, and trait interfaces that all other
//! layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Document**: an uploaded contract, normalized to Unicode text
//! - **Chunk**: a contiguous, offset-tracked slice of document text sized to
//!   fit within the model's input limit
//! - **Clause**: one identified contractual provision, anchored to absolute
//!   character offsets in the source document
//! - **ExtractionResult**: the ordered clause list plus run metadata,
//!   immutable once the orchestrator finalizes it
//!
//! ## Architecture
//!
//! This crate holds pure data types and trait seams only. Infrastructure
//! implementations (LLM clients, SQLite storage, HTTP) live in other crates
//! and are passed explicitly into the extraction pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod clause;
pub mod document;
pub mod result;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use clause::{Clause, ClauseId};
pub use document::{Document, DocumentId};
pub use result::{ExtractionMetadata, ExtractionResult, ExtractionStatus, ExtractionSummary};
pub use traits::{ClauseStore, ModelClient, StoredExtraction, TextExtractError, TextExtractor};

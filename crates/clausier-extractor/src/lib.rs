//! Clausier Extractor
//!
//! The extraction orchestration pipeline: splits contract text into
//! size-bounded chunks, invokes the model sequentially per chunk, repairs
//! and validates its JSON output, and reassembles per-chunk clause fragments
//! into one ordered, position-mapped result for the whole document.
//!
//! # Architecture
//!
//! ```text
//! Bytes → TextExtractor → Chunker → Prompt → ModelClient → Parser
//!                                                             ↓
//!                        ClauseStore ← Orchestrator ← Assembler
//! ```
//!
//! # Key Properties
//!
//! - **Lossless chunking**: chunk texts concatenate back to the input
//!   exactly, with cumulative character offsets
//! - **Sequential invocation**: one in-flight model call per document,
//!   preserving clause order and bounding outbound concurrency
//! - **Repair over rejection**: malformed model output goes through an
//!   ordered recovery pipeline instead of failing the chunk outright
//! - **Isolated chunk failure**: a failed chunk contributes zero clauses and
//!   an index in the metadata; the run continues
//!
//! # Example Usage
//!
//! ```no_run
//! use clausier_extractor::{ExtractionPipeline, ExtractionRequest, ExtractorConfig};
//! use clausier_extractor::ingest::PlainTextExtractor;
//! use clausier_model::MockClient;
//! use clausier_store::SqliteStore;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = MockClient::new("[]");
//! let store = Arc::new(Mutex::new(SqliteStore::open_in_memory()?));
//! let pipeline = ExtractionPipeline::new(
//!     model,
//!     store,
//!     PlainTextExtractor,
//!     ExtractorConfig::default(),
//! )?;
//!
//! let request = ExtractionRequest {
//!     filename: "contract.txt".to_string(),
//!     bytes: b"Either party may terminate this agreement.".to_vec(),
//!     mime_type: "text/plain".to_string(),
//! };
//!
//! let extraction = pipeline.extract(request).await?;
//! println!("{} clauses", extraction.result.metadata.total_clauses);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod assembler;
pub mod chunker;
pub mod config;
mod error;
pub mod ingest;
pub mod parser;
mod pipeline;
pub mod prompt;
mod types;


pub use config::ExtractorConfig;
pub use error::ExtractError;
pub use pipeline::ExtractionPipeline;
pub use types::{DocumentExtraction, ExtractionRequest, RawClauseRecord};

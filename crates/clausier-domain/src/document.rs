//! Document module - the unit of upload and extraction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a document, backed by a UUIDv4.
///
/// Opaque to callers; the only operations are generation, parsing, and
/// display. Extraction runs, clauses, and persisted rows are all keyed by
/// this identifier.
///
/// # Examples
///
/// ```
/// use clausier_domain::DocumentId;
///
/// let id = DocumentId::new();
/// let parsed = DocumentId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(uuid::Uuid);

impl DocumentId {
    /// Generate a fresh random DocumentId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a DocumentId from its canonical string form.
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid document id: {}", e))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded contract document.
///
/// Immutable once created. `raw_text` is the normalized Unicode text
/// produced by the text-extraction collaborator; `byte_size` is the size of
/// the original upload, not of the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Original filename as supplied by the caller
    pub filename: String,

    /// Normalized document text
    pub raw_text: String,

    /// Size of the uploaded bytes
    pub byte_size: usize,

    /// Upload time (unix seconds)
    pub uploaded_at: u64,
}

impl Document {
    /// Create a new document with a fresh id.
    pub fn new(filename: String, raw_text: String, byte_size: usize, uploaded_at: u64) -> Self {
        Self {
            id: DocumentId::new(),
            filename,
            raw_text,
            byte_size,
            uploaded_at,
        }
    }

    /// Length of the document text in characters.
    ///
    /// All clause offsets are bounded by this value.
    pub fn text_len(&self) -> usize {
        self.raw_text.chars().count()
    }
}

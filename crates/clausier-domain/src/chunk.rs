//! Chunk module - offset-tracked slices of document text

/// A contiguous slice of a document's text, sized to fit within the model's
/// input limit.
///
/// Chunks are produced once per extraction run and never mutated. Their
/// union in index order reconstructs the document text exactly: no overlap,
/// no gap, no loss. `start_offset` is the absolute character offset of
/// `text` within the document, which equals the summed character length of
/// all preceding chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based, sequential position within the document
    pub index: usize,

    /// The chunk's text
    pub text: String,

    /// Absolute character offset of `text` within the document
    pub start_offset: usize,
}

impl Chunk {
    /// Length of the chunk text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Absolute character offset one past the end of this chunk.
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.char_len()
    }
}

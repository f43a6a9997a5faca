//! Clause assembly: anchoring model records to document offsets
//!
//! For each raw record the assembler searches for the claimed content as a
//! verbatim substring of its source chunk and remaps the match to absolute
//! character offsets in the document. Records whose content cannot be found
//! (the model paraphrased or truncated its quote) keep a zero-length anchor
//! at the chunk start: partial structural information is preferred over
//! silent loss.

use crate::types::RawClauseRecord;
use clausier_domain::{Chunk, Clause, ClauseId};
use tracing::debug;

/// A clause anchored to document offsets but not yet numbered.
///
/// Identifiers are assigned only after every chunk has been assembled, so
/// they follow the final document-wide ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseDraft {
    /// Clause heading (may be empty)
    pub title: String,
    /// Clause text as the model reported it
    pub content: String,
    /// Clause category
    pub clause_type: String,
    /// Page number, when reported
    pub page_number: Option<u32>,
    /// Absolute character offset of the anchor start
    pub start_position: usize,
    /// Absolute character offset of the anchor end
    pub end_position: usize,
}

/// Anchor one chunk's records, in input order.
pub fn assemble_chunk(chunk: &Chunk, records: &[RawClauseRecord]) -> Vec<ClauseDraft> {
    records
        .iter()
        .map(|record| {
            let (start_position, end_position) = match chunk.text.find(&record.content) {
                Some(byte_idx) => {
                    let local = chunk.text[..byte_idx].chars().count();
                    let start = chunk.start_offset + local;
                    (start, start + record.content.chars().count())
                }
                None => {
                    debug!(
                        chunk = chunk.index,
                        clause_type = %record.clause_type,
                        "Clause content not found verbatim in chunk, using zero-length anchor"
                    );
                    (chunk.start_offset, chunk.start_offset)
                }
            };

            ClauseDraft {
                title: record.title.clone(),
                content: record.content.clone(),
                clause_type: record.clause_type.clone(),
                page_number: record.page_number,
                start_position,
                end_position,
            }
        })
        .collect()
}

/// Assign document-scoped identifiers to the concatenated drafts.
///
/// `drafts` must already be in final order: per-chunk fragments concatenated
/// in chunk-index order, each preserving its discovery order.
pub fn number_clauses(drafts: Vec<ClauseDraft>) -> Vec<Clause> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| Clause {
            clause_id: ClauseId::from_number(i as u32 + 1),
            title: draft.title,
            content: draft.content,
            clause_type: draft.clause_type,
            page_number: draft.page_number,
            start_position: draft.start_position,
            end_position: draft.end_position,
        })
        .collect()
}

//! Offset-preserving text chunking
//!
//! Splits document text into ordered, size-bounded chunks whose
//! concatenation reproduces the input exactly. Later offset remapping
//! depends on that guarantee, so every split strategy cuts contiguously;
//! boundary preference only moves the cut point, never drops or reorders
//! text.

use clausier_domain::Chunk;

/// Share of the chunk used as the boundary lookback window (last 20%).
const LOOKBACK_DIVISOR: usize = 5;

/// Split `text` into chunks of at most `max_chunk_chars` characters.
///
/// Walks the text from offset 0, greedily extending each candidate chunk up
/// to the limit. When the limit would bisect the text, the cut prefers the
/// last paragraph break (`\n\n`) in the lookback window, then the last
/// sentence terminator, and falls back to a hard cut at the limit. Empty
/// input yields a single empty chunk at offset 0 so downstream stages
/// always have at least one unit of work.
///
/// Offsets are character offsets; cuts always land on character boundaries.
pub fn split(text: &str, max_chunk_chars: usize) -> Vec<Chunk> {
    assert!(max_chunk_chars > 0, "max_chunk_chars must be greater than 0");

    // Byte index of every character boundary, plus the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    if total_chars == 0 {
        return vec![Chunk {
            index: 0,
            text: String::new(),
            start_offset: 0,
        }];
    }

    let lookback = (max_chunk_chars / LOOKBACK_DIVISOR).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total_chars {
        let hard_end = (start + max_chunk_chars).min(total_chars);
        let end = if hard_end == total_chars {
            total_chars
        } else {
            pick_boundary(text, &bounds, start, hard_end, lookback)
        };

        chunks.push(Chunk {
            index: chunks.len(),
            text: text[bounds[start]..bounds[end]].to_string(),
            start_offset: start,
        });
        start = end;
    }

    chunks
}

/// Choose a cut point in `(start, hard_end]`, preferring natural boundaries
/// inside the lookback window. All positions are character offsets.
fn pick_boundary(
    text: &str,
    bounds: &[usize],
    start: usize,
    hard_end: usize,
    lookback: usize,
) -> usize {
    // Window must leave at least one character in the chunk.
    let window_start = hard_end.saturating_sub(lookback).max(start + 1);
    let window = &text[bounds[window_start]..bounds[hard_end]];

    // Cut just after the last paragraph break in the window.
    if let Some(pos) = window.rfind("\n\n") {
        return window_start + window[..pos + 2].chars().count();
    }

    // Cut just after the last sentence terminator.
    if let Some(pos) = window.rfind(['.', '!', '?']) {
        return window_start + window[..=pos].chars().count();
    }

    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn check_invariants(text: &str, max: usize, chunks: &[Chunk]) {
        assert_eq!(reassemble(chunks), text, "concatenation must be lossless");

        let mut expected_offset = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(
                chunk.start_offset, expected_offset,
                "start_offset must equal summed length of preceding chunks"
            );
            assert!(
                chunk.char_len() <= max,
                "chunk {} exceeds limit: {} > {}",
                i,
                chunk.char_len(),
                max
            );
            expected_offset += chunk.char_len();
        }
    }

    #[test]
    fn test_empty_text_yields_single_empty_chunk() {
        let chunks = split("", 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn test_small_text_is_single_chunk() {
        let text = "Short contract text.";
        let chunks = split(text, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        check_invariants(text, 100, &chunks);
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        // Paragraph break inside the lookback window of the first cut
        let text = format!("{}\n\n{}", "a".repeat(90), "b".repeat(60));
        let chunks = split(&text, 100);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with("\n\n"));
        assert_eq!(chunks[1].text, "b".repeat(60));
        check_invariants(&text, 100, &chunks);
    }

    #[test]
    fn test_falls_back_to_sentence_boundary() {
        let text = format!("{}. {}", "a".repeat(88), "b".repeat(60));
        let chunks = split(&text, 100);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.ends_with('.'));
        assert!(chunks[1].text.starts_with(' '));
        check_invariants(&text, 100, &chunks);
    }

    #[test]
    fn test_hard_cut_when_no_boundary() {
        let text = "x".repeat(250);
        let chunks = split(&text, 100);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].char_len(), 100);
        assert_eq!(chunks[1].char_len(), 100);
        assert_eq!(chunks[2].char_len(), 50);
        check_invariants(&text, 100, &chunks);
    }

    #[test]
    fn test_multibyte_text_cuts_on_char_boundaries() {
        let text = "é".repeat(150);
        let chunks = split(&text, 100);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].char_len(), 100);
        assert_eq!(chunks[1].start_offset, 100);
        check_invariants(&text, 100, &chunks);
    }

    #[test]
    fn test_twenty_thousand_chars_three_chunks() {
        // 20,000 characters of sentence-dense filler with max 8,000 splits
        // into exactly 3 chunks, boundaries shifting at most one lookback
        // window (20% = 1,600 chars) before the hard limit.
        let sentence = "The parties agree to the terms set forth herein. ";
        let mut text = sentence.repeat(20_000 / sentence.len() + 1);
        text.truncate(20_000);
        assert_eq!(text.chars().count(), 20_000);

        let chunks = split(&text, 8_000);
        assert_eq!(chunks.len(), 3);

        let lookback = 8_000 / 5;
        assert_eq!(chunks[0].start_offset, 0);
        assert!(chunks[1].start_offset > 8_000 - lookback && chunks[1].start_offset <= 8_000);
        assert!(chunks[2].start_offset > 16_000 - 2 * lookback && chunks[2].start_offset <= 16_000);
        check_invariants(&text, 8_000, &chunks);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn concatenation_is_lossless(
                text in "[a-zA-Z .!?\néé中]{0,400}",
                max in 1usize..64,
            ) {
                let chunks = split(&text, max);
                check_invariants(&text, max, &chunks);
            }

            #[test]
            fn offsets_cover_text_exactly(
                text in ".{1,200}",
                max in 1usize..32,
            ) {
                let chunks = split(&text, max);
                let last = chunks.last().unwrap();
                prop_assert_eq!(last.end_offset(), text.chars().count());
            }
        }
    }
}

//! Text extraction boundary
//!
//! Binary document parsing (PDF, DOCX) lives in an external collaborator;
//! this module ships the plain-text implementation of the `TextExtractor`
//! seam and fixes the error contract at the boundary.

use clausier_domain::{TextExtractError, TextExtractor};

/// Text extractor for plain-text and Markdown uploads.
///
/// Decodes UTF-8 and normalizes line endings to `\n` so chunk offsets are
/// stable across platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, TextExtractError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/plain" | "text/markdown" | "text/x-markdown" => {}
            other => {
                return Err(TextExtractError::UnsupportedFormat(format!(
                    "{} (supported: text/plain, text/markdown)",
                    if other.is_empty() { "<missing>" } else { other }
                )))
            }
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|e| TextExtractError::CorruptFile(format!("invalid UTF-8: {}", e)))?;

        Ok(normalize(text))
    }
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

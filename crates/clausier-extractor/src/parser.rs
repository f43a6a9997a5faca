//! Repair and validation of model output
//!
//! Models ignore formatting instructions often enough that raw responses go
//! through an ordered recovery pipeline before parsing is declared failed:
//!
//! 1. strict JSON-array parse of the full text
//! 2. strip Markdown code-fence wrappers and retry
//! 3. parse the substring between the first `[` and the last `]`
//!
//! Parsing never raises. The worst case is an empty record list flagged as
//! a failure, which the orchestrator treats differently from a clean "no
//! clauses found" response.

use crate::types::RawClauseRecord;
use serde_json::Value;
use tracing::warn;

/// Outcome of parsing one chunk's model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Valid records, in the model's output order
    pub records: Vec<RawClauseRecord>,

    /// True when any recovery step beyond the strict parse was needed.
    /// Surfaced in run metadata for observability, never for control flow.
    pub repaired: bool,

    /// True when no step produced a JSON array. Distinct from an empty
    /// array, which is a successful "no clauses found".
    pub failed: bool,

    /// Array elements dropped by per-record validation
    pub dropped: usize,
}

impl ParseOutcome {
    fn failure() -> Self {
        Self {
            records: Vec::new(),
            repaired: false,
            failed: true,
            dropped: 0,
        }
    }
}

/// Parse a raw model response into validated clause records.
pub fn parse(raw_text: &str) -> ParseOutcome {
    let trimmed = raw_text.trim();

    let mut repaired = false;
    let mut items = parse_as_array(trimmed);

    if items.is_none() {
        if let Some(unfenced) = strip_code_fences(trimmed) {
            items = parse_as_array(&unfenced);
            repaired = items.is_some();
        }
    }

    if items.is_none() {
        if let Some(bracketed) = bracket_slice(trimmed) {
            items = parse_as_array(bracketed);
            repaired = items.is_some();
        }
    }

    let Some(items) = items else {
        return ParseOutcome::failure();
    };

    let mut records = Vec::new();
    let mut dropped = 0;
    for (idx, item) in items.iter().enumerate() {
        match parse_record(item) {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(index = idx, %reason, "Dropping invalid clause record");
                dropped += 1;
            }
        }
    }

    ParseOutcome {
        records,
        repaired,
        failed: false,
        dropped,
    }
}

/// Parse `text` as JSON and keep it only if it is an array.
///
/// A parse that succeeds but yields a non-array value is treated as a miss
/// so later recovery steps still get a chance to locate an embedded array
/// (e.g. `{"clauses": [...]}` wrappers).
fn parse_as_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Strip a Markdown code-fence wrapper (with optional language tag).
/// Returns None when the text is not fenced.
fn strip_code_fences(text: &str) -> Option<String> {
    if !text.starts_with("```") {
        return None;
    }
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return None;
    }

    let last = if lines[lines.len() - 1].trim_start().starts_with("```") {
        lines.len() - 1
    } else {
        lines.len()
    };
    Some(lines[1..last].join("\n"))
}

/// The substring between the first `[` and the last `]`, inclusive.
fn bracket_slice(text: &str) -> Option<&str> {
    let first = text.find('[')?;
    let last = text.rfind(']')?;
    if last <= first {
        return None;
    }
    Some(&text[first..=last])
}

/// Validate one array element into a record.
///
/// Only objects with non-empty `clause_type` and `content` string fields
/// survive; everything else is dropped and counted rather than aborting the
/// whole chunk's result.
fn parse_record(value: &Value) -> Result<RawClauseRecord, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "element is not a JSON object".to_string())?;

    let clause_type = obj
        .get("clause_type")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "missing or empty 'clause_type'".to_string())?
        .to_string();

    let content = obj
        .get("content")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing or empty 'content'".to_string())?
        .to_string();

    let title = obj
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let page_number = obj
        .get("page_number")
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok());

    Ok(RawClauseRecord {
        clause_type,
        title,
        content,
        page_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ARRAY: &str = r#"[
        {"clause_type": "termination", "title": "T", "content": "Either party may terminate."},
        {"clause_type": "payment", "title": "", "content": "Fees are due within 30 days.", "page_number": 3}
    ]"#;

    #[test]
    fn test_strict_parse() {
        let outcome = parse(VALID_ARRAY);
        assert!(!outcome.failed);
        assert!(!outcome.repaired);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].clause_type, "termination");
        assert_eq!(outcome.records[1].page_number, Some(3));
    }

    #[test]
    fn test_empty_array_is_success_not_failure() {
        let outcome = parse("[]");
        assert!(!outcome.failed);
        assert!(!outcome.repaired);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_fenced_json_parses_same_as_unwrapped() {
        let fenced = format!("```json\n{}\n```", VALID_ARRAY);
        let outcome = parse(&fenced);
        let plain = parse(VALID_ARRAY);

        assert!(!outcome.failed);
        assert!(outcome.repaired);
        assert_eq!(outcome.records, plain.records);
    }

    #[test]
    fn test_fence_without_language_tag() {
        let fenced = format!("```\n{}\n```", VALID_ARRAY);
        let outcome = parse(&fenced);
        assert!(!outcome.failed);
        assert!(outcome.repaired);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_surrounding_prose_is_recovered() {
        let wrapped = format!(
            "Here are the clauses I found:\n{}\nLet me know if you need more.",
            VALID_ARRAY
        );
        let outcome = parse(&wrapped);
        assert!(!outcome.failed);
        assert!(outcome.repaired);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_object_wrapper_recovered_via_bracket_slice() {
        let wrapped = format!("{{\"clauses\": {}}}", VALID_ARRAY);
        let outcome = parse(&wrapped);
        assert!(!outcome.failed);
        assert!(outcome.repaired);
        assert_eq!(outcome.records.len(), 2);
    }

    #[test]
    fn test_prose_without_brackets_fails_cleanly() {
        let outcome = parse("I could not find any clauses in this text.");
        assert!(outcome.failed);
        assert!(!outcome.repaired);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_non_array_json_without_embedded_array_fails() {
        let outcome = parse(r#"{"message": "no clauses"}"#);
        assert!(outcome.failed);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_invalid_elements_dropped_and_counted() {
        let raw = r#"[
            {"clause_type": "termination", "content": "Either party may terminate."},
            {"clause_type": "", "content": "empty type"},
            {"clause_type": "payment"},
            "not an object",
            {"clause_type": "notices", "content": "Notices shall be in writing."}
        ]"#;
        let outcome = parse(raw);
        assert!(!outcome.failed);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dropped, 3);
    }

    #[test]
    fn test_missing_title_defaults_to_empty() {
        let outcome = parse(r#"[{"clause_type": "other", "content": "text"}]"#);
        assert_eq!(outcome.records[0].title, "");
    }

    #[test]
    fn test_non_numeric_page_number_ignored() {
        let outcome =
            parse(r#"[{"clause_type": "other", "content": "text", "page_number": "two"}]"#);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].page_number, None);
    }

    #[test]
    fn test_truncated_fence_fails_cleanly() {
        // A fence opener with nothing usable inside never panics
        let outcome = parse("```json");
        assert!(outcome.failed);
    }
}

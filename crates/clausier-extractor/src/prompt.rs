//! Model prompt construction for clause extraction
//!
//! Prompts are a pure function of the chunk text and the configured clause
//! taxonomy: identical inputs always render the identical prompt, which the
//! reproducibility tests rely on.

/// Build the extraction prompt for one chunk of contract text.
pub fn build_extraction_prompt(chunk_text: &str, clause_types: &[String]) -> String {
    let mut prompt = String::new();

    // 1. Role and task instruction
    prompt.push_str(EXTRACTION_INSTRUCTIONS);
    prompt.push_str("\n\n");

    // 2. Recognized clause-type vocabulary
    prompt.push_str("Common clause types:\n");
    prompt.push_str(&clause_types.join(", "));
    prompt.push_str("\n\n");

    // 3. The text to analyze
    prompt.push_str("Contract text:\n");
    prompt.push_str("---\n");
    prompt.push_str(chunk_text);
    prompt.push_str("\n---\n\n");

    // 4. Output format reminder
    prompt.push_str(OUTPUT_FORMAT_REMINDER);

    prompt
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are a legal document analysis expert. Extract all legal clauses from the following contract text.
Note: this may be one portion of a larger document. Extract only from this portion.

Your job:

1. Identify each legal clause
2. Quote the full clause text exactly as it appears in the source
3. Assign a clause type from the vocabulary below (or "other")
4. Capture the page number if one is marked in the text

Each clause object must contain:
- "clause_type": clause category (string, required)
- "title": clause heading, or "" if none (string)
- "content": exact clause text quoted verbatim from the source (string, required)
- "page_number": page number if present, otherwise omit the field (number)"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Example output:
[
  {
    "clause_type": "termination",
    "title": "Termination",
    "content": "Either party may terminate this agreement upon thirty days written notice.",
    "page_number": 2
  }
]

Return ONLY the JSON array now: no markdown code blocks, no explanations, no surrounding prose."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;

    fn taxonomy() -> Vec<String> {
        ExtractorConfig::default().clause_types
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_extraction_prompt("Either party may terminate.", &taxonomy());
        let b = build_extraction_prompt("Either party may terminate.", &taxonomy());
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_includes_chunk_text() {
        let prompt = build_extraction_prompt("The Receiving Party shall hold in confidence.", &taxonomy());
        assert!(prompt.contains("The Receiving Party shall hold in confidence."));
    }

    #[test]
    fn test_prompt_includes_taxonomy() {
        let prompt = build_extraction_prompt("text", &taxonomy());
        assert!(prompt.contains("termination"));
        assert!(prompt.contains("force_majeure"));
        assert!(prompt.contains("governing_law"));
    }

    #[test]
    fn test_prompt_demands_bare_json_array() {
        let prompt = build_extraction_prompt("text", &taxonomy());
        assert!(prompt.contains("ONLY the JSON array"));
        assert!(prompt.contains("no markdown code blocks"));
    }

    #[test]
    fn test_prompt_names_required_fields() {
        let prompt = build_extraction_prompt("text", &taxonomy());
        assert!(prompt.contains("\"clause_type\""));
        assert!(prompt.contains("\"title\""));
        assert!(prompt.contains("\"content\""));
        assert!(prompt.contains("\"page_number\""));
    }

    #[test]
    fn test_different_taxonomies_yield_different_prompts() {
        let custom = vec!["exclusivity".to_string()];
        let a = build_extraction_prompt("text", &taxonomy());
        let b = build_extraction_prompt("text", &custom);
        assert_ne!(a, b);
        assert!(b.contains("exclusivity"));
    }
}

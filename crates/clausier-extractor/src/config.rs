//! Configuration for the extraction pipeline

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Clause-type vocabulary the model is asked to use.
pub const COMMON_CLAUSE_TYPES: [&str; 15] = [
    "termination",
    "payment",
    "confidentiality",
    "liability",
    "indemnification",
    "governing_law",
    "dispute_resolution",
    "intellectual_property",
    "warranty",
    "force_majeure",
    "assignment",
    "severability",
    "entire_agreement",
    "amendment",
    "notices",
];

/// Configuration for the extraction pipeline.
///
/// Loaded once at process startup and passed by reference; every field has a
/// fixed default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters). Sized to leave room for prompt
    /// overhead inside the model's input limit.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Model to use for extraction
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Token budget for each model response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature. Low by default for consistent extraction.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum accepted upload size (bytes)
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: usize,

    /// Time budget for a single chunk's model call (seconds)
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,

    /// Upper bound on total document extraction time (seconds). Once
    /// exceeded, remaining chunks are recorded as timed-out failures.
    #[serde(default = "default_document_timeout_secs")]
    pub document_timeout_secs: u64,

    /// Clause-type vocabulary embedded in prompts
    #[serde(default = "default_clause_types")]
    pub clause_types: Vec<String>,
}

fn default_max_chunk_chars() -> usize {
    8_000
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_output_tokens() -> u32 {
    2_000
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_file_size_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_chunk_timeout_secs() -> u64 {
    120
}

fn default_document_timeout_secs() -> u64 {
    600
}

fn default_clause_types() -> Vec<String> {
    COMMON_CLAUSE_TYPES.iter().map(|s| s.to_string()).collect()
}

impl ExtractorConfig {
    /// Get the per-chunk model call timeout as a Duration.
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_secs)
    }

    /// Get the total document extraction time cap as a Duration.
    pub fn document_timeout(&self) -> Duration {
        Duration::from_secs(self.document_timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_chars == 0 {
            return Err("max_chunk_chars must be greater than 0".to_string());
        }
        if self.max_file_size_bytes == 0 {
            return Err("max_file_size_bytes must be greater than 0".to_string());
        }
        if self.chunk_timeout_secs == 0 {
            return Err("chunk_timeout_secs must be greater than 0".to_string());
        }
        if self.document_timeout_secs < self.chunk_timeout_secs {
            return Err("document_timeout_secs cannot be less than chunk_timeout_secs".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.clause_types.is_empty() {
            return Err("clause_types must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            model_name: default_model_name(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            max_file_size_bytes: default_max_file_size_bytes(),
            chunk_timeout_secs: default_chunk_timeout_secs(),
            document_timeout_secs: default_document_timeout_secs(),
            clause_types: default_clause_types(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_chunk_chars, 8_000);
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.clause_types.len(), 15);
    }

    #[test]
    fn test_invalid_max_chunk_chars() {
        let mut config = ExtractorConfig::default();
        config.max_chunk_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_document_timeout_below_chunk_timeout() {
        let mut config = ExtractorConfig::default();
        config.document_timeout_secs = config.chunk_timeout_secs - 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = ExtractorConfig::default();
        config.temperature = 2.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_chunk_chars, parsed.max_chunk_chars);
        assert_eq!(config.model_name, parsed.model_name);
        assert_eq!(config.clause_types, parsed.clause_types);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("max_chunk_chars = 4000").unwrap();
        assert_eq!(config.max_chunk_chars, 4_000);
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
    }
}

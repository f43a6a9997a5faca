//! Configuration file parsing for the API server.
//!
//! Loads settings from TOML files including bind address, database path,
//! OpenAI credentials, and the embedded extractor section.

use clausier_extractor::ExtractorConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// API configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// API server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// OpenAI-compatible API endpoint
    #[serde(default = "default_openai_endpoint")]
    pub openai_endpoint: String,

    /// OpenAI API key. Falls back to the OPENAI_API_KEY environment
    /// variable when absent from the file.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Upper bound for the list endpoint's page_size parameter
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Extraction pipeline settings
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_database_path() -> String {
    "clausier.db".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default max page size, matching the list endpoint's hard clamp
fn default_max_page_size() -> usize {
    100
}

impl ApiConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ApiConfig = toml::from_str(&contents)?;

        config.extractor.validate().map_err(ConfigError::Invalid)?;
        if config.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "max_page_size must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// The API key: the config file value, else the OPENAI_API_KEY
    /// environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ApiConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: ":memory:".to_string(),
            openai_endpoint: default_openai_endpoint(),
            openai_api_key: Some("test-key-do-not-use-in-production".to_string()),
            max_page_size: default_max_page_size(),
            extractor: ExtractorConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

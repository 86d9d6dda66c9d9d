//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; [`FileConfig::validate`] reports values
//! that parse but cannot work.

mod backend;
mod chat;
mod logging;

pub use backend::{DEFAULT_BASE_URL, FileBackendConfig};
pub use chat::FileChatConfig;
pub use logging::FileLoggingConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("backend.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("backend.base_url is not a valid http(s) URL: {0}")]
    InvalidBaseUrl(String),

    #[error("backend.connect_timeout_secs cannot be 0")]
    InvalidConnectTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection settings
    pub backend: FileBackendConfig,
    /// Chat behavior
    pub chat: FileChatConfig,
    /// Conversation log settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        } else {
            match reqwest::Url::parse(base_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => issues.push(ConfigValidationError::InvalidBaseUrl(base_url.to_string())),
            }
        }

        if self.backend.connect_timeout_secs == 0 {
            issues.push(ConfigValidationError::InvalidConnectTimeout);
        }

        issues
    }
}

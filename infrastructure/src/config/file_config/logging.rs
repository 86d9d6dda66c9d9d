//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation log path; empty disables the log
    pub conversation_log: String,
}

impl FileLoggingConfig {
    /// The conversation log path, if one is configured.
    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        let path = self.conversation_log.trim();
        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

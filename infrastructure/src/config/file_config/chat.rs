//! Chat configuration from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Save the conversation after every finished turn
    pub auto_save: bool,
    /// Path to the REPL history file
    pub history_file: Option<String>,
}

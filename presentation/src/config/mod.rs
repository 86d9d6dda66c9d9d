//! Presentation-level configuration
//!
//! Settings the REPL needs, mapped from the file configuration by the binary.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplConfig {
    /// Save the conversation after every completed or cancelled turn
    pub auto_save: bool,
    /// Path to history file (`~/` is expanded)
    pub history_file: Option<String>,
    /// Skip status lines and banners
    pub quiet: bool,
}

impl ReplConfig {
    /// Where REPL input history is kept.
    ///
    /// Defaults to `<data dir>/chatline/history.txt`.
    pub fn history_path(&self) -> Option<PathBuf> {
        match self.history_file.as_deref().map(str::trim) {
            Some("") => None,
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|d| d.join("chatline").join("history.txt")),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

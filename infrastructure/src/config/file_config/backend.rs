//! Backend configuration from TOML (`[backend]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8501";

/// Raw backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Base URL of the generation and storage service
    pub base_url: String,
    /// Seconds to wait for the TCP/TLS connection
    pub connect_timeout_secs: u64,
    /// Seconds a whole request may take, streaming included; 0 disables
    pub request_timeout_secs: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 300,
        }
    }
}

impl FileBackendConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `None` when the request timeout is disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_request_timeout_disables() {
        let config = FileBackendConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.request_timeout().is_none());
        assert_eq!(
            FileBackendConfig::default().request_timeout(),
            Some(Duration::from_secs(300))
        );
    }
}

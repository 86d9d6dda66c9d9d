//! Shared `reqwest` client for the backend.

use crate::config::FileBackendConfig;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

/// Longest error body kept from a failed response
const MAX_ERROR_BODY: usize = 512;

/// Errors building the backend client
#[derive(Error, Debug)]
pub enum HttpSetupError {
    #[error("Invalid backend URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Base URL plus a configured `reqwest::Client`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: &FileBackendConfig) -> Result<Self, HttpSetupError> {
        Self::with_timeouts(
            &config.base_url,
            config.connect_timeout(),
            config.request_timeout(),
        )
    }

    /// Build with explicit timeouts. `request_timeout` covers the whole
    /// exchange, streamed body included.
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Option<Duration>,
    ) -> Result<Self, HttpSetupError> {
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| HttpSetupError::InvalidBaseUrl(base_url.to_string()))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("chatline/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        // Mock servers on localhost must not go through a system proxy
        if cfg!(test) {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// URL for `segments` under the base path, each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Read the body of a failed response, cut to a loggable size.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.len() > MAX_ERROR_BODY {
        format!("{}... [truncated]", &body[..body.floor_char_boundary(MAX_ERROR_BODY)])
    } else {
        body.to_string()
    }
}

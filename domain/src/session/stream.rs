//! Stream session status.
//!
//! [`StreamStatus`] is the state of one request/response cycle:
//!
//! ```text
//! Idle ──start──▶ Streaming ──┬─ end of body ──▶ Completed
//!                             ├─ cancel ───────▶ Cancelled
//!                             └─ transport err ▶ Failed(StreamFailure)
//! ```
//!
//! `Cancelled` is a user decision, never folded into `Failed`.

use serde::{Deserialize, Serialize};

/// Category of a transport-level failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum FailureKind {
    /// Could not connect or the request could not be sent.
    Connection,
    /// The backend answered with a non-success HTTP status.
    HttpStatus(u16),
    /// The request or a read timed out.
    Timeout,
    /// The body broke off while being read.
    Body,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Connection => f.write_str("connection"),
            FailureKind::HttpStatus(code) => write!(f, "http {}", code),
            FailureKind::Timeout => f.write_str("timeout"),
            FailureKind::Body => f.write_str("body"),
        }
    }
}

/// Error descriptor carried by a failed stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl StreamFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FailureKind::HttpStatus(code) if self.message.is_empty() => {
                write!(f, "HTTP {}", code)
            }
            FailureKind::HttpStatus(code) => write!(f, "HTTP {}: {}", code, self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// State of a stream session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    Idle,
    Streaming,
    Completed,
    Cancelled,
    Failed(StreamFailure),
}

impl StreamStatus {
    /// Returns true once the session can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamStatus::Completed | StreamStatus::Cancelled | StreamStatus::Failed(_)
        )
    }

    /// Short machine-friendly name (used in conversation logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Idle => "idle",
            StreamStatus::Streaming => "streaming",
            StreamStatus::Completed => "completed",
            StreamStatus::Cancelled => "cancelled",
            StreamStatus::Failed(_) => "failed",
        }
    }

    /// The failure descriptor, if the stream failed.
    pub fn failure(&self) -> Option<&StreamFailure> {
        match self {
            StreamStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamStatus::Idle => f.write_str("Idle"),
            StreamStatus::Streaming => f.write_str("Streaming"),
            StreamStatus::Completed => f.write_str("Completed"),
            StreamStatus::Cancelled => f.write_str("Cancelled"),
            StreamStatus::Failed(failure) => write!(f, "Error: {}", failure),
        }
    }
}

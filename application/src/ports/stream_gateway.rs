//! Stream gateway port
//!
//! Defines how the application layer opens a streamed generation request.
//! The backend answers with a plain chunked body; the gateway hands the raw
//! chunks back untouched and decoding happens in the session.

use async_trait::async_trait;
use chatline_domain::{FailureKind, Message, StreamFailure};
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while opening or reading a stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Timeout")]
    Timeout,

    #[error("Stream error: {0}")]
    Body(String),
}

impl GatewayError {
    /// Convert into the descriptor carried by a `Failed` stream status.
    pub fn to_failure(&self) -> StreamFailure {
        match self {
            GatewayError::Connection(msg) => StreamFailure::new(FailureKind::Connection, msg),
            GatewayError::Status { status, body } => {
                StreamFailure::new(FailureKind::HttpStatus(*status), body.trim())
            }
            GatewayError::Timeout => StreamFailure::new(FailureKind::Timeout, "request timed out"),
            GatewayError::Body(msg) => StreamFailure::new(FailureKind::Body, msg),
        }
    }
}

/// Raw response body chunks, in arrival order
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, GatewayError>> + Send>>;

/// Body of a `/stream` request: the full history including the new user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamRequest {
    pub messages: Vec<Message>,
}

impl StreamRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Gateway for streamed text generation
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait StreamGateway: Send + Sync {
    /// Send the request and return the response body as a chunk stream.
    ///
    /// A non-success status must be reported here, before any chunk.
    async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, GatewayError>;
}

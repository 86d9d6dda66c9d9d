//! Port for structured conversation logging.
//!
//! Records what happened to each chat (streams started and finished, chats
//! saved, loaded and deleted) as machine-readable events. Diagnostics go
//! through `tracing`; this port is the audit trail.

use serde_json::Value;

/// Event type names written by the use cases
pub mod event_types {
    pub const STREAM_STARTED: &str = "stream_started";
    pub const STREAM_FINISHED: &str = "stream_finished";
    pub const CHAT_SAVED: &str = "chat_saved";
    pub const CHAT_LOADED: &str = "chat_loaded";
    pub const CHAT_DELETED: &str = "chat_deleted";
}

/// A structured conversation event for logging.
///
/// The logger adds the timestamp when it writes the record.
pub struct ConversationEvent {
    /// Event type identifier, one of [`event_types`].
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events.
///
/// `log` is synchronous and infallible: a broken log must never interrupt a
/// stream, so implementations swallow their own write errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

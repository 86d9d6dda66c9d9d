//! Chat persistence port
//!
//! Saved conversations live in the backend. This port moves whole records in
//! and out; id generation and title derivation belong to
//! [`ChatLibrary`](crate::use_cases::chat_library::ChatLibrary).

use async_trait::async_trait;
use chatline_domain::{Message, SessionIdentity};
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// No record with this id. Recoverable: callers report it and go on.
    #[error("Chat not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl PersistenceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound(_))
    }
}

/// A persisted conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
}

/// Storage for saved conversations
#[async_trait]
pub trait ChatPersistence: Send + Sync {
    /// All saved chats, in the order the backend returns them.
    async fn list(&self) -> Result<Vec<SessionIdentity>, PersistenceError>;

    /// Load one chat; [`PersistenceError::NotFound`] if the id is unknown.
    async fn load(&self, id: &str) -> Result<ChatRecord, PersistenceError>;

    /// Create or overwrite the record with `record.id`.
    async fn save(&self, record: &ChatRecord) -> Result<(), PersistenceError>;

    /// Delete one chat; [`PersistenceError::NotFound`] if the id is unknown.
    async fn delete(&self, id: &str) -> Result<(), PersistenceError>;
}

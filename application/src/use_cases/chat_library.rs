//! Chat library use case.
//!
//! Lists, loads, saves and deletes conversations through a
//! [`ChatPersistence`] adapter. Client-side ids and derived titles are
//! assigned here, so every adapter stores records exactly as given.

use crate::ports::chat_persistence::{ChatPersistence, ChatRecord, PersistenceError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use chatline_domain::{SessionIdentity, Transcript, derive_title, generate_chat_id};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A conversation loaded from persistence, ready to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedChat {
    pub identity: SessionIdentity,
    pub transcript: Transcript,
}

pub struct ChatLibrary {
    persistence: Arc<dyn ChatPersistence>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for ChatLibrary {
    fn clone(&self) -> Self {
        Self {
            persistence: self.persistence.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl ChatLibrary {
    pub fn new(persistence: Arc<dyn ChatPersistence>) -> Self {
        Self {
            persistence,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub async fn list(&self) -> Result<Vec<SessionIdentity>, PersistenceError> {
        let chats = self.persistence.list().await?;
        debug!("Listed {} saved chats", chats.len());
        Ok(chats)
    }

    /// Load a chat into a fresh, sealed transcript.
    ///
    /// A record without a title gets one derived from its first message.
    pub async fn load(&self, id: &str) -> Result<LoadedChat, PersistenceError> {
        let record = self.persistence.load(id).await?;
        let transcript = Transcript::from_messages(record.messages);
        let title = if record.title.trim().is_empty() {
            derive_title(&transcript)
        } else {
            record.title
        };
        let identity = SessionIdentity::new(record.id, title);

        info!(
            "Loaded chat {} ({} messages)",
            identity.id,
            transcript.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            event_types::CHAT_LOADED,
            serde_json::json!({
                "id": identity.id,
                "messages": transcript.len(),
            }),
        ));
        Ok(LoadedChat {
            identity,
            transcript,
        })
    }

    /// Save a snapshot of `transcript`.
    ///
    /// Without an `id` a new one is generated; with one the stored record is
    /// overwritten, so saving twice under the same id leaves one record.
    /// Without a `title` one is derived from the first message. An open turn
    /// is saved with whatever it holds so far.
    pub async fn save(
        &self,
        transcript: &Transcript,
        id: Option<&str>,
        title: Option<&str>,
    ) -> Result<SessionIdentity, PersistenceError> {
        if transcript.is_empty() {
            return Err(PersistenceError::InvalidRecord(
                "cannot save an empty conversation".to_string(),
            ));
        }

        let id = match id {
            Some(id) => id.to_string(),
            None => {
                let id = generate_chat_id(chrono::Utc::now());
                debug!("Generated chat id {}", id);
                id
            }
        };
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| derive_title(transcript));

        let record = ChatRecord {
            id,
            title,
            messages: transcript.messages().to_vec(),
        };
        self.persistence.save(&record).await?;

        info!("Saved chat {} ({} messages)", record.id, record.messages.len());
        self.conversation_logger.log(ConversationEvent::new(
            event_types::CHAT_SAVED,
            serde_json::json!({
                "id": record.id,
                "title": record.title,
                "messages": record.messages.len(),
            }),
        ));
        Ok(SessionIdentity::new(record.id, record.title))
    }

    /// Delete a chat. An unknown id comes back as
    /// [`PersistenceError::NotFound`]; nothing else is touched.
    pub async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        match self.persistence.delete(id).await {
            Ok(()) => {
                info!("Deleted chat {}", id);
                self.conversation_logger.log(ConversationEvent::new(
                    event_types::CHAT_DELETED,
                    serde_json::json!({ "id": id }),
                ));
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete chat {}: {}", id, e);
                Err(e)
            }
        }
    }
}

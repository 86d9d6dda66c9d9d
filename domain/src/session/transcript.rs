//! Transcript, the ordered conversation history of one chat.
//!
//! The assistant message currently under construction is tracked by an
//! explicit index (`open_turn`) rather than inferred from the role of the
//! last element. [`Transcript::begin_assistant_turn`] opens it,
//! [`Transcript::merge_delta`] appends to it and [`Transcript::seal_turn`]
//! closes it. Every other message is immutable.
//!
//! Opening a turn hands out a [`TurnToken`]. The `*_into`/`close_turn`
//! variants only act while that exact turn is still open, so a writer whose
//! turn was sealed, cleared or swapped out cannot reach a newer one.
//!
//! # Invariants
//!
//! - At most one open turn exists, and when it does it is the last message.
//! - After N calls to `merge_delta` on an open turn, its content equals the
//!   concatenation of the N fragments in call order.

use super::entities::{Message, Role};
use crate::core::error::DomainError;
use crate::core::prompt::Prompt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique across every transcript in the process.
static NEXT_TURN: AtomicU64 = AtomicU64::new(1);

/// Identifies one opened assistant turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnToken(u64);

impl TurnToken {
    fn next() -> Self {
        Self(NEXT_TURN.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTurn {
    index: usize,
    token: TurnToken,
}

/// Ordered, mutable conversation history (Entity)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    open_turn: Option<OpenTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from previously persisted messages.
    ///
    /// Loaded transcripts have no open turn.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            open_turn: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// First message of the conversation, used for title derivation
    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn has_open_turn(&self) -> bool {
        self.open_turn.is_some()
    }

    /// The assistant message currently receiving deltas, if any
    pub fn open_turn(&self) -> Option<&Message> {
        self.open_turn.map(|open| &self.messages[open.index])
    }

    /// Whether `token` names the turn that is open right now
    pub fn is_open(&self, token: TurnToken) -> bool {
        self.open_turn.is_some_and(|open| open.token == token)
    }

    /// Append a sealed user message.
    ///
    /// Any open assistant turn is sealed first, so no further merge can
    /// target it. Fails with [`DomainError::InvalidInput`] when the content
    /// is blank; the transcript is left unchanged in that case.
    pub fn append_user(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        let prompt = Prompt::try_new(content)?;
        self.seal_turn();
        self.messages.push(Message::user(prompt.into_content()));
        Ok(())
    }

    /// Append an empty assistant message and mark it open.
    pub fn begin_assistant_turn(&mut self) -> Result<TurnToken, DomainError> {
        if self.open_turn.is_some() {
            return Err(DomainError::TurnAlreadyOpen);
        }
        self.messages.push(Message::assistant(String::new()));
        let token = TurnToken::next();
        self.open_turn = Some(OpenTurn {
            index: self.messages.len() - 1,
            token,
        });
        Ok(token)
    }

    /// Append `text` to the open assistant turn, whichever it is.
    pub fn merge_delta(&mut self, text: &str) -> Result<(), DomainError> {
        let open = self.open_turn.ok_or(DomainError::NoOpenTurn)?;
        self.push_delta(open.index, text);
        Ok(())
    }

    /// Append `text` to the turn opened as `token`.
    ///
    /// Fails with [`DomainError::NoOpenTurn`] once that turn is no longer
    /// open, even if another one is.
    pub fn merge_delta_into(&mut self, token: TurnToken, text: &str) -> Result<(), DomainError> {
        match self.open_turn {
            Some(open) if open.token == token => {
                self.push_delta(open.index, text);
                Ok(())
            }
            _ => Err(DomainError::NoOpenTurn),
        }
    }

    fn push_delta(&mut self, index: usize, text: &str) {
        let message = &mut self.messages[index];
        debug_assert_eq!(message.role, Role::Assistant);
        message.content.push_str(text);
    }

    /// Close the open turn. Calling this with no open turn is a no-op.
    pub fn seal_turn(&mut self) {
        self.open_turn = None;
    }

    /// Seal the turn opened as `token` and return it.
    ///
    /// Another writer's open turn is left untouched.
    pub fn close_turn(&mut self, token: TurnToken) -> Result<&Message, DomainError> {
        match self.open_turn {
            Some(open) if open.token == token => {
                self.open_turn = None;
                Ok(&self.messages[open.index])
            }
            _ => Err(DomainError::NoOpenTurn),
        }
    }

    /// Drop all messages (e.g. when the active chat was deleted).
    pub fn clear(&mut self) {
        self.messages.clear();
        self.open_turn = None;
    }
}

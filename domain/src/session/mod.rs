//! Chat session domain.
//!
//! - [`entities::Message`]: a single message within a conversation
//! - [`transcript::Transcript`]: ordered history with an explicit open turn
//! - [`identity::SessionIdentity`]: id/title of a persisted conversation
//! - [`stream::StreamStatus`]: lifecycle of one streamed response

pub mod entities;
pub mod identity;
pub mod stream;
pub mod transcript;

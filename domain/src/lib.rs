//! Domain layer for chatline
//!
//! This crate contains the conversation model and the pure parts of the
//! streaming engine. It has no dependencies on I/O, async runtimes or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! ## Transcript
//!
//! The ordered history of one conversation. Exactly one assistant message may
//! be *open* while a response streams in; deltas are appended to it in arrival
//! order and nothing else is ever mutated.
//!
//! ## Stream decoding
//!
//! Response bodies arrive as arbitrary byte chunks. [`Utf8StreamDecoder`]
//! turns them into text fragments without ever splitting a character.

pub mod codec;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use codec::utf8::Utf8StreamDecoder;
pub use core::{error::DomainError, prompt::Prompt};
pub use session::{
    entities::{Message, Role},
    identity::{SessionIdentity, derive_title, generate_chat_id},
    stream::{FailureKind, StreamFailure, StreamStatus},
    transcript::{Transcript, TurnToken},
};

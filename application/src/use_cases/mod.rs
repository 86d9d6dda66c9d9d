//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod cancellation;
pub mod chat_library;
pub mod shared;
pub mod stream_session;

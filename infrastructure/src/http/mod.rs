//! HTTP adapters for the chat backend
//!
//! One [`BackendClient`] is shared by the stream gateway and the chat store:
//!
//! - `POST /stream`: chunked plain-text reply ([`HttpStreamGateway`])
//! - `GET /list_chats`, `GET /load_chat/{id}`, `POST /save_chat`,
//!   `DELETE /delete_chat/{id}` ([`HttpChatPersistence`])

pub mod chat_persistence;
pub mod client;
pub mod protocol;
pub mod stream_gateway;

pub use chat_persistence::HttpChatPersistence;
pub use client::{BackendClient, HttpSetupError};
pub use stream_gateway::HttpStreamGateway;

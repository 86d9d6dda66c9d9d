//! Application layer for chatline
//!
//! This crate contains the stream session engine, the chat library and the
//! port definitions the infrastructure adapters implement.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_persistence::{ChatPersistence, ChatRecord, PersistenceError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    stream_gateway::{ByteStream, GatewayError, StreamGateway, StreamRequest},
    stream_observer::{NoStreamObserver, StreamObserver},
};
pub use use_cases::cancellation::CancelHandle;
pub use use_cases::chat_library::{ChatLibrary, LoadedChat};
pub use use_cases::shared::SharedTranscript;
pub use use_cases::stream_session::{StreamOutcome, StreamSession, StreamSessionError};

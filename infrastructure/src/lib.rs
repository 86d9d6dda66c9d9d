//! Infrastructure layer for chatline
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration file loading.

pub mod config;
pub mod http;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendConfig, FileChatConfig, FileConfig,
    FileLoggingConfig,
};
pub use http::{BackendClient, HttpChatPersistence, HttpSetupError, HttpStreamGateway};
pub use logging::JsonlConversationLogger;

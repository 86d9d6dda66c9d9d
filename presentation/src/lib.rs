//! Presentation layer for chatline
//!
//! This crate contains the CLI definition, console output and the
//! interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand, TurnRunner};
pub use cli::commands::Cli;
pub use config::ReplConfig;
pub use output::console::ConsoleFormatter;
pub use output::printer::StreamPrinter;

//! Interactive chat module
//!
//! Provides a readline-based chat interface and the turn runner shared with
//! one-shot mode.

mod repl;
mod turn;

pub use repl::{ChatRepl, ReplCommand};
pub use turn::TurnRunner;

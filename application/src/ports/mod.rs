//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_persistence;
pub mod conversation_logger;
pub mod stream_gateway;
pub mod stream_observer;

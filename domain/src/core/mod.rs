//! Core domain concepts shared across all subdomains.
//!
//! - [`prompt::Prompt`]: a validated user prompt
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod prompt;
pub mod string;

//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: LLM models the story engine can run on
//! - [`error::DomainError`]: domain-level errors
//! - [`text`]: tokenizing and JSON-block helpers used by parsers and filters

pub mod error;
pub mod model;
pub mod text;

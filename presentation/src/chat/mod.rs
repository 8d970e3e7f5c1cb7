//! Interactive story module
//!
//! Provides a readline-based interactive interface for a story session.

mod repl;

pub use repl::{StoryRepl, new_session_id};

//! Presentation layer for lexiquest
//!
//! This crate contains CLI definitions, the interactive story REPL,
//! progress reporters and assessment report formatting.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{StoryRepl, new_session_id};
pub use cli::commands::Cli;
pub use output::report::{AssessmentReport, ExportFormat, ReportRow};
pub use progress::reporter::{ProgressReporter, SimpleProgress};

//! Application-level configuration.
//!
//! - [`SessionConfig`]: orchestrator loop control (batch size, step limit, fixed replies)

pub mod session_config;

pub use session_config::{DEFAULT_ENDED, DEFAULT_REFUSAL, SessionConfig};

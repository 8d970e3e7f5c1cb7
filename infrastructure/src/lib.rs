//! Infrastructure layer for lexiquest
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod guard;
pub mod logging;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileGuardConfig, FileLoggingConfig,
    FileModelsConfig, FileProviderConfig, FileSessionConfig,
};
pub use guard::WordListGuard;
pub use logging::JsonlConversationLogger;
pub use providers::{OpenAiCompatConfig, OpenAiCompatGateway};
pub use storage::{InMemorySessionStore, JsonFileSessionStore};

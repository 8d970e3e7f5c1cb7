//! Configuration file loading for lexiquest
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LEXIQUEST_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./lexiquest.toml` or `./.lexiquest.toml`
//! 4. Global: `$XDG_CONFIG_HOME/lexiquest/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGuardConfig, FileLoggingConfig, FileModelsConfig,
    FileProviderConfig, FileSessionConfig,
};
pub use loader::ConfigLoader;

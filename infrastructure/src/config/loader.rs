//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_FILES: [&str; 2] = ["lexiquest.toml", ".lexiquest.toml"];

/// Prefix for environment overrides (`LEXIQUEST_PROVIDER__BASE_URL`, ...).
const ENV_PREFIX: &str = "LEXIQUEST_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `LEXIQUEST_`-prefixed environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./lexiquest.toml` or `./.lexiquest.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/lexiquest/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::global_config_path(), Path::new("."))
            .extract()
            .map_err(Box::new)
    }

    fn figment(explicit: Option<&PathBuf>, global: Option<PathBuf>, project_root: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(path) = Self::project_config_path_in(project_root) {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lexiquest").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_path_in(Path::new("."))
    }

    fn project_config_path_in(root: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [ env ] {}* variables", ENV_PREFIX);

        match Self::project_config_path() {
            Some(path) => println!("  [FOUND] Project: {}", path.display()),
            None => println!("  [     ] Project: ./lexiquest.toml or ./.lexiquest.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", mark, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}

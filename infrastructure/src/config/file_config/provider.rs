//! Model provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible provider configuration.
///
/// Works with OpenAI itself, a local Ollama server
/// (`base_url = "http://localhost:11434"`) or any other endpoint that
/// serves `/v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL without the `/v1/...` path.
    pub base_url: String,
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: None,
            timeout_seconds: 120,
        }
    }
}

impl FileProviderConfig {
    /// API key from the config file, else from the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

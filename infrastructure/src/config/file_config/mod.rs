//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly, validated, and then converted into the
//! application's [`SessionConfig`] and the domain's [`ModelConfig`].

mod models;
mod provider;
mod session;

pub use models::FileModelsConfig;
pub use provider::FileProviderConfig;
pub use session::{FileGuardConfig, FileLoggingConfig, FileSessionConfig};

use lexiquest_application::SessionConfig;
use lexiquest_domain::{ModelConfig, SubtaskRegistry, SurveyProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("session.challenges_per_batch cannot be 0")]
    ZeroBatchSize,

    #[error("session.max_steps_per_turn cannot be 0")]
    ZeroStepsPerTurn,

    #[error("provider.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("models.{field}: model name cannot be empty")]
    EmptyModelName { field: &'static str },

    #[error("session.subtask: unknown subtask '{key}' (known: {known})")]
    UnknownSubtask { key: String, known: String },
}

/// Complete file configuration
///
/// # Example
///
/// ```toml
/// [models]
/// narrator = "gpt-4o"
///
/// [provider]
/// base_url = "http://localhost:11434"
///
/// [session]
/// challenges_per_batch = 5
///
/// [guard]
/// blocked_terms = ["stupid"]
///
/// [survey]
/// age = "7"
/// interests = "dinosaurs, space"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub models: FileModelsConfig,
    pub provider: FileProviderConfig,
    pub session: FileSessionConfig,
    pub guard: FileGuardConfig,
    pub logging: FileLoggingConfig,
    /// Pre-filled survey profile; when present the survey dialogue is skipped.
    pub survey: Option<BTreeMap<String, String>>,
}

impl FileConfig {
    /// Check the values the session cannot run without.
    pub fn validate(&self, registry: &SubtaskRegistry) -> Result<(), ConfigValidationError> {
        if self.session.challenges_per_batch == 0 {
            return Err(ConfigValidationError::ZeroBatchSize);
        }
        if self.session.max_steps_per_turn == 0 {
            return Err(ConfigValidationError::ZeroStepsPerTurn);
        }
        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        self.models.to_model_config()?;
        if !registry.contains(&self.session.subtask) {
            return Err(ConfigValidationError::UnknownSubtask {
                key: self.session.subtask.clone(),
                known: registry.keys().collect::<Vec<_>>().join(", "),
            });
        }
        Ok(())
    }

    pub fn model_config(&self) -> Result<ModelConfig, ConfigValidationError> {
        self.models.to_model_config()
    }

    pub fn survey_profile(&self) -> Option<SurveyProfile> {
        self.survey
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| s.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
    }

    /// Application-level session settings.
    pub fn session_config(&self) -> SessionConfig {
        let session = &self.session;
        let config = SessionConfig::default()
            .with_subtask(session.subtask.clone())
            .with_challenges_per_batch(session.challenges_per_batch)
            .with_max_steps_per_turn(session.max_steps_per_turn)
            .with_refusal_message(session.refusal_message.clone())
            .with_ended_message(session.ended_message.clone())
            .with_generation_timeout(Some(Duration::from_secs(self.provider.timeout_seconds)));
        match self.survey_profile() {
            Some(profile) => config.with_survey_profile(profile),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FileConfig::default();
        assert_eq!(config.validate(&SubtaskRegistry::builtin()), Ok(()));
        assert!(config.survey_profile().is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
[models]
narrator = "gpt-4o"

[provider]
base_url = "http://localhost:11434"
temperature = 0.2

[session]
challenges_per_batch = 3

[guard]
blocked_terms = ["stupid", "shut up"]

[logging]
conversation_log = "transcript.jsonl"

[survey]
age = "7"
favorite_animal = "dolphin"
"#,
        )
        .unwrap();

        assert_eq!(config.provider.base_url, "http://localhost:11434");
        assert_eq!(config.session.challenges_per_batch, 3);
        assert_eq!(config.session.max_steps_per_turn, 4);
        assert_eq!(config.guard.blocked_terms.len(), 2);

        let session = config.session_config();
        assert_eq!(session.challenges_per_batch, 3);
        assert_eq!(session.generation_timeout, Some(Duration::from_secs(120)));
        let profile = session.survey_profile.unwrap();
        assert_eq!(profile.get("favorite_animal"), Some("dolphin"));
    }

    #[test]
    fn test_validation_errors() {
        let registry = SubtaskRegistry::builtin();

        let mut config = FileConfig::default();
        config.session.challenges_per_batch = 0;
        assert_eq!(config.validate(&registry), Err(ConfigValidationError::ZeroBatchSize));

        let mut config = FileConfig::default();
        config.session.max_steps_per_turn = 0;
        assert_eq!(config.validate(&registry), Err(ConfigValidationError::ZeroStepsPerTurn));

        let mut config = FileConfig::default();
        config.session.subtask = "Story Retelling".to_string();
        let err = config.validate(&registry).unwrap_err();
        assert!(err.to_string().contains("Vocabulary Awareness"));
    }
}

//! Role-based model configuration from TOML (`[models]` section)

use super::ConfigValidationError;
use lexiquest_domain::{Model, ModelConfig};
use serde::{Deserialize, Serialize};

/// Role-based model configuration from TOML
///
/// # Example
///
/// ```toml
/// [models]
/// narrator = "gpt-4o"        # Story and survey dialogue
/// manager = "gpt-4o-mini"    # Routing decisions
/// challenge = "gpt-4o"       # Challenge generation
/// assessor = "gpt-4o-mini"   # Extraction and evaluation
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    pub narrator: Option<String>,
    pub manager: Option<String>,
    pub challenge: Option<String>,
    pub assessor: Option<String>,
}

impl FileModelsConfig {
    fn parse(field: &'static str, value: Option<&String>) -> Result<Option<Model>, ConfigValidationError> {
        match value {
            None => Ok(None),
            Some(name) => name
                .parse::<Model>()
                .map(Some)
                .map_err(|_| ConfigValidationError::EmptyModelName { field }),
        }
    }

    /// Resolve into a [`ModelConfig`], keeping defaults for unset roles.
    pub fn to_model_config(&self) -> Result<ModelConfig, ConfigValidationError> {
        let mut config = ModelConfig::default();
        if let Some(model) = Self::parse("narrator", self.narrator.as_ref())? {
            config = config.with_narrator(model);
        }
        if let Some(model) = Self::parse("manager", self.manager.as_ref())? {
            config = config.with_manager(model);
        }
        if let Some(model) = Self::parse("challenge", self.challenge.as_ref())? {
            config = config.with_challenge(model);
        }
        if let Some(model) = Self::parse("assessor", self.assessor.as_ref())? {
            config = config.with_assessor(model);
        }
        Ok(config)
    }

    /// Set every role to `model` (the `--model` override).
    pub fn override_all(&mut self, model: &str) {
        for role in [
            &mut self.narrator,
            &mut self.manager,
            &mut self.challenge,
            &mut self.assessor,
        ] {
            *role = Some(model.to_string());
        }
    }
}

//! Role-based model configuration.
//!
//! [`ModelConfig`] groups the model selections for the session actors.
//! This is a static value object; once created, models don't change at runtime.

use super::actor::Actor;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Role-based model configuration.
///
/// - **Narrator**: story and survey dialogue, the only user-facing voice
/// - **Manager**: routing decisions (cheap, structured output)
/// - **Challenge**: challenge item generation
/// - **Assessor**: extraction and evaluation of responses
///
/// # Example
///
/// ```
/// use lexiquest_domain::agent::model_config::ModelConfig;
/// use lexiquest_domain::Model;
///
/// let config = ModelConfig::default().with_assessor(Model::Gpt4o);
///
/// assert_eq!(config.assessor, Model::Gpt4o);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub narrator: Model,
    pub manager: Model,
    pub challenge: Model,
    pub assessor: Model,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            narrator: Model::Gpt4oMini,
            manager: Model::Gpt4oMini,
            challenge: Model::Gpt4oMini,
            assessor: Model::Gpt4oMini,
        }
    }
}

impl ModelConfig {
    // ==================== Builder Methods ====================

    pub fn with_narrator(mut self, model: Model) -> Self {
        self.narrator = model;
        self
    }

    pub fn with_manager(mut self, model: Model) -> Self {
        self.manager = model;
        self
    }

    pub fn with_challenge(mut self, model: Model) -> Self {
        self.challenge = model;
        self
    }

    pub fn with_assessor(mut self, model: Model) -> Self {
        self.assessor = model;
        self
    }

    /// Same model for every role.
    pub fn uniform(model: Model) -> Self {
        Self {
            narrator: model.clone(),
            manager: model.clone(),
            challenge: model.clone(),
            assessor: model,
        }
    }

    /// Model used by `actor`; actors without a model of their own fall
    /// back to the manager's.
    pub fn for_actor(&self, actor: Actor) -> &Model {
        match actor {
            Actor::Narrator => &self.narrator,
            Actor::ChallengeSetter => &self.challenge,
            Actor::Assessor => &self.assessor,
            _ => &self.manager,
        }
    }
}

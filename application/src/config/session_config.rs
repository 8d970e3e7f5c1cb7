//! Session parameters: orchestrator loop control.
//!
//! [`SessionConfig`] groups the static parameters the orchestrator needs
//! for every exchange. These are application-layer concerns, not domain
//! policy.

use lexiquest_domain::SurveyProfile;
use lexiquest_domain::assessment::VocabularyAwareness;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed reply when the content check fails.
pub const DEFAULT_REFUSAL: &str = "Sorry, your input was not appropriate. Please try again.";

/// Fixed reply once the story has been closed.
pub const DEFAULT_ENDED: &str = "The story has ended. Thanks for playing! Start a new story with /reset.";

/// Orchestrator loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Registry key of the subtask to assess.
    pub subtask: String,
    /// Items requested per challenge-setter run.
    pub challenges_per_batch: usize,
    /// Orchestration steps allowed per human exchange before the narrator
    /// is forced to speak.
    pub max_steps_per_turn: usize,
    pub refusal_message: String,
    pub ended_message: String,
    /// Known profile; skips the survey dialogue when set.
    pub survey_profile: Option<SurveyProfile>,
    /// Limit for a single generation call.
    pub generation_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            subtask: VocabularyAwareness::KEY.to_string(),
            challenges_per_batch: 5,
            max_steps_per_turn: 4,
            refusal_message: DEFAULT_REFUSAL.to_string(),
            ended_message: DEFAULT_ENDED.to_string(),
            survey_profile: None,
            generation_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl SessionConfig {
    // ==================== Builder Methods ====================

    pub fn with_subtask(mut self, key: impl Into<String>) -> Self {
        self.subtask = key.into();
        self
    }

    pub fn with_challenges_per_batch(mut self, n: usize) -> Self {
        self.challenges_per_batch = n;
        self
    }

    pub fn with_max_steps_per_turn(mut self, n: usize) -> Self {
        self.max_steps_per_turn = n;
        self
    }

    pub fn with_refusal_message(mut self, message: impl Into<String>) -> Self {
        self.refusal_message = message.into();
        self
    }

    pub fn with_ended_message(mut self, message: impl Into<String>) -> Self {
        self.ended_message = message.into();
        self
    }

    pub fn with_survey_profile(mut self, profile: SurveyProfile) -> Self {
        self.survey_profile = Some(profile);
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = SessionConfig::default();
        assert_eq!(config.subtask, "Vocabulary Awareness");
        assert_eq!(config.challenges_per_batch, 5);
        assert_eq!(config.max_steps_per_turn, 4);
        assert!(config.survey_profile.is_none());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_challenges_per_batch(2)
            .with_max_steps_per_turn(6)
            .with_generation_timeout(None);
        assert_eq!(config.challenges_per_batch, 2);
        assert_eq!(config.max_steps_per_turn, 6);
        assert_eq!(config.generation_timeout, None);
    }
}

//! Values actors hand back to the orchestrator.
//!
//! Actors read the session but never write it. Each one returns an
//! [`ActorOutcome`] and the orchestrator applies it with
//! [`SessionState::apply`](super::state::SessionState::apply).

use crate::assessment::scoring::AssessmentState;
use crate::challenge::ChallengeItem;
use crate::survey::SurveyProfile;

/// A narrator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// User-visible text, with any survey end marker removed.
    pub text: String,
    /// Whether this message belongs to the survey transcript.
    pub survey: bool,
    /// The survey ended with this message.
    pub survey_finished: bool,
    /// Profile extracted when the survey ended.
    pub profile: Option<SurveyProfile>,
}

impl Narration {
    pub fn story(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            survey: false,
            survey_finished: false,
            profile: None,
        }
    }
}

/// Items produced by the challenge-setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedChallenges {
    pub items: Vec<ChallengeItem>,
    /// History line describing what happened.
    pub notice: String,
}

/// New assessment namespace after scoring captured responses.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOutcome {
    pub assessment: AssessmentState,
    /// How many of the oldest unassessed responses were scored.
    pub responses_assessed: usize,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorOutcome {
    Narration(Narration),
    ChallengesGenerated(GeneratedChallenges),
    Assessed(AssessmentOutcome),
}

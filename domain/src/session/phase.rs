//! Orchestrator phase machine.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session stands between and during exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// The narrator is still running the interest survey.
    #[default]
    AwaitingSurvey,
    /// Free storytelling.
    Narrating,
    /// A challenge item was dequeued and handed to the narrator.
    DeliveringChallenge,
    /// The narrator presented a challenge; the next human turn is the answer.
    AwaitingChallengeResponse,
    /// Captured responses are being extracted, evaluated and scored.
    Assessing,
    /// Assessment feedback is waiting to be consumed by the narrator.
    ReviewingFeedback,
    /// Nothing more runs in this exchange. Permanent once the session ended.
    Terminated,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::AwaitingSurvey => "awaiting_survey",
            SessionPhase::Narrating => "narrating",
            SessionPhase::DeliveringChallenge => "delivering_challenge",
            SessionPhase::AwaitingChallengeResponse => "awaiting_challenge_response",
            SessionPhase::Assessing => "assessing",
            SessionPhase::ReviewingFeedback => "reviewing_feedback",
            SessionPhase::Terminated => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Terminated)
    }

    /// Edges of the phase machine. Every non-terminal phase may stay where
    /// it is or terminate; leaving `Terminated` goes through
    /// [`SessionState::resume`](super::state::SessionState::resume).
    pub fn can_transition_to(&self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        if self.is_terminal() {
            return false;
        }
        if next == *self || next == Terminated {
            return true;
        }
        matches!(
            (self, next),
            (AwaitingSurvey, Narrating)
                | (Narrating, DeliveringChallenge)
                | (Narrating, Assessing)
                | (Narrating, ReviewingFeedback)
                | (DeliveringChallenge, AwaitingChallengeResponse)
                | (AwaitingChallengeResponse, DeliveringChallenge)
                | (AwaitingChallengeResponse, Assessing)
                | (Assessing, ReviewingFeedback)
                | (ReviewingFeedback, Narrating)
                | (ReviewingFeedback, DeliveringChallenge)
        )
    }

    pub fn transition(&mut self, next: SessionPhase) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            return Err(DomainError::IllegalTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Actors that take part in a session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn or is scheduled to produce the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The respondent.
    Human,
    /// Content check on inbound human turns.
    Alignment,
    /// Routing decision source consulted by the orchestrator.
    Manager,
    /// Tells the story and runs the survey.
    Narrator,
    /// Generates challenge items.
    ChallengeSetter,
    /// Extracts, evaluates and scores responses.
    Assessor,
    /// Fixed messages emitted by the orchestrator itself.
    System,
}

impl Actor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Human => "human",
            Actor::Alignment => "alignment",
            Actor::Manager => "manager",
            Actor::Narrator => "narrator",
            Actor::ChallengeSetter => "challenge_setter",
            Actor::Assessor => "assessor",
            Actor::System => "system",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Actor::Human => "You",
            Actor::Alignment => "Alignment Agent",
            Actor::Manager => "Manager Agent",
            Actor::Narrator => "Narrative Agent",
            Actor::ChallengeSetter => "Challenge Agent",
            Actor::Assessor => "Assessment Agent",
            Actor::System => "LexiQuest",
        }
    }

    /// Whether this actor's output is shown to the respondent.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Actor::Narrator | Actor::Alignment | Actor::System)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing() {
        assert!(Actor::Narrator.is_user_facing());
        assert!(!Actor::ChallengeSetter.is_user_facing());
        assert!(!Actor::Assessor.is_user_facing());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&Actor::ChallengeSetter).unwrap(),
            "\"challenge_setter\""
        );
        assert_eq!(Actor::Assessor.to_string(), "assessor");
    }
}

//! Generation-based routing decisions.

use crate::agent::actor::Actor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task assigned when the manager's answer cannot be used.
pub const FALLBACK_TASK: &str = "Continue the story";

/// Actor names the manager may choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAgent {
    NarrativeAgent,
    ChallengeAgent,
}

impl NextAgent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAgent::NarrativeAgent => "narrative_agent",
            NextAgent::ChallengeAgent => "challenge_agent",
        }
    }

    pub fn actor(&self) -> Actor {
        match self {
            NextAgent::NarrativeAgent => Actor::Narrator,
            NextAgent::ChallengeAgent => Actor::ChallengeSetter,
        }
    }
}

impl fmt::Display for NextAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `{"next_agent": ..., "task": ...}` as returned by the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub next_agent: NextAgent,
    #[serde(default)]
    pub task: String,
}

impl RoutingDecision {
    pub fn new(next_agent: NextAgent, task: impl Into<String>) -> Self {
        Self {
            next_agent,
            task: task.into(),
        }
    }

    /// The decision used whenever the manager's output is unusable.
    pub fn fallback() -> Self {
        Self::new(NextAgent::NarrativeAgent, FALLBACK_TASK)
    }

    /// Fill in a blank task so the chosen actor always has instructions.
    pub fn normalized(mut self) -> Self {
        if self.task.trim().is_empty() {
            self.task = match self.next_agent {
                NextAgent::NarrativeAgent => FALLBACK_TASK.to_string(),
                NextAgent::ChallengeAgent => "Create challenges based on the story".to_string(),
            };
        }
        self
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.next_agent, self.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision() {
        let decision: RoutingDecision =
            serde_json::from_str(r#"{"next_agent": "challenge_agent", "task": "Make triplets"}"#)
                .unwrap();
        assert_eq!(decision.next_agent, NextAgent::ChallengeAgent);
        assert_eq!(decision.next_agent.actor(), Actor::ChallengeSetter);
    }

    #[test]
    fn test_unknown_agent_rejected() {
        assert!(
            serde_json::from_str::<RoutingDecision>(r#"{"next_agent": "assessor", "task": "x"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_fallback() {
        let decision = RoutingDecision::fallback();
        assert_eq!(decision.next_agent, NextAgent::NarrativeAgent);
        assert_eq!(decision.task, "Continue the story");
    }

    #[test]
    fn test_normalized_fills_blank_task() {
        let decision: RoutingDecision =
            serde_json::from_str(r#"{"next_agent": "narrative_agent"}"#).unwrap();
        assert_eq!(decision.normalized().task, FALLBACK_TASK);
    }
}

//! Session domain entities

use crate::agent::actor::Actor;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message sent to the generation service (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One utterance in a session transcript, tagged with who produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub actor: Actor,
    pub content: String,
}

impl Turn {
    pub fn new(actor: Actor, content: impl Into<String>) -> Self {
        Self {
            actor,
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Actor::Human, content)
    }

    pub fn is_human(&self) -> bool {
        self.actor == Actor::Human
    }

    /// The message this turn becomes when replayed to the model.
    pub fn to_message(&self) -> Message {
        if self.is_human() {
            Message::user(&self.content)
        } else {
            Message::assistant(&self.content)
        }
    }
}

/// Render turns as model messages, oldest first.
pub fn to_messages(turns: &[Turn]) -> Vec<Message> {
    turns.iter().map(Turn::to_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_roles() {
        assert_eq!(Turn::human("hi").to_message().role, Role::User);
        assert_eq!(
            Turn::new(Actor::Narrator, "Once upon a time").to_message(),
            Message::assistant("Once upon a time")
        );
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn::new(Actor::ChallengeSetter, "ok");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["actor"], "challenge_setter");
        let back: Turn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }
}

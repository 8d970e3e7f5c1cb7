//! Port for the session transcript.
//!
//! `tracing` carries the human-readable diagnostics. This port records what
//! happened in a session as typed events with a JSON payload, so a run can
//! be replayed or analysed offline.

use serde_json::Value;
use std::fmt;

/// What a transcript event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    HumanTurn,
    Refusal,
    SurveyFinished,
    RoutingDecision,
    ChallengesGenerated,
    ChallengeDelivered,
    ItemAssessed,
    SessionEnded,
    Checkpoint,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::HumanTurn => "human_turn",
            EventKind::Refusal => "refusal",
            EventKind::SurveyFinished => "survey_finished",
            EventKind::RoutingDecision => "routing_decision",
            EventKind::ChallengesGenerated => "challenges_generated",
            EventKind::ChallengeDelivered => "challenge_delivered",
            EventKind::ItemAssessed => "item_assessed",
            EventKind::SessionEnded => "session_ended",
            EventKind::Checkpoint => "checkpoint",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry. The adapter adds the timestamp when it writes.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Sink for transcript events.
///
/// Writing is synchronous and cannot fail from the caller's point of view:
/// a broken log never interrupts a story.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::HumanTurn.as_str(), "human_turn");
        assert_eq!(EventKind::ItemAssessed.to_string(), "item_assessed");
    }
}

//! Domain layer for LexiQuest
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Story session
//!
//! A session interleaves a co-created story with an adaptive vocabulary
//! assessment. The orchestrator picks one actor per step (narrator,
//! challenge-setter or assessor) and applies what it returns to the
//! [`SessionState`].
//!
//! ## Assessment
//!
//! - **Subtask**: a pluggable assessment variant resolved through the
//!   [`SubtaskRegistry`]
//! - **Fidelity filter**: keeps only answers grounded in the raw response
//! - **Basal / ceiling**: stopping rules applied by the [`ScoringEngine`]

pub mod agent;
pub mod assessment;
pub mod challenge;
pub mod core;
pub mod orchestration;
pub mod prompt;
pub mod session;
pub mod survey;

// Re-export commonly used types
pub use agent::{actor::Actor, model_config::ModelConfig};
pub use assessment::{
    AssessedItem, AssessmentState, ErrorCategory, EvaluatedAnswer, ExtractedAnswer,
    ItemEvaluation, ItemScore, ScoreSummary, ScoreUpdate, ScoringEngine, SubtaskHandler,
    SubtaskRegistry, VocabularyAwareness,
};
pub use challenge::{
    ChallengeItem, ChallengeKind, ChallengeQueue, InferentialVocabularyChallenge, PairKey,
    Pairing, PhonemicChallenge, TripletChallenge,
};
pub use core::{error::DomainError, model::Model};
pub use orchestration::{ChallengeFlow, NextAgent, RoutingDecision, handle_challenge_flow};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Message, Role, Turn},
    outcome::{ActorOutcome, AssessmentOutcome, GeneratedChallenges, Narration},
    phase::SessionPhase,
    state::{ChallengeState, InputStatus, NarrativeState, SessionState, UserResponse},
};
pub use survey::{END_MARKER, SurveyProfile, strip_end_marker};

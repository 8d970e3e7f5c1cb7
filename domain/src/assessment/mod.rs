//! Assessment engine: extraction results, fidelity filtering, subtask
//! handlers and scoring.
//!
//! - [`answer`]: extracted and evaluated answers
//! - [`filter`]: grounds extracted pairings in the raw response
//! - [`subtask`]: the [`SubtaskHandler`] contract and [`SubtaskRegistry`]
//! - [`vocabulary`]: the Vocabulary Awareness (triplet) subtask
//! - [`scoring`]: running totals and basal/ceiling flags

pub mod answer;
pub mod filter;
pub mod scoring;
pub mod subtask;
pub mod vocabulary;

pub use answer::{
    AssessedItem, ErrorCategory, EvaluatedAnswer, ExtractedAnswer, ItemEvaluation, ItemScore,
};
pub use filter::filter_pairings;
pub use scoring::{AssessmentState, ScoreSummary, ScoreUpdate, ScoringEngine};
pub use subtask::{HandlerFactory, SubtaskHandler, SubtaskRegistry};
pub use vocabulary::VocabularyAwareness;

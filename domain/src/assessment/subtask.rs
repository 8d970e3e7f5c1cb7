//! Subtask handler contract and the registry that resolves handlers by key.
//!
//! A subtask is one pluggable assessment variant. The handler knows how to
//! prepare the extraction and evaluation inputs for its challenge kind, how
//! to finalize an item's score, and which stopping rules apply. Everything
//! else (calling the model, keeping the running totals) is generic.

use super::answer::{EvaluatedAnswer, ExtractedAnswer, ItemEvaluation};
use super::vocabulary::VocabularyAwareness;
use crate::challenge::{ChallengeItem, ChallengeKind, Pairing};
use crate::core::error::DomainError;
use std::collections::BTreeMap;

/// Capability set of one assessment subtask.
pub trait SubtaskHandler: Send + Sync {
    /// Unique registry key, e.g. `"Vocabulary Awareness"`.
    fn key(&self) -> &'static str;

    /// The challenge kind this subtask generates and scores.
    fn challenge_kind(&self) -> ChallengeKind;

    /// Upper bound of an item's total score.
    fn max_item_score(&self) -> u32;

    /// Number of answers expected per item.
    fn expected_answers(&self) -> usize;

    /// Number of leading items during which the basal rule is evaluated.
    fn basal_window(&self) -> usize {
        4
    }

    /// Description of the challenge format, shown to the challenge-setter.
    fn description(&self) -> &'static str;

    /// System instructions for the extraction call.
    fn extraction_instructions(&self) -> &'static str;

    /// System instructions for the evaluation call.
    fn evaluation_instructions(&self) -> &'static str;

    /// Render the raw respondent text for the extraction call.
    fn format_extraction_input(&self, raw_response: Option<&str>) -> String;

    /// Fidelity filter: keep only answers grounded in the raw response.
    fn filter_extracted_answers(
        &self,
        extracted: &ExtractedAnswer,
        raw_response: Option<&str>,
    ) -> ExtractedAnswer;

    /// Render the filtered answers and the ground-truth item for the
    /// evaluation call.
    fn format_evaluation_input(&self, extracted: &ExtractedAnswer, item: &ChallengeItem) -> String;

    /// Finalize `evaluation` against the answers that were submitted for
    /// it, set its `total_score` and return that score.
    ///
    /// The default implementation aligns verdicts to submitted answers by
    /// pair key. A verdict for a pair the respondent never gave is dropped,
    /// and a submitted pair the evaluator skipped counts as unevaluated.
    /// Each kept verdict carries the submitted pairing, not the model's
    /// copy of it. Expected-but-missing slots are filled with `incomplete`
    /// zeros, so the evaluation never has to arrive with the expected
    /// number of entries.
    fn update_score(&self, submitted: &ExtractedAnswer, evaluation: &mut ItemEvaluation) -> u32 {
        let mut verdicts = std::mem::take(&mut evaluation.evaluations);
        for pairing in &submitted.pairings {
            let matched = pairing.key().and_then(|key| {
                verdicts.iter().position(|verdict| {
                    verdict.evaluated_pairing.as_ref().and_then(Pairing::key) == Some(key.clone())
                })
            });
            let mut answer = match matched {
                Some(index) => verdicts.remove(index),
                None => EvaluatedAnswer::unevaluated(pairing.clone()),
            };
            answer.evaluated_pairing = Some(pairing.clone());
            evaluation.evaluations.push(answer);
        }
        while evaluation.evaluations.len() < self.expected_answers() {
            evaluation.evaluations.push(EvaluatedAnswer::missing());
        }
        for answer in &mut evaluation.evaluations {
            answer.normalize();
        }

        let total = evaluation.sum_scores(self.max_item_score());
        evaluation.total_score = Some(total);
        total
    }

    /// Basal rule over the global score history.
    fn check_basal_rule(&self, scores: &[u32]) -> bool;

    /// Ceiling rule over the global score history.
    fn check_ceiling_rule(&self, scores: &[u32]) -> bool;
}

/// Builds a fresh handler instance.
pub type HandlerFactory = fn() -> Box<dyn SubtaskHandler>;

/// Immutable mapping from subtask key to handler factory.
///
/// Built once (see [`SubtaskRegistry::builtin`]) and passed to whoever
/// needs to resolve handlers. Every lookup produces a new handler.
#[derive(Clone)]
pub struct SubtaskRegistry {
    factories: BTreeMap<&'static str, HandlerFactory>,
}

impl SubtaskRegistry {
    /// Registry of the subtasks shipped with the engine.
    pub fn builtin() -> Self {
        Self::from_factories([(VocabularyAwareness::KEY, VocabularyAwareness::boxed as HandlerFactory)])
    }

    /// Build a registry from explicit `(key, factory)` entries.
    ///
    /// Later entries replace earlier ones with the same key.
    pub fn from_factories(entries: impl IntoIterator<Item = (&'static str, HandlerFactory)>) -> Self {
        Self {
            factories: entries.into_iter().collect(),
        }
    }

    /// Resolve a handler by key. A miss is a fatal configuration error.
    pub fn create(&self, key: &str) -> Result<Box<dyn SubtaskHandler>, DomainError> {
        self.factories
            .get(key.trim())
            .map(|factory| factory())
            .ok_or_else(|| DomainError::UnknownSubtask(key.to_string()))
    }

    /// Resolve the handler registered for a challenge kind, if any.
    pub fn for_kind(&self, kind: ChallengeKind) -> Option<Box<dyn SubtaskHandler>> {
        self.factories
            .values()
            .map(|factory| factory())
            .find(|handler| handler.challenge_kind() == kind)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key.trim())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }
}

impl Default for SubtaskRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for SubtaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtaskRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

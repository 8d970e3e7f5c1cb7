//! Running score bookkeeping and basal/ceiling flags for one subtask run.

use super::answer::AssessedItem;
use super::subtask::SubtaskHandler;
use serde::{Deserialize, Serialize};

/// Cumulative totals for a subtask run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_items: u32,
    pub total_score: u32,
    /// `total_score / (total_items * max_item_score)`, two decimals.
    pub normalized_average: f64,
}

impl ScoreSummary {
    fn recompute(&mut self, max_item_score: u32) {
        let possible = self.total_items * max_item_score;
        self.normalized_average = if possible == 0 {
            0.0
        } else {
            round2(self.total_score as f64 / possible as f64)
        };
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The assessment namespace of the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentState {
    /// Move-backwards flag. Frozen once the basal window has been scored.
    pub basal: bool,
    /// Stop flag, re-evaluated after every item once the window is full.
    pub ceiling: bool,
    pub score_summary: ScoreSummary,
    /// Item totals in the order the items were assessed.
    pub item_total_scores: Vec<u32>,
    /// Append-only record of assessed items.
    pub assessment_history: Vec<AssessedItem>,
}

/// What changed when an item was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreUpdate {
    pub item_score: u32,
    pub basal: bool,
    pub ceiling: bool,
    /// Whether this update flipped the ceiling flag on.
    pub ceiling_reached: bool,
}

/// Applies a subtask's scoring rules to the assessment namespace.
pub struct ScoringEngine<'a> {
    handler: &'a dyn SubtaskHandler,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(handler: &'a dyn SubtaskHandler) -> Self {
        Self { handler }
    }

    /// Record a finalized item: append its total to the score history,
    /// update the running summary and re-check the stopping rules.
    ///
    /// The basal rule is only consulted while the history is shorter than
    /// the handler's basal window; after that the stored flag keeps the
    /// last value it was given. The ceiling rule is consulted every time.
    pub fn record(&self, state: &mut AssessmentState, assessed: AssessedItem) -> ScoreUpdate {
        let max = self.handler.max_item_score();
        let item_score = assessed.total_score().min(max);

        state.item_total_scores.push(item_score);
        state.score_summary.total_items += 1;
        state.score_summary.total_score += item_score;
        state.score_summary.recompute(max);

        if state.item_total_scores.len() < self.handler.basal_window() {
            state.basal = self.handler.check_basal_rule(&state.item_total_scores);
        }

        let was_ceiling = state.ceiling;
        state.ceiling = self.handler.check_ceiling_rule(&state.item_total_scores);

        state.assessment_history.push(assessed);

        ScoreUpdate {
            item_score,
            basal: state.basal,
            ceiling: state.ceiling,
            ceiling_reached: state.ceiling && !was_ceiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::answer::{
        EvaluatedAnswer, ExtractedAnswer, ItemEvaluation, ItemScore,
    };
    use crate::assessment::vocabulary::VocabularyAwareness;
    use crate::challenge::{ChallengeItem, ChallengeKind, Pairing};

    fn assessed(score: u32) -> AssessedItem {
        let verdict = |correct: bool| EvaluatedAnswer {
            evaluated_pairing: Some(Pairing::new("dog", "cat", "animals")),
            pair_is_valid: correct,
            justification_is_valid: correct,
            score: if correct {
                ItemScore::Correct
            } else {
                ItemScore::Incorrect
            },
            error_category: Default::default(),
            reasoning: String::new(),
        };
        let mut evaluation =
            ItemEvaluation::new(vec![verdict(score >= 1), verdict(score >= 2)]);
        evaluation.total_score = Some(score);
        AssessedItem {
            item: ChallengeItem::example(ChallengeKind::Triplet),
            response: Some("dog and cat".to_string()),
            extracted: ExtractedAnswer::default(),
            evaluation,
        }
    }

    fn run(scores: &[u32]) -> (AssessmentState, Vec<ScoreUpdate>) {
        let handler = VocabularyAwareness;
        let engine = ScoringEngine::new(&handler);
        let mut state = AssessmentState::default();
        let updates = scores
            .iter()
            .map(|s| engine.record(&mut state, assessed(*s)))
            .collect();
        (state, updates)
    }

    #[test]
    fn test_perfect_first_item() {
        let (state, updates) = run(&[2]);
        assert_eq!(updates[0].item_score, 2);
        assert!(!state.basal);
        assert!(!state.ceiling);
        assert_eq!(state.score_summary.total_items, 1);
        assert_eq!(state.score_summary.total_score, 2);
        assert_eq!(state.score_summary.normalized_average, 1.0);
        assert_eq!(state.assessment_history.len(), 1);
    }

    #[test]
    fn test_basal_tracks_last_score_inside_window() {
        let (_, updates) = run(&[2, 1, 2]);
        let basal: Vec<bool> = updates.iter().map(|u| u.basal).collect();
        assert_eq!(basal, vec![false, true, false]);
    }

    #[test]
    fn test_basal_freezes_after_window() {
        // Third item leaves basal true; from the fourth item on it is frozen.
        let (state, updates) = run(&[2, 2, 1, 2, 2, 2]);
        let basal: Vec<bool> = updates.iter().map(|u| u.basal).collect();
        assert_eq!(basal, vec![false, false, true, true, true, true]);
        assert!(state.basal);

        let (state, _) = run(&[2, 2, 2, 0, 0, 0]);
        assert!(!state.basal);
    }

    #[test]
    fn test_ceiling_fires_exactly_at_eighth_zero() {
        let (state, updates) = run(&[0; 8]);
        for update in &updates[..7] {
            assert!(!update.ceiling);
        }
        assert!(updates[7].ceiling);
        assert!(updates[7].ceiling_reached);
        assert!(state.ceiling);
        assert_eq!(state.score_summary.normalized_average, 0.0);
    }

    #[test]
    fn test_ceiling_reevaluated_each_item() {
        let (_, updates) = run(&[0, 0, 0, 0, 0, 0, 2, 2, 2]);
        assert!(updates[7].ceiling);
        assert!(!updates[8].ceiling);
        assert!(!updates[8].ceiling_reached);
    }

    #[test]
    fn test_normalized_average_rounds() {
        let (state, _) = run(&[2, 0, 0]);
        assert_eq!(state.score_summary.total_score, 2);
        assert_eq!(state.score_summary.normalized_average, 0.33);
    }

    #[test]
    fn test_empty_summary_average_is_zero() {
        let summary = ScoreSummary::default();
        assert_eq!(summary.normalized_average, 0.0);
    }
}

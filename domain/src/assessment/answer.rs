//! Extracted and evaluated respondent answers.

use crate::challenge::{ChallengeItem, Pairing};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Score of a single evaluated pairing: 1 when both the pair and the
/// justification hold, otherwise 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemScore {
    #[default]
    Incorrect,
    Correct,
}

impl ItemScore {
    pub fn value(&self) -> u32 {
        match self {
            ItemScore::Incorrect => 0,
            ItemScore::Correct => 1,
        }
    }
}

impl Serialize for ItemScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value())
    }
}

impl<'de> Deserialize<'de> for ItemScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u64::deserialize(deserializer)? {
            0 => Ok(ItemScore::Incorrect),
            1 => Ok(ItemScore::Correct),
            other => Err(serde::de::Error::custom(format!(
                "score must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Why a pairing scored zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    SemanticMismatch,
    JustificationVague,
    OffTopic,
    Incomplete,
    Other,
    #[default]
    None,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::SemanticMismatch => "semantic_mismatch",
            ErrorCategory::JustificationVague => "justification_vague",
            ErrorCategory::OffTopic => "off_topic",
            ErrorCategory::Incomplete => "incomplete",
            ErrorCategory::Other => "other",
            ErrorCategory::None => "none",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pairings claimed by the respondent, as stated in their free text.
///
/// This is also the target shape of the extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    #[serde(default)]
    pub pairings: Vec<Pairing>,
}

impl ExtractedAnswer {
    pub fn new(pairings: Vec<Pairing>) -> Self {
        Self { pairings }
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairings.len()
    }
}

/// Verdict on one submitted pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedAnswer {
    /// The pairing that was judged; `None` for an expected pairing the
    /// respondent never gave.
    #[serde(default)]
    pub evaluated_pairing: Option<Pairing>,
    pub pair_is_valid: bool,
    pub justification_is_valid: bool,
    pub score: ItemScore,
    #[serde(default)]
    pub error_category: ErrorCategory,
    #[serde(default)]
    pub reasoning: String,
}

impl EvaluatedAnswer {
    /// Placeholder for an expected pairing that was never given.
    pub fn missing() -> Self {
        Self {
            evaluated_pairing: None,
            pair_is_valid: false,
            justification_is_valid: false,
            score: ItemScore::Incorrect,
            error_category: ErrorCategory::Incomplete,
            reasoning: "No pairing was given for this slot.".to_string(),
        }
    }

    /// Verdict used when the evaluation call could not be completed.
    pub fn unevaluated(pairing: Pairing) -> Self {
        Self {
            evaluated_pairing: Some(pairing),
            pair_is_valid: false,
            justification_is_valid: false,
            score: ItemScore::Incorrect,
            error_category: ErrorCategory::Other,
            reasoning: "The answer could not be evaluated.".to_string(),
        }
    }

    /// Make the verdict self-consistent.
    ///
    /// A score of 1 needs both the pair and the justification to be valid;
    /// a zero always carries a category and a one never does.
    pub fn normalize(&mut self) {
        if !(self.pair_is_valid && self.justification_is_valid) {
            self.score = ItemScore::Incorrect;
        }
        match self.score {
            ItemScore::Correct => self.error_category = ErrorCategory::None,
            ItemScore::Incorrect => {
                if self.error_category == ErrorCategory::None {
                    self.error_category = ErrorCategory::Other;
                }
            }
        }
    }
}

/// The set of verdicts for one challenge item.
///
/// This is also the target shape of the evaluation call. `total_score` is
/// filled in by the subtask handler once the set is final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEvaluation {
    #[serde(default)]
    pub evaluations: Vec<EvaluatedAnswer>,
    #[serde(default)]
    pub total_score: Option<u32>,
}

impl ItemEvaluation {
    pub fn new(evaluations: Vec<EvaluatedAnswer>) -> Self {
        Self {
            evaluations,
            total_score: None,
        }
    }

    /// Sum of per-pair scores, capped at `max_item_score`.
    pub fn sum_scores(&self, max_item_score: u32) -> u32 {
        self.evaluations
            .iter()
            .map(|e| e.score.value())
            .sum::<u32>()
            .min(max_item_score)
    }
}

/// One assessed challenge item, as appended to the assessment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessedItem {
    pub item: ChallengeItem,
    /// Raw respondent text, `None` when no response was captured.
    pub response: Option<String>,
    pub extracted: ExtractedAnswer,
    pub evaluation: ItemEvaluation,
}

impl AssessedItem {
    pub fn total_score(&self) -> u32 {
        self.evaluation.total_score.unwrap_or(0)
    }
}

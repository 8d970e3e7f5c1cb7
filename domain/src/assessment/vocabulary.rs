//! Vocabulary Awareness subtask (word triplets).

use super::answer::ExtractedAnswer;
use super::filter::filter_pairings;
use super::subtask::SubtaskHandler;
use crate::challenge::item::EXPECTED_PAIRINGS;
use crate::challenge::{ChallengeItem, ChallengeKind, Pairing};

/// Number of trailing items the ceiling rule looks at.
pub const CEILING_WINDOW: usize = 8;

/// Zeros within the ceiling window that end the subtask.
pub const CEILING_ZEROS: usize = 6;

const DESCRIPTION: &str = r#"Each challenge presents a triplet of words (e.g. "dog-cat-bone") and the student is asked to
choose 2 words that go together and justify their choice. For each triplet, the student must
provide 2 pairs with justifications for each.

Exactly one of the three possible pairs must NOT go together, so that the two expected pairs
are unambiguous.

Examples:
dog-cat-bone: (dog, cat), because they are both animals
              (dog, bone), because dogs like bones

light-sun-feather: (light, sun), because the sun produces light
                   (light, feather), because a feather is light / not heavy"#;

const EXTRACTION: &str = r#"You are given a student's response to a Vocabulary Awareness (VA) challenge.

Your task is to extract the word pairs and their justifications exactly as the student stated them.

Rules:
- A student can make at most 2 pairs.
- Only extract pairs present in the student response. Do not add, improve or repeat pairs.
- If the response contains no pairs, return an empty list.

Example:
- Student Response: "I think its dog and cat because they are animals and dog and bone because dogs like bones."
- Output: {"pairings": [
    {"words": ["dog", "cat"], "justification": "they are animals"},
    {"words": ["dog", "bone"], "justification": "dogs like bones"}
  ]}

Respond with ONLY a JSON object of the form {"pairings": [{"words": [a, b], "justification": "..."}]}."#;

const EVALUATION: &str = r#"You are responsible for evaluating student responses to Vocabulary Awareness (VA) challenges.

For each pair in the student response, decide whether the word pair is valid and whether the justification is valid,
given the expected response. A pair is valid only if the relationship is a commonly understood semantic one. Puns,
similar-sounding words, surface similarity or guesses are NOT valid, even if the justification sounds plausible.

If BOTH the pair and the justification are valid, score 1, otherwise score 0. When the score is 0, set error_category
to one of: semantic_mismatch, justification_vague, off_topic, incomplete, other. When the score is 1, set it to none.
Always explain your decision in reasoning.

Only evaluate the pairs present in the student response. Do not add or repeat evaluations.

Example:
- Triplet: (light, sun, feather)
- Student Response:
    (light, sun): light comes from sun
    (light, feather): feathers are light
- Expected Response:
    (light, sun): because sun gives light / both are bright
    (light, feather): because feather is light / not heavy
- Output: {"evaluations": [
    {"evaluated_pairing": {"words": ["light", "sun"], "justification": "light comes from sun"},
     "pair_is_valid": true, "justification_is_valid": true, "score": 1, "error_category": "none",
     "reasoning": "The sun is a source of light."},
    {"evaluated_pairing": {"words": ["light", "feather"], "justification": "feathers are light"},
     "pair_is_valid": true, "justification_is_valid": true, "score": 1, "error_category": "none",
     "reasoning": "Feathers are not heavy."}
  ]}

Respond with ONLY a JSON object of that form."#;

/// Triplet subtask: two pairings per item, scored 0..=2.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyAwareness;

impl VocabularyAwareness {
    pub const KEY: &'static str = "Vocabulary Awareness";

    pub fn boxed() -> Box<dyn SubtaskHandler> {
        Box::new(Self)
    }
}

fn pairing_lines(pairings: &[Pairing]) -> String {
    if pairings.is_empty() {
        return "(no pairs given)".to_string();
    }
    pairings
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl SubtaskHandler for VocabularyAwareness {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn challenge_kind(&self) -> ChallengeKind {
        ChallengeKind::Triplet
    }

    fn max_item_score(&self) -> u32 {
        EXPECTED_PAIRINGS as u32
    }

    fn expected_answers(&self) -> usize {
        EXPECTED_PAIRINGS
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn extraction_instructions(&self) -> &'static str {
        EXTRACTION
    }

    fn evaluation_instructions(&self) -> &'static str {
        EVALUATION
    }

    fn format_extraction_input(&self, raw_response: Option<&str>) -> String {
        format!("Student Response: {}", raw_response.unwrap_or("").trim())
    }

    fn filter_extracted_answers(
        &self,
        extracted: &ExtractedAnswer,
        raw_response: Option<&str>,
    ) -> ExtractedAnswer {
        filter_pairings(extracted, raw_response.unwrap_or(""), EXPECTED_PAIRINGS)
    }

    fn format_evaluation_input(&self, extracted: &ExtractedAnswer, item: &ChallengeItem) -> String {
        let (triplet, expected) = match item.as_triplet() {
            Some(t) => (t.triplet.join(", "), pairing_lines(&t.pairings)),
            None => (item.label(), String::new()),
        };
        format!(
            "Triplet: ({})\n\nStudent Response:\n{}\n\nExpected Response:\n{}",
            triplet,
            pairing_lines(&extracted.pairings),
            expected
        )
    }

    /// True while the most recent item was not perfect. Only meaningful
    /// inside the basal window; the engine stops asking after that.
    fn check_basal_rule(&self, scores: &[u32]) -> bool {
        match scores.last() {
            Some(last) if scores.len() < self.basal_window() => *last < self.max_item_score(),
            _ => false,
        }
    }

    /// Six zeros within the last eight items.
    fn check_ceiling_rule(&self, scores: &[u32]) -> bool {
        if scores.len() < CEILING_WINDOW {
            return false;
        }
        scores[scores.len() - CEILING_WINDOW..]
            .iter()
            .filter(|s| **s == 0)
            .count()
            >= CEILING_ZEROS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basal_rule() {
        let va = VocabularyAwareness;
        assert!(!va.check_basal_rule(&[]));
        assert!(!va.check_basal_rule(&[2]));
        assert!(va.check_basal_rule(&[2, 1]));
        assert!(va.check_basal_rule(&[2, 2, 0]));
        // Outside the window the rule reports false; the engine keeps the
        // previous flag instead of asking.
        assert!(!va.check_basal_rule(&[0, 0, 0, 0]));
    }

    #[test]
    fn test_ceiling_rule() {
        let va = VocabularyAwareness;
        assert!(!va.check_ceiling_rule(&[0; 7]));
        assert!(va.check_ceiling_rule(&[0; 8]));
        assert!(va.check_ceiling_rule(&[2, 2, 0, 0, 0, 0, 0, 0]));
        assert!(!va.check_ceiling_rule(&[2, 2, 2, 0, 0, 0, 0, 0]));
        // Only the trailing eight count.
        assert!(!va.check_ceiling_rule(&[0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0]));
        assert!(va.check_ceiling_rule(&[2, 2, 2, 0, 0, 0, 0, 0, 1, 0]));
    }

    #[test]
    fn test_format_extraction_input_handles_missing_response() {
        let va = VocabularyAwareness;
        assert_eq!(va.format_extraction_input(None), "Student Response: ");
        assert_eq!(
            va.format_extraction_input(Some("  dog and cat ")),
            "Student Response: dog and cat"
        );
    }

    #[test]
    fn test_format_evaluation_input() {
        let va = VocabularyAwareness;
        let item = ChallengeItem::example(ChallengeKind::Triplet);
        let extracted = ExtractedAnswer::new(vec![Pairing::new("dog", "cat", "they're animals")]);
        let text = va.format_evaluation_input(&extracted, &item);
        assert!(text.starts_with("Triplet: (dog, cat, bone)"));
        assert!(text.contains("Student Response:\n(dog, cat): they're animals"));
        assert!(text.contains("(dog, bone): because dogs like bones"));
    }

    #[test]
    fn test_filter_without_response_is_empty() {
        let va = VocabularyAwareness;
        let extracted = ExtractedAnswer::new(vec![Pairing::new("dog", "cat", "animals")]);
        assert!(va.filter_extracted_answers(&extracted, None).is_empty());
    }
}

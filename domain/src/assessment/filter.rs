//! Fidelity filter over extracted pairings.
//!
//! The extraction call can return near-duplicates of the same pair or
//! pairs the respondent never stated. The filter keeps only pairings that
//! are grounded in the raw response, one per unordered word pair.

use super::answer::ExtractedAnswer;
use crate::challenge::{PairKey, Pairing};
use crate::core::text::{normalize, token_set};
use std::collections::HashMap;

/// Bonus awarded when the whole justification appears verbatim in the
/// raw response.
pub const LITERAL_MATCH_BONUS: usize = 5;

/// Lexical overlap between a justification and the raw response: the
/// literal-match bonus plus one point per distinct shared token.
pub fn overlap_score(justification: &str, raw_response: &str) -> usize {
    let justification_norm = normalize(justification);
    let raw_norm = normalize(raw_response);

    let bonus = if !justification_norm.is_empty() && raw_norm.contains(&justification_norm) {
        LITERAL_MATCH_BONUS
    } else {
        0
    };

    let raw_tokens = token_set(raw_response);
    let shared = token_set(justification)
        .iter()
        .filter(|t| raw_tokens.contains(*t))
        .count();

    bonus + shared
}

/// Whether both words of `key` occur in the raw response.
fn grounded_in(key: &PairKey, raw_norm: &str) -> bool {
    raw_norm.contains(key.first()) && raw_norm.contains(key.second())
}

/// Filter extracted pairings against the raw response.
///
/// 1. Drop malformed pairings and pairings whose words are absent from
///    the raw response.
/// 2. Collapse pairings that share an unordered word pair, keeping the
///    variant with the highest [`overlap_score`] (first seen on a tie).
/// 3. Keep at most `max_pairs` keys, in the order first stated.
///
/// Applying the filter to its own output returns the same output.
pub fn filter_pairings(
    extracted: &ExtractedAnswer,
    raw_response: &str,
    max_pairs: usize,
) -> ExtractedAnswer {
    let raw_norm = normalize(raw_response);
    if raw_norm.is_empty() {
        return ExtractedAnswer::default();
    }

    let mut order: Vec<PairKey> = Vec::new();
    let mut best: HashMap<PairKey, (usize, &Pairing)> = HashMap::new();

    for pairing in &extracted.pairings {
        let Some(key) = pairing.key() else {
            continue;
        };
        if !grounded_in(&key, &raw_norm) {
            continue;
        }
        let score = overlap_score(&pairing.justification, raw_response);
        match best.get(&key).map(|(existing, _)| score > *existing) {
            Some(false) => {}
            Some(true) => {
                best.insert(key, (score, pairing));
            }
            None => {
                order.push(key.clone());
                best.insert(key, (score, pairing));
            }
        }
    }

    // Truncation keeps the pairs the child stated first, not the
    // highest-scoring ones; a later duplicate only upgrades its slot.
    let pairings = order
        .iter()
        .take(max_pairs)
        .filter_map(|key| best.get(key).map(|(_, p)| (*p).clone()))
        .collect();

    ExtractedAnswer::new(pairings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str =
        "dog and cat because they're animals, and dog and bone because dogs like bones";

    #[test]
    fn test_overlap_literal_bonus() {
        let literal = overlap_score("dogs like bones", SCENARIO_A);
        let paraphrase = overlap_score("canines enjoy bones", SCENARIO_A);
        assert_eq!(literal, LITERAL_MATCH_BONUS + 3);
        assert_eq!(paraphrase, 1);
    }

    #[test]
    fn test_keeps_grounded_pairs() {
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("dog", "cat", "they're animals"),
            Pairing::new("dog", "bone", "dogs like bones"),
        ]);
        let filtered = filter_pairings(&extracted, SCENARIO_A, 2);
        assert_eq!(filtered, extracted);
    }

    #[test]
    fn test_dedupes_by_best_overlap() {
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("dog", "bone", "canines chew"),
            Pairing::new("bone", "dog", "dogs like bones"),
        ]);
        let filtered = filter_pairings(&extracted, SCENARIO_A, 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.pairings[0].justification, "dogs like bones");
    }

    #[test]
    fn test_tie_keeps_first() {
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("dog", "cat", "zebra"),
            Pairing::new("cat", "dog", "giraffe"),
        ]);
        let filtered = filter_pairings(&extracted, SCENARIO_A, 2);
        assert_eq!(filtered.pairings[0].justification, "zebra");
    }

    #[test]
    fn test_drops_invented_pairs() {
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("cat", "bone", "made up"),
            Pairing::new("dog", "dog", "malformed"),
            Pairing::new("dog", "cat", "they're animals"),
        ]);
        let filtered = filter_pairings(&extracted, "dog and cat, they're animals", 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.pairings[0].key(), Pairing::new("cat", "dog", "").key());
    }

    #[test]
    fn test_truncates_to_max_in_stated_order() {
        let raw = "dog cat bone";
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("cat", "bone", "a"),
            Pairing::new("dog", "cat", "b"),
            Pairing::new("dog", "bone", "c"),
        ]);
        let filtered = filter_pairings(&extracted, raw, 2);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.pairings[0].justification, "a");
        assert_eq!(filtered.pairings[1].justification, "b");
    }

    #[test]
    fn test_empty_response_yields_nothing() {
        let extracted = ExtractedAnswer::new(vec![Pairing::new("dog", "cat", "animals")]);
        assert!(filter_pairings(&extracted, "   ", 2).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let extracted = ExtractedAnswer::new(vec![
            Pairing::new("dog", "bone", "canines chew"),
            Pairing::new("dog", "cat", "they're animals"),
            Pairing::new("bone", "dog", "dogs like bones"),
            Pairing::new("cat", "bone", "nothing"),
        ]);
        let once = filter_pairings(&extracted, SCENARIO_A, 2);
        let twice = filter_pairings(&once, SCENARIO_A, 2);
        assert_eq!(once, twice);
        assert!(once.len() <= 2);
    }
}

//! Challenge items and their tagged record encoding.
//!
//! A [`ChallengeItem`] is persisted and exchanged with the model as a plain
//! JSON object carrying a `challenge_type` discriminator plus kind-specific
//! fields:
//!
//! ```json
//! {
//!   "challenge_type": "triplet",
//!   "triplet": ["dog", "cat", "bone"],
//!   "pairings": [
//!     {"words": ["dog", "cat"], "justification": "because they are both animals"},
//!     {"words": ["dog", "bone"], "justification": "because dogs like bones"}
//!   ]
//! }
//! ```
//!
//! Decoding resolves the discriminator through [`ChallengeKind::from_tag`]
//! and then matches exhaustively on the kind, so an unknown tag is a typed
//! [`DomainError::UnknownChallengeType`] rather than a silent default.

use super::pairing::{PairKey, Pairing};
use crate::core::error::DomainError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Field name of the discriminator in the record form.
pub const CHALLENGE_TYPE_FIELD: &str = "challenge_type";

/// Number of words in a vocabulary-awareness triplet.
pub const TRIPLET_SIZE: usize = 3;

/// Number of expected pairings per triplet.
pub const EXPECTED_PAIRINGS: usize = 2;

/// Discriminator for the challenge kinds the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Three words, two expected pairings (Vocabulary Awareness).
    Triplet,
    /// Non-word consonant removal (Phonemic Awareness).
    Phonemic,
    /// Meaning of a word from story context (Inferential Vocabulary).
    InferentialVocabulary,
}

/// Tag spellings accepted on decode, mapped to their kind.
///
/// The first spelling for each kind is the canonical one written on encode.
const KIND_TAGS: &[(&str, ChallengeKind)] = &[
    ("triplet", ChallengeKind::Triplet),
    ("vocabulary awareness", ChallengeKind::Triplet),
    ("phonemic", ChallengeKind::Phonemic),
    ("phonemic awareness", ChallengeKind::Phonemic),
    ("inferential_vocabulary", ChallengeKind::InferentialVocabulary),
    ("inferential vocabulary", ChallengeKind::InferentialVocabulary),
    ("iv", ChallengeKind::InferentialVocabulary),
];

impl ChallengeKind {
    /// Resolve a discriminator string (case-insensitive).
    pub fn from_tag(tag: &str) -> Result<Self, DomainError> {
        let needle = tag.trim().to_lowercase();
        KIND_TAGS
            .iter()
            .find(|(spelling, _)| *spelling == needle)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| DomainError::UnknownChallengeType(tag.to_string()))
    }

    /// Canonical discriminator written on encode.
    pub fn tag(&self) -> &'static str {
        match self {
            ChallengeKind::Triplet => "triplet",
            ChallengeKind::Phonemic => "phonemic",
            ChallengeKind::InferentialVocabulary => "inferential_vocabulary",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChallengeKind::Triplet => "Vocabulary Awareness",
            ChallengeKind::Phonemic => "Phonemic Awareness",
            ChallengeKind::InferentialVocabulary => "Inferential Vocabulary",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Three words and the two pairings expected from the respondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletChallenge {
    pub triplet: Vec<String>,
    pub pairings: Vec<Pairing>,
}

impl TripletChallenge {
    /// Check the structural invariants: three distinct words and exactly two
    /// well-formed pairings drawn from those words.
    ///
    /// Whether the third pair is a non-match is a generation contract and
    /// is not checked here.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.triplet.len() != TRIPLET_SIZE {
            return Err(DomainError::InvalidChallenge(format!(
                "triplet must have {} words, got {}",
                TRIPLET_SIZE,
                self.triplet.len()
            )));
        }
        let words: HashSet<String> = self
            .triplet
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        if words.len() != TRIPLET_SIZE {
            return Err(DomainError::InvalidChallenge(
                "triplet words must be distinct and non-empty".to_string(),
            ));
        }
        if self.pairings.len() != EXPECTED_PAIRINGS {
            return Err(DomainError::InvalidChallenge(format!(
                "triplet needs {} pairings, got {}",
                EXPECTED_PAIRINGS,
                self.pairings.len()
            )));
        }
        let mut seen: HashSet<PairKey> = HashSet::new();
        for pairing in &self.pairings {
            let key = pairing.key().ok_or_else(|| {
                DomainError::InvalidChallenge(format!("malformed pairing {}", pairing))
            })?;
            if !words.contains(key.first()) || !words.contains(key.second()) {
                return Err(DomainError::InvalidChallenge(format!(
                    "pairing {} uses a word outside the triplet",
                    key
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(DomainError::InvalidChallenge(format!(
                    "duplicate pairing {}",
                    key
                )));
            }
        }
        Ok(())
    }

    /// `dog-cat-bone`
    pub fn label(&self) -> String {
        self.triplet.join("-")
    }
}

/// A non-word and its single-consonant-removed form, with phonemic spellings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemicChallenge {
    pub non_word_pair: (String, String),
    pub phonemic_pair: (String, String),
}

/// A vocabulary-in-context question with a fallback forced-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferentialVocabularyChallenge {
    pub a_question: String,
    pub b_question: String,
    pub word_meaning_pair: (String, String),
}

/// A test item presented to the respondent (sum type over challenge kinds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeItem {
    Triplet(TripletChallenge),
    Phonemic(PhonemicChallenge),
    InferentialVocabulary(InferentialVocabularyChallenge),
}

impl ChallengeItem {
    pub fn kind(&self) -> ChallengeKind {
        match self {
            ChallengeItem::Triplet(_) => ChallengeKind::Triplet,
            ChallengeItem::Phonemic(_) => ChallengeKind::Phonemic,
            ChallengeItem::InferentialVocabulary(_) => ChallengeKind::InferentialVocabulary,
        }
    }

    /// Convenience constructor for the triplet kind (unvalidated).
    pub fn triplet(words: [&str; 3], pairings: [Pairing; 2]) -> Self {
        ChallengeItem::Triplet(TripletChallenge {
            triplet: words.iter().map(|w| w.to_string()).collect(),
            pairings: pairings.to_vec(),
        })
    }

    pub fn as_triplet(&self) -> Option<&TripletChallenge> {
        match self {
            ChallengeItem::Triplet(t) => Some(t),
            _ => None,
        }
    }

    /// A representative instance of `kind`, used to show the model the
    /// expected output shape.
    pub fn example(kind: ChallengeKind) -> Self {
        match kind {
            ChallengeKind::Triplet => ChallengeItem::triplet(
                ["dog", "cat", "bone"],
                [
                    Pairing::new("dog", "cat", "because they are both animals"),
                    Pairing::new("dog", "bone", "because dogs like bones"),
                ],
            ),
            ChallengeKind::Phonemic => ChallengeItem::Phonemic(PhonemicChallenge {
                non_word_pair: ("bip".to_string(), "ip".to_string()),
                phonemic_pair: ("bɪp".to_string(), "ɪp".to_string()),
            }),
            ChallengeKind::InferentialVocabulary => {
                ChallengeItem::InferentialVocabulary(InferentialVocabularyChallenge {
                    a_question: "Scott was tumbling off his skateboard. He kept getting hurt. What does tumble mean?".to_string(),
                    b_question: "Does tumble mean to ride or to fall?".to_string(),
                    word_meaning_pair: (
                        "tumble".to_string(),
                        "to fall suddenly, clumsily, or headlong".to_string(),
                    ),
                })
            }
        }
    }

    /// Structural validation for kinds that define invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            ChallengeItem::Triplet(t) => t.validate(),
            ChallengeItem::Phonemic(_) | ChallengeItem::InferentialVocabulary(_) => Ok(()),
        }
    }

    /// Short human-readable label for logs and reports.
    pub fn label(&self) -> String {
        match self {
            ChallengeItem::Triplet(t) => t.label(),
            ChallengeItem::Phonemic(p) => format!("{} / {}", p.non_word_pair.0, p.non_word_pair.1),
            ChallengeItem::InferentialVocabulary(iv) => iv.word_meaning_pair.0.clone(),
        }
    }

    // ==================== Record Encoding ====================

    /// Encode as a tagged key-value record.
    pub fn to_record(&self) -> Value {
        let body = match self {
            ChallengeItem::Triplet(t) => serde_json::to_value(t),
            ChallengeItem::Phonemic(p) => serde_json::to_value(p),
            ChallengeItem::InferentialVocabulary(iv) => serde_json::to_value(iv),
        };
        let mut map = match body {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert(
            CHALLENGE_TYPE_FIELD.to_string(),
            Value::String(self.kind().tag().to_string()),
        );
        Value::Object(map)
    }

    /// Decode a tagged key-value record, validating the result.
    pub fn from_record(record: &Value) -> Result<Self, DomainError> {
        let map = record.as_object().ok_or_else(|| {
            DomainError::InvalidChallenge("challenge record must be an object".to_string())
        })?;
        let tag = map
            .get(CHALLENGE_TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DomainError::InvalidChallenge(format!("missing `{}` field", CHALLENGE_TYPE_FIELD))
            })?;

        let item = match ChallengeKind::from_tag(tag)? {
            ChallengeKind::Triplet => ChallengeItem::Triplet(decode_body(record)?),
            ChallengeKind::Phonemic => ChallengeItem::Phonemic(decode_body(record)?),
            ChallengeKind::InferentialVocabulary => {
                ChallengeItem::InferentialVocabulary(decode_body(record)?)
            }
        };
        item.validate()?;
        Ok(item)
    }
}

fn decode_body<T: DeserializeOwned>(record: &Value) -> Result<T, DomainError> {
    serde_json::from_value(record.clone()).map_err(|e| DomainError::InvalidChallenge(e.to_string()))
}

impl Serialize for ChallengeItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChallengeItem {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Value::deserialize(deserializer)?;
        ChallengeItem::from_record(&record).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ChallengeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeItem::Triplet(t) => {
                write!(f, "Triplet: {}", t.label())?;
                for pairing in &t.pairings {
                    write!(f, "\n  {}", pairing)?;
                }
                Ok(())
            }
            ChallengeItem::Phonemic(p) => write!(
                f,
                "Phonemic: {} -> {} ({} -> {})",
                p.non_word_pair.0, p.non_word_pair.1, p.phonemic_pair.0, p.phonemic_pair.1
            ),
            ChallengeItem::InferentialVocabulary(iv) => write!(
                f,
                "Inferential Vocabulary: {} (meaning: {})",
                iv.word_meaning_pair.0, iv.word_meaning_pair.1
            ),
        }
    }
}

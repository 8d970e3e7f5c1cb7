//! Word pairings: the unit of both expected answers and respondent answers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An unordered pair of words plus the reason they go together.
///
/// `words` is kept as a list on the wire (`{"words": [a, b], "justification": ..}`)
/// because that is what model output looks like. A well-formed pairing has
/// exactly two distinct words; [`Pairing::key`] returns `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub words: Vec<String>,
    #[serde(default)]
    pub justification: String,
}

impl Pairing {
    pub fn new(a: impl Into<String>, b: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            words: vec![a.into(), b.into()],
            justification: justification.into(),
        }
    }

    /// The order-independent identity of this pairing.
    pub fn key(&self) -> Option<PairKey> {
        match self.words.as_slice() {
            [a, b] => PairKey::new(a, b),
            _ => None,
        }
    }
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.words.as_slice() {
            [a, b] => write!(f, "({}, {}): {}", a, b, self.justification),
            words => write!(f, "({}): {}", words.join(", "), self.justification),
        }
    }
}

/// Normalized, unordered word-pair identity.
///
/// Both words are trimmed and lowercased, then stored in sorted order so
/// `(dog, cat)` and `(Cat, dog)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    /// Build a key; `None` when a word is blank or both words are the same.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        if a <= b {
            Some(Self(a, b))
        } else {
            Some(Self(b, a))
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_unordered() {
        let a = Pairing::new("dog", "cat", "animals");
        let b = Pairing::new("Cat", " dog ", "pets");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().unwrap().to_string(), "cat-dog");
    }

    #[test]
    fn test_key_rejects_malformed() {
        assert!(Pairing::new("dog", "dog", "same").key().is_none());
        assert!(Pairing::new("dog", "", "blank").key().is_none());
        let three = Pairing {
            words: vec!["a".into(), "b".into(), "c".into()],
            justification: String::new(),
        };
        assert!(three.key().is_none());
    }

    #[test]
    fn test_display() {
        let p = Pairing::new("dog", "bone", "dogs like bones");
        assert_eq!(p.to_string(), "(dog, bone): dogs like bones");
    }

    #[test]
    fn test_missing_justification_defaults_empty() {
        let p: Pairing = serde_json::from_str(r#"{"words": ["sun", "light"]}"#).unwrap();
        assert_eq!(p.justification, "");
    }
}

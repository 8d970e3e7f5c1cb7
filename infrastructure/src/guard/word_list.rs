//! Block-list content guard
//!
//! Refuses input containing any configured term as a whole word or
//! phrase, ignoring case. Terms are escaped, so they match literally.

use lexiquest_application::ports::content_guard::{ContentGuard, GuardVerdict};
use regex::Regex;
use tracing::debug;

/// Case-insensitive whole-word block list
pub struct WordListGuard {
    pattern: Option<Regex>,
}

impl WordListGuard {
    /// Build a guard from `terms`. Blank terms are ignored; an empty list
    /// allows everything.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))?;
        debug!("Content guard loaded with {} term(s)", alternatives.len());
        Ok(Self {
            pattern: Some(pattern),
        })
    }
}

impl ContentGuard for WordListGuard {
    fn check(&self, text: &str) -> GuardVerdict {
        match self.pattern.as_ref().and_then(|p| p.find(text)) {
            Some(m) => GuardVerdict::Blocked {
                reason: format!("blocked term: {}", m.as_str().to_lowercase()),
            },
            None => GuardVerdict::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_case_insensitive() {
        let guard = WordListGuard::new(&["stupid", "shut up"]).unwrap();
        assert!(!guard.check("That is STUPID!").is_allowed());
        assert!(!guard.check("please shut   up").is_allowed());
        assert!(guard.check("the stupidest joke").is_allowed());
        assert!(guard.check("a happy dolphin").is_allowed());
    }

    #[test]
    fn test_reason_names_term() {
        let guard = WordListGuard::new(&["meanie"]).unwrap();
        assert_eq!(
            guard.check("you Meanie"),
            GuardVerdict::Blocked {
                reason: "blocked term: meanie".to_string()
            }
        );
    }

    #[test]
    fn test_terms_match_literally() {
        let guard = WordListGuard::new(&["a.b"]).unwrap();
        assert!(guard.check("axb").is_allowed());
        assert!(!guard.check("say a.b now").is_allowed());
    }

    #[test]
    fn test_empty_list_allows_everything() {
        let guard = WordListGuard::new::<&str>(&[]).unwrap();
        assert!(guard.check("anything").is_allowed());
        let guard = WordListGuard::new(&["  "]).unwrap();
        assert!(guard.check("anything").is_allowed());
    }
}

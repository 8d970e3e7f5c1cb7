//! Interest survey: end-marker handling and the extracted profile.
//!
//! The narrator runs a short survey before the story starts. It signals
//! completion by ending its final message with [`END_MARKER`], which is
//! never shown to the respondent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker the narrator appends to its last survey message.
pub const END_MARKER: &str = "<END>";

/// Remove every end marker from `text`.
///
/// Returns the cleaned text and whether a marker was present.
pub fn strip_end_marker(text: &str) -> (String, bool) {
    if !text.contains(END_MARKER) {
        return (text.to_string(), false);
    }
    (text.replace(END_MARKER, "").trim_end().to_string(), true)
}

/// Key/value facts about the respondent gathered by the survey
/// (`age`, `interests`, `wants_to_be`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyProfile {
    fields: BTreeMap<String, String>,
}

impl SurveyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from a JSON object; arrays are joined with commas
    /// and null or empty values are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut profile = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                if let Some(text) = flatten(value) {
                    profile.insert(key, text);
                }
            }
        }
        profile
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().trim().to_lowercase();
        let value = value.into().trim().to_string();
        if !key.is_empty() && !value.is_empty() {
            self.fields.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Bullet list for prompts, one `- key: value` per line.
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("- {}: {}", k.replace('_', " "), v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SurveyProfile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut profile = Self::new();
        for (k, v) in iter {
            profile.insert(k, v);
        }
        profile
    }
}

fn flatten(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(flatten)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_end_marker() {
        let (text, done) =
            strip_end_marker("You'll be a great astronaut!\n\nOk, now we will begin our story ...<END>");
        assert!(done);
        assert_eq!(
            text,
            "You'll be a great astronaut!\n\nOk, now we will begin our story ..."
        );

        let (text, done) = strip_end_marker("How old are you?");
        assert!(!done);
        assert_eq!(text, "How old are you?");
    }

    #[test]
    fn test_profile_from_json() {
        let profile = SurveyProfile::from_json(&json!({
            "age": 7,
            "interests": ["space", "dinosaurs"],
            "Wants_To_Be": "astronaut",
            "favorite_food": null,
            "favorite_book": "  "
        }));
        assert_eq!(profile.get("age"), Some("7"));
        assert_eq!(profile.get("interests"), Some("space, dinosaurs"));
        assert_eq!(profile.get("wants_to_be"), Some("astronaut"));
        assert_eq!(profile.get("favorite_food"), None);
        assert_eq!(profile.get("favorite_book"), None);
    }

    #[test]
    fn test_profile_from_non_object_is_empty() {
        assert!(SurveyProfile::from_json(&json!(["age", 7])).is_empty());
    }

    #[test]
    fn test_describe() {
        let profile: SurveyProfile = [("age", "7"), ("wants_to_be", "astronaut")]
            .into_iter()
            .collect();
        assert_eq!(profile.describe(), "- age: 7\n- wants to be: astronaut");
    }

    #[test]
    fn test_serializes_as_map() {
        let profile: SurveyProfile = [("age", "7")].into_iter().collect();
        assert_eq!(serde_json::to_value(&profile).unwrap(), json!({"age": "7"}));
    }
}

//! Text helpers for parsing free-form model output and respondent text.

use std::collections::BTreeSet;

/// Lowercased alphanumeric tokens of `text`, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Distinct lowercased tokens of `text`.
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Normalize text for case-insensitive substring checks: lowercase and
/// collapse all whitespace runs to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Locate the JSON payload inside a model response.
///
/// Models wrap JSON in markdown fences or surround it with prose. This
/// strips a leading ```` ```json ```` fence when present and otherwise slices
/// from the first opening brace/bracket to the matching last closing one.
pub fn extract_json_block(response: &str) -> Option<&str> {
    let trimmed = response.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    let start = unfenced.find(['{', '['])?;
    let closing = if unfenced[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = unfenced.rfind(closing)?;
    if end < start {
        return None;
    }
    Some(&unfenced[start..=end])
}

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Dogs like bones, don't they?"),
            vec!["dogs", "like", "bones", "don't", "they"]
        );
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  Dog   and\nCat "), "dog and cat");
    }

    #[test]
    fn test_extract_json_fenced() {
        let response = "```json\n{\"next_agent\": \"narrative_agent\"}\n```";
        assert_eq!(
            extract_json_block(response),
            Some("{\"next_agent\": \"narrative_agent\"}")
        );
    }

    #[test]
    fn test_extract_json_with_prose() {
        let response = "Here you go: {\"a\": {\"b\": 1}} hope that helps";
        assert_eq!(extract_json_block(response), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_extract_json_array() {
        assert_eq!(extract_json_block("[1, 2]"), Some("[1, 2]"));
    }

    #[test]
    fn test_extract_json_missing() {
        assert_eq!(extract_json_block("no json here"), None);
        assert_eq!(extract_json_block("} backwards {"), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }
}

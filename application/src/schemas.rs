//! JSON schemas attached to structured generation requests.

use serde_json::{Value, json};

fn pairing() -> Value {
    json!({
        "type": "object",
        "properties": {
            "words": {"type": "array", "items": {"type": "string"}, "minItems": 2, "maxItems": 2},
            "justification": {"type": "string"}
        },
        "required": ["words", "justification"]
    })
}

/// `{"next_agent": "narrative_agent" | "challenge_agent", "task": string}`
pub fn routing_decision() -> Value {
    json!({
        "type": "object",
        "properties": {
            "next_agent": {"type": "string", "enum": ["narrative_agent", "challenge_agent"]},
            "task": {"type": "string"}
        },
        "required": ["next_agent", "task"]
    })
}

/// `{"pairings": [pairing]}` with at most `max_pairs` entries.
pub fn extracted_answer(max_pairs: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "pairings": {"type": "array", "items": pairing(), "maxItems": max_pairs}
        },
        "required": ["pairings"]
    })
}

/// `{"evaluations": [evaluated answer]}`
pub fn item_evaluation() -> Value {
    json!({
        "type": "object",
        "properties": {
            "evaluations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "evaluated_pairing": pairing(),
                        "pair_is_valid": {"type": "boolean"},
                        "justification_is_valid": {"type": "boolean"},
                        "score": {"type": "integer", "enum": [0, 1]},
                        "error_category": {
                            "type": "string",
                            "enum": ["semantic_mismatch", "justification_vague", "off_topic", "incomplete", "other", "none"]
                        },
                        "reasoning": {"type": "string"}
                    },
                    "required": ["evaluated_pairing", "pair_is_valid", "justification_is_valid", "score", "error_category", "reasoning"]
                }
            }
        },
        "required": ["evaluations"]
    })
}

/// Flat object of survey facts.
pub fn survey_profile() -> Value {
    json!({
        "type": "object",
        "additionalProperties": {"type": ["string", "number", "array"]}
    })
}

/// A challenge record shaped like `example`.
pub fn challenge_record(example: &Value) -> Value {
    let required: Vec<&String> = example
        .as_object()
        .map(|map| map.keys().collect())
        .unwrap_or_default();
    json!({
        "type": "object",
        "required": required
    })
}

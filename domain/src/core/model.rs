//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Available LLM models (Value Object)
///
/// Known models are the ones the story engine has been tuned against.
/// Anything else is carried through as [`Model::Custom`] and handed to the
/// provider unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Model {
    // OpenAI models
    #[default]
    Gpt4oMini,
    Gpt4o,
    Gpt35Turbo,
    // Google models (OpenAI-compatible endpoint)
    Gemini20Flash,
    // Local models (Ollama)
    Gemma3,
    Llama32,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemma3 => "gemma3",
            Model::Llama32 => "llama3.2",
            Model::Custom(s) => s,
        }
    }

    /// Check if this model is typically served by a local Ollama instance
    pub fn is_local(&self) -> bool {
        matches!(self, Model::Gemma3 | Model::Llama32)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("model name cannot be empty".to_string());
        }
        Ok(match trimmed {
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4o" => Model::Gpt4o,
            "gpt-3.5-turbo" => Model::Gpt35Turbo,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemma3" => Model::Gemma3,
            "llama3.2" => Model::Llama32,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_models() {
        assert_eq!("gpt-4o-mini".parse::<Model>().unwrap(), Model::Gpt4oMini);
        assert_eq!("gemma3".parse::<Model>().unwrap(), Model::Gemma3);
        assert_eq!(
            "gemini-2.0-flash".parse::<Model>().unwrap(),
            Model::Gemini20Flash
        );
    }

    #[test]
    fn test_parse_custom_model() {
        let model: Model = "mistral-small".parse().unwrap();
        assert_eq!(model, Model::Custom("mistral-small".to_string()));
        assert_eq!(model.to_string(), "mistral-small");
    }

    #[test]
    fn test_parse_empty_rejected() {
        assert!("   ".parse::<Model>().is_err());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&Model::Gemma3).unwrap();
        assert_eq!(json, "\"gemma3\"");
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Model::Gemma3);
        assert!(back.is_local());
    }
}

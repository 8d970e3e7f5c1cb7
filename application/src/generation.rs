//! Structured generation service.
//!
//! Every model call in a session goes through [`GenerationService`]. A
//! [`GenerationRequest`] names the model, the system prompt, the message
//! sequence and optionally a target JSON schema. Structured calls return
//! either the parsed value or a [`StructuredOutputError`], and every call
//! site decides its own fallback.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, ResponseFormat};
use lexiquest_domain::core::text::{extract_json_block, truncate};
use lexiquest_domain::{Message, Model};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a structured generation call.
#[derive(Error, Debug)]
pub enum StructuredOutputError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Could not parse model output: {message}")]
    Parse { message: String, raw: String },
}

impl StructuredOutputError {
    /// Raw model text for parse failures.
    pub fn raw(&self) -> Option<&str> {
        match self {
            StructuredOutputError::Parse { raw, .. } => Some(raw),
            StructuredOutputError::Gateway(_) => None,
        }
    }
}

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: Model,
    pub system: String,
    pub messages: Vec<Message>,
    /// Target JSON schema for structured calls.
    pub schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(model: Model, system: impl Into<String>) -> Self {
        Self {
            model,
            system: system.into(),
            messages: Vec::new(),
            schema: None,
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_user(self, content: impl Into<String>) -> Self {
        self.with_message(Message::user(content))
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// System prompt as sent, with the schema appended for structured calls.
    fn system_prompt(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}\n\nYour output MUST be a single JSON value conforming to this JSON schema:\n{}",
                self.system, schema
            ),
            None => self.system.clone(),
        }
    }
}

/// Sends generation requests through the gateway.
#[derive(Clone)]
pub struct GenerationService {
    gateway: Arc<dyn LlmGateway>,
    timeout: Option<Duration>,
}

impl GenerationService {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Free-text completion.
    pub async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        self.call(request, ResponseFormat::Text).await
    }

    /// Structured completion parsed into `T`.
    pub async fn complete_structured<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> Result<T, StructuredOutputError> {
        let raw = self.call(request, ResponseFormat::JsonObject).await?;
        parse_structured(&raw)
    }

    async fn call(
        &self,
        request: &GenerationRequest,
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(&request.model, &request.system_prompt())
            .await?;

        debug!(
            "Generation call: model={}, messages={}, format={:?}",
            request.model,
            request.messages.len(),
            format
        );

        let call = session.complete(&request.messages, format);
        let text = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)??,
            None => call.await?,
        };

        debug!("Generation reply: {}", truncate(&text, 200));
        Ok(text)
    }
}

/// Parse a model reply into `T`, tolerating fences and surrounding prose.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, StructuredOutputError> {
    let block = extract_json_block(raw).ok_or_else(|| StructuredOutputError::Parse {
        message: "no JSON found in response".to_string(),
        raw: raw.to_string(),
    })?;
    serde_json::from_str(block).map_err(|e| StructuredOutputError::Parse {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGateway;
    use lexiquest_domain::{NextAgent, RoutingDecision};

    #[test]
    fn test_parse_structured_fenced() {
        let decision: RoutingDecision = parse_structured(
            "```json\n{\"next_agent\": \"challenge_agent\", \"task\": \"Make triplets\"}\n```",
        )
        .unwrap();
        assert_eq!(decision.next_agent, NextAgent::ChallengeAgent);
    }

    #[test]
    fn test_parse_structured_failure_keeps_raw() {
        let err = parse_structured::<RoutingDecision>("I think the narrator").unwrap_err();
        assert_eq!(err.raw(), Some("I think the narrator"));

        let err = parse_structured::<RoutingDecision>("{\"next_agent\": 3}").unwrap_err();
        assert!(matches!(err, StructuredOutputError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_complete_structured_appends_schema() {
        let gateway = Arc::new(ScriptedGateway::new([
            r#"{"next_agent": "narrative_agent", "task": "Continue the story"}"#,
        ]));
        let service = GenerationService::new(gateway.clone());
        let request = GenerationRequest::new(Model::default(), "Route.")
            .with_user("hello")
            .with_schema(serde_json::json!({"type": "object"}));

        let decision: RoutingDecision = service.complete_structured(&request).await.unwrap();
        assert_eq!(decision, RoutingDecision::fallback());

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.starts_with("Route."));
        assert!(calls[0].system.contains("JSON schema"));
        assert_eq!(calls[0].format, ResponseFormat::JsonObject);
        assert_eq!(calls[0].messages, vec![Message::user("hello")]);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_typed() {
        let gateway = Arc::new(ScriptedGateway::failing());
        let service = GenerationService::new(gateway);
        let request = GenerationRequest::new(Model::default(), "x");
        let err = service
            .complete_structured::<RoutingDecision>(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, StructuredOutputError::Gateway(_)));
    }
}

//! OpenAI-compatible chat completions gateway
//!
//! Talks to any server exposing `POST {base_url}/v1/chat/completions`:
//! OpenAI, a local Ollama, or another compatible proxy.

use crate::config::FileProviderConfig;
use async_trait::async_trait;
use lexiquest_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, ResponseFormat,
};
use lexiquest_domain::{Message, Model};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings shared by all sessions of one gateway.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl OpenAiCompatConfig {
    pub fn from_file(provider: &FileProviderConfig) -> Self {
        Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.resolve_api_key(),
            temperature: provider.temperature,
            max_tokens: provider.max_tokens,
            timeout: Duration::from_secs(provider.timeout_seconds),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

struct Shared {
    client: reqwest::Client,
    config: OpenAiCompatConfig,
}

/// LLM gateway over an OpenAI-compatible HTTP API
pub struct OpenAiCompatGateway {
    shared: Arc<Shared>,
}

impl OpenAiCompatGateway {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| GatewayError::AuthenticationFailed(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("OpenAI-compatible gateway initialized for {}", config.base_url);

        Ok(Self {
            shared: Arc::new(Shared { client, config }),
        })
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.create_session_with_system_prompt(model, "").await
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiCompatSession {
            shared: Arc::clone(&self.shared),
            model: model.clone(),
            system_prompt: (!system_prompt.is_empty()).then(|| system_prompt.to_string()),
        }))
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(vec![
            Model::Gpt4oMini,
            Model::Gpt4o,
            Model::Gpt35Turbo,
            Model::Gemini20Flash,
            Model::Gemma3,
            Model::Llama32,
        ])
    }
}

/// One stateless conversation context (system prompt + model)
pub struct OpenAiCompatSession {
    shared: Arc<Shared>,
    model: Model,
    system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonMode>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatSession {
    fn request<'a>(&'a self, messages: &'a [Message], format: ResponseFormat) -> ChatRequest<'a> {
        let mut chat = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system_prompt {
            chat.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        chat.extend(messages.iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatRequest {
            model: self.model.as_str(),
            messages: chat,
            temperature: self.shared.config.temperature,
            max_tokens: self.shared.config.max_tokens,
            response_format: match format {
                ResponseFormat::JsonObject => Some(JsonMode {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        }
    }
}

fn status_error(status: StatusCode, body: &str, model: &Model) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::AuthenticationFailed(format!("HTTP {}", status))
        }
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(model.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status, body)),
    }
}

#[async_trait]
impl LlmSession for OpenAiCompatSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.complete(&[Message::user(content)], ResponseFormat::Text)
            .await
    }

    async fn complete(
        &self,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        let body = self.request(messages, format);
        debug!(
            "POST chat completion: model={}, messages={}",
            body.model,
            body.messages.len()
        );

        let response = self
            .shared
            .client
            .post(self.shared.config.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(status_error(status, &text, &self.model));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::RequestFailed(format!("Invalid response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GatewayError::RequestFailed("Missing choices".to_string()))
    }
}

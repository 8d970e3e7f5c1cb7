//! Scripted test doubles shared by the application tests.

use crate::ports::content_guard::{ContentGuard, GuardVerdict};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession, ResponseFormat};
use crate::ports::session_store::{SessionStore, SessionStoreError};
use async_trait::async_trait;
use lexiquest_domain::{Message, Model, SessionState};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One call seen by the scripted gateway.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: Model,
    pub system: String,
    pub messages: Vec<Message>,
    pub format: ResponseFormat,
}

#[derive(Default)]
struct Script {
    replies: VecDeque<String>,
    calls: Vec<RecordedCall>,
}

/// Gateway whose sessions pop canned replies from one shared queue, in
/// call order, and record every request. An empty queue fails the call.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        let gateway = Self::default();
        for reply in replies {
            gateway.push(reply);
        }
        gateway
    }

    /// Gateway that fails every call.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: impl Into<String>) {
        self.script.lock().unwrap().replies.push_back(reply.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().replies.len()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.create_session_with_system_prompt(model, "").await
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(ScriptedSession {
            model: model.clone(),
            system: system_prompt.to_string(),
            script: self.script.clone(),
        }))
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(vec![Model::default()])
    }
}

struct ScriptedSession {
    model: Model,
    system: String,
    script: Arc<Mutex<Script>>,
}

impl ScriptedSession {
    fn answer(&self, messages: &[Message], format: ResponseFormat) -> Result<String, GatewayError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(RecordedCall {
            model: self.model.clone(),
            system: self.system.clone(),
            messages: messages.to_vec(),
            format,
        });
        script
            .replies
            .pop_front()
            .ok_or_else(|| GatewayError::Other("No more responses".to_string()))
    }
}

#[async_trait]
impl LlmSession for ScriptedSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.answer(&[Message::user(content)], ResponseFormat::Text)
    }

    async fn complete(
        &self,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<String, GatewayError> {
        self.answer(messages, format)
    }
}

/// Guard that blocks any text containing one of its words.
pub struct BlockWords(pub Vec<&'static str>);

impl ContentGuard for BlockWords {
    fn check(&self, text: &str) -> GuardVerdict {
        let lower = text.to_lowercase();
        match self.0.iter().find(|w| lower.contains(*w)) {
            Some(word) => GuardVerdict::Blocked {
                reason: format!("blocked term: {}", word),
            },
            None => GuardVerdict::Allowed,
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, SessionState>>,
}

impl MemoryStore {
    pub fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError> {
        Ok(self.get(session_id))
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(state.session_id.clone(), state.clone());
        Ok(())
    }
}

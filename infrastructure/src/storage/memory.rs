//! In-process session store for ephemeral sessions (`--ephemeral`).

use async_trait::async_trait;
use lexiquest_application::ports::session_store::{SessionStore, SessionStoreError};
use lexiquest_domain::SessionState;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps checkpoints in memory for the lifetime of the process
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(state.session_id.clone(), state.clone());
        Ok(())
    }
}

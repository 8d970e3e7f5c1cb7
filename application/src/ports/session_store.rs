//! Session persistence port
//!
//! Sessions are checkpointed after every exchange and loaded before the
//! next one, keyed by session id.

use async_trait::async_trait;
use lexiquest_domain::SessionState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid session id: {0:?}")]
    InvalidId(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a checkpoint; `Ok(None)` when the id is unknown.
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError>;

    /// Write a checkpoint, replacing any previous one for the same id.
    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError>;
}

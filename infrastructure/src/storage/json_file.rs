//! File-backed session checkpoints
//!
//! One pretty-printed JSON file per session under the state directory,
//! written to a temporary sibling and renamed into place.

use async_trait::async_trait;
use lexiquest_application::ports::session_store::{SessionStore, SessionStoreError};
use lexiquest_domain::SessionState;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Session store keeping `<state_dir>/<session_id>.json`
pub struct JsonFileSessionStore {
    dir: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checkpoint path for a session. Ids must be non-empty and use only
    /// `[A-Za-z0-9_-]`, so distinct ids never share a file and none can
    /// escape the state directory.
    pub fn path_for(&self, session_id: &str) -> Result<PathBuf, SessionStoreError> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SessionStoreError::InvalidId(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", session_id)))
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionStoreError> {
        let path = self.path_for(session_id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SessionStoreError::Io(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let state = serde_json::from_str(&content).map_err(|e| {
            SessionStoreError::Serialization(format!("failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded session {} from {}", session_id, path.display());
        Ok(Some(state))
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionStoreError> {
        let path = self.path_for(&state.session_id)?;
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            SessionStoreError::Io(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .await
            .map_err(|e| SessionStoreError::Io(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| SessionStoreError::Io(format!("failed to replace {}: {}", path.display(), e)))?;

        debug!("Checkpointed session {} to {}", state.session_id, path.display());
        Ok(())
    }
}

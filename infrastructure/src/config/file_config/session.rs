//! Session, guard and logging sections.

use lexiquest_application::config::{DEFAULT_ENDED, DEFAULT_REFUSAL};
use lexiquest_domain::VocabularyAwareness;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[session]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Subtask key, resolved through the subtask registry.
    pub subtask: String,
    pub challenges_per_batch: usize,
    pub max_steps_per_turn: usize,
    pub refusal_message: String,
    pub ended_message: String,
    /// Directory for session checkpoints. Defaults to the user data dir.
    pub state_dir: Option<PathBuf>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            subtask: VocabularyAwareness::KEY.to_string(),
            challenges_per_batch: 5,
            max_steps_per_turn: 4,
            refusal_message: DEFAULT_REFUSAL.to_string(),
            ended_message: DEFAULT_ENDED.to_string(),
            state_dir: None,
        }
    }
}

impl FileSessionConfig {
    /// Checkpoint directory: the configured one, else
    /// `$XDG_DATA_HOME/lexiquest/sessions`, else `./.lexiquest/sessions`.
    pub fn resolve_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("lexiquest").join("sessions"))
                .unwrap_or_else(|| PathBuf::from(".lexiquest").join("sessions"))
        })
    }
}

/// Profanity refused when no `[guard]` list is configured.
pub const DEFAULT_BLOCKED_TERMS: &[&str] = &[
    "arse", "arsehole", "ass", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap",
    "cock", "cunt", "damn", "dick", "dickhead", "fuck", "fucked", "fucker", "fucking",
    "motherfucker", "piss", "pissed", "prick", "shit", "shitty", "slut", "twat", "wanker",
    "whore",
];

/// `[guard]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGuardConfig {
    /// Whole words or phrases that cause a refusal. A configured list
    /// replaces the built-in one; `[]` turns the check off.
    pub blocked_terms: Vec<String>,
}

impl Default for FileGuardConfig {
    fn default() -> Self {
        Self {
            blocked_terms: DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation transcript. Disabled when unset.
    pub conversation_log: Option<PathBuf>,
}

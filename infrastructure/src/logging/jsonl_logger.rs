//! JSONL transcript writer for session events.
//!
//! Each [`ConversationEvent`] becomes one JSON line: the payload fields
//! plus `type` and an RFC3339 `timestamp`. The file is opened in append
//! mode so one transcript can span several runs of the same session.

use lexiquest_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL conversation logger.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and
/// on `Drop`.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open (or create) the transcript at `path`, creating parent
    /// directories as needed. Returns `None` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open conversation log {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn record(event: ConversationEvent, timestamp: String) -> Value {
    let mut map = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    map.insert("type".to_string(), Value::String(event.kind.to_string()));
    map.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(map)
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let Ok(line) = serde_json::to_string(&record(event, timestamp)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexiquest_application::ports::conversation_logger::EventKind;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("session.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            EventKind::HumanTurn,
            json!({"session_id": "LQ-chat_1", "exchange": 1, "text": "a dolphin"}),
        ));
        logger.log(ConversationEvent::new(
            EventKind::RoutingDecision,
            json!({"next_agent": "challenge_agent", "fallback": false}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "human_turn");
        assert_eq!(lines[0]["text"], "a dolphin");
        assert_eq!(lines[1]["next_agent"], "challenge_agent");
        let timestamp = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");

        JsonlConversationLogger::open(&path)
            .unwrap()
            .log(ConversationEvent::new(EventKind::Checkpoint, json!({"exchange": 1})));
        JsonlConversationLogger::open(&path)
            .unwrap()
            .log(ConversationEvent::new(EventKind::Checkpoint, json!({"exchange": 2})));

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["exchange"], 2);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let record = record(
            ConversationEvent::new(EventKind::Refusal, json!("blocked")),
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(record["type"], "refusal");
        assert_eq!(record["data"], "blocked");
    }

    #[test]
    fn test_unopenable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file.
        assert!(JsonlConversationLogger::open(dir.path()).is_none());
    }
}

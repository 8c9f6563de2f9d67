use serde::Deserialize;
use tracing::debug;

use crate::models::{LogFile, PiEvent, Session, SourceId};
use crate::normalizer::{Normalizer, TimeSpan};
use crate::project_name::resolve_project_name;

/// Pi Agent logs: cost is reported per assistant message, models and thinking
/// levels come from dedicated change events.
pub struct PiNormalizer {
    anchor: String,
}

impl PiNormalizer {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
        }
    }
}

impl Normalizer for PiNormalizer {
    fn source(&self) -> SourceId {
        SourceId::Pi
    }

    fn normalize(&self, file: &LogFile) -> Session {
        let project = resolve_project_name(&file.project_dir, &self.anchor);
        let mut session = Session::empty(project, file.path.clone());
        let mut span = TimeSpan::default();
        let mut saw_header = false;

        for value in &file.events {
            let event = match PiEvent::deserialize(value) {
                Ok(e) => e,
                Err(e) => {
                    debug!("unrecognized pi event in {}: {}", file.path.display(), e);
                    continue;
                }
            };

            match event {
                PiEvent::Session { timestamp } => {
                    if !saw_header {
                        saw_header = true;
                        session.start_time = timestamp;
                    }
                }
                PiEvent::Message { timestamp, message } => {
                    let timestamped = timestamp.as_deref().map(|ts| span.observe(ts)).unwrap_or(false);

                    match message.role.as_str() {
                        "user" => {
                            session.message_counts.user += 1;
                            if let (true, Some(ts)) = (timestamped, timestamp) {
                                session.user_message_timestamps.push(ts);
                            }
                        }
                        "assistant" => {
                            session.message_counts.assistant += 1;
                            if let Some(usage) = message.usage {
                                session.tokens.input += usage.input;
                                session.tokens.output += usage.output;
                                session.tokens.cache_read += usage.cache_read;
                                session.tokens.cache_write += usage.cache_write;
                                session.cost += usage.cost.map(|c| c.total).unwrap_or(0.0);
                            }
                        }
                        "toolResult" => session.message_counts.tool_result += 1,
                        _ => continue,
                    }
                    session.message_counts.total += 1;
                }
                PiEvent::ModelChange { model_id } => {
                    if let Some(model) = model_id.filter(|m| !m.is_empty()) {
                        session.models.insert(model);
                    }
                }
                PiEvent::ThinkingLevelChange { thinking_level } => {
                    if let Some(level) = thinking_level.filter(|l| !l.is_empty()) {
                        session.thinking_levels.insert(level);
                    }
                }
                PiEvent::Unknown => {}
            }
        }

        session.duration_minutes = span.minutes();
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn log(events: Vec<serde_json::Value>) -> LogFile {
        LogFile {
            project_dir: "--Users-me-Sites-got--".to_string(),
            path: PathBuf::from("/tmp/session.jsonl"),
            events,
        }
    }

    fn message(ts: &str, role: &str) -> serde_json::Value {
        json!({"type": "message", "timestamp": ts, "message": {"role": role, "content": "x"}})
    }

    #[test]
    fn test_basic_session() {
        let file = log(vec![
            json!({"type": "session", "id": "abc", "timestamp": "2025-01-15T10:00:00.000Z", "cwd": "/Users/me/Sites/got"}),
            json!({"type": "model_change", "timestamp": "2025-01-15T10:00:00.500Z", "provider": "anthropic", "modelId": "claude-sonnet-4-5"}),
            json!({"type": "thinking_level_change", "timestamp": "2025-01-15T10:00:00.600Z", "thinkingLevel": "high"}),
            message("2025-01-15T10:00:01.000Z", "user"),
            json!({
                "type": "message",
                "timestamp": "2025-01-15T10:00:02.000Z",
                "message": {
                    "role": "assistant",
                    "model": "ignored-here",
                    "usage": {"input": 100, "output": 50, "cacheRead": 20, "cacheWrite": 10, "cost": {"total": 0.0011}}
                }
            }),
            message("2025-01-15T10:00:03.000Z", "toolResult"),
            json!({
                "type": "message",
                "timestamp": "2025-01-15T10:12:01.000Z",
                "message": {"role": "assistant", "usage": {"input": 5, "cost": {"total": 0.0001}}}
            }),
        ]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.project, "got");
        assert_eq!(s.start_time.as_deref(), Some("2025-01-15T10:00:00.000Z"));
        assert_eq!(s.message_counts.total, 4);
        assert_eq!(s.message_counts.user, 1);
        assert_eq!(s.message_counts.assistant, 2);
        assert_eq!(s.message_counts.tool_result, 1);
        assert_eq!(s.tokens.input, 105);
        assert_eq!(s.tokens.output, 50);
        assert_eq!(s.tokens.cache_read, 20);
        assert_eq!(s.tokens.cache_write, 10);
        assert!((s.cost - 0.0012).abs() < 1e-9);
        assert!((s.duration_minutes - 12.0).abs() < 1e-9);
        assert_eq!(s.models.iter().collect::<Vec<_>>(), vec!["claude-sonnet-4-5"]);
        assert_eq!(s.thinking_levels.iter().collect::<Vec<_>>(), vec!["high"]);
        assert_eq!(s.user_message_timestamps, vec!["2025-01-15T10:00:01.000Z"]);
    }

    #[test]
    fn test_duration_ignores_non_message_events() {
        let file = log(vec![
            json!({"type": "session", "timestamp": "2025-01-15T09:00:00.000Z"}),
            message("2025-01-15T10:00:00.000Z", "user"),
            json!({"type": "compaction", "timestamp": "2025-01-15T11:00:00.000Z", "summary": "..."}),
        ]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.duration_minutes, 0.0);
        assert_eq!(s.start_time.as_deref(), Some("2025-01-15T09:00:00.000Z"));
    }

    #[test]
    fn test_missing_usage_fields_are_zero() {
        let file = log(vec![json!({
            "type": "message",
            "timestamp": "2025-01-15T10:00:00.000Z",
            "message": {"role": "assistant", "usage": {"output": 7}}
        })]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.tokens.output, 7);
        assert_eq!(s.tokens.input, 0);
        assert_eq!(s.cost, 0.0);
    }

    #[test]
    fn test_null_usage_field_keeps_the_event() {
        let file = log(vec![
            message("2025-01-15T10:00:00.000Z", "user"),
            json!({
                "type": "message",
                "timestamp": "2025-01-15T10:05:00.000Z",
                "message": {
                    "role": "assistant",
                    "usage": {"input": 100, "output": "12", "cacheRead": null, "cost": {"total": 0.5}}
                }
            }),
        ]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.message_counts.assistant, 1);
        assert_eq!(s.tokens.input, 100);
        assert_eq!(s.tokens.output, 0);
        assert_eq!(s.tokens.cache_read, 0);
        assert!((s.cost - 0.5).abs() < 1e-9);
        assert!((s.duration_minutes - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_null_cost_and_timestamp_fields_default() {
        let file = log(vec![
            json!({"type": "session", "timestamp": null}),
            json!({"type": "model_change", "modelId": null}),
            json!({
                "type": "message",
                "timestamp": "2025-01-15T10:00:00.000Z",
                "message": {"role": "assistant", "usage": {"input": 3, "cost": {"total": null}}}
            }),
        ]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert!(s.start_time.is_none());
        assert!(s.models.is_empty());
        assert_eq!(s.message_counts.assistant, 1);
        assert_eq!(s.tokens.input, 3);
        assert_eq!(s.cost, 0.0);
    }

    #[test]
    fn test_models_counted_once_per_session() {
        let file = log(vec![
            json!({"type": "model_change", "modelId": "a"}),
            json!({"type": "model_change", "modelId": "b"}),
            json!({"type": "model_change", "modelId": "a"}),
        ]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.models.len(), 2);
        assert_eq!(s.message_counts.total, 0);
    }

    #[test]
    fn test_unrecognized_event_yields_zero_session() {
        let file = log(vec![json!({"type": "custom_thing", "payload": 1})]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.message_counts.total, 0);
        assert_eq!(s.tokens.total(), 0);
        assert_eq!(s.cost, 0.0);
        assert_eq!(s.duration_minutes, 0.0);
        assert!(s.start_time.is_none());
        assert!(s.models.is_empty());
    }

    #[test]
    fn test_event_without_type_is_skipped() {
        let file = log(vec![json!({"hello": "world"}), json!(42)]);

        let s = PiNormalizer::new("Sites").normalize(&file);
        assert_eq!(s.message_counts.total, 0);
    }
}

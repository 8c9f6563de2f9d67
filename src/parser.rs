use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::RateTable;
use crate::models::{ClaudeEvent, ClaudeMessage, LogFile, Session, SourceId};
use crate::normalizer::{Normalizer, TimeSpan};
use crate::project_name::resolve_project_name;

/// Content markers of slash-command echoes, which are not typed by the user.
const COMMAND_MARKERS: &[&str] = &["<command-name>", "<local-command-stdout>"];

/// Placeholder model Claude Code writes on locally generated messages.
const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Claude Code logs: token usage only, so cost is estimated from the rate
/// table. Models come from the assistant messages themselves.
pub struct ClaudeNormalizer {
    anchor: String,
    rates: RateTable,
}

impl ClaudeNormalizer {
    pub fn new(anchor: impl Into<String>, rates: RateTable) -> Self {
        Self {
            anchor: anchor.into(),
            rates,
        }
    }
}

impl Normalizer for ClaudeNormalizer {
    fn source(&self) -> SourceId {
        SourceId::Claude
    }

    fn normalize(&self, file: &LogFile) -> Session {
        let project = resolve_project_name(&file.project_dir, &self.anchor);
        let mut session = Session::empty(project, file.path.clone());
        let mut span = TimeSpan::default();

        // Streamed responses repeat the same message id; the last line wins.
        let mut assistant: Vec<ClaudeMessage> = Vec::new();
        let mut assistant_by_id: HashMap<String, usize> = HashMap::new();

        for value in &file.events {
            // Read before the typed decode so any timestamped line bounds the session.
            let timestamp = value.get("timestamp").and_then(|v| v.as_str());
            let timestamped = timestamp.map(|ts| span.observe(ts)).unwrap_or(false);

            let event = match ClaudeEvent::deserialize(value) {
                Ok(e) => e,
                Err(e) => {
                    debug!("unrecognized claude event in {}: {}", file.path.display(), e);
                    continue;
                }
            };

            match event.event_type.as_str() {
                "user" => {
                    if event.is_meta.unwrap_or(false) {
                        continue;
                    }
                    let Some(msg) = event.message else {
                        continue;
                    };
                    if is_tool_result(&msg.content) {
                        session.message_counts.tool_result += 1;
                        continue;
                    }
                    let text = extract_raw_text(&msg.content);
                    if COMMAND_MARKERS.iter().any(|m| text.contains(m)) {
                        continue;
                    }
                    session.message_counts.user += 1;
                    if let (true, Some(ts)) = (timestamped, timestamp) {
                        session.user_message_timestamps.push(ts.to_string());
                    }
                }
                "assistant" => {
                    if event.is_api_error_message.unwrap_or(false) {
                        continue;
                    }
                    let Some(msg) = event.message else {
                        continue;
                    };
                    match msg.id.clone() {
                        Some(id) => match assistant_by_id.get(&id) {
                            Some(&idx) => assistant[idx] = msg,
                            None => {
                                assistant_by_id.insert(id, assistant.len());
                                assistant.push(msg);
                            }
                        },
                        None => assistant.push(msg),
                    }
                }
                _ => {}
            }
        }

        for msg in &assistant {
            if let Some(ref usage) = msg.usage {
                session.tokens.input += usage.input_tokens;
                session.tokens.output += usage.output_tokens;
                session.tokens.cache_read += usage.cache_read_input_tokens;
                session.tokens.cache_write += usage.cache_creation_input_tokens;
            }
            if let Some(model) = msg.model.as_deref() {
                if !model.is_empty() && model != SYNTHETIC_MODEL {
                    session.models.insert(model.to_string());
                }
            }
        }

        session.message_counts.assistant = assistant.len() as u64;
        session.message_counts.total = session.message_counts.user
            + session.message_counts.assistant
            + session.message_counts.tool_result;
        session.cost = self.rates.estimate(&session.tokens);
        session.start_time = span.first_raw();
        session.duration_minutes = span.minutes();
        session
    }
}

/// True when the content is a non-empty list made only of `tool_result` blocks.
fn is_tool_result(content: &serde_json::Value) -> bool {
    match content {
        serde_json::Value::Array(blocks) => {
            !blocks.is_empty()
                && blocks
                    .iter()
                    .all(|b| b.get("type").and_then(|v| v.as_str()) == Some("tool_result"))
        }
        _ => false,
    }
}

/// Extract raw text preserving newlines.
fn extract_raw_text(content: &serde_json::Value) -> String {
    match content {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(blocks) => {
            let mut texts = Vec::new();
            for block in blocks {
                if block.get("type").and_then(|v| v.as_str()) == Some("text") {
                    if let Some(text) = block.get("text").and_then(|v| v.as_str()) {
                        texts.push(text.to_string());
                    }
                }
            }
            texts.join("\n")
        }
        _ => String::new(),
    }
}

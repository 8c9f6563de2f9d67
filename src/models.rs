use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Null or mistyped fields decode to their default instead of failing the event.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

// --- Raw JSONL event types: Pi Agent ---

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PiEvent {
    Session {
        #[serde(default, deserialize_with = "lenient")]
        timestamp: Option<String>,
    },
    Message {
        #[serde(default, deserialize_with = "lenient")]
        timestamp: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        message: PiMessage,
    },
    ModelChange {
        #[serde(default, rename = "modelId", deserialize_with = "lenient")]
        model_id: Option<String>,
    },
    ThinkingLevelChange {
        #[serde(default, rename = "thinkingLevel", deserialize_with = "lenient")]
        thinking_level: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
pub struct PiMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<PiUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PiUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub input: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub output: u64,
    #[serde(default, rename = "cacheRead", deserialize_with = "lenient")]
    pub cache_read: u64,
    #[serde(default, rename = "cacheWrite", deserialize_with = "lenient")]
    pub cache_write: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<PiCost>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PiCost {
    #[serde(default, deserialize_with = "lenient")]
    pub total: f64,
}

// --- Raw JSONL event types: Claude Code ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeEvent {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub event_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub is_meta: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_api_error_message: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<ClaudeMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaudeMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default)]
    pub content: serde_json::Value, // string | ContentBlock[]
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<ClaudeUsage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaudeUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_read_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_creation_input_tokens: u64,
}

// --- Sources ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Pi,
    Claude,
}

impl SourceId {
    pub fn all() -> &'static [SourceId] {
        &[SourceId::Pi, SourceId::Claude]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Pi => "pi",
            SourceId::Claude => "claude",
        }
    }

    /// Sources that only report tokens get their cost from the rate table.
    pub fn cost_estimated(self) -> bool {
        matches!(self, SourceId::Claude)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub id: SourceId,
    pub label: String,
}

// --- Log reader output ---

/// One `.jsonl` file with every line decoded, in file order.
#[derive(Debug, Clone)]
pub struct LogFile {
    /// Raw (encoded) name of the project directory holding the file.
    pub project_dir: String,
    pub path: PathBuf,
    pub events: Vec<serde_json::Value>,
}

// --- Processed types ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_write: u64,
}

impl TokenTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.input + self.output + self.cache_read + self.cache_write
    }

    pub fn add(&mut self, other: &TokenTotals) {
        self.input += other.input;
        self.output += other.output;
        self.cache_read += other.cache_read;
        self.cache_write += other.cache_write;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageCounts {
    pub total: u64,
    pub user: u64,
    pub assistant: u64,
    pub tool_result: u64,
}

/// One normalized working session, derived from one log file.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub project: String,
    pub source_file: PathBuf,
    pub start_time: Option<String>,
    pub message_counts: MessageCounts,
    pub cost: f64,
    pub tokens: TokenTotals,
    pub duration_minutes: f64,
    pub models: BTreeSet<String>,
    pub thinking_levels: BTreeSet<String>,
    pub user_message_timestamps: Vec<String>,
}

impl Session {
    pub fn empty(project: String, source_file: PathBuf) -> Self {
        Self {
            project,
            source_file,
            start_time: None,
            message_counts: MessageCounts::default(),
            cost: 0.0,
            tokens: TokenTotals::zero(),
            duration_minutes: 0.0,
            models: BTreeSet::new(),
            thinking_levels: BTreeSet::new(),
            user_message_timestamps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectStats {
    pub sessions: u64,
    pub messages: u64,
    pub user_messages: u64,
    pub cost: f64,
    pub tokens: TokenTotals,
    pub duration_minutes: f64,
    pub models: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_sessions: u64,
    pub total_messages: u64,
    pub total_user_messages: u64,
    pub total_cost: f64,
    pub total_tokens: TokenTotals,
    pub active_days: u64,
    pub total_duration_minutes: f64,
    pub total_projects: u64,
}

/// Day-of-week (0 = Sunday) by hour-of-day counts of user messages.
pub type Punchcard = [[u64; 24]; 7];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub source: SourceId,
    pub cost_estimated: bool,
    pub summary: Summary,
    pub punchcard: Punchcard,
    pub daily_activity: BTreeMap<String, u64>,
    pub daily_cost: BTreeMap<String, f64>,
    pub daily_tokens: BTreeMap<String, TokenTotals>,
    pub projects: BTreeMap<String, ProjectStats>,
    pub model_usage: BTreeMap<String, u64>,
    pub thinking_level_usage: BTreeMap<String, u64>,
}

impl Statistics {
    pub fn empty(source: SourceId) -> Self {
        Self {
            source,
            cost_estimated: source.cost_estimated(),
            summary: Summary::default(),
            punchcard: [[0; 24]; 7],
            daily_activity: BTreeMap::new(),
            daily_cost: BTreeMap::new(),
            daily_tokens: BTreeMap::new(),
            projects: BTreeMap::new(),
            model_usage: BTreeMap::new(),
            thinking_level_usage: BTreeMap::new(),
        }
    }
}

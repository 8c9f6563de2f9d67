use chrono::{DateTime, Utc};

use crate::models::{LogFile, Session, SourceId};

/// Turns the decoded events of one log file into a `Session`.
///
/// Implementations are pure folds over an already-read event list and never
/// fail: fields that are missing or of the wrong shape count as zero/empty.
pub trait Normalizer {
    fn source(&self) -> SourceId;

    fn normalize(&self, file: &LogFile) -> Session;

    fn normalize_all(&self, files: &[LogFile]) -> Vec<Session> {
        files.iter().map(|f| self.normalize(f)).collect()
    }
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .or_else(|_| DateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.fZ"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

/// Earliest and latest timestamp seen so far, keeping the raw string of the
/// earliest one.
#[derive(Debug, Default)]
pub struct TimeSpan {
    first: Option<(DateTime<Utc>, String)>,
    last: Option<DateTime<Utc>>,
}

impl TimeSpan {
    /// Returns false when `raw` is not a parseable timestamp.
    pub fn observe(&mut self, raw: &str) -> bool {
        let Some(ts) = parse_timestamp(raw) else {
            return false;
        };
        match &self.first {
            Some((first, _)) if *first <= ts => {}
            _ => self.first = Some((ts, raw.to_string())),
        }
        match self.last {
            Some(last) if last >= ts => {}
            _ => self.last = Some(ts),
        }
        true
    }

    pub fn first_raw(&self) -> Option<String> {
        self.first.as_ref().map(|(_, raw)| raw.clone())
    }

    pub fn minutes(&self) -> f64 {
        match (&self.first, self.last) {
            (Some((first, _)), Some(last)) => {
                (last - *first).num_milliseconds().max(0) as f64 / 60_000.0
            }
            _ => 0.0,
        }
    }
}

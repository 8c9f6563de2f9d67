use chrono::{Datelike, Local, Timelike};
use tracing::warn;

use crate::models::{ProjectStats, Session, SourceId, Statistics, Summary};
use crate::normalizer::parse_timestamp;

/// Calendar-day key of a timestamp: its first ten characters, verbatim.
///
/// No timezone conversion happens here, while the punchcard buckets by local
/// time, so a message near local midnight can land on different days in the
/// two views.
pub fn day_key(ts: &str) -> &str {
    ts.get(..10).unwrap_or(ts)
}

/// Fold all sessions of one source into a single `Statistics`.
pub fn compute_statistics(source: SourceId, sessions: &[Session]) -> Statistics {
    let mut stats = Statistics::empty(source);

    for s in sessions {
        let project = stats.projects.entry(s.project.clone()).or_default();
        project.sessions += 1;
        project.messages += s.message_counts.total;
        project.user_messages += s.message_counts.user;
        project.cost += s.cost;
        project.tokens.add(&s.tokens);
        project.duration_minutes += s.duration_minutes;
        project.models.extend(s.models.iter().cloned());

        for model in &s.models {
            *stats.model_usage.entry(model.clone()).or_insert(0) += 1;
        }
        for level in &s.thinking_levels {
            *stats.thinking_level_usage.entry(level.clone()).or_insert(0) += 1;
        }

        for ts in &s.user_message_timestamps {
            let Some(parsed) = parse_timestamp(ts) else {
                warn!("skipping unparseable user message timestamp {:?}", ts);
                continue;
            };
            let local = parsed.with_timezone(&Local);
            let dow = local.weekday().num_days_from_sunday() as usize;
            let hour = local.hour() as usize;
            stats.punchcard[dow][hour] += 1;

            *stats
                .daily_activity
                .entry(day_key(ts).to_string())
                .or_insert(0) += 1;
        }

        if let Some(ref start) = s.start_time {
            let day = day_key(start).to_string();
            *stats.daily_cost.entry(day.clone()).or_insert(0.0) += s.cost;
            stats.daily_tokens.entry(day).or_default().add(&s.tokens);
        }
    }

    stats.summary = summarize(sessions, &stats);
    stats
}

fn summarize(sessions: &[Session], stats: &Statistics) -> Summary {
    let mut summary = Summary {
        total_sessions: sessions.len() as u64,
        active_days: stats.daily_activity.len() as u64,
        total_projects: stats.projects.len() as u64,
        ..Summary::default()
    };

    for s in sessions {
        summary.total_messages += s.message_counts.total;
        summary.total_user_messages += s.message_counts.user;
        summary.total_cost += s.cost;
        summary.total_tokens.add(&s.tokens);
        summary.total_duration_minutes += s.duration_minutes;
    }

    summary
}

/// Projects ordered by cost, most expensive first.
pub fn projects_by_cost(stats: &Statistics) -> Vec<(&String, &ProjectStats)> {
    let mut projects: Vec<_> = stats.projects.iter().collect();
    projects.sort_by(|a, b| {
        b.1.cost
            .partial_cmp(&a.1.cost)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    projects
}

/// Usage counts ordered by frequency, most used first.
pub fn ranked(usage: &std::collections::BTreeMap<String, u64>) -> Vec<(&String, u64)> {
    let mut items: Vec<(&String, u64)> = usage.iter().map(|(k, &v)| (k, v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
}

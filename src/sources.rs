use std::str::FromStr;
use tracing::info;

use crate::config::{Config, SourceConfig};
use crate::error::{Result, UsageError};
use crate::metrics;
use crate::models::{SourceId, SourceInfo, Statistics};
use crate::normalizer::Normalizer;
use crate::parser::ClaudeNormalizer;
use crate::pi_parser::PiNormalizer;
use crate::scanner::read_sessions_root;

impl FromStr for SourceId {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pi" => Ok(SourceId::Pi),
            "claude" => Ok(SourceId::Claude),
            other => Err(UsageError::UnknownSource(other.to_string())),
        }
    }
}

pub fn source_config(config: &Config, id: SourceId) -> &SourceConfig {
    match id {
        SourceId::Pi => &config.sources.pi,
        SourceId::Claude => &config.sources.claude,
    }
}

pub fn normalizer_for(config: &Config, id: SourceId) -> Box<dyn Normalizer> {
    match id {
        SourceId::Pi => Box::new(PiNormalizer::new(config.project_anchor.clone())),
        SourceId::Claude => Box::new(ClaudeNormalizer::new(
            config.project_anchor.clone(),
            config.rates,
        )),
    }
}

/// Sources whose sessions root exists on disk.
pub fn list_available_sources(config: &Config) -> Vec<SourceInfo> {
    SourceId::all()
        .iter()
        .filter_map(|&id| {
            let sc = source_config(config, id);
            sc.root.is_dir().then(|| SourceInfo {
                id,
                label: sc.label.clone(),
            })
        })
        .collect()
}

/// Read, normalize and aggregate every log of the named source.
///
/// The id is validated before touching the filesystem.
pub fn compute_statistics(config: &Config, source_id: &str) -> Result<Statistics> {
    let id: SourceId = source_id.parse()?;
    compute_for(config, id)
}

pub fn compute_for(config: &Config, id: SourceId) -> Result<Statistics> {
    let root = &source_config(config, id).root;
    let files = read_sessions_root(root)?;

    let normalizer = normalizer_for(config, id);
    let sessions = normalizer.normalize_all(&files);
    let stats = metrics::compute_statistics(normalizer.source(), &sessions);

    info!(
        "{}: {} files, {} sessions, {} projects",
        id,
        files.len(),
        stats.summary.total_sessions,
        stats.summary.total_projects
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_with_roots(dir: &Path) -> Config {
        let mut config = Config::default();
        config.sources.pi.root = dir.join("pi");
        config.sources.claude.root = dir.join("claude");
        config
    }

    fn write(path: &Path, lines: &[&str]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, lines.join("\n")).unwrap();
    }

    #[test]
    fn test_parse_source_id() {
        assert_eq!("pi".parse::<SourceId>().unwrap(), SourceId::Pi);
        assert_eq!("claude".parse::<SourceId>().unwrap(), SourceId::Claude);
        assert!(matches!(
            "cursor".parse::<SourceId>(),
            Err(UsageError::UnknownSource(s)) if s == "cursor"
        ));
    }

    #[test]
    fn test_unknown_source_rejected_before_io() {
        // Roots point nowhere; the error must still be the id, not I/O.
        let config = config_with_roots(Path::new("/definitely/not/here"));
        let err = compute_statistics(&config, "gemini").unwrap_err();
        assert!(matches!(err, UsageError::UnknownSource(_)));
    }

    #[test]
    fn test_list_only_existing_roots() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());
        assert!(list_available_sources(&config).is_empty());

        fs::create_dir_all(dir.path().join("claude")).unwrap();
        let sources = list_available_sources(&config);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, SourceId::Claude);
        assert_eq!(sources[0].label, "Claude Code");
    }

    #[test]
    fn test_missing_root_gives_empty_statistics() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());

        let stats = compute_statistics(&config, "pi").unwrap();
        assert_eq!(stats.summary.total_sessions, 0);
        assert!(stats.projects.is_empty());
        assert!(stats.daily_activity.is_empty());
        assert!(stats.model_usage.is_empty());
    }

    #[test]
    fn test_root_that_is_a_file_is_unavailable_and_empty() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());
        fs::write(dir.path().join("pi"), "not a directory").unwrap();

        assert!(list_available_sources(&config).is_empty());
        let stats = compute_statistics(&config, "pi").unwrap();
        assert_eq!(stats.summary.total_sessions, 0);
    }

    #[test]
    fn test_pi_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());
        write(
            &dir.path().join("pi/--Users-me-Sites-got--/2025-01-15_abc.jsonl"),
            &[
                r#"{"type":"session","id":"abc","timestamp":"2025-01-15T10:00:00.000Z","cwd":"/Users/me/Sites/got"}"#,
                r#"{"type":"model_change","timestamp":"2025-01-15T10:00:00.100Z","provider":"anthropic","modelId":"claude-sonnet-4-5"}"#,
                r#"{"type":"message","timestamp":"2025-01-15T10:00:01.000Z","message":{"role":"user","content":"hi"}}"#,
                r#"{"type":"message","timestamp":"2025-01-15T10:00:02.000Z","message":{"role":"assistant","usage":{"input":100,"output":50,"cacheRead":0,"cacheWrite":0,"cost":{"total":0.25}}}}"#,
            ],
        );

        let stats = compute_statistics(&config, "pi").unwrap();
        assert!(!stats.cost_estimated);
        assert_eq!(stats.source, SourceId::Pi);
        assert_eq!(stats.summary.total_sessions, 1);
        assert_eq!(stats.summary.total_messages, 2);
        assert!((stats.summary.total_cost - 0.25).abs() < 1e-9);
        assert_eq!(stats.projects["got"].sessions, 1);
        assert_eq!(stats.model_usage["claude-sonnet-4-5"], 1);
        assert!((stats.daily_cost["2025-01-15"] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_claude_end_to_end_is_estimated_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());
        write(
            &dir.path().join("claude/-Users-me-Sites-api/s1.jsonl"),
            &[
                r#"{"type":"user","timestamp":"2025-02-01T08:00:00.000Z","message":{"role":"user","content":"go"}}"#,
                r#"{"type":"assistant","timestamp":"2025-02-01T08:00:10.000Z","message":{"id":"m1","model":"claude-sonnet-4-5","usage":{"input_tokens":1000000,"output_tokens":0}}}"#,
            ],
        );
        write(
            &dir.path().join("claude/-Users-me-Sites-web/s2.jsonl"),
            &[r#"{"type":"summary","summary":"empty"}"#],
        );

        let first = compute_statistics(&config, "claude").unwrap();
        assert!(first.cost_estimated);
        assert_eq!(first.summary.total_sessions, 2);
        assert_eq!(first.summary.total_projects, 2);
        assert!((first.summary.total_cost - 3.0).abs() < 1e-9);

        let second = compute_statistics(&config, "claude").unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_malformed_log_fails_request() {
        let dir = TempDir::new().unwrap();
        let config = config_with_roots(dir.path());
        write(
            &dir.path().join("claude/proj/s1.jsonl"),
            &[r#"{"type":"user"}"#, r#"{"type":"#],
        );

        let err = compute_statistics(&config, "claude").unwrap_err();
        assert!(matches!(err, UsageError::MalformedLog { line: 2, .. }));
    }
}

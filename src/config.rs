use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, UsageError};
use crate::models::TokenTotals;

/// Top-level configuration, loaded once from TOML and passed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub rates: RateTable,
    /// Directory segment treated as the parent of project folders when
    /// decoding project directory names.
    pub project_anchor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            rates: RateTable::default(),
            project_anchor: "Sites".to_string(),
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| UsageError::io(path, e))?;
        Self::parse(&contents)
            .map_err(|e| UsageError::Config(format!("{}: {}", path.display(), e)))
    }

    fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agent-usage")
            .join("config.toml")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub pi: SourceConfig,
    pub claude: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            pi: SourceConfig {
                root: home_dir().join(".pi").join("agent").join("sessions"),
                label: "Pi Agent".to_string(),
            },
            claude: SourceConfig {
                root: home_dir().join(".claude").join("projects"),
                label: "Claude Code".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Sessions root: one subdirectory per project, each holding `.jsonl` logs.
    pub root: PathBuf,
    pub label: String,
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}

/// API pricing in USD per million tokens, used where a source does not
/// report cost itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateTable {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            input: 3.0,
            output: 15.0,
            cache_read: 0.3,
            cache_write: 3.75,
        }
    }
}

impl RateTable {
    pub fn estimate(&self, tokens: &TokenTotals) -> f64 {
        (tokens.input as f64 * self.input
            + tokens.output as f64 * self.output
            + tokens.cache_read as f64 * self.cache_read
            + tokens.cache_write as f64 * self.cache_write)
            / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_price_one_million_input_tokens_at_three_dollars() {
        let tokens = TokenTotals {
            input: 1_000_000,
            ..TokenTotals::zero()
        };
        let cost = RateTable::default().estimate(&tokens);
        assert!((cost - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_combines_all_rates() {
        let tokens = TokenTotals {
            input: 1_000_000,
            output: 1_000_000,
            cache_read: 1_000_000,
            cache_write: 1_000_000,
        };
        let cost = RateTable::default().estimate(&tokens);
        assert!((cost - (3.0 + 15.0 + 0.3 + 3.75)).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse(
            r#"
            project_anchor = "code"

            [rates]
            output = 20.0

            [sources.pi]
            root = "/tmp/pi-sessions"
            label = "Pi"
            "#,
        )
        .unwrap();

        assert_eq!(config.project_anchor, "code");
        assert_eq!(config.rates.output, 20.0);
        assert_eq!(config.rates.input, 3.0);
        assert_eq!(config.sources.pi.root, PathBuf::from("/tmp/pi-sessions"));
        assert_eq!(config.sources.claude.label, "Claude Code");
    }

    #[test]
    fn test_load_from_reports_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rates = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, UsageError::Config(_)));
    }
}

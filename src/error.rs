use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("malformed log {}:{line}: {source}", .path.display())]
    MalformedLog {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl UsageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UsageError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, UsageError};
use crate::models::LogFile;

const LOG_EXTENSION: &str = ".jsonl";

/// Read every `.jsonl` file in every immediate subdirectory of `root`.
///
/// A missing root (or one that is not a directory) yields no files rather than an error, so callers can report
/// the source as unavailable. Any line that is not valid JSON fails the whole
/// read.
pub fn read_sessions_root(root: &Path) -> Result<Vec<LogFile>> {
    if !root.is_dir() {
        debug!("sessions root {} is not a directory", root.display());
        return Ok(vec![]);
    }

    let mut project_dirs = Vec::new();
    let entries = fs::read_dir(root).map_err(|e| UsageError::io(root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| UsageError::io(root, e))?;
        let file_type = entry.file_type().map_err(|e| UsageError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        project_dirs.push(entry.path());
    }
    // read_dir order is platform dependent
    project_dirs.sort();

    let mut files = Vec::new();
    for project_dir in project_dirs {
        let project_name = project_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut log_paths = Vec::new();
        let entries = fs::read_dir(&project_dir).map_err(|e| UsageError::io(&project_dir, e))?;
        for f in entries {
            let f = f.map_err(|e| UsageError::io(&project_dir, e))?;
            let fname = f.file_name().to_string_lossy().to_string();
            if !fname.ends_with(LOG_EXTENSION) || f.file_type().map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }
            log_paths.push(f.path());
        }
        log_paths.sort();

        for path in log_paths {
            let events = read_log_file(&path)?;
            debug!("read {} events from {}", events.len(), path.display());
            files.push(LogFile {
                project_dir: project_name.clone(),
                path,
                events,
            });
        }
    }

    Ok(files)
}

/// Decode one newline-delimited JSON file. Blank lines are skipped.
pub fn read_log_file(path: &Path) -> Result<Vec<serde_json::Value>> {
    let raw = fs::read_to_string(path).map_err(|e| UsageError::io(path, e))?;

    let mut events = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|source| UsageError::MalformedLog {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = read_sessions_root(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_root_that_is_a_file_is_empty() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "sessions", "not a directory");
        let files = read_sessions_root(&dir.path().join("sessions")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_reads_jsonl_files_per_project() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "-Users-me-Sites-a/one.jsonl", "{\"type\":\"a\"}\n\n{\"type\":\"b\"}\n");
        write(dir.path(), "-Users-me-Sites-a/notes.txt", "not a log");
        write(dir.path(), "-Users-me-Sites-b/two.jsonl", "{\"type\":\"c\"}");
        write(dir.path(), "stray.jsonl", "{\"type\":\"d\"}");

        let files = read_sessions_root(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].project_dir, "-Users-me-Sites-a");
        assert_eq!(files[0].events.len(), 2);
        assert_eq!(files[0].events[1]["type"], "b");
        assert_eq!(files[1].project_dir, "-Users-me-Sites-b");
        assert_eq!(files[1].events.len(), 1);
    }

    #[test]
    fn test_empty_project_dir_yields_no_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        let files = read_sessions_root(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_malformed_line_fails_whole_read() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "proj/good.jsonl", "{\"type\":\"a\"}\n");
        write(dir.path(), "proj/bad.jsonl", "{\"type\":\"a\"}\n{not json\n");

        let err = read_sessions_root(dir.path()).unwrap_err();
        match err {
            UsageError::MalformedLog { path, line, .. } => {
                assert!(path.ends_with("bad.jsonl"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

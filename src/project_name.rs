//! Decoding of project directory names.
//!
//! Both tools name a project's log directory after its absolute path with
//! every `/` replaced by `-` (`/Users/me/Sites/app` → `-Users-me-Sites-app`,
//! Pi Agent additionally wraps the name in `--`). The encoding is lossy: a
//! project called `foo-bar` is indistinguishable from a `bar` folder inside
//! `foo`. When the anchor segment (e.g. `Sites`) appears, everything after it
//! is taken as the project name; otherwise only the last segment is.

const DELIMITER: char = '-';

pub fn resolve_project_name(dir_name: &str, anchor: &str) -> String {
    let trimmed = dir_name.trim_matches(DELIMITER);
    if trimmed.is_empty() {
        return dir_name.to_string();
    }

    let segments: Vec<&str> = trimmed.split(DELIMITER).collect();

    if let Some(idx) = segments.iter().rposition(|s| *s == anchor) {
        if idx + 1 < segments.len() {
            return segments[idx + 1..].join(&DELIMITER.to_string());
        }
    }

    segments.last().map(|s| s.to_string()).unwrap_or_default()
}

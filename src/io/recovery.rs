use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// Self-documenting header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
<!-- snip recovery log — append-only error recovery data
     This file captures data that snip couldn't save normally.
     If something went missing, check here.
     View with: sn recovery
     Safe to delete if empty or stale. -->

---
";

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    Write,
    Import,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Import => write!(f, "import"),
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

/// Return the path to the recovery log file.
pub fn recovery_log_path(root: &Path) -> PathBuf {
    root.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename, so a
/// failed write leaves the previous file contents untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting + append
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Format this entry as a markdown block for the recovery log.
    fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "## {} — {}: {}\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        ));
        out.push('\n');
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }
}

/// Append an entry to the recovery log, creating the log (with header) if
/// needed. Failures here are swallowed — recovery logging must never turn
/// an already-failing operation into a panic.
pub fn log_recovery(root: &Path, entry: RecoveryEntry) {
    let path = recovery_log_path(root);
    let is_new = !path.exists();

    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| {
            if is_new {
                file.write_all(FILE_HEADER.as_bytes())?;
            }
            file.write_all(entry.to_markdown().as_bytes())
        });

    if let Err(e) = result {
        eprintln!(
            "warning: could not write recovery log {}: {}",
            path.display(),
            e
        );
    }
}

/// Read the raw recovery log contents, or `None` if no log exists.
pub fn read_log(root: &Path) -> Option<String> {
    std::fs::read_to_string(recovery_log_path(root)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry() -> RecoveryEntry {
        RecoveryEntry {
            timestamp: "2025-10-20T08:00:00Z".parse().unwrap(),
            category: RecoveryCategory::Write,
            description: "item data write failed".into(),
            fields: vec![("Target".into(), "snip-items.json".into())],
            body: "[{\"id\":\"a1\"}]".into(),
        }
    }

    #[test]
    fn log_creates_file_with_header() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), sample_entry());

        let content = read_log(tmp.path()).unwrap();
        assert!(content.starts_with("<!-- snip recovery log"));
        assert!(content.contains("write: item data write failed"));
        assert!(content.contains("Target: snip-items.json"));
        assert!(content.contains("[{\"id\":\"a1\"}]"));
    }

    #[test]
    fn log_appends_without_duplicate_header() {
        let tmp = TempDir::new().unwrap();
        log_recovery(tmp.path(), sample_entry());
        log_recovery(tmp.path(), sample_entry());

        let content = read_log(tmp.path()).unwrap();
        assert_eq!(content.matches("snip recovery log").count(), 1);
        assert_eq!(content.matches("## 2025-10-20T08:00:00Z").count(), 2);
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn read_log_missing_returns_none() {
        let tmp = TempDir::new().unwrap();
        assert!(read_log(tmp.path()).is_none());
    }
}

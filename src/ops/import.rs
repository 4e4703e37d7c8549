use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use crate::io::store::validate;
use crate::model::Item;
use crate::ops::repo::{RepoError, Repository};

/// Error type for import/export operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("import file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("import data does not match the item schema")]
    Format,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Import a JSON array of items from `path`, replacing the entire
/// collection. Validate-then-commit: any read, parse, or schema failure
/// rejects the whole payload before the live collection is touched.
/// Returns the number of imported items.
pub fn import_file(repo: &mut Repository, path: &Path) -> Result<usize, ImportError> {
    let content = fs::read_to_string(path).map_err(|e| ImportError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: Value = serde_json::from_str(&content)?;
    if !validate(&raw) {
        return Err(ImportError::Format);
    }
    let items: Vec<Item> = serde_json::from_value(raw)?;
    let count = items.len();
    repo.replace_all(items)?;
    Ok(count)
}

/// Export the full collection, unmodified, as pretty-printed JSON.
pub fn export_file(repo: &Repository, path: &Path) -> Result<(), ImportError> {
    let content = serde_json::to_string_pretty(repo.items())?;
    fs::write(path, content).map_err(|e| ImportError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default export filename, stamped with today's date.
pub fn default_export_filename() -> String {
    format!("snip-backup-{}.json", Utc::now().format("%Y-%m-%d"))
}

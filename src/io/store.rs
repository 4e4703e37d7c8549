use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::{Item, Settings};

/// Storage key for the item collection.
pub const ITEMS_KEY: &str = "snip-items";
/// Storage key for user settings.
pub const SETTINGS_KEY: &str = "snip-settings";

/// Error type for store write operations. Reads never fail — they degrade
/// to an empty collection / default settings.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The local key-value store: one JSON file per key in a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: PathBuf) -> Store {
        Store { root }
    }

    /// Resolve the store root: explicit override, then `SNIP_DIR`, then
    /// `XDG_DATA_HOME/snip`, then `~/.local/share/snip`.
    pub fn resolve_root(override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Ok(dir) = std::env::var("SNIP_DIR") {
            return PathBuf::from(dir);
        }
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
        data_dir.join("snip")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Load the item collection. An absent file yields an empty collection;
    /// a corrupt file is backed up as `.json.bak` and an empty collection
    /// is returned. Never fails the caller.
    pub fn load_items(&self) -> Vec<Item> {
        self.load_degrading(ITEMS_KEY)
    }

    /// Serialize and atomically write the full collection. On failure the
    /// previously stored state is untouched and the payload is appended to
    /// the recovery log.
    pub fn save_items(&self, items: &[Item]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(items).map_err(|e| StoreError::Serialize {
            key: ITEMS_KEY,
            source: e,
        })?;
        self.write_key(ITEMS_KEY, &content)
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    pub fn load_settings(&self) -> Settings {
        self.load_degrading(SETTINGS_KEY)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(settings).map_err(|e| StoreError::Serialize {
                key: SETTINGS_KEY,
                source: e,
            })?;
        self.write_key(SETTINGS_KEY, &content)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn load_degrading<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let path = self.key_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                // Corrupted — back up and start fresh
                let bak = path.with_extension("json.bak");
                let _ = fs::copy(&path, &bak);
                eprintln!(
                    "warning: could not parse {} (backed up as {}): {}",
                    path.display(),
                    bak.display(),
                    e
                );
                T::default()
            }
        }
    }

    fn write_key(&self, key: &str, content: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        if let Err(e) = fs::create_dir_all(&self.root) {
            return Err(StoreError::Write { path, source: e });
        }
        if let Err(e) = recovery::atomic_write(&path, content.as_bytes()) {
            recovery::log_recovery(
                &self.root,
                RecoveryEntry {
                    timestamp: chrono::Utc::now(),
                    category: RecoveryCategory::Write,
                    description: format!("{} write failed", key),
                    fields: vec![
                        ("Target".to_string(), format!("{}.json", key)),
                        ("Error".to_string(), e.to_string()),
                    ],
                    body: content.to_string(),
                },
            );
            return Err(StoreError::Write { path, source: e });
        }
        Ok(())
    }
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

// ---------------------------------------------------------------------------
// Import validation
// ---------------------------------------------------------------------------

/// Structural check used to gate import: `raw` must be an array where every
/// element carries all required item fields with the right primitive types.
/// Partial or malformed records reject the whole payload.
pub fn validate(raw: &Value) -> bool {
    let Some(entries) = raw.as_array() else {
        return false;
    };
    entries.iter().all(|entry| {
        let Some(obj) = entry.as_object() else {
            return false;
        };
        obj.get("id").is_some_and(Value::is_string)
            && obj.get("text").is_some_and(Value::is_string)
            && obj
                .get("keywords")
                .and_then(Value::as_array)
                .is_some_and(|kws| kws.iter().all(Value::is_string))
            && obj.get("createTime").is_some_and(Value::is_string)
            && obj.get("updateTime").is_some_and(Value::is_string)
            && obj.get("copyCount").is_some_and(|v| v.as_u64().is_some())
            && obj.get("isPinned").is_some_and(Value::is_boolean)
            && obj.get("isDeleted").is_some_and(Value::is_boolean)
    })
}

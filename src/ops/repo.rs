use uuid::Uuid;

use crate::io::store::{Store, StoreError};
use crate::model::{Item, ItemPatch};
use crate::ops::trash;
use crate::util::time::now_ts;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("snippet text is empty")]
    EmptyText,
    #[error("item not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// The authoritative in-memory item collection, write-through to the store.
///
/// Every mutation serializes the full collection before the in-memory state
/// is committed, so a failed write leaves both the store and the collection
/// exactly as they were.
pub struct Repository {
    items: Vec<Item>,
    store: Store,
}

impl Repository {
    /// Open a repository over the given store. A missing or corrupt data
    /// file degrades to an empty collection.
    pub fn open(store: Store) -> Repository {
        let items = store.load_items();
        Repository { items, store }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a new item from trimmed text and normalized keywords.
    /// Empty text after trimming is a validation error, surfaced to the
    /// caller rather than silently dropped.
    pub fn create(&mut self, text: &str, keywords: Vec<String>) -> Result<Item, RepoError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RepoError::EmptyText);
        }

        let now = now_ts();
        let item = Item {
            id: generate_id(),
            text: text.to_string(),
            keywords: normalize_keywords(keywords),
            create_time: now.clone(),
            update_time: now,
            copy_count: 0,
            is_pinned: false,
            is_deleted: false,
            deleted_time: None,
            pinned_time: None,
        };

        let mut next = self.items.clone();
        next.push(item.clone());
        self.commit(next)?;
        Ok(item)
    }

    /// Merge `patch` into the item with the given id. `update_time` is set
    /// to now unconditionally, even when the patch carried its own.
    pub fn update(&mut self, id: &str, patch: ItemPatch) -> Result<Item, RepoError> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let mut next = self.items.clone();
        patch.apply(&mut next[idx]);
        next[idx].update_time = now_ts();
        let updated = next[idx].clone();
        self.commit(next)?;
        Ok(updated)
    }

    /// Permanently remove the item with the given id.
    pub fn delete(&mut self, id: &str) -> Result<(), RepoError> {
        if !self.items.iter().any(|item| item.id == id) {
            return Err(RepoError::NotFound(id.to_string()));
        }
        let next = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        self.commit(next)
    }

    /// Permanently remove every item whose id is in `ids`. Unknown ids are
    /// skipped. Returns the number of items removed; persists once.
    pub fn delete_many(&mut self, ids: &[String]) -> Result<usize, RepoError> {
        let next: Vec<Item> = self
            .items
            .iter()
            .filter(|item| !ids.contains(&item.id))
            .cloned()
            .collect();
        let removed = self.items.len() - next.len();
        if removed > 0 {
            self.commit(next)?;
        }
        Ok(removed)
    }

    /// Wholesale replace of the collection, used by import.
    pub fn replace_all(&mut self, items: Vec<Item>) -> Result<(), RepoError> {
        self.commit(items)
    }

    /// Run the trash retention sweep, persisting only when something was
    /// purged. Returns the number of items permanently removed. Safe to run
    /// on every load; a second run on a cleaned collection is a no-op.
    pub fn sweep_trash(&mut self, retention_days: i64) -> Result<usize, RepoError> {
        let cleaned = trash::auto_clean(&self.items, retention_days);
        let removed = self.items.len() - cleaned.len();
        if removed > 0 {
            self.commit(cleaned)?;
        }
        Ok(removed)
    }

    /// Persist `next`, committing it as the in-memory collection only when
    /// the write succeeded.
    fn commit(&mut self, next: Vec<Item>) -> Result<(), RepoError> {
        self.store.save_items(&next)?;
        self.items = next;
        Ok(())
    }
}

/// Fresh unique item id. UUID v7 composes a timestamp with random bits, so
/// ids are unique across devices and sort roughly by creation time.
fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Trim keywords, drop blanks, and deduplicate preserving first occurrence.
pub fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() || seen.iter().any(|k| k == keyword) {
            continue;
        }
        seen.push(keyword.to_string());
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;
    use crate::util::time::parse_ts_or_epoch;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_repo(tmp: &TempDir) -> Repository {
        Repository::open(Store::open(tmp.path().to_path_buf()))
    }

    // --- Create ---

    #[test]
    fn create_sets_fresh_item_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("hello", vec![]).unwrap();

        assert_eq!(item.create_time, item.update_time);
        assert_eq!(item.copy_count, 0);
        assert!(!item.is_pinned);
        assert!(!item.is_deleted);
        assert!(item.pinned_time.is_none());
        assert!(item.deleted_time.is_none());
    }

    #[test]
    fn create_trims_text_and_filters_blank_keywords() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo
            .create("  hello  ", vec!["a".into(), "".into(), "b".into()])
            .unwrap();
        assert_eq!(item.text, "hello");
        assert_eq!(item.keywords, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn create_dedups_keywords_preserving_order() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo
            .create("text", vec!["b".into(), "a".into(), "b".into(), " a ".into()])
            .unwrap();
        assert_eq!(item.keywords, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn create_rejects_whitespace_only_text() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let err = repo.create("   ", vec![]).unwrap_err();
        assert!(matches!(err, RepoError::EmptyText));
        assert!(repo.items().is_empty());
    }

    #[test]
    fn create_assigns_unique_ids() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let a = repo.create("one", vec![]).unwrap();
        let b = repo.create("two", vec![]).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn create_persists_write_through() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        repo.create("persisted", vec![]).unwrap();

        let reopened = open_repo(&tmp);
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.items()[0].text, "persisted");
    }

    // --- Update ---

    #[test]
    fn update_merges_patch_and_bumps_update_time() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("original", vec![]).unwrap();
        let before = parse_ts_or_epoch(&item.update_time);

        let updated = repo
            .update(
                &item.id,
                ItemPatch {
                    text: Some("edited".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.text, "edited");
        assert!(parse_ts_or_epoch(&updated.update_time) >= before);
        assert_eq!(updated.create_time, item.create_time);
    }

    #[test]
    fn update_overrides_caller_supplied_update_time() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("text", vec![]).unwrap();

        let updated = repo
            .update(
                &item.id,
                ItemPatch {
                    update_time: Some("1999-01-01T00:00:00.000Z".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_ne!(updated.update_time, "1999-01-01T00:00:00.000Z");
    }

    #[test]
    fn update_unknown_id_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let err = repo.update("missing", ItemPatch::default()).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[test]
    fn update_can_set_and_clear_pin() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("pin me", vec![]).unwrap();

        let pinned = repo
            .update(
                &item.id,
                ItemPatch {
                    is_pinned: Some(true),
                    pinned_time: Patch::Set("2025-10-20T08:00:00.000Z".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(pinned.is_pinned);
        assert!(pinned.pinned_time.is_some());

        let unpinned = repo
            .update(
                &item.id,
                ItemPatch {
                    is_pinned: Some(false),
                    pinned_time: Patch::Clear,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!unpinned.is_pinned);
        assert!(unpinned.pinned_time.is_none());
    }

    // --- Delete ---

    #[test]
    fn delete_removes_and_persists() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("doomed", vec![]).unwrap();
        repo.delete(&item.id).unwrap();

        assert!(repo.items().is_empty());
        assert!(open_repo(&tmp).items().is_empty());
    }

    #[test]
    fn delete_unknown_id_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        assert!(matches!(
            repo.delete("missing"),
            Err(RepoError::NotFound(_))
        ));
    }

    #[test]
    fn delete_many_skips_unknown_ids() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let a = repo.create("one", vec![]).unwrap();
        let b = repo.create("two", vec![]).unwrap();

        let removed = repo
            .delete_many(&[a.id.clone(), "missing".into()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.items().len(), 1);
        assert_eq!(repo.items()[0].id, b.id);
    }

    // --- Replace / sweep ---

    #[test]
    fn replace_all_swaps_collection() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        repo.create("old", vec![]).unwrap();

        let replacement = vec![Item {
            id: "imported".into(),
            text: "new".into(),
            keywords: vec![],
            create_time: "2025-01-01T00:00:00.000Z".into(),
            update_time: "2025-01-01T00:00:00.000Z".into(),
            copy_count: 0,
            is_pinned: false,
            is_deleted: false,
            deleted_time: None,
            pinned_time: None,
        }];
        repo.replace_all(replacement.clone()).unwrap();
        assert_eq!(repo.items(), &replacement[..]);
        assert_eq!(open_repo(&tmp).items(), &replacement[..]);
    }

    #[test]
    fn sweep_purges_expired_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut repo = open_repo(&tmp);
        let item = repo.create("expired", vec![]).unwrap();
        let old = (chrono::Utc::now() - chrono::Duration::days(31))
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        repo.update(
            &item.id,
            ItemPatch {
                is_deleted: Some(true),
                deleted_time: Patch::Set(old),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(repo.sweep_trash(30).unwrap(), 1);
        assert!(repo.items().is_empty());
        assert_eq!(repo.sweep_trash(30).unwrap(), 0);
    }
}

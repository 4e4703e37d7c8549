use chrono::{Duration, Utc};

use crate::model::Item;
use crate::util::time::{now_ts, parse_ts, parse_ts_or_epoch};

/// Statistics about the trash, for display before a clear or sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashStats {
    /// Items currently in the trash
    pub total_deleted: usize,
    /// Items already past the retention window
    pub will_be_cleaned: usize,
    /// Earliest deletion timestamp among trashed items
    pub oldest_deleted_time: Option<String>,
}

/// Copy of `item` moved to the trash: deleted flag set, deletion and
/// update timestamps stamped with now. Persisting is the caller's job.
pub fn move_to_trash(item: &Item) -> Item {
    let now = now_ts();
    let mut trashed = item.clone();
    trashed.is_deleted = true;
    trashed.deleted_time = Some(now.clone());
    trashed.update_time = now;
    trashed
}

/// Copy of `item` restored from the trash: deleted flag and deletion
/// timestamp cleared, update timestamp stamped with now.
pub fn restore_from_trash(item: &Item) -> Item {
    let mut restored = item.clone();
    restored.is_deleted = false;
    restored.deleted_time = None;
    restored.update_time = now_ts();
    restored
}

/// Pure retention filter: keeps items that are not deleted, or were
/// deleted within the last `retention_days`. A trashed item with a
/// missing or unparseable deletion timestamp never expires. Re-running
/// on an already-cleaned collection is a no-op.
pub fn auto_clean(items: &[Item], retention_days: i64) -> Vec<Item> {
    let now = Utc::now();
    let threshold = Duration::days(retention_days);

    items
        .iter()
        .filter(|item| {
            if item.is_deleted
                && let Some(deleted_time) = &item.deleted_time
                && let Some(deleted_at) = parse_ts(deleted_time)
                && now - deleted_at > threshold
            {
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Drop every trashed item, regardless of age.
pub fn clear_trash(items: &[Item]) -> Vec<Item> {
    items
        .iter()
        .filter(|item| !item.is_deleted)
        .cloned()
        .collect()
}

/// Summarize the trash against the retention window.
pub fn trash_stats(items: &[Item], retention_days: i64) -> TrashStats {
    let now = Utc::now();
    let threshold = Duration::days(retention_days);
    let deleted: Vec<&Item> = items.iter().filter(|item| item.is_deleted).collect();

    let will_be_cleaned = deleted
        .iter()
        .filter(|item| {
            item.deleted_time
                .as_deref()
                .and_then(parse_ts)
                .is_some_and(|deleted_at| now - deleted_at > threshold)
        })
        .count();

    let oldest_deleted_time = deleted
        .iter()
        .filter_map(|item| item.deleted_time.clone())
        .min_by_key(|ts| parse_ts_or_epoch(ts));

    TrashStats {
        total_deleted: deleted.len(),
        will_be_cleaned,
        oldest_deleted_time,
    }
}

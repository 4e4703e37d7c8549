use serde::{Deserialize, Serialize};

/// A single stored snippet.
///
/// Field names follow the persisted JSON schema (camelCase), which is also
/// the import/export format. The two optional timestamps are serialized by
/// omission when absent — consumers check for presence, never for null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique, immutable identifier
    pub id: String,
    /// Snippet body, trimmed at creation
    pub text: String,
    /// Keyword tags, blank entries filtered at creation
    pub keywords: Vec<String>,
    /// Creation timestamp (ISO 8601 UTC), set once
    pub create_time: String,
    /// Last-mutation timestamp, bumped on every update
    pub update_time: String,
    /// Number of successful copy actions
    pub copy_count: u32,
    /// Whether the item is pinned to the top of listings
    pub is_pinned: bool,
    /// Whether the item is in the trash
    pub is_deleted: bool,
    /// When the item was moved to the trash (present iff is_deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_time: Option<String>,
    /// When the item was pinned (present iff is_pinned), used for sorting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_time: Option<String>,
}

/// Tri-state value for patching an optional field: leave it alone, clear
/// it, or set it. Distinguishes "not mentioned" from "explicitly absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    fn apply(&self, slot: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(v) => *slot = Some(v.clone()),
        }
    }
}

/// Partial update for an [`Item`]. Unset fields are left unchanged.
///
/// `update_time` may be supplied but the repository overwrites it with
/// "now" on every update regardless.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub update_time: Option<String>,
    pub copy_count: Option<u32>,
    pub is_pinned: Option<bool>,
    pub pinned_time: Patch<String>,
    pub is_deleted: Option<bool>,
    pub deleted_time: Patch<String>,
}

impl ItemPatch {
    /// Capture every mutable field of `item` as a patch, so a fully
    /// rewritten copy (e.g. from the trash policy) can be persisted
    /// through the repository's update path.
    pub fn from_item(item: &Item) -> Self {
        ItemPatch {
            text: Some(item.text.clone()),
            keywords: Some(item.keywords.clone()),
            update_time: Some(item.update_time.clone()),
            copy_count: Some(item.copy_count),
            is_pinned: Some(item.is_pinned),
            pinned_time: match &item.pinned_time {
                Some(t) => Patch::Set(t.clone()),
                None => Patch::Clear,
            },
            is_deleted: Some(item.is_deleted),
            deleted_time: match &item.deleted_time {
                Some(t) => Patch::Set(t.clone()),
                None => Patch::Clear,
            },
        }
    }

    /// Merge this patch into `item`. Does not touch `create_time` or `id`.
    pub fn apply(&self, item: &mut Item) {
        if let Some(text) = &self.text {
            item.text = text.clone();
        }
        if let Some(keywords) = &self.keywords {
            item.keywords = keywords.clone();
        }
        if let Some(ts) = &self.update_time {
            item.update_time = ts.clone();
        }
        if let Some(count) = self.copy_count {
            item.copy_count = count;
        }
        if let Some(pinned) = self.is_pinned {
            item.is_pinned = pinned;
        }
        self.pinned_time.apply(&mut item.pinned_time);
        if let Some(deleted) = self.is_deleted {
            item.is_deleted = deleted;
        }
        self.deleted_time.apply(&mut item.deleted_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_item() -> Item {
        Item {
            id: "a1".into(),
            text: "hello world".into(),
            keywords: vec!["greeting".into()],
            create_time: "2025-10-01T08:00:00.000Z".into(),
            update_time: "2025-10-01T08:00:00.000Z".into(),
            copy_count: 0,
            is_pinned: false,
            is_deleted: false,
            deleted_time: None,
            pinned_time: None,
        }
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert!(json.get("createTime").is_some());
        assert!(json.get("updateTime").is_some());
        assert!(json.get("copyCount").is_some());
        assert!(json.get("isPinned").is_some());
        assert!(json.get("isDeleted").is_some());
    }

    #[test]
    fn absent_timestamps_are_omitted_not_null() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert!(json.get("pinnedTime").is_none());
        assert!(json.get("deletedTime").is_none());

        let mut pinned = sample_item();
        pinned.is_pinned = true;
        pinned.pinned_time = Some("2025-10-02T08:00:00.000Z".into());
        let json = serde_json::to_value(&pinned).unwrap();
        assert_eq!(
            json.get("pinnedTime").and_then(|v| v.as_str()),
            Some("2025-10-02T08:00:00.000Z")
        );
    }

    #[test]
    fn deserialize_round_trip_preserves_fields() {
        let mut item = sample_item();
        item.is_deleted = true;
        item.deleted_time = Some("2025-10-03T08:00:00.000Z".into());

        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut item = sample_item();
        let patch = ItemPatch {
            text: Some("edited".into()),
            ..Default::default()
        };
        patch.apply(&mut item);
        assert_eq!(item.text, "edited");
        assert_eq!(item.keywords, vec!["greeting".to_string()]);
        assert_eq!(item.copy_count, 0);
    }

    #[test]
    fn patch_clear_removes_optional_timestamp() {
        let mut item = sample_item();
        item.is_pinned = true;
        item.pinned_time = Some("2025-10-02T08:00:00.000Z".into());

        let patch = ItemPatch {
            is_pinned: Some(false),
            pinned_time: Patch::Clear,
            ..Default::default()
        };
        patch.apply(&mut item);
        assert!(!item.is_pinned);
        assert_eq!(item.pinned_time, None);
    }

    #[test]
    fn from_item_round_trips_onto_blank_item() {
        let mut trashed = sample_item();
        trashed.is_deleted = true;
        trashed.deleted_time = Some("2025-10-03T08:00:00.000Z".into());
        trashed.update_time = "2025-10-03T08:00:00.000Z".into();

        let mut target = sample_item();
        ItemPatch::from_item(&trashed).apply(&mut target);
        assert_eq!(target, trashed);
    }
}

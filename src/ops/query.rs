use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::model::Item;
use crate::util::time::parse_ts_or_epoch;

/// A named filter over the full item collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    All,
    Pinned,
    Trash,
}

impl View {
    /// Parse a CLI view name
    pub fn parse(s: &str) -> Option<View> {
        match s {
            "all" => Some(View::All),
            "pinned" => Some(View::Pinned),
            "trash" => Some(View::Trash),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::All => "all",
            View::Pinned => "pinned",
            View::Trash => "trash",
        }
    }

    /// Whether an item belongs to this view
    pub fn includes(self, item: &Item) -> bool {
        match self {
            View::All => !item.is_deleted,
            View::Pinned => item.is_pinned && !item.is_deleted,
            View::Trash => item.is_deleted,
        }
    }
}

/// The display-ready sequence for a view: filter, then sort, then search.
///
/// Pure — no side effects, recomputed on demand from the collection.
/// Search only removes non-matching items; it never reorders, so the sort
/// invariant holds regardless of search text.
pub fn visible_items<'a>(items: &'a [Item], view: View, search: &str) -> Vec<&'a Item> {
    let mut filtered: Vec<&Item> = items.iter().filter(|item| view.includes(item)).collect();
    sort_for_display(&mut filtered);

    if search.trim().is_empty() {
        return filtered;
    }
    filtered
        .into_iter()
        .filter(|item| matches_search(item, search))
        .collect()
}

/// Pinned items first (newest pin first), then the rest newest-created
/// first.
fn sort_for_display(items: &mut [&Item]) {
    items.sort_by(|a, b| match (a.is_pinned, b.is_pinned) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => pin_stamp(b).cmp(&pin_stamp(a)),
        (false, false) => {
            parse_ts_or_epoch(&b.create_time).cmp(&parse_ts_or_epoch(&a.create_time))
        }
    });
}

fn pin_stamp(item: &Item) -> DateTime<Utc> {
    item.pinned_time
        .as_deref()
        .map(parse_ts_or_epoch)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Case-insensitive substring match over the text and every keyword.
/// A blank query matches everything.
pub fn matches_search(item: &Item, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    item.text.to_lowercase().contains(&query)
        || item
            .keywords
            .iter()
            .any(|keyword| keyword.to_lowercase().contains(&query))
}

// ---------------------------------------------------------------------------
// Preview windows
// ---------------------------------------------------------------------------

/// A `max_len`-character window into `text` for list display, with `...`
/// markers on truncated edges. With a matching search query the window is
/// centered on the first match position; otherwise it is the head of the
/// text. Window math is in characters, not bytes.
pub fn preview(text: &str, search: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    let query = search.trim().to_lowercase();
    let match_index = if query.is_empty() {
        None
    } else {
        first_match_char_index(text, &query)
    };

    match match_index {
        None => {
            if total <= max_len {
                text.to_string()
            } else {
                let head: String = chars[..max_len].iter().collect();
                format!("{}...", head)
            }
        }
        Some(index) => {
            let start = index.saturating_sub(max_len / 2);
            let end = total.min(start + max_len);
            let mut window: String = chars[start..end].iter().collect();
            if start > 0 {
                window = format!("...{}", window);
            }
            if end < total {
                window.push_str("...");
            }
            window
        }
    }
}

/// Character index of the first case-insensitive occurrence of
/// `query_lower` in `text`.
fn first_match_char_index(text: &str, query_lower: &str) -> Option<usize> {
    let lowered = text.to_lowercase();
    let byte_index = lowered.find(query_lower)?;
    Some(lowered[..byte_index].chars().count())
}

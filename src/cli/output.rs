use serde::Serialize;

use crate::model::Item;
use crate::ops::query::preview;
use crate::ops::trash::TrashStats;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashStatsJson {
    pub total_deleted: usize,
    pub will_be_cleaned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_deleted_time: Option<String>,
}

impl From<&TrashStats> for TrashStatsJson {
    fn from(stats: &TrashStats) -> Self {
        TrashStatsJson {
            total_deleted: stats.total_deleted,
            will_be_cleaned: stats.will_be_cleaned,
            oldest_deleted_time: stats.oldest_deleted_time.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct CleanReportJson {
    pub removed: usize,
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Human formatting
// ---------------------------------------------------------------------------

/// Abbreviated id for listings — the full id still works everywhere.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn marker(item: &Item) -> char {
    if item.is_deleted {
        'x'
    } else if item.is_pinned {
        '*'
    } else {
        ' '
    }
}

/// One listing line: `- [*] \`0199a2b4\` preview text #keyword`
pub fn format_item_row(item: &Item, search: &str, preview_len: usize) -> String {
    let text = item.text.replace('\n', " ");
    let mut line = format!(
        "- [{}] `{}` {}",
        marker(item),
        short_id(&item.id),
        preview(&text, search, preview_len)
    );
    for keyword in &item.keywords {
        line.push_str(&format!(" #{}", keyword));
    }
    line
}

/// Full detail block for `sn show`.
pub fn format_item_detail(item: &Item) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("id:       {}", item.id));
    lines.push(format!("created:  {}", item.create_time));
    lines.push(format!("updated:  {}", item.update_time));
    lines.push(format!("copies:   {}", item.copy_count));
    if let Some(pinned_time) = &item.pinned_time {
        lines.push(format!("pinned:   {}", pinned_time));
    }
    if let Some(deleted_time) = &item.deleted_time {
        lines.push(format!("deleted:  {}", deleted_time));
    }
    if !item.keywords.is_empty() {
        lines.push(format!(
            "keywords: {}",
            item.keywords
                .iter()
                .map(|k| format!("#{}", k))
                .collect::<Vec<_>>()
                .join(" ")
        ));
    }
    lines.push(String::new());
    lines.extend(item.text.lines().map(|l| l.to_string()));
    lines
}

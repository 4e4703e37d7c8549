use serde::{Deserialize, Serialize};

/// User settings, stored under the settings key next to the item data.
/// Missing fields fall back to defaults, so a partial or absent settings
/// blob still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Days a trashed item is kept before the automatic sweep removes it
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Width of the preview window, in characters
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            retention_days: 30,
            preview_length: 100,
        }
    }
}

fn default_retention_days() -> i64 {
    30
}

fn default_preview_length() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.retention_days, 30);
        assert_eq!(settings.preview_length, 100);
    }

    #[test]
    fn partial_object_keeps_other_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"retentionDays":7}"#).unwrap();
        assert_eq!(settings.retention_days, 7);
        assert_eq!(settings.preview_length, 100);
    }
}

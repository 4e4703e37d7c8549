use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an ISO 8601 UTC string with millisecond precision,
/// e.g. `2025-10-20T08:00:00.000Z`.
pub fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp string. Returns `None` when the string is not
/// valid RFC 3339 — callers decide how unparseable stamps order.
pub fn parse_ts(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a stored timestamp for ordering, treating unparseable stamps as
/// the epoch so they sort last in newest-first listings.
pub fn parse_ts_or_epoch(ts: &str) -> DateTime<Utc> {
    parse_ts(ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ts_is_utc_millis() {
        let ts = now_ts();
        assert!(ts.ends_with('Z'));
        // 2025-10-20T08:00:00.000Z → fixed width
        assert_eq!(ts.len(), 24);
        assert!(parse_ts(&ts).is_some());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_ts("not a date").is_none());
        assert_eq!(parse_ts_or_epoch("t"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn parse_normalizes_offsets_to_utc() {
        let dt = parse_ts("2025-10-20T10:00:00.000+02:00").unwrap();
        assert_eq!(dt, parse_ts("2025-10-20T08:00:00.000Z").unwrap());
    }
}

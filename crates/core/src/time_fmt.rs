//! Timestamp formatting shared by the event envelope (§3) and backup
//! record naming (§6).

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// RFC3339 UTC, e.g. `2026-07-26T10:15:00Z`, used for the event envelope's
/// `Timestamp` field.
pub fn epoch_ms_to_rfc3339(epoch_ms: u64) -> String {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// ISO8601 local-format datetime without a timezone suffix, e.g.
/// `2026-07-26T10:15:00`, used inside backup record names (§6, §4.5). The
/// backup naming grammar splits on `-`, so this format must not itself
/// contain a bare `-` outside of the date portion — it doesn't, since time
/// is colon-separated.
pub fn epoch_ms_to_backup_datetime(epoch_ms: u64) -> String {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Parse a backup-style datetime string back into a UTC instant. Returns
/// `None` on malformed input rather than erroring — callers treat this as
/// "can't sort, fall back to lexicographic order".
pub fn parse_backup_datetime(s: &str) -> Option<DateTime<Utc>> {
    let naive = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;

//! Time utilities: DB timestamp encoding, whole-minute durations, display formatting.

use chrono::{DateTime, Local, SecondsFormat, SubsecRound, Utc};

/// Timestamps are persisted with millisecond precision.
pub fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

/// Encode a timestamp for the DB: `YYYY-MM-DDTHH:MM:SS.mmmZ`.
/// The fixed width keeps lexical order equal to chronological order.
pub fn to_db_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_db_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Whole minutes elapsed between two instants.
/// Partial minutes are dropped (never rounded up); a negative span counts as 0.
pub fn whole_minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    (ms / 60_000).max(0)
}

/// Local wall-clock rendering used in tables.
pub fn format_local(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_local_opt(dt: Option<DateTime<Utc>>) -> String {
    match dt {
        Some(d) => format_local(d),
        None => "--".to_string(),
    }
}

//! Change-log text handling.
//!
//! The LOG field holds a newline-delimited history of rating changes,
//! newest entry first, each prefixed with a local timestamp in the fixed
//! `DD.MM.YYYY, HH:MM` convention.

use chrono::{DateTime, Local};

/// Timestamp convention used for log entries, e.g. "24.12.2023, 18:05".
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// Format a point in time for a log entry.
pub fn format_timestamp(when: DateTime<Local>) -> String {
    when.format(TIMESTAMP_FORMAT).to_string()
}

/// The seed entry written when a record is created.
pub fn created_entry(when: DateTime<Local>, stars: u32) -> String {
    format!(
        "{}: Eintrag erstellt mit {} Sternen",
        format_timestamp(when),
        stars
    )
}

/// The entry written when a rating changes.
pub fn rating_entry(when: DateTime<Local>, old: u32, new: u32) -> String {
    format!(
        "{}: Bewertung von {} auf {} geändert",
        format_timestamp(when),
        old,
        new
    )
}

/// Prepend a new entry to an existing log, newest first. The old text is
/// trimmed so repeated merges never accumulate blank lines.
pub fn prepend(entry: &str, existing: Option<&str>) -> String {
    match existing.map(str::trim) {
        Some(old) if !old.is_empty() => format!("{entry}\n{old}"),
        _ => entry.to_string(),
    }
}

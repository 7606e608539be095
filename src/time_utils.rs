// SPDX-License-Identifier: MIT

//! Shared helpers for date/time parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an arrival timestamp supplied by a client.
///
/// Accepts RFC3339 ("2024-06-01T10:00:00Z"), a naive datetime without
/// offset ("2024-06-01T10:00" / "2024-06-01T10:00:00") taken as UTC, or
/// a bare date ("2024-06-01") taken as midnight UTC. HTML datetime-local
/// and date inputs produce the naive forms.
pub fn parse_arrival(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

//! Turnaround time (TAT) calculation
//!
//! TAT is the number of minutes between a record becoming known (store
//! creation time, falling back to its "Added On" date) and the invitation
//! email being sent.

use chrono::{DateTime, NaiveDate, Utc};

/// Elapsed minutes from `reference` to `sent_at`, rounded to 2 decimals
///
/// Clamped at zero when the reference lies after the send time.
pub fn turnaround_minutes(reference: DateTime<Utc>, sent_at: DateTime<Utc>) -> f64 {
    let elapsed_ms = sent_at.signed_duration_since(reference).num_milliseconds().max(0);
    let minutes = elapsed_ms as f64 / 60_000.0;
    (minutes * 100.0).round() / 100.0
}

/// Parse a timestamp or date written by the store or an operator
///
/// Accepts RFC 3339 timestamps and the usual date spellings; date-only
/// values resolve to midnight UTC. Returns `None` for blank or unparseable
/// input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    match dateparser::parse_with_timezone(raw, &Utc) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(raw = raw, error = %e, "Unparseable timestamp");
            None
        }
    }
}

/// Pick the TAT reference time for a record
///
/// Store creation time wins over the "Added On" value.
pub fn reference_time(created_time: Option<&str>, added_on: Option<&str>) -> Option<DateTime<Utc>> {
    created_time
        .and_then(parse_timestamp)
        .or_else(|| added_on.and_then(parse_timestamp))
}

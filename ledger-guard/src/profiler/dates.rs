//! Date parsing for date-like text columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a cell value as a date or datetime.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]`, `YYYY-MM-DD HH:MM:SS[.f]`
/// and RFC 3339 with an offset, which is normalized to UTC.
pub fn parse_date_value(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.naive_utc())
}

/// Formats a datetime the way profiles store date bounds.
pub fn format_profile_date(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Reads back a date bound written by [`format_profile_date`].
pub fn parse_profile_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Running minimum and maximum over parsed values.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DateBounds {
    min: Option<NaiveDateTime>,
    max: Option<NaiveDateTime>,
}

impl DateBounds {
    pub(crate) fn observe(&mut self, value: &str) {
        if let Some(parsed) = parse_date_value(value) {
            self.min = Some(self.min.map_or(parsed, |min| min.min(parsed)));
            self.max = Some(self.max.map_or(parsed, |max| max.max(parsed)));
        }
    }

    /// Formatted `(min, max)`, or `None` when nothing parsed.
    pub(crate) fn finish(self) -> Option<(String, String)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((format_profile_date(min), format_profile_date(max))),
            _ => None,
        }
    }
}

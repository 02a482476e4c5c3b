use crate::feed::FeedEntry;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;
use std::sync::LazyLock;

/// Shown when an entry carries no usable date at all.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// `YYYY-MM-DD` at the start of the raw text.
static DATE_PREFIX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("Invalid date prefix pattern"));

/// RFC 822 layouts, matched after the weekday name has been dropped.
/// The weekday is not checked against the date.
const RFC822_FORMATS: [&str; 2] = [
    // "02 Jan 2024 10:00:00 +0800"
    "%d %b %Y %H:%M:%S %z",
    // "02 Jan 2024 10:00:00 GMT"
    "%d %b %Y %H:%M:%S %Z",
];

// ISO 8601: "2024-01-02T10:00:00+0800"
const ISO_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
// ISO 8601 without offset: "2024-01-02T10:00:00"
const ISO_NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Normalizes an entry's publish date to `YYYY-MM-DD`.
///
/// Resolution order:
///
/// 1. Raw text (`published`, else `updated`, trimmed) starting with
///    `YYYY-MM-DD`: its first 10 characters
/// 2. Raw text matching one of the RFC 822 / ISO 8601 layouts: the calendar
///    date as written, with no timezone conversion
/// 3. The structured `published_parsed`/`updated_parsed` date
/// 4. The raw text itself if non-empty, otherwise [`UNKNOWN_DATE`]
pub fn format_entry_date(entry: &FeedEntry) -> String {
    let raw = raw_date_text(entry);

    if !raw.is_empty() {
        if DATE_PREFIX_PATTERN.is_match(raw) {
            return raw.chars().take(10).collect();
        }
        if let Some(date) = parse_raw_date(raw) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Some(parsed) = entry.published_parsed.or(entry.updated_parsed) {
        return parsed.date_naive().format("%Y-%m-%d").to_string();
    }

    if raw.is_empty() {
        UNKNOWN_DATE.to_string()
    } else {
        raw.to_string()
    }
}

/// First non-empty of `published`/`updated`, trimmed afterwards.
///
/// A whitespace-only `published` still wins over `updated` and trims to "".
fn raw_date_text(entry: &FeedEntry) -> &str {
    entry
        .published
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| entry.updated.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("")
        .trim()
}

fn parse_raw_date(raw: &str) -> Option<NaiveDate> {
    let rfc822 = strip_weekday(raw);
    RFC822_FORMATS
        .iter()
        .find_map(|fmt| parse_date_as_written(rfc822, fmt))
        .or_else(|| parse_date_as_written(raw, ISO_OFFSET_FORMAT))
        .or_else(|| parse_date_as_written(raw, ISO_NAIVE_FORMAT))
}

/// Calendar date of `text` in its own offset; zone names and missing
/// offsets are taken at face value.
fn parse_date_as_written(text: &str, fmt: &str) -> Option<NaiveDate> {
    if fmt.ends_with("%z") {
        DateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date_naive())
    } else {
        NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date())
    }
}

/// Drops a leading `"Tue, "` so a weekday that disagrees with the date
/// does not reject an otherwise valid RFC 822 timestamp.
fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if day.trim().parse::<Weekday>().is_ok() => rest.trim_start(),
        _ => raw,
    }
}

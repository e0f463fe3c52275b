//! Cheap per-entry gates: recency, language, and publish-date extraction.
//!
//! Both gates fail open. An entry whose age cannot be determined is treated
//! as recent, since dropping an undated but relevant article costs more
//! than keeping a stale one.

use crate::models::{FeedEntry, UNKNOWN_DATE};
use chrono::{DateTime, TimeDelta, Utc};

/// Common English function words used by [`looks_like_target_language`].
pub const ENGLISH_MARKERS: [&str; 10] = [
    "the", "and", "in", "of", "to", "a", "for", "with", "that", "on",
];

/// Minimum number of distinct marker words for text to count as English.
pub const MIN_LANGUAGE_MARKERS: usize = 3;

/// Recency window expressed in months of 30 days.
pub fn months_window(months: u32) -> TimeDelta {
    TimeDelta::days(30 * i64::from(months))
}

/// Accept iff the entry was published no more than `max_age` before `now`.
///
/// Entries without a parsed timestamp are accepted.
pub fn is_recent(entry: &FeedEntry, max_age: TimeDelta, now: DateTime<Utc>) -> bool {
    match entry.published {
        Some(published) => now.signed_duration_since(published) <= max_age,
        None => true,
    }
}

/// Marker-word heuristic standing in for language detection.
///
/// Counts how many distinct [`ENGLISH_MARKERS`] appear as whitespace
/// delimited tokens (case-insensitive) and accepts at
/// [`MIN_LANGUAGE_MARKERS`] or more. Short headlines and texts heavy in
/// proper nouns can be misjudged.
pub fn looks_like_target_language(text: &str) -> bool {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let found = ENGLISH_MARKERS
        .into_iter()
        .filter(|marker| tokens.contains(marker))
        .count();
    found >= MIN_LANGUAGE_MARKERS
}

/// Publish date for output, `YYYY-MM-DD` or `"Unknown"`.
///
/// Prefers the parsed timestamp. Otherwise falls back to the raw string:
/// the date half of an ISO-like `date T time` value, or its first ten
/// characters.
pub fn publish_date(entry: &FeedEntry) -> String {
    if let Some(published) = entry.published {
        return published.format("%Y-%m-%d").to_string();
    }

    let raw = match entry.published_raw.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return UNKNOWN_DATE.to_string(),
    };

    if let Some((date, _)) = raw.split_once('T') {
        if looks_like_iso_date(date) {
            return date.to_string();
        }
    }

    raw.chars().take(10).collect()
}

fn looks_like_iso_date(s: &str) -> bool {
    s.len() == 10
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        })
}

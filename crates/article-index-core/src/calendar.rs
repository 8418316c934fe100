//! Title patterns for date lookups.
//!
//! Diary-style archives name entries `<prefix>YYYY-MM-DD...`. The pattern
//! returned here is a LIKE pattern for [`Store::find_first`](crate::store::Store::find_first).

/// `"{prefix}{year}-{MM}-{DD}%"`, `month` is 1-based.
pub fn date_title_pattern(prefix: &str, year: i32, month: u32, day: u32) -> String {
    format!("{}{}-{:02}-{:02}%", prefix, year, month, day)
}

// src/utils/date.rs

//! Publication and registration date parsing.

use chrono::NaiveDate;

/// Display value for a book whose release month is unknown.
pub const UNDETERMINED_RELEASE: &str = "発売日未定";

/// Parse the leading `YYYYMM` of a raw publication date.
///
/// Hyphens are ignored so `2025-03` and `20250315` both parse. Returns `None`
/// for anything shorter than six digits or with a month outside 1-12.
pub fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let digits: String = raw.trim().chars().filter(|&c| c != '-').collect();
    let year: i32 = digits.get(..4)?.parse().ok()?;
    let month: u32 = digits.get(4..6)?.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Format a raw `YYYYMM...` date as `YYYY年M月`.
///
/// # Examples
/// ```
/// use shinsho_finder::utils::date::format_pubdate;
///
/// assert_eq!(format_pubdate("20250315"), "2025年3月");
/// assert_eq!(format_pubdate("2025"), "発売日未定");
/// ```
pub fn format_pubdate(raw: &str) -> String {
    match parse_year_month(raw) {
        Some((year, month)) => format!("{year}年{month}月"),
        None => UNDETERMINED_RELEASE.to_string(),
    }
}

/// Parse a `YYYY-MM-DD` date, ignoring any trailing time component.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

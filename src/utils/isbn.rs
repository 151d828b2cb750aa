// src/utils/isbn.rs

//! ISBN helpers.

/// Convert a 978-prefixed ISBN-13 into its ISBN-10 form.
///
/// Hyphens are ignored. Anything that is not a 13-digit `978` ISBN (including
/// `979` ISBNs, which have no ISBN-10) yields an empty string.
///
/// # Examples
/// ```
/// use shinsho_finder::utils::isbn::to_isbn10;
///
/// assert_eq!(to_isbn10("978-4-00-431093-8"), "4004310938");
/// assert_eq!(to_isbn10("9790000000001"), "");
/// ```
pub fn to_isbn10(isbn13: &str) -> String {
    let clean: String = isbn13.chars().filter(|&c| c != '-').collect();
    if clean.len() != 13 || !clean.starts_with("978") || !clean.bytes().all(|b| b.is_ascii_digit())
    {
        return String::new();
    }

    let base = &clean[3..12];
    let sum: u32 = base
        .bytes()
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * (10 - i as u32))
        .sum();

    match (11 - sum % 11) % 11 {
        10 => format!("{base}X"),
        check => format!("{base}{check}"),
    }
}

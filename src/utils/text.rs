// src/utils/text.rs

//! Text cleanup helpers.

/// Punctuation removed from hashtags, ASCII and full-width.
const HASHTAG_STRIP: &[char] = &[
    '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', ':', ';', '<',
    '=', '>', '?', '@', '[', '\\', ']', '^', '`', '{', '|', '}', '~', '、', '。', '，', '．',
    '・', '：', '；', '！', '？', '＋', '＝', '＆', '＃', '＠', '／', '＼', '（', '）', '［',
    '］', '｛', '｝', '「', '」', '『', '』', '【', '】', '〈', '〉', '《', '》', '〔', '〕',
    '“', '”', '‘', '’', '…', '～', '〜',
];

/// Turn free text into a hashtag body by removing whitespace and punctuation.
///
/// # Examples
/// ```
/// use shinsho_finder::utils::text::hashtag_body;
///
/// assert_eq!(hashtag_body("講談社＋α新書"), "講談社α新書");
/// assert_eq!(hashtag_body("山田 太郎"), "山田太郎");
/// ```
pub fn hashtag_body(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !HASHTAG_STRIP.contains(c))
        .collect()
}

/// Escape text for XML element content and attribute values.
pub fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

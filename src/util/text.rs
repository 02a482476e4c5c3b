/// First code point of the CJK Unified Ideographs block.
const CJK_START: char = '\u{4E00}';
/// Last code point of the CJK Unified Ideographs block.
const CJK_END: char = '\u{9FFF}';

/// Returns the part of a link before the first `#`.
///
/// Only the literal first `#` is significant; no URL normalization is done,
/// so the result is byte-for-byte a prefix of the input.
///
/// # Examples
///
/// ```
/// use readme_feed::util::strip_fragment;
///
/// assert_eq!(strip_fragment("https://example.com/post#comments"), "https://example.com/post");
/// assert_eq!(strip_fragment("https://example.com/post"), "https://example.com/post");
/// assert_eq!(strip_fragment("#top"), "");
/// ```
pub fn strip_fragment(link: &str) -> &str {
    match link.find('#') {
        Some(idx) => &link[..idx],
        None => link,
    }
}

/// Returns `true` if the text contains at least one CJK Unified Ideograph
/// (U+4E00 through U+9FFF).
///
/// Extension blocks, compatibility ideographs, kana and hangul are not
/// counted. This is a heuristic for "written in Chinese", nothing more.
///
/// # Examples
///
/// ```
/// use readme_feed::util::contains_cjk;
///
/// assert!(contains_cjk("Rust 入门"));
/// assert!(!contains_cjk("Getting started"));
/// assert!(!contains_cjk("ひらがな"));
/// ```
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| (CJK_START..=CJK_END).contains(&c))
}

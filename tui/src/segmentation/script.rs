//! Detection of scripts that are written without inter-word delimiters.
//!
//! Only text containing at least one of these code points is ever handed to the tokenizer; every
//! other line keeps the host's native word semantics.

/// Inclusive code point ranges that trigger segmentation.
const SEGMENTABLE_RANGES: &[(u32, u32)] = &[
    (0x3040, 0x309F),   // Hiragana
    (0x30A0, 0x30FF),   // Katakana
    (0x3400, 0x4DBF),   // CJK Unified Ideographs Extension A
    (0x4E00, 0x9FFF),   // CJK Unified Ideographs
    (0xF900, 0xFAFF),   // CJK Compatibility Ideographs
    (0x20000, 0x2A6DF), // Extension B
    (0x2A700, 0x2EBEF), // Extensions C-F
    (0x30000, 0x323AF), // Extensions G-H
];

pub fn is_segmentable_char(ch: char) -> bool {
    let cp = ch as u32;
    SEGMENTABLE_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// True iff `text` contains at least one code point in a segmentable script.
pub fn contains_segmentable_script(text: &str) -> bool {
    // ASCII fast path: none of the ranges are below U+3040.
    !text.is_ascii() && text.chars().any(is_segmentable_char)
}

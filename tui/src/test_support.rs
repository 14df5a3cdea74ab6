use hanseg_protocol::Segment;

use crate::segmentation::Tokenizer;

/// Deterministic tokenizer for tests: greedy longest match over a fixed word list, whitespace
/// runs as one segment, and one segment per unmatched character.
pub(crate) struct DictTokenizer {
    words: Vec<&'static str>,
}

impl DictTokenizer {
    pub(crate) fn new(words: &[&'static str]) -> Self {
        let mut words = words.to_vec();
        words.sort_by_key(|w| std::cmp::Reverse(w.len()));
        Self { words }
    }

    /// Splits `我爱北京天安门` into `我爱 | 北京 | 天安门`.
    pub(crate) fn beijing() -> Self {
        Self::new(&["我爱", "北京", "天安门", "你好", "世界"])
    }
}

impl Tokenizer for DictTokenizer {
    fn segment<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let len = if rest.starts_with(char::is_whitespace) {
                rest.find(|c: char| !c.is_whitespace())
                    .unwrap_or(rest.len())
            } else if let Some(word) = self.words.iter().find(|w| rest.starts_with(**w)) {
                word.len()
            } else {
                rest.chars().next().map_or(rest.len(), char::len_utf8)
            };
            out.push(Segment::from_range(text, pos..pos + len));
            pos += len;
        }
        out
    }
}

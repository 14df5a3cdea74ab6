//! The tokenizer seam and its default ICU4X-backed implementation.
//!
//! A [`Tokenizer`] turns plain text into an ordered list of [`Segment`]s that cover the input
//! exactly: no gaps, no overlaps, no dropped characters. The rest of the segmentation code relies
//! on that contract and does not re-validate it at runtime.

use std::ops::Range;

use hanseg_protocol::Segment;
use icu_segmenter::WordSegmenter;
use icu_segmenter::WordSegmenterBorrowed;
use icu_segmenter::options::WordBreakInvariantOptions;

/// ASCII punctuation split out of ICU4X segments so `foo.bar` yields three words.
pub const WORD_SEPARATORS: &str = "`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// Splits text into semantic word segments.
///
/// Implementations must be deterministic for a given dictionary state.
pub trait Tokenizer {
    fn segment<'t>(&self, text: &'t str) -> Vec<Segment<'t>>;
}

/// Dictionary-based word segmentation from ICU4X (compiled data, no runtime data loading).
///
/// Whitespace runs become one segment each. Non-whitespace runs are split at ICU4X word breaks
/// and again wherever an ASCII separator meets a non-separator character.
pub struct IcuTokenizer {
    segmenter: WordSegmenterBorrowed<'static>,
}

impl IcuTokenizer {
    pub fn new() -> Self {
        Self {
            segmenter: WordSegmenter::new_auto(WordBreakInvariantOptions::default()),
        }
    }
}

impl Default for IcuTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IcuTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcuTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for IcuTokenizer {
    fn segment<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut out = Vec::new();
        let mut iter = text.char_indices();
        let Some((_, first_ch)) = iter.next() else {
            return out;
        };

        let mut run_start = 0;
        let mut run_is_whitespace = first_ch.is_whitespace();

        for (idx, ch) in iter {
            let is_whitespace = ch.is_whitespace();
            if is_whitespace == run_is_whitespace {
                continue;
            }
            self.push_run(text, run_start..idx, run_is_whitespace, &mut out);
            run_start = idx;
            run_is_whitespace = is_whitespace;
        }
        self.push_run(text, run_start..text.len(), run_is_whitespace, &mut out);

        tracing::trace!(bytes = text.len(), segments = out.len(), "segmented text");
        out
    }
}

impl IcuTokenizer {
    fn push_run<'t>(
        &self,
        text: &'t str,
        run: Range<usize>,
        is_whitespace: bool,
        out: &mut Vec<Segment<'t>>,
    ) {
        if run.start >= run.end {
            return;
        }
        if is_whitespace {
            out.push(Segment::from_range(text, run));
            return;
        }

        let slice = &text[run.clone()];
        let mut breakpoints: Vec<usize> = self.segmenter.segment_str(slice).collect();
        if breakpoints.first().copied() != Some(0) {
            breakpoints.insert(0, 0);
        }
        if breakpoints.last().copied() != Some(slice.len()) {
            breakpoints.push(slice.len());
        }

        for w in breakpoints.windows(2) {
            let start = run.start + w[0];
            let end = run.start + w[1];
            if start >= end {
                continue;
            }
            split_by_word_separators(text, start..end, out);
        }
    }
}

fn split_by_word_separators<'t>(text: &'t str, range: Range<usize>, out: &mut Vec<Segment<'t>>) {
    let mut seg_start = range.start;
    let mut current_is_separator = None;

    for (idx, ch) in text[range.clone()].char_indices() {
        let is_separator = WORD_SEPARATORS.contains(ch);
        match current_is_separator {
            None => current_is_separator = Some(is_separator),
            Some(prev) if prev != is_separator => {
                let boundary = range.start + idx;
                out.push(Segment::from_range(text, seg_start..boundary));
                seg_start = boundary;
                current_is_separator = Some(is_separator);
            }
            Some(_) => {}
        }
    }

    out.push(Segment::from_range(text, seg_start..range.end));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn texts(segments: &[Segment<'_>]) -> Vec<String> {
        segments.iter().map(|s| s.text.to_string()).collect()
    }

    /// Tokenizer contract: segments are contiguous, non-empty and cover `[0, len)` exactly.
    fn assert_covers(text: &str, segments: &[Segment<'_>]) {
        let mut expected_start = 0;
        for segment in segments {
            assert_eq!(segment.start, expected_start, "gap or overlap in {text:?}");
            assert!(segment.end > segment.start, "empty segment in {text:?}");
            assert_eq!(segment.text, &text[segment.range()]);
            expected_start = segment.end;
        }
        assert_eq!(expected_start, text.len(), "segments do not reach end of {text:?}");
    }

    #[test]
    fn empty_text_yields_no_segments() {
        assert!(IcuTokenizer::new().segment("").is_empty());
    }

    #[test]
    fn whitespace_runs_are_single_segments() {
        let tokenizer = IcuTokenizer::new();
        let segments = tokenizer.segment("foo   bar");
        assert_eq!(texts(&segments), vec!["foo", "   ", "bar"]);
    }

    #[test]
    fn ascii_separators_split_words() {
        let tokenizer = IcuTokenizer::new();
        let segments = tokenizer.segment("foo.bar-baz");
        assert_eq!(texts(&segments), vec!["foo", ".", "bar", "-", "baz"]);
    }

    #[test]
    fn chinese_text_splits_into_more_than_one_word() {
        let tokenizer = IcuTokenizer::new();
        let text = "我爱北京天安门";
        let segments = tokenizer.segment(text);
        assert!(segments.len() > 1, "expected dictionary breaks: {segments:?}");
        assert_covers(text, &segments);
    }

    #[test]
    fn segmentation_covers_random_mixed_text() {
        const ALPHABET: &[char] = &[
            '我', '爱', '北', '京', '天', '安', '门', '的', 'カ', 'な', 'a', 'b', 'Z', '1', ' ',
            '\t', '\n', '.', ',', '-', '，', '。', 'é', '😀',
        ];
        let tokenizer = IcuTokenizer::new();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let len = rng.random_range(0..40);
            let text: String = (0..len)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
                .collect();
            let segments = tokenizer.segment(&text);
            assert_covers(&text, &segments);
        }
    }
}

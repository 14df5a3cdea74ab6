//! Tokenizer output and the word spans derived from it.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// One tokenizer-produced word inside the text it was derived from.
///
/// `start`/`end` are byte offsets relative to the segmented text, and `end - start` always equals
/// `text.len()`. Segments from a single tokenizer call are contiguous and cover the input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Segment<'a> {
    /// Build a segment from a byte range of `source`.
    pub fn from_range(source: &'a str, range: Range<usize>) -> Self {
        Self {
            text: &source[range.clone()],
            start: range.start,
            end: range.end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `start <= pos < end`. A position on a boundary belongs to the segment starting there.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn to_word_span(&self) -> WordSpan {
        WordSpan {
            from: self.start,
            to: self.end,
            word: self.text.to_string(),
        }
    }
}

/// Result of a boundary lookup.
///
/// Lookups over a single line return line-relative offsets; callers lift them into document
/// offsets with [`WordSpan::offset_by`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub from: usize,
    pub to: usize,
    pub word: String,
}

impl WordSpan {
    pub fn offset_by(self, base: usize) -> Self {
        Self {
            from: self.from + base,
            to: self.to + base,
            word: self.word,
        }
    }
}

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

/// A half-open document range to be visually marked as one word.
///
/// Ranges from one build pass are ordered by `from` and never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationRange {
    pub from: usize,
    pub to: usize,
}

impl DecorationRange {
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }
}

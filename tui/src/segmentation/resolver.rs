//! Segment-sized steps over an arbitrary document range.
//!
//! The host's native word steps treat a run of ideographs as one group. [`step_destination`]
//! takes the span such a step would cross and shortens it to the first (or last) segment of that
//! span. [`SegmentedFallback`] applies that to every step of an existing [`WordFallback`], so the
//! host's fallback path stops at segment boundaries too. A step that starts inside a segment of
//! its line first finishes that segment.

use std::borrow::Cow;
use std::ops::Range;
use std::rc::Rc;

use hanseg_protocol::Direction;
use hanseg_protocol::SelectionRange;

use super::Tokenizer;
use super::contains_segmentable_script;
use super::find_word_at;
use crate::host::Document;
use crate::host::WordFallback;

/// Where a step from `start` towards `limit` should stop.
///
/// The direction is forward when `start < limit`. `slice` returns the document text of the range
/// it is given. Returns `None` when the crossed text has no segmentable script (the caller keeps
/// its own step); otherwise `start` moved by the length of the first segment (forward) or the
/// last segment (backward) of the crossed text.
pub fn step_destination<'d>(
    tokenizer: &dyn Tokenizer,
    start: usize,
    limit: usize,
    slice: impl FnOnce(Range<usize>) -> Cow<'d, str>,
) -> Option<usize> {
    if start == limit {
        return None;
    }
    let forward = start < limit;
    let text = slice(start.min(limit)..start.max(limit));
    if !contains_segmentable_script(&text) {
        return None;
    }

    let segments = tokenizer.segment(&text);
    let segment = if forward {
        segments.first()
    } else {
        segments.last()
    }?;

    if forward {
        Some(start + segment.len())
    } else {
        Some(start - segment.len())
    }
}

/// A [`WordFallback`] whose steps never cross more than one segment of segmentable text.
///
/// For text without segmentable script this behaves exactly like the wrapped fallback.
pub struct SegmentedFallback<F> {
    inner: F,
    tokenizer: Rc<dyn Tokenizer>,
}

impl<F: WordFallback> SegmentedFallback<F> {
    pub fn new(inner: F, tokenizer: Rc<dyn Tokenizer>) -> Self {
        Self { inner, tokenizer }
    }

    fn refine(&self, doc: &dyn Document, start: usize, limit: usize) -> usize {
        if let Some(edge) = self.enclosing_segment_edge(doc, start, limit) {
            return edge;
        }
        step_destination(self.tokenizer.as_ref(), start, limit, |range| doc.slice(range))
            .unwrap_or(limit)
    }

    /// The edge of the line segment strictly enclosing `start` that faces `limit`, never past
    /// `limit`.
    fn enclosing_segment_edge(
        &self,
        doc: &dyn Document,
        start: usize,
        limit: usize,
    ) -> Option<usize> {
        let line = doc.line_at(start);
        let rel = start.checked_sub(line.start)?;
        let word = find_word_at(self.tokenizer.as_ref(), &line.text, rel)?;
        if word.from == rel || !contains_segmentable_script(&word.word) {
            return None;
        }
        let span = word.offset_by(line.start);
        if start < limit {
            Some(span.to.min(limit))
        } else {
            Some(span.from.max(limit))
        }
    }
}

impl<F: WordFallback> WordFallback for SegmentedFallback<F> {
    fn move_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
        extend: bool,
    ) -> SelectionRange {
        let native = self.inner.move_word(doc, range, direction, extend);
        let head = self.refine(doc, range.head, native.head);
        native.with_head(head, extend)
    }

    fn delete_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
    ) -> Option<Range<usize>> {
        let native = self.inner.delete_word(doc, range, direction)?;
        if !range.is_empty() {
            return Some(native);
        }
        let limit = match direction {
            Direction::Forward => native.end,
            Direction::Backward => native.start,
        };
        let target = self.refine(doc, range.head, limit);
        Some(range.head.min(target)..range.head.max(target))
    }
}

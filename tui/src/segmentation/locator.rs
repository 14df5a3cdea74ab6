//! Boundary lookups over a single line of text.
//!
//! All offsets here are relative to `text`. Every lookup short-circuits to `None` without calling
//! the tokenizer when the text has no segmentable script.

use hanseg_protocol::Direction;
use hanseg_protocol::Segment;
use hanseg_protocol::WordSpan;

use super::Tokenizer;
use super::contains_segmentable_script;

/// Return the segment `[start, end)` with `start <= pos < end`.
///
/// A position on a boundary belongs to the segment starting there. `pos == text.len()` is never
/// inside a segment.
pub fn find_word_at(tokenizer: &dyn Tokenizer, text: &str, pos: usize) -> Option<WordSpan> {
    if !contains_segmentable_script(text) {
        return None;
    }
    tokenizer
        .segment(text)
        .iter()
        .find(|segment| segment.contains(pos))
        .map(Segment::to_word_span)
}

/// Return the segment next to `pos` in `direction`.
///
/// - Forward: the first segment starting strictly after `pos`. A position inside a segment skips
///   to the next segment, not the rest of the current one.
/// - Backward: scanning left to right, the last segment seen before reaching one that starts at
///   or after `pos`. If no segment starts at or after `pos` (the caret is inside or at the end of
///   the last segment), the scan never stops and the lookup yields `None`; so does a caret at or
///   before the start of the first segment.
pub fn find_adjacent_word(
    tokenizer: &dyn Tokenizer,
    text: &str,
    pos: usize,
    direction: Direction,
) -> Option<WordSpan> {
    if !contains_segmentable_script(text) {
        return None;
    }
    let segments = tokenizer.segment(text);

    match direction {
        Direction::Forward => segments
            .iter()
            .find(|segment| segment.start > pos)
            .map(Segment::to_word_span),
        Direction::Backward => {
            let mut previous = None;
            for segment in &segments {
                if segment.start >= pos {
                    return previous.map(Segment::to_word_span);
                }
                previous = Some(segment);
            }
            None
        }
    }
}

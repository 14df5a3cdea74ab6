//! The host's own word motion: runs of same-class characters.
//!
//! This is the behavior the segmentation layer falls back to, and the one it improves on: any
//! run of alphanumeric characters is one "word", so a line of Chinese is a single unit.

use std::ops::Range;

use hanseg_protocol::Direction;
use hanseg_protocol::SelectionRange;
use unicode_segmentation::UnicodeSegmentation;

use super::Document;
use super::WordFallback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Whitespace,
    Punctuation,
}

fn classify(grapheme: &str) -> CharClass {
    let Some(ch) = grapheme.chars().next() else {
        return CharClass::Whitespace;
    };
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// Character-class word groups over extended grapheme clusters.
///
/// - Forward: skip whitespace, then the following run of one class, stopping at its end.
/// - Backward: skip whitespace, then the preceding run of one class, stopping at its start.
/// - At a line edge the step crosses the `\n` and stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeWordCommands;

impl NativeWordCommands {
    /// Where one group step from `pos` lands.
    pub fn group_target(doc: &dyn Document, pos: usize, direction: Direction) -> usize {
        let line = doc.line_at(pos);
        let rel = pos.saturating_sub(line.start).min(line.text.len());

        match direction {
            Direction::Forward => {
                if rel >= line.text.len() {
                    return (pos + 1).min(doc.len()).max(pos);
                }
                line.start + run_end(&line.text, rel)
            }
            Direction::Backward => {
                if rel == 0 {
                    return pos.saturating_sub(1);
                }
                line.start + run_start(&line.text, rel)
            }
        }
    }

    /// The same-class run under `offset`, for the host's default double-click.
    ///
    /// At the end of a line the run is empty.
    pub fn group_at(doc: &dyn Document, offset: usize) -> Range<usize> {
        let line = doc.line_at(offset);
        let rel = offset.saturating_sub(line.start).min(line.text.len());
        let text = line.text.as_ref();

        let Some((_, under)) = text[rel..].grapheme_indices(true).next() else {
            return offset..offset;
        };
        let class = classify(under);
        let end = text[rel..]
            .grapheme_indices(true)
            .find(|(_, g)| classify(g) != class)
            .map_or(text.len(), |(idx, _)| rel + idx);
        let start = text[..rel]
            .grapheme_indices(true)
            .rev()
            .take_while(|(_, g)| classify(g) == class)
            .last()
            .map_or(rel, |(idx, _)| idx);
        line.start + start..line.start + end
    }
}

fn run_end(text: &str, rel: usize) -> usize {
    let mut graphemes = text[rel..]
        .grapheme_indices(true)
        .map(|(idx, g)| (rel + idx, g))
        .peekable();

    while let Some((_, g)) = graphemes.peek() {
        if classify(g) != CharClass::Whitespace {
            break;
        }
        graphemes.next();
    }

    let Some((_, first)) = graphemes.peek().copied() else {
        return text.len();
    };
    let class = classify(first);
    for (idx, g) in graphemes {
        if classify(g) != class {
            return idx;
        }
    }
    text.len()
}

fn run_start(text: &str, rel: usize) -> usize {
    let mut graphemes = text[..rel].grapheme_indices(true).rev().peekable();

    while let Some((_, g)) = graphemes.peek() {
        if classify(g) != CharClass::Whitespace {
            break;
        }
        graphemes.next();
    }

    let Some((mut start, first)) = graphemes.peek().copied() else {
        return 0;
    };
    let class = classify(first);
    for (idx, g) in graphemes {
        if classify(g) != class {
            break;
        }
        start = idx;
    }
    start
}

impl WordFallback for NativeWordCommands {
    fn move_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
        extend: bool,
    ) -> SelectionRange {
        let target = Self::group_target(doc, range.head, direction);
        range.with_head(target, extend)
    }

    fn delete_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
    ) -> Option<Range<usize>> {
        if !range.is_empty() {
            return Some(range.range());
        }
        let target = Self::group_target(doc, range.head, direction);
        if target == range.head {
            return None;
        }
        Some(range.head.min(target)..range.head.max(target))
    }
}

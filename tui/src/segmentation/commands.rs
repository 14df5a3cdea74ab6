//! Word motion, selection and deletion that snap to segment boundaries.
//!
//! Each command runs once per selection range and produces a single [`Transaction`] for all of
//! them. A range whose line has no segmentable script, or no adjacent segment in the requested
//! direction, is handed to the host's [`WordFallback`] unchanged, so plain text keeps the host's
//! own word semantics exactly.

use std::ops::Range;

use hanseg_protocol::Direction;
use hanseg_protocol::Selection;
use hanseg_protocol::SelectionRange;
use hanseg_protocol::Transaction;

use super::Tokenizer;
use super::find_adjacent_word;
use super::find_word_at;
use crate::host::EditorContext;

/// The word commands a host can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordCommand {
    /// Move the head to the start of the adjacent segment; `extend` keeps the anchor.
    Move { direction: Direction, extend: bool },
    Delete { direction: Direction },
}

impl WordCommand {
    pub fn name(self) -> &'static str {
        match self {
            WordCommand::Move {
                direction: Direction::Backward,
                extend: false,
            } => "cursor-word-left",
            WordCommand::Move {
                direction: Direction::Forward,
                extend: false,
            } => "cursor-word-right",
            WordCommand::Move {
                direction: Direction::Backward,
                extend: true,
            } => "select-word-left",
            WordCommand::Move {
                direction: Direction::Forward,
                extend: true,
            } => "select-word-right",
            WordCommand::Delete {
                direction: Direction::Backward,
            } => "delete-word-backward",
            WordCommand::Delete {
                direction: Direction::Forward,
            } => "delete-word-forward",
        }
    }
}

/// Run `command` over every range of the current selection.
pub fn run_word_command(
    tokenizer: &dyn Tokenizer,
    cx: &EditorContext<'_>,
    command: WordCommand,
) -> Transaction {
    match command {
        WordCommand::Move { direction, extend } => {
            let ranges = cx
                .selection
                .ranges()
                .iter()
                .map(|&range| move_range(tokenizer, cx, range, direction, extend))
                .collect();
            Transaction::select(Selection::new(ranges, cx.selection.main_index()))
        }
        WordCommand::Delete { direction } => {
            let spans: Vec<Option<Range<usize>>> = cx
                .selection
                .ranges()
                .iter()
                .map(|&range| delete_span(tokenizer, cx, range, direction))
                .collect();
            Transaction::from_deletions(cx.selection, &spans)
        }
    }
}

fn move_range(
    tokenizer: &dyn Tokenizer,
    cx: &EditorContext<'_>,
    range: SelectionRange,
    direction: Direction,
    extend: bool,
) -> SelectionRange {
    let line = cx.doc.line_at(range.head);
    let rel = range.head.saturating_sub(line.start);
    match find_adjacent_word(tokenizer, &line.text, rel, direction) {
        // Both directions land on the segment start.
        Some(word) => range.with_head(line.start + word.from, extend),
        None => {
            tracing::debug!(head = range.head, ?direction, extend, "word move falls back to host");
            cx.fallback.move_word(cx.doc, range, direction, extend)
        }
    }
}

fn delete_span(
    tokenizer: &dyn Tokenizer,
    cx: &EditorContext<'_>,
    range: SelectionRange,
    direction: Direction,
) -> Option<Range<usize>> {
    if !range.is_empty() {
        return Some(range.range());
    }

    let caret = range.head;
    let line = cx.doc.line_at(caret);
    let rel = caret.saturating_sub(line.start);
    match find_adjacent_word(tokenizer, &line.text, rel, direction) {
        Some(word) => Some(match direction {
            Direction::Forward => caret..line.start + word.to,
            Direction::Backward => line.start + word.from..caret,
        }),
        None => {
            tracing::debug!(caret, ?direction, "word delete falls back to host");
            cx.fallback.delete_word(cx.doc, range, direction)
        }
    }
}

/// Select the segment under `offset` (a double-click). `None` leaves the host's default behavior
/// in place.
pub fn select_word_at(
    tokenizer: &dyn Tokenizer,
    cx: &EditorContext<'_>,
    offset: usize,
) -> Option<Transaction> {
    let line = cx.doc.line_at(offset);
    let rel = offset.checked_sub(line.start)?;
    let word = find_word_at(tokenizer, &line.text, rel)?.offset_by(line.start);
    tracing::debug!(from = word.from, to = word.to, word = %word.word, "double-click selects segment");
    Some(Transaction::select(Selection::single(SelectionRange::new(
        word.from, word.to,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::host::NativeWordCommands;
    use crate::host::TextBuffer;
    use crate::host::WordFallback;
    use crate::test_support::DictTokenizer;
    use hanseg_protocol::Change;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "我爱北京天安门";

    const MOVE_RIGHT: WordCommand = WordCommand::Move {
        direction: Direction::Forward,
        extend: false,
    };
    const MOVE_LEFT: WordCommand = WordCommand::Move {
        direction: Direction::Backward,
        extend: false,
    };
    const SELECT_RIGHT: WordCommand = WordCommand::Move {
        direction: Direction::Forward,
        extend: true,
    };
    const DELETE_BACKWARD: WordCommand = WordCommand::Delete {
        direction: Direction::Backward,
    };
    const DELETE_FORWARD: WordCommand = WordCommand::Delete {
        direction: Direction::Forward,
    };

    fn run(text: &str, selection: Selection, command: WordCommand) -> Transaction {
        let doc = TextBuffer::new(text);
        let cx = EditorContext {
            doc: &doc,
            selection: &selection,
            fallback: &NativeWordCommands,
        };
        run_word_command(&DictTokenizer::beijing(), &cx, command)
    }

    fn caret(pos: usize) -> Selection {
        Selection::caret(pos)
    }

    #[test]
    fn double_click_selects_segment_under_offset() {
        let doc = TextBuffer::new(TEXT);
        let selection = caret(0);
        let cx = EditorContext {
            doc: &doc,
            selection: &selection,
            fallback: &NativeWordCommands,
        };
        let tx = select_word_at(&DictTokenizer::beijing(), &cx, 15).expect("word under offset");
        assert_eq!(tx, Transaction::select(Selection::single(SelectionRange::new(12, 21))));
    }

    #[test]
    fn double_click_on_later_line_uses_document_offsets() {
        let doc = TextBuffer::new("hello\n你好世界");
        let selection = caret(0);
        let cx = EditorContext {
            doc: &doc,
            selection: &selection,
            fallback: &NativeWordCommands,
        };
        let tokenizer = DictTokenizer::beijing();
        assert_eq!(
            select_word_at(&tokenizer, &cx, 13),
            Some(Transaction::select(Selection::single(SelectionRange::new(12, 18))))
        );
        assert_eq!(select_word_at(&tokenizer, &cx, 2), None);
        assert_eq!(select_word_at(&tokenizer, &cx, doc.len()), None);
    }

    #[test]
    fn move_right_lands_on_start_of_next_segment() {
        let tx = run(TEXT, caret(6), MOVE_RIGHT);
        assert_eq!(tx, Transaction::select(caret(12)));
    }

    #[test]
    fn move_left_lands_on_start_of_previous_segment() {
        assert_eq!(run(TEXT, caret(12), MOVE_LEFT), Transaction::select(caret(6)));
        assert_eq!(run(TEXT, caret(9), MOVE_LEFT), Transaction::select(caret(6)));
    }

    #[test]
    fn select_right_keeps_anchor() {
        let tx = run(TEXT, Selection::single(SelectionRange::new(0, 6)), SELECT_RIGHT);
        assert_eq!(
            tx,
            Transaction::select(Selection::single(SelectionRange::new(0, 12)))
        );
    }

    #[test]
    fn move_without_adjacent_segment_delegates_to_host() {
        // Inside the last segment there is no next segment; the native step runs to line end.
        assert_eq!(run(TEXT, caret(15), MOVE_RIGHT), Transaction::select(caret(21)));
    }

    #[test]
    fn delete_backward_removes_preceding_segment() {
        let tx = run(TEXT, caret(12), DELETE_BACKWARD);
        assert_eq!(tx.changes, vec![Change::delete(6..12)]);
        assert_eq!(tx.selection, caret(6));
        assert_eq!(tx.apply(TEXT), "我爱天安门");
    }

    #[test]
    fn delete_forward_extends_to_end_of_next_segment() {
        let tx = run(TEXT, caret(6), DELETE_FORWARD);
        assert_eq!(tx.changes, vec![Change::delete(6..21)]);
        assert_eq!(tx.selection, caret(6));
    }

    #[test]
    fn delete_with_selection_removes_exactly_the_selection() {
        for command in [DELETE_FORWARD, DELETE_BACKWARD] {
            let tx = run(TEXT, Selection::single(SelectionRange::new(12, 6)), command);
            assert_eq!(tx.changes, vec![Change::delete(6..12)]);
            assert_eq!(tx.selection, caret(6));
        }
    }

    #[test]
    fn delete_forward_at_line_end_delegates_to_host() {
        let tx = run("北京\nhello", caret(6), DELETE_FORWARD);
        assert_eq!(tx.changes, vec![Change::delete(6..7)]);
        assert_eq!(tx.selection, caret(6));
    }

    #[test]
    fn delete_with_nothing_to_remove_is_selection_only() {
        let tx = run("hello", caret(5), DELETE_FORWARD);
        assert!(tx.is_selection_only());
        assert_eq!(tx.selection, caret(5));
    }

    #[test]
    fn multiple_ranges_are_updated_in_one_transaction() {
        let text = "我爱北京\n你好世界";
        let selection = Selection::new(
            vec![SelectionRange::caret(6), SelectionRange::caret(19)],
            1,
        );
        let tx = run(text, selection, DELETE_BACKWARD);
        assert_eq!(tx.changes, vec![Change::delete(0..6), Change::delete(13..19)]);
        assert_eq!(
            tx.selection,
            Selection::new(vec![SelectionRange::caret(0), SelectionRange::caret(7)], 1)
        );
        assert_eq!(tx.apply(text), "北京\n世界");
    }

    #[test]
    fn overlapping_deletions_are_merged() {
        let selection = Selection::new(
            vec![SelectionRange::new(0, 9), SelectionRange::caret(12)],
            0,
        );
        let tx = run(TEXT, selection, DELETE_BACKWARD);
        assert_eq!(tx.changes, vec![Change::delete(0..12)]);
        assert_eq!(
            tx.selection,
            Selection::new(vec![SelectionRange::caret(0), SelectionRange::caret(0)], 0)
        );
    }

    #[test]
    fn plain_text_matches_host_commands_exactly() {
        let text = "hello world, foo_bar\n  next line";
        let doc = TextBuffer::new(text);
        let native = NativeWordCommands;
        for pos in 0..=doc.len() {
            let range = SelectionRange::caret(pos);
            for direction in [Direction::Forward, Direction::Backward] {
                for extend in [false, true] {
                    let tx = run(text, caret(pos), WordCommand::Move { direction, extend });
                    let expected = native.move_word(&doc, range, direction, extend);
                    assert_eq!(tx, Transaction::select(Selection::single(expected)));
                }

                let tx = run(text, caret(pos), WordCommand::Delete { direction });
                let expected = native.delete_word(&doc, range, direction);
                assert_eq!(
                    tx.changes,
                    expected.clone().map(Change::delete).into_iter().collect::<Vec<_>>()
                );
                let expected_caret = expected.map_or(pos, |span| span.start);
                assert_eq!(tx.selection, caret(expected_caret));
            }
        }
    }
}

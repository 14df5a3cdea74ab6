//! Edit intents handed back to the host.
//!
//! A [`Transaction`] is built and dispatched within a single command invocation and is never
//! persisted. The host applies it atomically: every change plus the new selection in one update.

use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::selection::Selection;
use crate::selection::SelectionRange;

/// Replace `[from, to)` with `insert`. Offsets are in pre-transaction coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn delete(range: Range<usize>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            insert: String::new(),
        }
    }

    /// Byte delta this change applies to everything after it.
    pub fn delta(&self) -> isize {
        self.insert.len() as isize - (self.to - self.from) as isize
    }
}

/// One atomic document update.
///
/// `changes` are sorted by `from` and do not overlap. `selection` is expressed in
/// post-transaction coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub changes: Vec<Change>,
    pub selection: Selection,
}

impl Transaction {
    pub fn select(selection: Selection) -> Self {
        Self {
            changes: Vec::new(),
            selection,
        }
    }

    /// Merge per-range deletions into one transaction.
    ///
    /// `spans[i]` is what range `i` of `selection` deletes. Overlapping spans are merged. Every
    /// range collapses to a caret at the start of its span; a range with `None` keeps its head.
    pub fn from_deletions(selection: &Selection, spans: &[Option<Range<usize>>]) -> Self {
        let mut sorted: Vec<Range<usize>> = spans
            .iter()
            .flatten()
            .filter(|span| span.start < span.end)
            .cloned()
            .collect();
        sorted.sort_by_key(|span| span.start);

        let mut changes: Vec<Change> = Vec::with_capacity(sorted.len());
        for span in sorted {
            match changes.last_mut() {
                Some(last) if span.start <= last.to => last.to = last.to.max(span.end),
                _ => changes.push(Change::delete(span)),
            }
        }

        let ranges = selection
            .ranges()
            .iter()
            .zip(spans)
            .map(|(range, span)| {
                let pos = span.as_ref().map_or(range.head, |span| span.start);
                SelectionRange::caret(map_through_deletions(&changes, pos))
            })
            .collect();

        Self {
            changes,
            selection: Selection::new(ranges, selection.main_index()),
        }
    }

    pub fn is_selection_only(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply the changes to `text` and return the new document text.
    ///
    /// Changes that fall outside `text` or land inside a UTF-8 sequence are clamped to the
    /// nearest preceding char boundary.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for change in &self.changes {
            let from = floor_char_boundary(text, change.from.max(cursor));
            let to = floor_char_boundary(text, change.to.max(from));
            out.push_str(&text[cursor..from]);
            out.push_str(&change.insert);
            cursor = to;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

/// Map a pre-transaction offset through sorted, non-overlapping deletions.
fn map_through_deletions(changes: &[Change], pos: usize) -> usize {
    let mut removed = 0;
    for change in changes {
        if change.to <= pos {
            removed += change.to - change.from;
        } else if change.from < pos {
            return change.from - removed;
        } else {
            break;
        }
    }
    pos - removed
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn applies_multiple_changes_in_order() {
        let tx = Transaction {
            changes: vec![
                Change::delete(6..12),
                Change {
                    from: 15,
                    to: 15,
                    insert: "!".to_string(),
                },
                Change::delete(18..21),
            ],
            selection: Selection::caret(6),
        };
        assert_eq!(tx.apply("我爱北京天安门"), "我爱天!安");
    }

    #[test]
    fn selection_only_transaction_leaves_text_untouched() {
        let tx = Transaction::select(Selection::single(SelectionRange::new(0, 6)));
        assert!(tx.is_selection_only());
        assert_eq!(tx.apply("我爱"), "我爱");
    }

    #[test]
    fn deletions_map_carets_into_new_coordinates() {
        let selection = Selection::new(
            vec![
                SelectionRange::caret(9),
                SelectionRange::caret(2),
                SelectionRange::new(14, 12),
            ],
            2,
        );
        let tx = Transaction::from_deletions(&selection, &[Some(4..9), None, Some(12..14)]);
        assert_eq!(tx.changes, vec![Change::delete(4..9), Change::delete(12..14)]);
        assert_eq!(
            tx.selection,
            Selection::new(
                vec![
                    SelectionRange::caret(4),
                    SelectionRange::caret(2),
                    SelectionRange::caret(7),
                ],
                2,
            )
        );
    }

    #[test]
    fn overlapping_deletions_merge() {
        let selection = Selection::new(
            vec![SelectionRange::caret(6), SelectionRange::caret(8)],
            0,
        );
        let tx = Transaction::from_deletions(&selection, &[Some(2..6), Some(4..8)]);
        assert_eq!(tx.changes, vec![Change::delete(2..8)]);
        assert_eq!(
            tx.selection,
            Selection::new(vec![SelectionRange::caret(2), SelectionRange::caret(2)], 0)
        );
    }

    #[test]
    fn delta_reflects_net_length_change() {
        assert_eq!(Change::delete(2..5).delta(), -3);
        let insert = Change {
            from: 2,
            to: 2,
            insert: "abc".to_string(),
        };
        assert_eq!(insert.delta(), 3);
    }
}

use std::borrow::Cow;
use std::ops::Range;

use hanseg_protocol::Transaction;

use super::Document;
use super::LineRef;

/// A `String` document with a line-start index.
///
/// `\r\n` and lone `\r` are normalized to `\n` on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    line_starts: Vec<usize>,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        let text = if text.contains('\r') {
            text.replace("\r\n", "\n").replace('\r', "\n")
        } else {
            text.to_string()
        };
        let line_starts = compute_line_starts(&text);
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line `number`, or `None` past the last line.
    pub fn line(&self, number: usize) -> Option<LineRef<'_>> {
        let start = *self.line_starts.get(number)?;
        let end = self
            .line_starts
            .get(number + 1)
            .map_or(self.text.len(), |next| next - 1);
        Some(LineRef {
            number,
            start,
            text: Cow::Borrowed(&self.text[start..end]),
        })
    }

    pub fn apply(&mut self, tx: &Transaction) {
        if tx.is_selection_only() {
            return;
        }
        self.text = tx.apply(&self.text);
        self.line_starts = compute_line_starts(&self.text);
    }

    /// Clamp `offset` into the buffer and onto a char boundary (rounding down).
    pub fn clamp_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while offset > 0 && !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

impl Document for TextBuffer {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn line_at(&self, offset: usize) -> LineRef<'_> {
        let number = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        match self.line(number) {
            Some(line) => line,
            None => LineRef {
                number: 0,
                start: 0,
                text: Cow::Borrowed(""),
            },
        }
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        let start = self.clamp_offset(range.start);
        let end = self.clamp_offset(range.end).max(start);
        Cow::Borrowed(&self.text[start..end])
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanseg_protocol::Change;
    use hanseg_protocol::Selection;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_lines_by_offset() {
        let buffer = TextBuffer::new("hello\n我爱北京\n");
        assert_eq!(buffer.line_count(), 3);

        let line = buffer.line_at(8);
        assert_eq!(line.number, 1);
        assert_eq!(line.start, 6);
        assert_eq!(line.text, "我爱北京");

        // The newline itself belongs to the line it terminates.
        assert_eq!(buffer.line_at(5).number, 0);
        assert_eq!(buffer.line_at(buffer.len()).number, 2);
        assert_eq!(buffer.line_at(buffer.len()).text, "");
    }

    #[test]
    fn normalizes_carriage_returns() {
        let buffer = TextBuffer::new("a\r\nb\rc");
        assert_eq!(buffer.text(), "a\nb\nc");
        assert_eq!(buffer.line_count(), 3);
    }

    #[test]
    fn slice_clamps_to_char_boundaries() {
        let buffer = TextBuffer::new("我爱");
        assert_eq!(buffer.slice(1..100), "我爱");
        assert_eq!(buffer.slice(3..6), "爱");
    }

    #[test]
    fn apply_reindexes_lines() {
        let mut buffer = TextBuffer::new("ab\ncd");
        buffer.apply(&Transaction {
            changes: vec![Change::delete(2..3)],
            selection: Selection::caret(2),
        });
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.line_count(), 1);
    }
}

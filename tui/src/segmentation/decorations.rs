//! Word-boundary decorations for the visible part of a document.
//!
//! The set is rebuilt from scratch for every visible-range change or document change. Nothing is
//! patched incrementally, so a rebuild over unchanged input always yields the same set.

use std::ops::Range;

use hanseg_protocol::DecorationRange;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use super::Tokenizer;
use super::contains_segmentable_script;
use crate::host::Document;

/// Build one decoration per segment in every visible range.
///
/// Ranges are processed independently in the order given (hosts pass them ascending and
/// non-overlapping). A range without segmentable script contributes nothing and costs no
/// tokenizer call.
pub fn build_decorations(
    tokenizer: &dyn Tokenizer,
    doc: &dyn Document,
    visible: &[Range<usize>],
) -> Vec<DecorationRange> {
    let mut out = Vec::new();
    for range in visible {
        let text = doc.slice(range.clone());
        if !contains_segmentable_script(&text) {
            continue;
        }

        let mut offset = 0;
        for segment in tokenizer.segment(&text) {
            let len = segment.text.len();
            out.push(DecorationRange {
                from: range.start + offset,
                to: range.start + offset + len,
            });
            offset += len;
        }
    }
    tracing::trace!(ranges = visible.len(), decorations = out.len(), "built decorations");
    out
}

/// Styles alternated across consecutive decorated words so that neighbors stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationStyles {
    pub even: Style,
    pub odd: Style,
}

impl Default for DecorationStyles {
    fn default() -> Self {
        Self {
            even: Style::new().underlined().cyan(),
            odd: Style::new().underlined().magenta(),
        }
    }
}

/// Render one line of text, styling the parts covered by `decorations`.
///
/// `line_start` is the document offset of `text`. Styles alternate by each decoration's index in
/// `decorations`, so a word keeps its color regardless of which line is drawn first.
pub fn decorate_line(
    text: &str,
    line_start: usize,
    decorations: &[DecorationRange],
    styles: DecorationStyles,
) -> Line<'static> {
    let line_end = line_start + text.len();
    let first = decorations.partition_point(|d| d.to <= line_start);

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (idx, decoration) in decorations[first..].iter().enumerate() {
        if decoration.from >= line_end {
            break;
        }
        let from = decoration.from.max(line_start) - line_start;
        let to = decoration.to.min(line_end) - line_start;
        if from >= to || !text.is_char_boundary(from) || !text.is_char_boundary(to) {
            continue;
        }
        // A newline inside a decorated whitespace run is not part of this line.
        if text[from..to].trim().is_empty() {
            continue;
        }
        if from > cursor {
            spans.push(Span::raw(text[cursor..from].to_string()));
        }
        let style = if (first + idx) % 2 == 0 {
            styles.even
        } else {
            styles.odd
        };
        spans.push(Span::styled(text[from..to].to_string(), style));
        cursor = to;
    }
    if cursor < text.len() {
        spans.push(Span::raw(text[cursor..].to_string()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TextBuffer;
    use crate::test_support::DictTokenizer;
    use pretty_assertions::assert_eq;

    fn ranges(decorations: &[DecorationRange]) -> Vec<Range<usize>> {
        decorations.iter().map(DecorationRange::range).collect()
    }

    #[test]
    fn one_decoration_per_segment() {
        let doc = TextBuffer::new("我爱北京天安门");
        let tokenizer = DictTokenizer::beijing();
        let decorations = build_decorations(&tokenizer, &doc, &[0..doc.len()]);
        assert_eq!(ranges(&decorations), vec![0..6, 6..12, 12..21]);
    }

    #[test]
    fn offsets_are_document_absolute_per_visible_range() {
        let doc = TextBuffer::new("hello\n你好世界\nplain\n北京");
        let tokenizer = DictTokenizer::beijing();
        // Two discontiguous visible ranges: line 1 and line 3.
        let visible = [6..18, 25..31];
        let decorations = build_decorations(&tokenizer, &doc, &visible);
        assert_eq!(ranges(&decorations), vec![6..12, 12..18, 25..31]);
    }

    #[test]
    fn ranges_without_segmentable_script_contribute_nothing() {
        let doc = TextBuffer::new("hello world");
        let tokenizer = DictTokenizer::beijing();
        assert!(build_decorations(&tokenizer, &doc, &[0..doc.len()]).is_empty());
        assert!(build_decorations(&tokenizer, &doc, &[]).is_empty());
    }

    #[test]
    fn mixed_range_decorates_every_segment_in_order() {
        let doc = TextBuffer::new("hi 北京");
        let tokenizer = DictTokenizer::beijing();
        let decorations = build_decorations(&tokenizer, &doc, &[0..doc.len()]);
        assert_eq!(ranges(&decorations), vec![0..1, 1..2, 2..3, 3..9]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let doc = TextBuffer::new("我爱北京天安门\n你好世界");
        let tokenizer = DictTokenizer::beijing();
        let visible = [0..doc.len()];
        assert_eq!(
            build_decorations(&tokenizer, &doc, &visible),
            build_decorations(&tokenizer, &doc, &visible)
        );
    }

    #[test]
    fn decorate_line_alternates_styles_and_keeps_plain_text() {
        let styles = DecorationStyles::default();
        let decorations = [
            DecorationRange { from: 10, to: 16 },
            DecorationRange { from: 16, to: 22 },
        ];
        let line = decorate_line("a 我爱北京", 8, &decorations, styles);
        let spans: Vec<(String, Style)> = line
            .spans
            .iter()
            .map(|span| (span.content.to_string(), span.style))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("a ".to_string(), Style::default()),
                ("我爱".to_string(), styles.even),
                ("北京".to_string(), styles.odd),
            ]
        );
    }
}

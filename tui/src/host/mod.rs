//! The seams between the segmentation core and whatever editor hosts it.
//!
//! The core never owns document state. It reads through [`Document`], falls back to the host's
//! own word commands through [`WordFallback`], and hands edits back as
//! [`hanseg_protocol::Transaction`]s. Everything the host wires up (key handling, double-click,
//! decorations) goes through [`EditorPlugin`] and is registered with a [`Registry`].

mod native_word;
mod plugin;
mod text_buffer;

use std::borrow::Cow;
use std::ops::Range;

use hanseg_protocol::Direction;
use hanseg_protocol::SelectionRange;

pub use native_word::NativeWordCommands;
pub use plugin::Disposer;
pub use plugin::EditorContext;
pub use plugin::EditorPlugin;
pub use plugin::Precedence;
pub use plugin::Registry;
pub use text_buffer::TextBuffer;

/// One line of a document, without its trailing `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef<'a> {
    /// Zero-based line index.
    pub number: usize,
    /// Document offset of the first byte of the line.
    pub start: usize,
    pub text: Cow<'a, str>,
}

impl LineRef<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Read access to the host's document.
///
/// Lines are separated by a single `\n`; hosts normalize other line endings before exposing
/// text here.
pub trait Document {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The line containing `offset`. Offsets past the end resolve to the last line.
    fn line_at(&self, offset: usize) -> LineRef<'_>;

    /// Text in `range`, clamped to the document.
    fn slice(&self, range: Range<usize>) -> Cow<'_, str>;
}

/// The host's default word-boundary commands, applied to one selection range at a time.
pub trait WordFallback {
    /// Move (or, with `extend`, extend) the range's head by one word group.
    fn move_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
        extend: bool,
    ) -> SelectionRange;

    /// The span a word deletion removes, or `None` when there is nothing to delete.
    fn delete_word(
        &self,
        doc: &dyn Document,
        range: SelectionRange,
        direction: Direction,
    ) -> Option<Range<usize>>;
}

use std::ops::Range;
use std::rc::Rc;

use crossterm::event::KeyEvent;
use hanseg_protocol::DecorationRange;
use hanseg_protocol::Transaction;

use super::Keymap;
use super::Tokenizer;
use super::WordCommand;
use super::build_decorations;
use super::run_word_command;
use super::select_word_at;
use crate::host::Disposer;
use crate::host::Document;
use crate::host::EditorContext;
use crate::host::EditorPlugin;
use crate::host::Precedence;
use crate::host::Registry;

/// Segment-aware word editing packaged as one host plugin.
pub struct WordSegmentation {
    tokenizer: Rc<dyn Tokenizer>,
    keymap: Keymap,
    highlight_boundaries: bool,
}

impl WordSegmentation {
    pub fn new(tokenizer: Rc<dyn Tokenizer>, keymap: Keymap) -> Self {
        Self {
            tokenizer,
            keymap,
            highlight_boundaries: true,
        }
    }

    pub fn with_highlight_boundaries(mut self, enabled: bool) -> Self {
        self.highlight_boundaries = enabled;
        self
    }

    /// Register with the highest precedence so the word bindings win over the host's own.
    pub fn install(self, registry: &Registry) -> Disposer {
        registry.register(Rc::new(self), Precedence::Highest)
    }

    pub fn run(&self, cx: &EditorContext<'_>, command: WordCommand) -> Transaction {
        run_word_command(self.tokenizer.as_ref(), cx, command)
    }
}

impl EditorPlugin for WordSegmentation {
    fn on_key(&self, cx: &EditorContext<'_>, key: &KeyEvent) -> Option<Transaction> {
        let command = self.keymap.lookup(key)?;
        tracing::trace!(command = command.name(), "word command key");
        Some(self.run(cx, command))
    }

    fn on_double_click(&self, cx: &EditorContext<'_>, offset: usize) -> Option<Transaction> {
        select_word_at(self.tokenizer.as_ref(), cx, offset)
    }

    fn decorations(&self, doc: &dyn Document, visible: &[Range<usize>]) -> Vec<DecorationRange> {
        if !self.highlight_boundaries {
            return Vec::new();
        }
        build_decorations(self.tokenizer.as_ref(), doc, visible)
    }
}

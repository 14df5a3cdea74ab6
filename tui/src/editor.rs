//! A small multi-line editor that hosts the word segmentation plugin.
//!
//! The editor owns the document and the selection; plugins only see snapshots through
//! [`EditorContext`] and answer with transactions. Every key press and double-click is offered to
//! the registered plugins first (highest precedence first). Only when none of them claims it does
//! the editor run its own binding.

use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use hanseg_protocol::Change;
use hanseg_protocol::DecorationRange;
use hanseg_protocol::Direction;
use hanseg_protocol::Selection;
use hanseg_protocol::SelectionRange;
use hanseg_protocol::Transaction;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::host::Disposer;
use crate::host::Document;
use crate::host::EditorContext;
use crate::host::NativeWordCommands;
use crate::host::Registry;
use crate::host::TextBuffer;
use crate::host::WordFallback;
use crate::segmentation::DecorationStyles;
use crate::segmentation::Keymap;
use crate::segmentation::Platform;
use crate::segmentation::SegmentedFallback;
use crate::segmentation::Tokenizer;
use crate::segmentation::WordCommand;
use crate::segmentation::WordSegmentation;
use crate::segmentation::decorate_line;

/// Two presses on the same cell within this window are a double-click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const SCROLL_LINES: usize = 3;
const TAB: &str = "    ";

/// Host-level switches, usually read from the user config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    /// Underline every segment in the visible lines.
    pub highlight_boundaries: bool,
    /// Let the host's own word steps stop at segment boundaries too.
    pub refine_native_steps: bool,
    pub platform: Platform,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            highlight_boundaries: true,
            refine_native_steps: true,
            platform: Platform::detect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Click {
    at: Instant,
    column: u16,
    row: u16,
}

pub struct Editor {
    buffer: TextBuffer,
    selection: Selection,
    registry: Registry,
    fallback: Box<dyn WordFallback>,
    keymap: Keymap,
    styles: DecorationStyles,
    title: String,
    /// First visible line.
    scroll: usize,
    /// Keep the main head on screen at the next draw. Cleared by wheel scrolling.
    follow_head: bool,
    /// Where the document was last drawn; mouse coordinates are mapped through it.
    text_area: Rect,
    last_click: Option<Click>,
    dirty: bool,
    status: Option<String>,
    segmentation: Option<Disposer>,
}

impl Editor {
    pub fn new(
        text: &str,
        title: impl Into<String>,
        tokenizer: Rc<dyn Tokenizer>,
        options: EditorOptions,
    ) -> Self {
        let fallback: Box<dyn WordFallback> = if options.refine_native_steps {
            Box::new(SegmentedFallback::new(
                NativeWordCommands,
                Rc::clone(&tokenizer),
            ))
        } else {
            Box::new(NativeWordCommands)
        };

        let keymap = Keymap::for_platform(options.platform);
        let registry = Registry::new();
        let segmentation = WordSegmentation::new(tokenizer, keymap.clone())
            .with_highlight_boundaries(options.highlight_boundaries)
            .install(&registry);

        Self {
            buffer: TextBuffer::new(text),
            selection: Selection::caret(0),
            registry,
            fallback,
            keymap,
            styles: DecorationStyles::default(),
            title: title.into(),
            scroll: 0,
            follow_head: true,
            text_area: Rect::default(),
            last_click: None,
            dirty: false,
            status: None,
            segmentation: Some(segmentation),
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = self.clamp_selection(selection);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Unregister the word segmentation plugin. Word keys then run the host's own bindings.
    pub fn disable_segmentation(&mut self) {
        if let Some(disposer) = self.segmentation.take() {
            disposer.dispose();
        }
    }

    /// Insert `text` (a paste) over every selection range.
    pub fn insert_text(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let tx = self.replace_selections(&text);
        self.dispatch(tx);
    }

    /// Apply `tx` atomically: document changes first, then the selection.
    pub fn dispatch(&mut self, tx: Transaction) {
        if !tx.is_selection_only() {
            self.buffer.apply(&tx);
            self.dirty = true;
        }
        self.selection = self.clamp_selection(tx.selection);
        self.follow_head = true;
    }

    /// Handle a key press. Returns `false` when neither a plugin nor the editor used it.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        self.status = None;

        let claimed = {
            let cx = self.context();
            self.registry
                .plugins()
                .iter()
                .find_map(|plugin| plugin.on_key(&cx, &key))
        };
        if let Some(tx) = claimed {
            self.dispatch(tx);
            return true;
        }

        match self.builtin_key(key) {
            Some(tx) => {
                self.dispatch(tx);
                true
            }
            None => false,
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let offset = self.offset_at(event.column, event.row);
                let is_double = self.last_click.is_some_and(|click| {
                    click.column == event.column
                        && click.row == event.row
                        && now.saturating_duration_since(click.at) <= DOUBLE_CLICK_WINDOW
                });
                if is_double {
                    self.last_click = None;
                    self.double_click(offset);
                } else {
                    self.last_click = Some(Click {
                        at: now,
                        column: event.column,
                        row: event.row,
                    });
                    self.selection = Selection::caret(offset);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let offset = self.offset_at(event.column, event.row);
                let range = self.selection.main().with_head(offset, true);
                self.selection = Selection::single(range);
            }
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(SCROLL_LINES);
                self.follow_head = false;
            }
            MouseEventKind::ScrollDown => {
                let last = self.buffer.line_count().saturating_sub(1);
                self.scroll = (self.scroll + SCROLL_LINES).min(last);
                self.follow_head = false;
            }
            _ => {}
        }
    }

    /// Select the word under `offset`, letting plugins replace the host's default selection.
    pub fn double_click(&mut self, offset: usize) {
        let claimed = {
            let cx = self.context();
            self.registry
                .plugins()
                .iter()
                .find_map(|plugin| plugin.on_double_click(&cx, offset))
        };
        let tx = claimed.unwrap_or_else(|| {
            let group = NativeWordCommands::group_at(&self.buffer, offset);
            Transaction::select(Selection::single(SelectionRange::new(
                group.start,
                group.end,
            )))
        });
        self.dispatch(tx);
    }

    /// Document offset under a screen cell of the last drawn frame.
    ///
    /// Cells left of the text snap to the line start, cells past the end of a line snap to its
    /// end, and rows past the last line snap to the end of the document. A cell in the middle of
    /// a wide character resolves to the start of that character.
    pub fn offset_at(&self, column: u16, row: u16) -> usize {
        let area = self.text_area;
        let line_number = self.scroll + usize::from(row.saturating_sub(area.y));
        let Some(line) = self.buffer.line(line_number) else {
            return self.buffer.len();
        };
        let col = usize::from(column.saturating_sub(area.x));
        line.start + byte_at_column(&line.text, col)
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let text_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        let status_area = Rect {
            y: area.y + text_area.height,
            height: area.height.min(1),
            ..area
        };
        self.text_area = text_area;
        self.scroll = self.scroll.min(self.buffer.line_count().saturating_sub(1));
        if self.follow_head {
            self.scroll_to_head(usize::from(text_area.height));
        }

        let first = self.scroll;
        let last_exclusive = (first + usize::from(text_area.height)).min(self.buffer.line_count());
        let visible: Vec<std::ops::Range<usize>> = (first..last_exclusive)
            .filter_map(|n| self.buffer.line(n))
            .map(|line| line.start..line.end())
            .collect();
        let decorations = self.decorations(&visible);

        let lines: Vec<Line<'static>> = (first..last_exclusive)
            .filter_map(|n| self.buffer.line(n))
            .map(|line| decorate_line(&line.text, line.start, &decorations, self.styles))
            .collect();
        frame.render_widget(Paragraph::new(lines), text_area);
        self.paint_selection(frame, first, last_exclusive);

        frame.render_widget(Paragraph::new(self.status_line()), status_area);

        let head = self.selection.main().head;
        let line = self.buffer.line_at(head);
        if line.number >= first && line.number < last_exclusive {
            let rel = head.saturating_sub(line.start).min(line.text.len());
            let col = line.text[..rel].width();
            let x = text_area
                .x
                .saturating_add(u16::try_from(col).unwrap_or(u16::MAX));
            let row = u16::try_from(line.number - first).unwrap_or(u16::MAX);
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), text_area.y + row));
        }
    }

    fn context(&self) -> EditorContext<'_> {
        EditorContext {
            doc: &self.buffer,
            selection: &self.selection,
            fallback: self.fallback.as_ref(),
        }
    }

    fn decorations(&self, visible: &[std::ops::Range<usize>]) -> Vec<DecorationRange> {
        let mut decorations: Vec<DecorationRange> = self
            .registry
            .plugins()
            .iter()
            .flat_map(|plugin| plugin.decorations(&self.buffer, visible))
            .collect();
        decorations.sort_by_key(|d| (d.from, d.to));
        decorations
    }

    fn paint_selection(&self, frame: &mut Frame<'_>, first: usize, last_exclusive: usize) {
        let area = self.text_area;
        let buf = frame.buffer_mut();
        for range in self.selection.ranges().iter().filter(|r| !r.is_empty()) {
            for n in first..last_exclusive {
                let Some(line) = self.buffer.line(n) else {
                    continue;
                };
                let from = range.from().max(line.start);
                let to = range.to().min(line.end());
                if from >= to {
                    continue;
                }
                let start_col = line.text[..from - line.start].width();
                let end_col = line.text[..to - line.start].width();
                let x = area.x.saturating_add(u16::try_from(start_col).unwrap_or(u16::MAX));
                let width = u16::try_from(end_col - start_col).unwrap_or(u16::MAX);
                let row = area.y + u16::try_from(n - first).unwrap_or(u16::MAX);
                let cells = Rect::new(x, row, width, 1).intersection(area);
                buf.set_style(cells, Style::new().reversed());
            }
        }
    }

    fn status_line(&self) -> Line<'static> {
        let marker = if self.dirty { " [+]" } else { "" };
        let mut spans = vec![format!(" {}{marker} ", self.title).bold()];
        if let Some(status) = &self.status {
            spans.push(format!(" {status} ").into());
        } else {
            for command in [
                WordCommand::Move {
                    direction: Direction::Forward,
                    extend: false,
                },
                WordCommand::Move {
                    direction: Direction::Forward,
                    extend: true,
                },
                WordCommand::Delete {
                    direction: Direction::Backward,
                },
            ] {
                if let Some(binding) = self.keymap.primary_binding(command) {
                    spans.push(format!(" {binding}").cyan());
                    spans.push(format!(" {}", command.name()).dim());
                }
            }
            spans.push(" ctrl+s".cyan());
            spans.push(" save".dim());
            spans.push(" esc".cyan());
            spans.push(" quit".dim());
        }
        Line::from(spans)
    }

    fn scroll_to_head(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let line = self.buffer.line_at(self.selection.main().head).number;
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
    }

    fn clamp_selection(&self, selection: Selection) -> Selection {
        let ranges = selection
            .ranges()
            .iter()
            .map(|range| {
                SelectionRange::new(
                    self.buffer.clamp_offset(range.anchor),
                    self.buffer.clamp_offset(range.head),
                )
            })
            .collect();
        Selection::new(ranges, selection.main_index())
    }

    /// The editor's own bindings, used when no plugin claims a key.
    fn builtin_key(&self, key: KeyEvent) -> Option<Transaction> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let word = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        let direction_of = |code: KeyCode| Direction::from_forward(code == KeyCode::Right);

        match key.code {
            KeyCode::Char('a') if key.modifiers == KeyModifiers::CONTROL => Some(
                Transaction::select(Selection::single(SelectionRange::new(0, self.buffer.len()))),
            ),
            KeyCode::Char(c) if !word => Some(self.replace_selections(c.encode_utf8(&mut [0; 4]))),
            KeyCode::Enter => Some(self.replace_selections("\n")),
            KeyCode::Tab => Some(self.replace_selections(TAB)),
            KeyCode::Backspace | KeyCode::Delete => {
                let direction = Direction::from_forward(key.code == KeyCode::Delete);
                Some(if word {
                    self.native_word_delete(direction)
                } else {
                    self.delete_graphemes(direction)
                })
            }
            KeyCode::Left | KeyCode::Right if word => {
                let direction = direction_of(key.code);
                Some(self.map_ranges(|editor, range| {
                    editor
                        .fallback
                        .move_word(&editor.buffer, range, direction, shift)
                }))
            }
            KeyCode::Left | KeyCode::Right => {
                let direction = direction_of(key.code);
                Some(self.map_ranges(|editor, range| {
                    if !shift && !range.is_empty() {
                        let edge = if direction.is_forward() {
                            range.to()
                        } else {
                            range.from()
                        };
                        return SelectionRange::caret(edge);
                    }
                    range.with_head(editor.grapheme_step(range.head, direction), shift)
                }))
            }
            KeyCode::Home | KeyCode::End => Some(self.map_ranges(|editor, range| {
                let line = editor.buffer.line_at(range.head);
                let target = if key.code == KeyCode::Home {
                    line.start
                } else {
                    line.end()
                };
                range.with_head(target, shift)
            })),
            KeyCode::Up | KeyCode::Down => {
                let down = key.code == KeyCode::Down;
                Some(self.map_ranges(|editor, range| {
                    range.with_head(editor.vertical_target(range.head, down), shift)
                }))
            }
            _ => None,
        }
    }

    fn map_ranges(&self, f: impl Fn(&Self, SelectionRange) -> SelectionRange) -> Transaction {
        let ranges = self
            .selection
            .ranges()
            .iter()
            .map(|&range| f(self, range))
            .collect();
        Transaction::select(Selection::new(ranges, self.selection.main_index()))
    }

    /// Replace every selection range with `text`, leaving a caret after each insertion.
    fn replace_selections(&self, text: &str) -> Transaction {
        let ranges = self.selection.ranges();
        let mut order: Vec<usize> = (0..ranges.len()).collect();
        order.sort_by_key(|&idx| ranges[idx].from());

        let mut changes = Vec::with_capacity(ranges.len());
        let mut carets = vec![SelectionRange::caret(0); ranges.len()];
        let mut shift: isize = 0;
        for idx in order {
            let range = ranges[idx];
            let change = Change {
                from: range.from(),
                to: range.to(),
                insert: text.to_string(),
            };
            let start = range.from().saturating_add_signed(shift);
            carets[idx] = SelectionRange::caret(start + text.len());
            shift += change.delta();
            changes.push(change);
        }
        Transaction {
            changes,
            selection: Selection::new(carets, self.selection.main_index()),
        }
    }

    fn delete_graphemes(&self, direction: Direction) -> Transaction {
        let spans: Vec<Option<std::ops::Range<usize>>> = self
            .selection
            .ranges()
            .iter()
            .map(|range| {
                if !range.is_empty() {
                    return Some(range.range());
                }
                let target = self.grapheme_step(range.head, direction);
                if target == range.head {
                    None
                } else {
                    Some(range.head.min(target)..range.head.max(target))
                }
            })
            .collect();
        Transaction::from_deletions(&self.selection, &spans)
    }

    fn native_word_delete(&self, direction: Direction) -> Transaction {
        let spans: Vec<Option<std::ops::Range<usize>>> = self
            .selection
            .ranges()
            .iter()
            .map(|&range| self.fallback.delete_word(&self.buffer, range, direction))
            .collect();
        Transaction::from_deletions(&self.selection, &spans)
    }

    fn grapheme_step(&self, pos: usize, direction: Direction) -> usize {
        let text = self.buffer.text();
        let pos = self.buffer.clamp_offset(pos);
        match direction {
            Direction::Forward => text[pos..]
                .graphemes(true)
                .next()
                .map_or(pos, |g| pos + g.len()),
            Direction::Backward => text[..pos]
                .grapheme_indices(true)
                .next_back()
                .map_or(pos, |(idx, _)| idx),
        }
    }

    /// Same display column on the line above or below.
    fn vertical_target(&self, pos: usize, down: bool) -> usize {
        let line = self.buffer.line_at(pos);
        let col = line.text[..pos.saturating_sub(line.start).min(line.text.len())].width();
        let target = if down {
            line.number + 1
        } else if line.number == 0 {
            return 0;
        } else {
            line.number - 1
        };
        match self.buffer.line(target) {
            Some(target) => target.start + byte_at_column(&target.text, col),
            None => self.buffer.len(),
        }
    }
}

/// Byte offset of the grapheme that starts at or covers display column `col`.
fn byte_at_column(text: &str, col: usize) -> usize {
    let mut width = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let w = grapheme.width();
        if col < width + w.max(1) {
            return idx;
        }
        width += w;
    }
    text.len()
}

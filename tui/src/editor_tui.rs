//! Full-screen terminal session around an [`Editor`].

use std::io;
use std::io::Stdout;
use std::io::stdout;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor::Show;
use crossterm::event;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::editor::Editor;
use crate::exit::AppExitInfo;
use crate::exit::ExitReason;

/// Raw mode plus alternate screen for as long as the guard lives.
struct TerminalModes;

impl TerminalModes {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let modes = Self;
        execute!(
            stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        Ok(modes)
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        if let Err(err) = execute!(
            stdout(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
            Show
        ) {
            tracing::warn!("failed to restore terminal screen: {err}");
        }
        if let Err(err) = disable_raw_mode() {
            tracing::warn!("failed to leave raw mode: {err}");
        }
    }
}

/// Session-level keys handled before the editor sees the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKey {
    Save,
    Quit(ExitReason),
}

fn session_key(key: &KeyEvent) -> Option<SessionKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers == KeyModifiers::CONTROL;
    match key.code {
        KeyCode::Char('s') if ctrl => Some(SessionKey::Save),
        KeyCode::Char('q') if ctrl => Some(SessionKey::Quit(ExitReason::UserRequested)),
        KeyCode::Char('c') if ctrl => Some(SessionKey::Quit(ExitReason::Interrupted)),
        KeyCode::Esc if key.modifiers.is_empty() => {
            Some(SessionKey::Quit(ExitReason::UserRequested))
        }
        _ => None,
    }
}

/// Run `editor` full-screen until the user quits.
///
/// <kbd>Ctrl</kbd>+<kbd>S</kbd> hands the current text to `save`; a failed save is reported in
/// the status line and the session continues.
pub fn run_editor(
    editor: &mut Editor,
    mut save: impl FnMut(&str) -> anyhow::Result<()>,
) -> anyhow::Result<AppExitInfo> {
    let _modes = TerminalModes::enter().context("enter full-screen terminal mode")?;
    let mut terminal: Terminal<CrosstermBackend<Stdout>> =
        Terminal::new(CrosstermBackend::new(stdout())).context("create terminal")?;
    terminal.clear()?;

    let mut saves = 0;
    let exit_reason = loop {
        terminal.draw(|frame| editor.render(frame))?;

        match event::read().context("read terminal event")? {
            Event::Key(key) => match session_key(&key) {
                Some(SessionKey::Save) => match save(editor.text()) {
                    Ok(()) => {
                        saves += 1;
                        editor.mark_saved();
                        editor.set_status("saved");
                        tracing::info!(bytes = editor.text().len(), "saved buffer");
                    }
                    Err(err) => {
                        tracing::warn!("save failed: {err:#}");
                        editor.set_status(format!("save failed: {err:#}"));
                    }
                },
                Some(SessionKey::Quit(reason)) => break reason,
                None => {
                    editor.handle_key(key);
                }
            },
            Event::Mouse(mouse) => editor.handle_mouse(mouse, Instant::now()),
            Event::Paste(text) => editor.insert_text(&text),
            Event::Resize(..) | Event::FocusGained | Event::FocusLost => {}
        }
    };

    Ok(AppExitInfo {
        exit_reason,
        saves,
        unsaved_changes: editor.is_dirty(),
    })
}

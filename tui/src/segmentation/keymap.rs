//! Physical key combinations for the word commands.

use std::fmt;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use hanseg_protocol::Direction;

use super::WordCommand;

/// Which modifier convention the primary bindings follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// <kbd>Ctrl</kbd>+arrow, <kbd>Ctrl</kbd>+<kbd>Backspace</kbd>.
    Standard,
    /// <kbd>Option</kbd>+arrow, <kbd>Option</kbd>+<kbd>Backspace</kbd>.
    Mac,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Standard
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Press or repeat of exactly this combination.
    pub fn is_press(&self, event: &KeyEvent) -> bool {
        self.code == event.code
            && self.modifiers == event.modifiers
            && matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift+")?;
        }
        match self.code {
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Delete => f.write_str("del"),
            KeyCode::Char(c) => write!(f, "{c}"),
            other => write!(f, "{other:?}"),
        }
    }
}

const fn bind(
    code: KeyCode,
    modifiers: KeyModifiers,
    command: WordCommand,
) -> (KeyBinding, WordCommand) {
    (KeyBinding::new(code, modifiers), command)
}

const MOVE_LEFT: WordCommand = WordCommand::Move {
    direction: Direction::Backward,
    extend: false,
};
const MOVE_RIGHT: WordCommand = WordCommand::Move {
    direction: Direction::Forward,
    extend: false,
};
const SELECT_LEFT: WordCommand = WordCommand::Move {
    direction: Direction::Backward,
    extend: true,
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

/// Readline-style alternates, bound on every platform.
const READLINE_BINDINGS: &[(KeyBinding, WordCommand)] = &[
    bind(KeyCode::Char('b'), KeyModifiers::ALT, MOVE_LEFT),
    bind(KeyCode::Char('f'), KeyModifiers::ALT, MOVE_RIGHT),
    bind(KeyCode::Char('w'), KeyModifiers::CONTROL, DELETE_BACKWARD),
    bind(KeyCode::Backspace, KeyModifiers::ALT, DELETE_BACKWARD),
    bind(KeyCode::Char('d'), KeyModifiers::ALT, DELETE_FORWARD),
];

/// Key table for the word commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<(KeyBinding, WordCommand)>,
}

impl Keymap {
    pub fn for_platform(platform: Platform) -> Self {
        let word = match platform {
            Platform::Standard => KeyModifiers::CONTROL,
            Platform::Mac => KeyModifiers::ALT,
        };
        let mut bindings = vec![
            bind(KeyCode::Left, word, MOVE_LEFT),
            bind(KeyCode::Right, word, MOVE_RIGHT),
            bind(KeyCode::Left, word | KeyModifiers::SHIFT, SELECT_LEFT),
            bind(KeyCode::Right, word | KeyModifiers::SHIFT, SELECT_RIGHT),
            bind(KeyCode::Backspace, word, DELETE_BACKWARD),
            bind(KeyCode::Delete, word, DELETE_FORWARD),
        ];
        for &(binding, command) in READLINE_BINDINGS {
            if !bindings.iter().any(|(existing, _)| *existing == binding) {
                bindings.push((binding, command));
            }
        }
        Self { bindings }
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<WordCommand> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.is_press(event))
            .map(|&(_, command)| command)
    }

    /// The first (primary) binding of `command`.
    pub fn primary_binding(&self, command: WordCommand) -> Option<KeyBinding> {
        self.bindings
            .iter()
            .find(|&&(_, bound)| bound == command)
            .map(|&(binding, _)| binding)
    }
}

/// Summary produced when an editor session exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppExitInfo {
    /// Why the session ended.
    pub exit_reason: ExitReason,
    /// Successful saves during the session.
    pub saves: usize,
    /// The buffer had edits that were never saved.
    pub unsaved_changes: bool,
}

/// Reason why the editor session terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user asked to quit (<kbd>Esc</kbd> or <kbd>Ctrl</kbd>+<kbd>Q</kbd>).
    UserRequested,
    /// The user interrupted the session with <kbd>Ctrl</kbd>+<kbd>C</kbd>.
    Interrupted,
}

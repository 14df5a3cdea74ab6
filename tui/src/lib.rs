// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod editor;
mod editor_tui;
mod exit;
pub mod host;
pub mod segmentation;

#[cfg(test)]
mod test_support;

pub use editor::Editor;
pub use editor::EditorOptions;
pub use editor_tui::run_editor;
pub use exit::AppExitInfo;
pub use exit::ExitReason;

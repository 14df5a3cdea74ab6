//! Word-boundary editing for scripts written without spaces between words.
//!
//! The host's native notion of a "word" is a maximal run of alphanumeric characters, which turns
//! a whole line of Chinese into one unit. This module asks a [`Tokenizer`] for real word segments
//! and snaps motion, selection, deletion and double-click selection to them, while text without
//! segmentable script keeps the host's behavior untouched.
//!
//! Layering, leaves first:
//!
//! - [`script`](contains_segmentable_script): cheap detection that gates every tokenizer call.
//! - [`locator`](find_word_at): lookups over a single line.
//! - [`resolver`](step_destination): segment-sized steps over an arbitrary range.
//! - [`decorations`](build_decorations): marks for the visible ranges.
//! - [`commands`](run_word_command): the editing commands, per selection range.
//! - [`WordSegmentation`]: key, double-click and decoration glue registered with a host.

mod commands;
mod decorations;
mod keymap;
mod locator;
mod plugin;
mod resolver;
mod script;
mod tokenizer;

pub use commands::WordCommand;
pub use commands::run_word_command;
pub use commands::select_word_at;
pub use decorations::DecorationStyles;
pub use decorations::build_decorations;
pub use decorations::decorate_line;
pub use keymap::KeyBinding;
pub use keymap::Keymap;
pub use keymap::Platform;
pub use locator::find_adjacent_word;
pub use locator::find_word_at;
pub use plugin::WordSegmentation;
pub use resolver::SegmentedFallback;
pub use resolver::step_destination;
pub use script::contains_segmentable_script;
pub use script::is_segmentable_char;
pub use tokenizer::IcuTokenizer;
pub use tokenizer::Tokenizer;

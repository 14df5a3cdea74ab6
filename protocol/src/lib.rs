//! Plain data shared between the segmentation core, the editor host and the CLI.
//!
//! All offsets are UTF-8 byte offsets into the text they describe and always sit on `char`
//! boundaries.

mod decoration;
mod segment;
mod selection;
mod transaction;

pub use decoration::DecorationRange;
pub use segment::Segment;
pub use segment::WordSpan;
pub use selection::Direction;
pub use selection::Selection;
pub use selection::SelectionRange;
pub use transaction::Change;
pub use transaction::Transaction;

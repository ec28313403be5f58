//! Editing model: cell selection, keypad input, and edit operations

mod cursor;
pub mod keypad;
mod operation;

pub use cursor::CellSelection;
pub use keypad::QuantityEntry;
pub use operation::{Change, EditOp, EditResult};

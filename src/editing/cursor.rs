//! Selected matrix cell and its pending keypad input

use crate::editing::keypad::QuantityEntry;
use crate::grid::CellKey;

/// The cell being edited through the keypad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSelection {
    pub cell: CellKey,
    pub entry: QuantityEntry,
}

impl CellSelection {
    /// Open the keypad on `cell`, seeded with its current quantity
    pub fn new(cell: CellKey, current: Option<u32>) -> Self {
        Self {
            cell,
            entry: QuantityEntry::new(current.unwrap_or(0)),
        }
    }
}

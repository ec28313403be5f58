//! Edit operations and results

use crate::document::OrderField;
use crate::grid::{AxisKind, AxisSign, CellKey};
use smallvec::SmallVec;

/// An atomic user edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Set the ordered quantity of a cell; zero or less clears it
    SetQuantity { cell: CellKey, quantity: i64 },
    /// Change one metadata field
    SetField { field: OrderField, value: String },
    /// Flip the display sign of an axis
    SetSign { axis: AxisKind, sign: AxisSign },
}

impl EditOp {
    pub fn set_quantity(sphere: usize, cylinder: usize, quantity: i64) -> Self {
        Self::SetQuantity {
            cell: CellKey::new(sphere, cylinder),
            quantity,
        }
    }

    pub fn set_field(field: OrderField, value: impl Into<String>) -> Self {
        Self::SetField {
            field,
            value: value.into(),
        }
    }

    pub fn set_sign(axis: AxisKind, sign: AxisSign) -> Self {
        Self::SetSign { axis, sign }
    }

    /// Whether this kind of edit can change the printed table
    pub fn affects_layout(&self) -> bool {
        !matches!(self, EditOp::SetField { .. })
    }
}

/// What an edit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Cell(CellKey),
    Field(OrderField),
    Sign(AxisKind),
}

/// Result of applying an edit operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResult {
    /// Things that actually changed (empty for no-op edits)
    pub changes: SmallVec<[Change; 2]>,
    /// Whether the print plan was invalidated
    pub layout_invalidated: bool,
    /// Whether the active session was written
    pub saved: bool,
}

impl EditResult {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

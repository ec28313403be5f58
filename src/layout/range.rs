//! Trimming the power matrix down to the rows and columns worth printing

use crate::grid::{AxisValue, CellKey, PowerGrid};

/// Axis prefixes that cover every ordered cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintableRange {
    pub rows: Vec<AxisValue>,
    pub cols: Vec<AxisValue>,
}

/// Slice both axes up to (and including) the last index holding data.
///
/// An axis with no data at all still keeps its first value so the printed
/// table is never empty.
pub fn reduce_to_printable(
    rows: &[AxisValue],
    cols: &[AxisValue],
    grid: &PowerGrid,
) -> PrintableRange {
    let last_row = last_index_with_data(rows.len(), |i| {
        cols.iter()
            .any(|c| grid.quantity(CellKey::new(rows[i].index, c.index)).is_some())
    });
    let last_col = last_index_with_data(cols.len(), |j| {
        rows.iter()
            .any(|r| grid.quantity(CellKey::new(r.index, cols[j].index)).is_some())
    });

    PrintableRange {
        rows: rows[..(last_row + 1).min(rows.len())].to_vec(),
        cols: cols[..(last_col + 1).min(cols.len())].to_vec(),
    }
}

fn last_index_with_data(len: usize, has_data: impl Fn(usize) -> bool) -> usize {
    (0..len).rev().find(|&i| has_data(i)).unwrap_or(0)
}

//! Sparse sphere x cylinder quantity grid

mod axis;

pub use axis::{
    parse_label, Axis, AxisKind, AxisSign, AxisSigns, AxisValue, CYLINDER_COUNT, SPHERE_COUNT,
    STEP_CENTI,
};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Position of one cell, keyed by axis index rather than by label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub sphere: usize,
    pub cylinder: usize,
}

impl CellKey {
    pub fn new(sphere: usize, cylinder: usize) -> Self {
        Self { sphere, cylinder }
    }
}

/// Persisted form of a grid entry, labelled with the signs in effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridEntryRecord {
    pub row_axis: String,
    pub col_axis: String,
    pub quantity: u32,
}

/// Quantities per (sphere, cylinder) combination.
///
/// Only positive quantities are stored; writing zero or a negative number
/// removes the cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerGrid {
    cells: FxHashMap<CellKey, u32>,
}

impl PowerGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a cell. Returns true if the grid changed.
    pub fn set_quantity(&mut self, key: CellKey, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.cells.remove(&key).is_some();
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.cells.insert(key, quantity) != Some(quantity)
    }

    /// Quantity for a cell; `None` when nothing is ordered
    pub fn quantity(&self, key: CellKey) -> Option<u32> {
        self.cells.get(&key).copied()
    }

    /// Whether any column of this sphere row holds a quantity
    pub fn row_has_data(&self, sphere: usize) -> bool {
        self.cells.keys().any(|k| k.sphere == sphere)
    }

    /// Whether any row of this cylinder column holds a quantity
    pub fn col_has_data(&self, cylinder: usize) -> bool {
        self.cells.keys().any(|k| k.cylinder == cylinder)
    }

    /// Sum of every ordered quantity
    pub fn total_quantity(&self) -> u64 {
        self.cells.values().map(|&q| q as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellKey, u32)> + '_ {
        self.cells.iter().map(|(k, v)| (*k, *v))
    }

    /// Labelled entries for persistence, ordered by sphere then cylinder
    pub fn to_entries(&self, sphere: &Axis, cylinder: &Axis) -> Vec<GridEntryRecord> {
        let mut keys: Vec<_> = self.cells.keys().copied().collect();
        keys.sort_unstable();

        keys.into_iter()
            .filter_map(|key| {
                let row = sphere.value(key.sphere)?;
                let col = cylinder.value(key.cylinder)?;
                Some(GridEntryRecord {
                    row_axis: row.label(),
                    col_axis: col.label(),
                    quantity: self.cells[&key],
                })
            })
            .collect()
    }

    /// Rebuild a grid from persisted entries.
    ///
    /// Labels are matched by magnitude, so entries saved under the other
    /// sign still land on their position. Unresolvable entries are skipped.
    pub fn from_entries(sphere: &Axis, cylinder: &Axis, entries: &[GridEntryRecord]) -> Self {
        let mut grid = Self::new();
        for entry in entries {
            let (Some(s), Some(c)) = (
                sphere.index_of_label(&entry.row_axis),
                cylinder.index_of_label(&entry.col_axis),
            ) else {
                tracing::warn!(
                    row = %entry.row_axis,
                    col = %entry.col_axis,
                    "skipping grid entry outside the power matrix"
                );
                continue;
            };
            grid.set_quantity(CellKey::new(s, c), entry.quantity as i64);
        }
        grid
    }
}

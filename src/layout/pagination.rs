//! Pagination of sphere rows onto fixed-height pages

use crate::grid::AxisValue;
use std::ops::Range;

/// Rows assigned to one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Page index (0-based)
    pub page_index: usize,
    /// Slice of the paginated row sequence on this page
    pub rows: Range<usize>,
}

impl PageLayout {
    pub fn new(page_index: usize, rows: Range<usize>) -> Self {
        Self { page_index, rows }
    }

    /// Number of rows on this page
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pagination rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationRules {
    /// Hard cap on rows per page
    pub max_rows_per_page: usize,
    /// Start a new page at the first row whose magnitude exceeds this
    pub break_magnitude: f32,
}

impl PaginationRules {
    /// Derive the row cap from the printable height and the smallest
    /// legible row.
    pub fn from_capacity(capacity_mm: f32, min_row_height_mm: f32, break_magnitude: f32) -> Self {
        let fit = if min_row_height_mm > 0.0 {
            (capacity_mm / min_row_height_mm).floor()
        } else {
            0.0
        };
        Self {
            max_rows_per_page: fit.max(1.0).min(u32::MAX as f32) as usize,
            break_magnitude,
        }
    }

    /// Index of the natural optical break, if it fits on the first page
    fn natural_split(&self, rows: &[AxisValue]) -> Option<usize> {
        let split = rows
            .iter()
            .position(|r| r.magnitude() > self.break_magnitude)?;
        (split > 0 && split <= self.max_rows_per_page).then_some(split)
    }

    /// Partition `rows` into pages.
    ///
    /// Prefers a page break at the natural split; otherwise chunks
    /// uniformly. Always yields at least one page.
    pub fn paginate(&self, rows: &[AxisValue]) -> Vec<PageLayout> {
        let mut pages = Vec::new();

        let start = match self.natural_split(rows) {
            Some(split) => {
                pages.push(PageLayout::new(0, 0..split));
                split
            }
            None => 0,
        };

        let per_page = self.max_rows_per_page.max(1);
        let mut offset = start;
        while offset < rows.len() {
            let end = offset.saturating_add(per_page).min(rows.len());
            pages.push(PageLayout::new(pages.len(), offset..end));
            offset = end;
        }

        if pages.is_empty() {
            pages.push(PageLayout::new(0, 0..0));
        }

        tracing::debug!(
            rows = rows.len(),
            pages = pages.len(),
            max_rows = self.max_rows_per_page,
            natural_split = start,
            "paginated rows"
        );
        pages
    }
}

/// Split rows into pages that fit `capacity_mm` at `min_row_height_mm`.
pub fn paginate(
    rows: &[AxisValue],
    capacity_mm: f32,
    min_row_height_mm: f32,
    break_magnitude: f32,
) -> Vec<PageLayout> {
    PaginationRules::from_capacity(capacity_mm, min_row_height_mm, break_magnitude).paginate(rows)
}

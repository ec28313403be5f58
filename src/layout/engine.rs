//! Print plan: reduced axes, page breaks and per-page styling

use crate::grid::{Axis, AxisValue, PowerGrid};
use crate::layout::font::FontTier;
use crate::layout::pagination::{PageLayout, PaginationRules};
use crate::layout::range::{reduce_to_printable, PrintableRange};
use serde::{Deserialize, Serialize};

/// Page geometry and fitting thresholds, in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConstraints {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub header_height_mm: f32,
    pub footer_height_mm: f32,
    pub table_header_height_mm: f32,
    pub min_row_height_mm: f32,
    pub max_row_height_mm: f32,
    /// Sphere magnitude after which a new page is preferred
    pub break_magnitude: f32,
    /// Pages with fewer rows are sized as if they had this many
    pub min_sized_rows: usize,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0, // A4
            page_height_mm: 297.0,
            margin_mm: 15.0,
            header_height_mm: 45.0,
            footer_height_mm: 15.0,
            table_header_height_mm: 8.0,
            min_row_height_mm: 5.5,
            max_row_height_mm: 9.0,
            break_magnitude: 10.0,
            min_sized_rows: 10,
        }
    }
}

impl LayoutConstraints {
    /// Height left for table body rows on one page
    pub fn content_height(&self) -> f32 {
        self.page_height_mm
            - 2.0 * self.margin_mm
            - self.header_height_mm
            - self.footer_height_mm
            - self.table_header_height_mm
    }

    /// Width inside the page margins
    pub fn content_width(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    pub fn pagination_rules(&self) -> PaginationRules {
        PaginationRules::from_capacity(
            self.content_height(),
            self.min_row_height_mm,
            self.break_magnitude,
        )
    }

    pub fn max_rows_per_page(&self) -> usize {
        self.pagination_rules().max_rows_per_page
    }

    /// Row height for a page holding `row_count` rows
    pub fn row_height(&self, row_count: usize) -> f32 {
        let sized = row_count.max(self.min_sized_rows).max(1);
        let height = self.content_height() / sized as f32;
        height
            .max(self.min_row_height_mm)
            .min(self.max_row_height_mm.max(self.min_row_height_mm))
    }

    pub fn page_style(&self, row_count: usize, col_count: usize) -> PageStyle {
        PageStyle {
            row_height_mm: self.row_height(row_count),
            font_size_px: FontTier::for_columns(col_count).px(),
        }
    }
}

/// Derived sizing for one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStyle {
    pub row_height_mm: f32,
    pub font_size_px: f32,
}

/// A page with its rows and style
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    pub layout: PageLayout,
    pub style: PageStyle,
}

/// Everything needed to lay out the printed invoice table
#[derive(Debug, Clone, PartialEq)]
pub struct PrintPlan {
    /// Printable sphere rows
    pub rows: Vec<AxisValue>,
    /// Printable cylinder columns
    pub cols: Vec<AxisValue>,
    pub pages: Vec<PlannedPage>,
}

impl PrintPlan {
    pub fn compute(
        grid: &PowerGrid,
        sphere: &Axis,
        cylinder: &Axis,
        constraints: &LayoutConstraints,
    ) -> Self {
        let PrintableRange { rows, cols } =
            reduce_to_printable(&sphere.values(), &cylinder.values(), grid);

        let pages = constraints
            .pagination_rules()
            .paginate(&rows)
            .into_iter()
            .map(|layout| {
                let style = constraints.page_style(layout.row_count(), cols.len());
                PlannedPage { layout, style }
            })
            .collect();

        Self { rows, cols, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rows printed on a page
    pub fn page_rows(&self, page: &PlannedPage) -> &[AxisValue] {
        &self.rows[page.layout.rows.clone()]
    }
}

/// Cached print plan, recomputed lazily after edits
#[derive(Debug, Clone)]
pub struct LayoutState {
    constraints: LayoutConstraints,
    plan: Option<PrintPlan>,
    /// Bumped whenever a new plan is computed
    layout_version: u64,
}

impl LayoutState {
    pub fn new(constraints: LayoutConstraints) -> Self {
        Self {
            constraints,
            plan: None,
            layout_version: 0,
        }
    }

    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    /// Drop the cached plan
    pub fn invalidate(&mut self) {
        self.plan = None;
    }

    pub fn version(&self) -> u64 {
        self.layout_version
    }

    /// Current plan, recomputing it if an edit invalidated it
    pub fn plan(&mut self, grid: &PowerGrid, sphere: &Axis, cylinder: &Axis) -> &PrintPlan {
        if self.plan.is_none() {
            self.layout_version += 1;
            tracing::debug!(version = self.layout_version, "recomputing print plan");
        }
        let constraints = self.constraints;
        self.plan
            .get_or_insert_with(|| PrintPlan::compute(grid, sphere, cylinder, &constraints))
    }
}

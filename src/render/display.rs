//! Invoice display model: one render-ready record per printed page

use crate::document::OrderMetadata;
use crate::grid::{CellKey, PowerGrid};
use crate::layout::{PageStyle, PrintPlan};
use serde::Serialize;

/// Shown for blank client fields
pub const BLANK_FIELD: &str = "________________";
/// Shown when no lens type was entered
pub const DEFAULT_LENS_TYPE: &str = "Standard Lens";
pub const INVOICE_TITLE: &str = "Sales Invoice";
pub const INVOICE_SUBTITLE: &str = "Precision Optical Order";
pub const FOOTER_NOTE: &str = "Generated by LensOrder Pro";

/// Header block repeated on every page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceHeader {
    pub title: String,
    pub subtitle: String,
    pub client_name: String,
    pub client_address: String,
    pub order_id: String,
    pub date: String,
    pub lens_type: String,
}

impl InvoiceHeader {
    pub fn from_metadata(meta: &OrderMetadata) -> Self {
        Self {
            title: INVOICE_TITLE.to_string(),
            subtitle: INVOICE_SUBTITLE.to_string(),
            client_name: or_placeholder(&meta.client_name, BLANK_FIELD),
            client_address: or_placeholder(&meta.client_address, BLANK_FIELD),
            order_id: meta.order_id.clone(),
            date: meta.date.clone(),
            lens_type: or_placeholder(&meta.lens_type, DEFAULT_LENS_TYPE),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// One sphere row of the printed table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRow {
    pub sphere: String,
    /// Quantity per printed cylinder column
    pub cells: Vec<Option<u32>>,
    /// Alternate-row shading
    pub striped: bool,
}

/// A fully resolved invoice page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePage {
    pub page_index: usize,
    pub page_count: usize,
    pub header: InvoiceHeader,
    pub columns: Vec<String>,
    pub rows: Vec<InvoiceRow>,
    pub row_height_mm: f32,
    pub font_size_px: f32,
    pub footer_note: String,
}

impl InvoicePage {
    /// Footer page marker, e.g. `Page 1 of 3`
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page_index + 1, self.page_count)
    }

    pub fn style(&self) -> PageStyle {
        PageStyle {
            row_height_mm: self.row_height_mm,
            font_size_px: self.font_size_px,
        }
    }
}

/// Every page of the invoice, in print order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub pages: Vec<InvoicePage>,
    /// Total ordered lenses
    pub total_quantity: u64,
}

impl InvoiceDocument {
    pub fn build(meta: &OrderMetadata, grid: &PowerGrid, plan: &PrintPlan) -> Self {
        let header = InvoiceHeader::from_metadata(meta);
        let columns: Vec<String> = plan.cols.iter().map(|c| c.label()).collect();
        let page_count = plan.page_count();

        let pages = plan
            .pages
            .iter()
            .map(|page| {
                let rows = plan
                    .page_rows(page)
                    .iter()
                    .enumerate()
                    .map(|(i, sphere)| InvoiceRow {
                        sphere: sphere.label(),
                        cells: plan
                            .cols
                            .iter()
                            .map(|cyl| grid.quantity(CellKey::new(sphere.index, cyl.index)))
                            .collect(),
                        striped: i % 2 == 1,
                    })
                    .collect();

                InvoicePage {
                    page_index: page.layout.page_index,
                    page_count,
                    header: header.clone(),
                    columns: columns.clone(),
                    rows,
                    row_height_mm: page.style.row_height_mm,
                    font_size_px: page.style.font_size_px,
                    footer_note: FOOTER_NOTE.to_string(),
                }
            })
            .collect();

        Self {
            pages,
            total_quantity: grid.total_quantity(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Axis, AxisSign};
    use crate::layout::LayoutConstraints;

    fn build(meta: &OrderMetadata, grid: &PowerGrid) -> InvoiceDocument {
        let plan = PrintPlan::compute(
            grid,
            &Axis::sphere(AxisSign::Minus),
            &Axis::cylinder(AxisSign::Minus),
            &LayoutConstraints::default(),
        );
        InvoiceDocument::build(meta, grid, &plan)
    }

    #[test]
    fn test_empty_invoice_has_one_page() {
        let doc = build(&OrderMetadata::default(), &PowerGrid::new());
        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages[0];
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.columns, vec!["0.00"]);
        assert_eq!(page.header.client_name, BLANK_FIELD);
        assert_eq!(page.header.lens_type, DEFAULT_LENS_TYPE);
        assert_eq!(page.page_label(), "Page 1 of 1");
    }

    #[test]
    fn test_cells_and_stripes() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(1, 2), 4);
        grid.set_quantity(CellKey::new(40, 0), 1);
        let mut meta = OrderMetadata::default();
        meta.client_name = "Clearview".into();

        let doc = build(&meta, &grid);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.total_quantity, 5);

        let first = &doc.pages[0];
        assert_eq!(first.header.client_name, "Clearview");
        assert_eq!(first.columns, vec!["0.00", "-0.25", "-0.50"]);
        assert_eq!(first.rows[1].sphere, "-0.25");
        assert_eq!(first.rows[1].cells, vec![None, None, Some(4)]);
        assert!(!first.rows[0].striped);
        assert!(first.rows[1].striped);

        let second = &doc.pages[1];
        assert_eq!(second.page_label(), "Page 2 of 2");
        assert_eq!(second.rows.last().unwrap().cells[0], Some(1));
        assert!(!second.rows[0].striped);
    }
}

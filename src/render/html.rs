//! HTML markup for invoice pages, handed to the rasterizer
//!
//! Each page is a self-contained `.invoice-page` element with explicit
//! millimetre dimensions and an opaque white background. Only inline
//! styles are used so a detached copy renders identically.

use crate::layout::LayoutConstraints;
use crate::render::display::{InvoiceDocument, InvoicePage};
use std::fmt::Write;

/// Colours used on the printed invoice
pub mod theme {
    pub const PRIMARY: &str = "#1e3a8a";
    pub const SECONDARY: &str = "#2563eb";
    pub const ACCENT: &str = "#eff6ff";
    pub const BORDER: &str = "#cbd5e1";
    pub const TEXT_MAIN: &str = "#0f172a";
    pub const TEXT_MUTED: &str = "#64748b";
    pub const SPH_BG: &str = "#f8fafc";
    pub const WHITE: &str = "#ffffff";
}

/// Escape text for use in element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for every page, in order
pub fn render_document_html(doc: &InvoiceDocument, constraints: &LayoutConstraints) -> String {
    let mut html = String::from(r#"<div class="pdf-wrapper">"#);
    for page in &doc.pages {
        html.push_str(&render_page_html(page, constraints));
    }
    html.push_str("</div>");
    html
}

/// Markup for a single page
pub fn render_page_html(page: &InvoicePage, c: &LayoutConstraints) -> String {
    let mut html = String::new();
    // Writing to a String cannot fail
    let _ = write_page(&mut html, page, c);
    html
}

fn write_page(out: &mut String, page: &InvoicePage, c: &LayoutConstraints) -> std::fmt::Result {
    write!(
        out,
        r#"<div class="invoice-page" data-page="{index}" style="box-sizing:border-box;position:relative;width:{w}mm;height:{h}mm;padding:{m}mm;background-color:{bg};font-family:Inter, sans-serif;">"#,
        index = page.page_index,
        w = c.page_width_mm,
        h = c.page_height_mm,
        m = c.margin_mm,
        bg = theme::WHITE,
    )?;
    write_header(out, page, c)?;
    write_table(out, page, c)?;
    write_footer(out, page, c)?;
    out.push_str("</div>");
    Ok(())
}

fn write_header(out: &mut String, page: &InvoicePage, c: &LayoutConstraints) -> std::fmt::Result {
    let h = &page.header;
    write!(
        out,
        r#"<div class="invoice-header" style="display:flex;justify-content:space-between;align-items:flex-start;height:{height}mm;margin-bottom:4mm;border-bottom:2px solid {primary};">"#,
        height = c.header_height_mm - 5.0,
        primary = theme::PRIMARY,
    )?;

    write!(
        out,
        r#"<div style="width:55%;display:flex;flex-direction:column;justify-content:space-between;height:100%;"><div><h1 style="margin:0;font-size:24px;font-weight:900;text-transform:uppercase;color:{primary};">{title}</h1><p style="margin:0;font-size:10px;color:{muted};">{subtitle}</p></div><div style="font-size:10px;"><span style="font-weight:700;text-transform:uppercase;color:{secondary};">Bill To:</span><p style="margin:0;font-size:18px;font-weight:700;color:{main};">{client}</p><p style="margin:0;color:{muted};">{address}</p></div></div>"#,
        primary = theme::PRIMARY,
        secondary = theme::SECONDARY,
        muted = theme::TEXT_MUTED,
        main = theme::TEXT_MAIN,
        title = escape_html(&h.title),
        subtitle = escape_html(&h.subtitle),
        client = escape_html(&h.client_name),
        address = escape_html(&h.client_address),
    )?;

    write!(
        out,
        r#"<div style="width:45%;display:flex;flex-direction:column;align-items:flex-end;justify-content:space-between;height:100%;text-align:right;"><div style="padding:4px 16px;background-color:{primary};color:{white};font-size:12px;font-weight:700;text-transform:uppercase;">Order Details</div><div style="font-size:10px;"><div><span style="font-weight:700;color:{muted};">Invoice ID:</span> <span style="font-weight:700;font-family:monospace;color:{main};">{order_id}</span></div><div><span style="font-weight:700;color:{muted};">Date:</span> <span style="font-weight:700;color:{main};">{date}</span></div></div><div><span style="display:block;font-size:8px;font-weight:700;text-transform:uppercase;color:{muted};">Product / Lens Type</span><span style="display:block;font-size:20px;font-weight:900;text-transform:uppercase;color:{secondary};">{lens}</span></div></div></div>"#,
        primary = theme::PRIMARY,
        secondary = theme::SECONDARY,
        white = theme::WHITE,
        muted = theme::TEXT_MUTED,
        main = theme::TEXT_MAIN,
        order_id = escape_html(&h.order_id),
        date = escape_html(&h.date),
        lens = escape_html(&h.lens_type),
    )
}

fn write_table(out: &mut String, page: &InvoicePage, c: &LayoutConstraints) -> std::fmt::Result {
    write!(
        out,
        r#"<table style="width:100%;border-collapse:collapse;table-layout:fixed;font-size:{font}px;border:2px solid {primary};"><thead><tr style="height:{th}mm;background-color:{primary};color:{white};"><th style="width:50px;padding:0;font-size:7px;">SPH \ CYL</th>"#,
        font = page.font_size_px,
        primary = theme::PRIMARY,
        white = theme::WHITE,
        th = c.table_header_height_mm,
    )?;
    for col in &page.columns {
        write!(
            out,
            r#"<th style="padding:0;font-weight:700;text-align:center;">{}</th>"#,
            escape_html(col)
        )?;
    }
    out.push_str("</tr></thead><tbody>");

    for row in &page.rows {
        let bg = if row.striped { theme::ACCENT } else { theme::WHITE };
        write!(
            out,
            r#"<tr style="height:{rh}mm;"><td style="padding:0;font-weight:700;text-align:center;background-color:{sph_bg};color:{primary};border-right:2px solid {primary};border-bottom:1px solid {border};">{label}</td>"#,
            rh = page.row_height_mm,
            sph_bg = theme::SPH_BG,
            primary = theme::PRIMARY,
            border = theme::BORDER,
            label = escape_html(&row.sphere),
        )?;
        for cell in &row.cells {
            match cell {
                Some(qty) => write!(
                    out,
                    r#"<td style="padding:0;text-align:center;background-color:{bg};border-right:1px solid {border};border-bottom:1px solid {border};color:{primary};font-weight:900;">{qty}</td>"#,
                    border = theme::BORDER,
                    primary = theme::PRIMARY,
                )?,
                None => write!(
                    out,
                    r#"<td style="padding:0;background-color:{bg};border-right:1px solid {border};border-bottom:1px solid {border};"></td>"#,
                    border = theme::BORDER,
                )?,
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    Ok(())
}

fn write_footer(out: &mut String, page: &InvoicePage, c: &LayoutConstraints) -> std::fmt::Result {
    write!(
        out,
        r#"<div class="invoice-footer" style="position:absolute;bottom:{m}mm;left:{m}mm;right:{m}mm;display:flex;justify-content:space-between;align-items:flex-end;border-top:1px solid {border};padding-top:2mm;"><div style="font-size:9px;color:{muted};">{note}</div><div style="font-size:9px;font-weight:700;padding:4px 12px;background-color:{accent};color:{primary};">{label}</div></div>"#,
        m = c.margin_mm,
        border = theme::BORDER,
        muted = theme::TEXT_MUTED,
        accent = theme::ACCENT,
        primary = theme::PRIMARY,
        note = escape_html(&page.footer_note),
        label = page.page_label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OrderMetadata;
    use crate::grid::{Axis, AxisSign, CellKey, PowerGrid};
    use crate::layout::PrintPlan;

    fn document(meta: &OrderMetadata, grid: &PowerGrid) -> InvoiceDocument {
        let plan = PrintPlan::compute(
            grid,
            &Axis::sphere(AxisSign::Minus),
            &Axis::cylinder(AxisSign::Minus),
            &LayoutConstraints::default(),
        );
        InvoiceDocument::build(meta, grid, &plan)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"A&B's"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_page_markup() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(2, 1), 9);
        let mut meta = OrderMetadata::default();
        meta.order_id = "#ORD-4321".into();
        meta.client_name = "<Optics & Co>".into();

        let doc = document(&meta, &grid);
        let html = render_page_html(&doc.pages[0], &LayoutConstraints::default());

        assert!(html.starts_with(r#"<div class="invoice-page""#));
        assert!(html.contains("width:210mm;height:297mm;padding:15mm"));
        assert!(html.contains("background-color:#ffffff"));
        assert!(html.contains("&lt;Optics &amp; Co&gt;"));
        assert!(!html.contains("<Optics"));
        assert!(html.contains("#ORD-4321"));
        assert!(html.contains(">9</td>"));
        assert!(html.contains("Page 1 of 1"));
        assert!(html.contains("Standard Lens"));
        assert_eq!(html.matches("<tr style=\"height:9mm;\">").count(), 3);
    }

    #[test]
    fn test_document_markup_has_every_page() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(80, 24), 1);
        let doc = document(&OrderMetadata::default(), &grid);
        let html = render_document_html(&doc, &LayoutConstraints::default());
        assert_eq!(html.matches(r#"class="invoice-page""#).count(), 3);
        assert!(html.contains("Page 3 of 3"));
    }
}

//! Render output: invoice display model and page markup

mod display;
pub mod html;

pub use display::{
    InvoiceDocument, InvoiceHeader, InvoicePage, InvoiceRow, BLANK_FIELD, DEFAULT_LENS_TYPE,
    FOOTER_NOTE, INVOICE_SUBTITLE, INVOICE_TITLE,
};
pub use html::{escape_html, render_document_html, render_page_html};

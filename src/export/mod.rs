//! Invoice export: capture each page and assemble a downloadable document
//!
//! The pipeline is strictly sequential. For every page in order it stages
//! an isolated copy of the page markup, waits for styles to settle,
//! rasterizes it, discards the copy and appends the image. Any failure
//! aborts the whole export and nothing is written out.

use crate::error::ExportError;
use crate::layout::LayoutConstraints;
use crate::render::{render_page_html, InvoiceDocument};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Rasterizer and document output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    /// Page width in CSS pixels (A4 at 96 DPI)
    pub page_width_px: u32,
    pub page_height_px: u32,
    /// Device pixel ratio used when rasterizing
    pub scale: f32,
    /// Delay between staging a page and capturing it
    pub settle_ms: u32,
    /// Opaque background painted under every page
    pub background: String,
    /// JPEG quality, 0..=1
    pub image_quality: f32,
    /// Layout viewport width handed to the rasterizer
    pub window_width_px: u32,
    /// Appended to the order id to form the file name
    pub file_suffix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_width_px: 794,
            page_height_px: 1123,
            scale: 3.0,
            settle_ms: 150,
            background: "#ffffff".to_string(),
            image_quality: 0.95,
            window_width_px: 1200,
            file_suffix: "_Invoice.pdf".to_string(),
        }
    }
}

impl ExportSettings {
    /// Download name for an order, e.g. `#ORD-1234` -> `ORD-1234_Invoice.pdf`
    pub fn file_name(&self, order_id: &str) -> String {
        let stem: String = order_id.chars().filter(|&c| c != '#').collect();
        let stem = stem.trim();
        let stem = if stem.is_empty() { "Order" } else { stem };
        format!("{}{}", stem, self.file_suffix)
    }
}

/// External rasterization and document-writing capability.
///
/// Implementations own the staging area and the document being assembled.
/// `finish` is only called once every page was appended; `abort` is
/// called instead when any step fails.
#[allow(async_fn_in_trait)]
pub trait ExportBackend {
    /// Handle to a staged page copy
    type Staged;
    /// Captured page image
    type Image;

    /// Progress text for the blocking "generating" overlay
    fn progress(&mut self, message: &str);

    /// The hidden render surface exists
    fn check_render_target(&self) -> Result<(), ExportError>;

    /// Rasterizer and document writer are loaded
    fn check_capabilities(&self) -> Result<(), ExportError>;

    async fn stage(
        &mut self,
        page_html: &str,
        settings: &ExportSettings,
    ) -> Result<Self::Staged, ExportError>;

    async fn settle(&mut self, millis: u32);

    async fn rasterize(
        &mut self,
        staged: &Self::Staged,
        settings: &ExportSettings,
    ) -> Result<Self::Image, ExportError>;

    fn discard(&mut self, staged: Self::Staged);

    fn add_page(&mut self, index: usize, image: Self::Image) -> Result<(), ExportError>;

    async fn finish(&mut self, file_name: &str) -> Result<(), ExportError>;

    /// Drop whatever was accumulated by a failed export
    fn abort(&mut self);
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub file_name: String,
    pub pages: usize,
}

/// Export every page of `document` through `backend`
pub async fn export_invoice<B: ExportBackend>(
    document: &InvoiceDocument,
    order_id: &str,
    constraints: &LayoutConstraints,
    settings: &ExportSettings,
    backend: &mut B,
) -> Result<ExportReport, ExportError> {
    let span = tracing::info_span!("export_invoice", order_id = %order_id);
    let result = run_pipeline(document, order_id, constraints, settings, backend)
        .instrument(span)
        .await;
    match &result {
        Ok(report) => tracing::info!(file = %report.file_name, pages = report.pages, "exported invoice"),
        Err(err) => {
            tracing::warn!(error = %err, "export failed");
            backend.abort();
        }
    }
    result
}

async fn run_pipeline<B: ExportBackend>(
    document: &InvoiceDocument,
    order_id: &str,
    constraints: &LayoutConstraints,
    settings: &ExportSettings,
    backend: &mut B,
) -> Result<ExportReport, ExportError> {
    backend.check_render_target()?;
    backend.progress("Initializing engine...");

    if document.total_quantity == 0 || document.pages.is_empty() {
        return Err(ExportError::NoPrintablePages);
    }
    backend.check_capabilities()?;

    let total = document.page_count();
    for (index, page) in document.pages.iter().enumerate() {
        backend.progress(&format!("Capturing Page {} of {}...", index + 1, total));

        let html = render_page_html(page, constraints);
        let staged = backend.stage(&html, settings).await?;
        backend.settle(settings.settle_ms).await;
        let captured = backend.rasterize(&staged, settings).await;
        backend.discard(staged);

        let image = captured.map_err(|err| match err {
            ExportError::Rasterization { .. } => err,
            other => ExportError::Rasterization {
                page: index + 1,
                reason: other.to_string(),
            },
        })?;
        backend.add_page(index, image)?;
        tracing::debug!(page = index + 1, total, "captured page");
    }

    backend.progress("Downloading file...");
    let file_name = settings.file_name(order_id);
    backend.finish(&file_name).await?;

    Ok(ExportReport {
        file_name,
        pages: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OrderMetadata;
    use crate::grid::{Axis, AxisSign, CellKey, PowerGrid};
    use crate::layout::PrintPlan;

    #[derive(Default)]
    struct FakeBackend {
        log: Vec<String>,
        images: Vec<(usize, String)>,
        finished: Option<String>,
        staged_live: usize,
        fail_on_page: Option<usize>,
        missing_target: bool,
        missing_library: bool,
        aborted: bool,
        rasterized: usize,
    }

    impl ExportBackend for FakeBackend {
        type Staged = usize;
        type Image = String;

        fn progress(&mut self, message: &str) {
            self.log.push(format!("progress:{}", message));
        }

        fn check_render_target(&self) -> Result<(), ExportError> {
            if self.missing_target {
                Err(ExportError::MissingRenderTarget)
            } else {
                Ok(())
            }
        }

        fn check_capabilities(&self) -> Result<(), ExportError> {
            if self.missing_library {
                Err(ExportError::MissingCapability("jsPDF".into()))
            } else {
                Ok(())
            }
        }

        async fn stage(
            &mut self,
            page_html: &str,
            _settings: &ExportSettings,
        ) -> Result<usize, ExportError> {
            assert_eq!(self.staged_live, 0, "pages must be staged one at a time");
            self.staged_live += 1;
            self.log.push("stage".into());
            Ok(page_html.len())
        }

        async fn settle(&mut self, millis: u32) {
            self.log.push(format!("settle:{}", millis));
        }

        async fn rasterize(
            &mut self,
            staged: &usize,
            _settings: &ExportSettings,
        ) -> Result<String, ExportError> {
            self.rasterized += 1;
            self.log.push("rasterize".into());
            if self.fail_on_page == Some(self.rasterized) {
                return Err(ExportError::Output("canvas tainted".into()));
            }
            Ok(format!("img{}", staged))
        }

        fn discard(&mut self, _staged: usize) {
            self.staged_live -= 1;
            self.log.push("discard".into());
        }

        fn add_page(&mut self, index: usize, image: String) -> Result<(), ExportError> {
            self.log.push(format!("add:{}", index));
            self.images.push((index, image));
            Ok(())
        }

        async fn finish(&mut self, file_name: &str) -> Result<(), ExportError> {
            self.finished = Some(file_name.to_string());
            Ok(())
        }

        fn abort(&mut self) {
            self.aborted = true;
            self.images.clear();
        }
    }

    fn document(grid: &PowerGrid) -> InvoiceDocument {
        let plan = PrintPlan::compute(
            grid,
            &Axis::sphere(AxisSign::Minus),
            &Axis::cylinder(AxisSign::Minus),
            &LayoutConstraints::default(),
        );
        InvoiceDocument::build(&OrderMetadata::default(), grid, &plan)
    }

    fn run(doc: &InvoiceDocument, backend: &mut FakeBackend) -> Result<ExportReport, ExportError> {
        pollster::block_on(export_invoice(
            doc,
            "#ORD-1234",
            &LayoutConstraints::default(),
            &ExportSettings::default(),
            backend,
        ))
    }

    #[test]
    fn test_file_name() {
        let settings = ExportSettings::default();
        assert_eq!(settings.file_name("#ORD-1234"), "ORD-1234_Invoice.pdf");
        assert_eq!(settings.file_name("#"), "Order_Invoice.pdf");
    }

    #[test]
    fn test_sequential_pages_in_order() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(80, 3), 2);
        let doc = document(&grid);
        let mut backend = FakeBackend::default();

        let report = run(&doc, &mut backend).unwrap();
        assert_eq!(report.pages, 3);
        assert_eq!(report.file_name, "ORD-1234_Invoice.pdf");
        assert_eq!(backend.finished.as_deref(), Some("ORD-1234_Invoice.pdf"));

        let indices: Vec<usize> = backend.images.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let steps: Vec<&str> = backend
            .log
            .iter()
            .filter(|l| !l.starts_with("progress"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            &steps[..5],
            &["stage", "settle:150", "rasterize", "discard", "add:0"]
        );
        assert!(backend.log.contains(&"progress:Capturing Page 2 of 3...".to_string()));
        assert_eq!(backend.log.last().unwrap(), "progress:Downloading file...");
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let doc = document(&PowerGrid::new());
        let mut backend = FakeBackend::default();
        assert!(matches!(
            run(&doc, &mut backend),
            Err(ExportError::NoPrintablePages)
        ));
        assert!(backend.finished.is_none());
        assert!(backend.aborted);
    }

    #[test]
    fn test_missing_target_and_library() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(0, 0), 1);
        let doc = document(&grid);

        let mut backend = FakeBackend {
            missing_target: true,
            ..FakeBackend::default()
        };
        assert!(matches!(
            run(&doc, &mut backend),
            Err(ExportError::MissingRenderTarget)
        ));

        let mut backend = FakeBackend {
            missing_library: true,
            ..FakeBackend::default()
        };
        let err = run(&doc, &mut backend).unwrap_err();
        assert_eq!(
            err.to_string(),
            "jsPDF library not found. Please check your internet connection."
        );
        assert_eq!(backend.rasterized, 0);
    }

    #[test]
    fn test_failure_aborts_without_output() {
        let mut grid = PowerGrid::new();
        grid.set_quantity(CellKey::new(80, 3), 2);
        let doc = document(&grid);
        let mut backend = FakeBackend {
            fail_on_page: Some(2),
            ..FakeBackend::default()
        };

        match run(&doc, &mut backend) {
            Err(ExportError::Rasterization { page, reason }) => {
                assert_eq!(page, 2);
                assert!(reason.contains("canvas tainted"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(backend.finished.is_none());
        assert!(backend.aborted);
        assert!(backend.images.is_empty());
        // the failed page was still cleaned up
        assert_eq!(backend.staged_live, 0);
        assert_eq!(backend.rasterized, 2);
    }
}

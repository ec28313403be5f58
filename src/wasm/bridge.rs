//! JavaScript bindings for page capture (html2canvas) and PDF assembly (jsPDF)
//!
//! The heavy lifting stays in the browser libraries; Rust drives the
//! sequence through [`JsExportBackend`].

use crate::error::ExportError;
use crate::export::{ExportBackend, ExportSettings};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/export_bridge.js")]
extern "C" {
    /// Show text on the "generating" overlay
    #[wasm_bindgen(js_name = reportProgress)]
    fn report_progress(message: &str);

    /// The off-screen host element for staged pages exists
    #[wasm_bindgen(js_name = hasRenderTarget)]
    fn has_render_target() -> bool;

    /// Name of the first missing library, or null when everything is loaded
    #[wasm_bindgen(js_name = missingLibrary)]
    fn missing_library() -> Option<String>;

    /// Mount a fixed-size copy of the page markup. Resolves to the node.
    #[wasm_bindgen(catch, js_name = stagePage)]
    async fn stage_page(html: &str, settings_json: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = settle)]
    async fn settle_for(millis: u32) -> JsValue;

    /// Capture a staged node. Resolves to a JPEG data URL.
    #[wasm_bindgen(catch, js_name = capturePage)]
    async fn capture_page(node: &JsValue, settings_json: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = discardPage)]
    fn discard_page(node: &JsValue);

    /// Append an image as a full A4 page, creating the document on page 0
    #[wasm_bindgen(catch, js_name = addPageImage)]
    fn add_page_image(index: usize, image: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_name = saveDocument)]
    async fn save_document(file_name: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = abortDocument)]
    fn abort_document();
}

/// Export backend that delegates to `export_bridge.js`
#[derive(Default)]
pub struct JsExportBackend {
    settings_json: String,
}

impl JsExportBackend {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            settings_json: serde_json::to_string(settings).unwrap_or_default(),
        }
    }
}

impl ExportBackend for JsExportBackend {
    type Staged = JsValue;
    type Image = JsValue;

    fn progress(&mut self, message: &str) {
        report_progress(message);
    }

    fn check_render_target(&self) -> Result<(), ExportError> {
        if has_render_target() {
            Ok(())
        } else {
            Err(ExportError::MissingRenderTarget)
        }
    }

    fn check_capabilities(&self) -> Result<(), ExportError> {
        match missing_library() {
            Some(name) => Err(ExportError::MissingCapability(name)),
            None => Ok(()),
        }
    }

    async fn stage(
        &mut self,
        page_html: &str,
        _settings: &ExportSettings,
    ) -> Result<JsValue, ExportError> {
        stage_page(page_html, &self.settings_json)
            .await
            .map_err(|e| ExportError::Output(describe(&e)))
    }

    async fn settle(&mut self, millis: u32) {
        let _ = settle_for(millis).await;
    }

    async fn rasterize(
        &mut self,
        staged: &JsValue,
        _settings: &ExportSettings,
    ) -> Result<JsValue, ExportError> {
        capture_page(staged, &self.settings_json)
            .await
            .map_err(|e| ExportError::Output(describe(&e)))
    }

    fn discard(&mut self, staged: JsValue) {
        discard_page(&staged);
    }

    fn add_page(&mut self, index: usize, image: JsValue) -> Result<(), ExportError> {
        add_page_image(index, &image).map_err(|e| ExportError::Output(describe(&e)))
    }

    async fn finish(&mut self, file_name: &str) -> Result<(), ExportError> {
        save_document(file_name)
            .await
            .map(|_| ())
            .map_err(|e| ExportError::Output(describe(&e)))
    }

    fn abort(&mut self) {
        abort_document();
    }
}

/// Best-effort text for a thrown JS value
fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

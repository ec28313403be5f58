//! WASM bindings for the order form
//!
//! Structured results cross the bridge as JSON strings. The grid itself
//! is handed over as a flat `Uint32Array` so the matrix view can redraw
//! without parsing.

mod bridge;
mod console;
mod storage;

pub use bridge::JsExportBackend;
pub use console::ConsoleWriter;
pub use storage::LocalStorage;

use crate::error::LensOrderError;
use crate::grid::{CYLINDER_COUNT, SPHERE_COUNT};
use crate::{
    AxisKind, AxisSigns, AxisValue, DeleteOutcome, EditOp, InvoiceConfig, MemoryStorage,
    OrderEditor, OrderField, Session, StorageBackend, SystemClock,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use time::OffsetDateTime;
use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console::install(tracing::Level::INFO);
}

type SharedEditor = Rc<RefCell<OrderEditor<Box<dyn StorageBackend>>>>;

/// WASM-exposed order editor
#[wasm_bindgen]
pub struct WasmLensOrder {
    editor: SharedEditor,
}

#[wasm_bindgen]
impl WasmLensOrder {
    /// Open the editor on `localStorage`, restoring the active session.
    ///
    /// Falls back to in-memory storage when `localStorage` is unavailable.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmLensOrder, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => InvoiceConfig::from_json(json).map_err(to_js)?,
            None => InvoiceConfig::default(),
        };

        let storage: Box<dyn StorageBackend> = match LocalStorage::open() {
            Ok(local) => Box::new(local),
            Err(err) => {
                tracing::warn!(error = %err, "falling back to in-memory sessions");
                Box::new(MemoryStorage::new())
            }
        };

        let editor = OrderEditor::open(storage, Box::new(SystemClock), config).map_err(to_js)?;
        Ok(Self {
            editor: Rc::new(RefCell::new(editor)),
        })
    }

    /// Current order metadata (JSON)
    #[wasm_bindgen(js_name = getMetadata)]
    pub fn get_metadata(&self) -> Result<String, JsValue> {
        to_json(self.editor.borrow().metadata())
    }

    /// Set a metadata field by its form name (`clientName`, `lensType`, ...)
    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, name: &str, value: &str) -> Result<bool, JsValue> {
        let field = OrderField::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown field: {}", name)))?;
        let result = self
            .editor
            .borrow_mut()
            .apply(EditOp::set_field(field, value))
            .map_err(to_js)?;
        Ok(!result.is_noop())
    }

    /// Set a cell quantity; zero or negative clears it
    #[wasm_bindgen(js_name = setQuantity)]
    pub fn set_quantity(&self, sphere: usize, cylinder: usize, quantity: i32) -> Result<bool, JsValue> {
        let result = self
            .editor
            .borrow_mut()
            .apply(EditOp::set_quantity(sphere, cylinder, quantity as i64))
            .map_err(to_js)?;
        Ok(!result.is_noop())
    }

    #[wasm_bindgen(js_name = getQuantity)]
    pub fn get_quantity(&self, sphere: usize, cylinder: usize) -> u32 {
        self.editor.borrow().quantity(sphere, cylinder).unwrap_or(0)
    }

    /// Row-major quantities of the full matrix, zero for empty cells
    #[wasm_bindgen(js_name = getGridBuffer)]
    pub fn get_grid_buffer(&self) -> js_sys::Uint32Array {
        let mut cells = vec![0u32; SPHERE_COUNT * CYLINDER_COUNT];
        for (key, quantity) in self.editor.borrow().grid().iter() {
            cells[key.sphere * CYLINDER_COUNT + key.cylinder] = quantity;
        }
        js_sys::Uint32Array::from(cells.as_slice())
    }

    /// Axis labels and signs (JSON)
    #[wasm_bindgen(js_name = getAxes)]
    pub fn get_axes(&self) -> Result<String, JsValue> {
        let editor = self.editor.borrow();
        let labels = |values: Vec<AxisValue>| -> Vec<String> {
            values.iter().map(|v| v.label()).collect()
        };
        to_json(&AxesView {
            sphere: labels(editor.sphere_axis().values()),
            cylinder: labels(editor.cylinder_axis().values()),
            signs: editor.signs(),
        })
    }

    /// Flip an axis sign; returns the new sign glyph
    #[wasm_bindgen(js_name = toggleSign)]
    pub fn toggle_sign(&self, axis: &str) -> Result<String, JsValue> {
        let kind = parse_axis(axis)?;
        let mut editor = self.editor.borrow_mut();
        editor.toggle_sign(kind).map_err(to_js)?;
        Ok(editor.signs().get(kind).glyph().to_string())
    }

    /// Open the keypad on a cell; returns the keypad display
    #[wasm_bindgen(js_name = selectCell)]
    pub fn select_cell(&self, sphere: usize, cylinder: usize) -> Result<String, JsValue> {
        let mut editor = self.editor.borrow_mut();
        let selection = editor.select_cell(sphere, cylinder).map_err(to_js)?;
        Ok(selection.entry.display().to_string())
    }

    /// Keypad input: a digit, `CLR` or `DEL`. Returns the keypad display.
    #[wasm_bindgen(js_name = pressKey)]
    pub fn press_key(&self, key: &str) -> Result<String, JsValue> {
        let mut editor = self.editor.borrow_mut();
        let entry = editor
            .keypad()
            .ok_or_else(|| to_js(LensOrderError::NoSelection))?;
        match key {
            "CLR" => entry.clear(),
            "DEL" | "Backspace" => entry.backspace(),
            _ => {
                for digit in key.chars() {
                    entry.press(digit);
                }
            }
        }
        Ok(entry.display().to_string())
    }

    /// Commit the keypad value to the selected cell
    #[wasm_bindgen(js_name = confirmQuantity)]
    pub fn confirm_quantity(&self) -> Result<bool, JsValue> {
        let result = self.editor.borrow_mut().confirm_quantity().map_err(to_js)?;
        Ok(!result.is_noop())
    }

    #[wasm_bindgen(js_name = cancelSelection)]
    pub fn cancel_selection(&self) {
        self.editor.borrow_mut().cancel_selection();
    }

    /// Invoice pages as display records (JSON)
    #[wasm_bindgen(js_name = getInvoiceJson)]
    pub fn get_invoice_json(&self) -> Result<String, JsValue> {
        to_json(&self.editor.borrow_mut().invoice())
    }

    /// Invoice pages as HTML markup
    #[wasm_bindgen(js_name = renderInvoiceHtml)]
    pub fn render_invoice_html(&self) -> String {
        self.editor.borrow_mut().invoice_html()
    }

    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.editor.borrow_mut().print_plan().page_count()
    }

    /// Start a new named session (JSON of the created session)
    #[wasm_bindgen(js_name = createSession)]
    pub fn create_session(&self, name: &str) -> Result<String, JsValue> {
        let session = self.editor.borrow_mut().create_session(name).map_err(to_js)?;
        to_json(&SessionView::from(&session))
    }

    #[wasm_bindgen(js_name = loadSession)]
    pub fn load_session(&self, id: &str) -> Result<(), JsValue> {
        self.editor.borrow_mut().load_session(id).map_err(to_js)
    }

    /// Delete a session. Returns `{"outcome": ...}` describing the new
    /// active session, if any.
    #[wasm_bindgen(js_name = deleteSession)]
    pub fn delete_session(&self, id: &str) -> Result<String, JsValue> {
        let outcome = self.editor.borrow_mut().delete_session(id).map_err(to_js)?;
        let view = match &outcome {
            DeleteOutcome::Removed => DeleteView::Removed,
            DeleteOutcome::Activated(session) => DeleteView::Activated { id: &session.id },
            DeleteOutcome::NeedsNewSession => DeleteView::NeedsNewSession,
        };
        to_json(&view)
    }

    #[wasm_bindgen(js_name = activeSessionId)]
    pub fn active_session_id(&self) -> Option<String> {
        self.editor.borrow().store().active_id().map(str::to_string)
    }

    /// Saved sessions, newest first, optionally filtered (JSON)
    #[wasm_bindgen(js_name = listSessions)]
    pub fn list_sessions(&self, search: Option<String>) -> Result<String, JsValue> {
        let editor = self.editor.borrow();
        let views: Vec<SessionView> = editor
            .sessions(search.as_deref())
            .into_iter()
            .map(SessionView::from)
            .collect();
        to_json(&views)
    }

    /// Remembered values of `clientName` or `lensType` matching `term` (JSON)
    pub fn suggestions(&self, field: &str, term: &str) -> Result<String, JsValue> {
        let editor = self.editor.borrow();
        let list = match OrderField::from_name(field) {
            Some(OrderField::ClientName) => editor.store().client_names(),
            Some(OrderField::LensType) => editor.store().lens_types(),
            _ => return Err(JsValue::from_str(&format!("no suggestions for {}", field))),
        };
        to_json(&list.matching(term))
    }

    #[wasm_bindgen(js_name = commitSuggestions)]
    pub fn commit_suggestions(&self) -> Result<(), JsValue> {
        self.editor.borrow_mut().commit_suggestions().map_err(to_js)
    }

    #[wasm_bindgen(js_name = isExporting)]
    pub fn is_exporting(&self) -> bool {
        self.editor.borrow().is_exporting()
    }

    /// Generate and download the invoice PDF.
    ///
    /// Resolves to `{"fileName", "pages"}`; rejects with the message to
    /// show the user. Edits are refused until the promise settles.
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&self) -> js_sys::Promise {
        let editor = Rc::clone(&self.editor);
        wasm_bindgen_futures::future_to_promise(async move {
            let job = editor.borrow_mut().begin_export().map_err(to_js)?;
            let mut backend = JsExportBackend::new(&job.settings);
            let result = job.run(&mut backend).await;
            editor.borrow_mut().end_export();

            let report = result.map_err(to_js)?;
            editor.borrow_mut().commit_suggestions().map_err(to_js)?;
            Ok(JsValue::from_str(&to_json(&report)?))
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AxesView {
    sphere: Vec<String>,
    cylinder: Vec<String>,
    signs: AxisSigns,
}

/// Row of the history list
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    id: &'a str,
    name: &'a str,
    client_name: &'a str,
    lens_type: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    total_lenses: u64,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            id: &session.id,
            name: &session.name,
            client_name: &session.order_metadata.client_name,
            lens_type: &session.order_metadata.lens_type,
            updated_at: session.updated_at,
            total_lenses: session.total_lenses(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
enum DeleteView<'a> {
    Removed,
    Activated { id: &'a str },
    NeedsNewSession,
}

fn parse_axis(name: &str) -> Result<AxisKind, JsValue> {
    match name {
        "sphere" | "row" => Ok(AxisKind::Sphere),
        "cylinder" | "col" => Ok(AxisKind::Cylinder),
        _ => Err(JsValue::from_str(&format!("unknown axis: {}", name))),
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js)
}

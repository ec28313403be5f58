//! lens-order: order entry core for optical lens shops
//!
//! This crate provides the engine behind a browser-based lens order form:
//! - A sparse sphere x cylinder quantity grid with sign-toggled axes
//! - Printable-range trimming and page pagination for the invoice table
//! - Invoice page rendering (display model and HTML markup)
//! - A sequential export pipeline over an injected rasterizer
//! - Named draft sessions persisted to pluggable storage

pub mod config;
pub mod document;
pub mod editing;
pub mod error;
pub mod export;
pub mod grid;
pub mod layout;
pub mod render;
pub mod session;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmLensOrder;

// Re-export primary types
pub use config::InvoiceConfig;
pub use document::{OrderField, OrderMetadata};
pub use editing::{CellSelection, Change, EditOp, EditResult, QuantityEntry};
pub use error::{ExportError, LensOrderError, Result, StoreError};
pub use export::{export_invoice, ExportBackend, ExportReport, ExportSettings};
pub use grid::{Axis, AxisKind, AxisSign, AxisSigns, AxisValue, CellKey, GridEntryRecord, PowerGrid};
pub use layout::{
    paginate, reduce_to_printable, LayoutConstraints, LayoutState, PageLayout, PageStyle,
    PrintPlan, PrintableRange,
};
pub use render::{InvoiceDocument, InvoicePage};
pub use session::{
    Clock, DeleteOutcome, MemoryStorage, Session, SessionStore, StorageBackend, SystemClock,
};

/// Snapshot of everything an export needs, taken when the export starts
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub document: InvoiceDocument,
    pub order_id: String,
    pub constraints: LayoutConstraints,
    pub settings: ExportSettings,
}

impl ExportJob {
    /// Run the export pipeline for this snapshot
    pub async fn run<B: ExportBackend>(&self, backend: &mut B) -> Result<ExportReport> {
        let report = export_invoice(
            &self.document,
            &self.order_id,
            &self.constraints,
            &self.settings,
            backend,
        )
        .await?;
        Ok(report)
    }
}

/// The active editing context combining all components
pub struct OrderEditor<S: StorageBackend> {
    metadata: OrderMetadata,
    grid: PowerGrid,
    signs: AxisSigns,
    layout: LayoutState,
    export_settings: ExportSettings,
    store: SessionStore<S>,
    selection: Option<CellSelection>,
    exporting: bool,
}

impl<S: StorageBackend> OrderEditor<S> {
    /// Create an editor over an opened store, restoring its active session
    pub fn new(store: SessionStore<S>, config: InvoiceConfig) -> Self {
        let mut editor = Self {
            metadata: OrderMetadata::fresh(store.now()),
            grid: PowerGrid::new(),
            signs: AxisSigns::default(),
            layout: LayoutState::new(config.layout),
            export_settings: config.export,
            store,
            selection: None,
            exporting: false,
        };
        if let Some(session) = editor.store.active().cloned() {
            editor.restore(&session);
        }
        editor
    }

    /// Open the store on `storage` and create an editor over it
    pub fn open(storage: S, clock: Box<dyn Clock>, config: InvoiceConfig) -> Result<Self> {
        let store = SessionStore::open(storage, clock)?;
        Ok(Self::new(store, config))
    }

    pub fn metadata(&self) -> &OrderMetadata {
        &self.metadata
    }

    pub fn grid(&self) -> &PowerGrid {
        &self.grid
    }

    pub fn signs(&self) -> AxisSigns {
        self.signs
    }

    pub fn sphere_axis(&self) -> Axis {
        Axis::sphere(self.signs.row)
    }

    pub fn cylinder_axis(&self) -> Axis {
        Axis::cylinder(self.signs.col)
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn constraints(&self) -> &LayoutConstraints {
        self.layout.constraints()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Quantity at a cell, `None` when nothing is ordered
    pub fn quantity(&self, sphere: usize, cylinder: usize) -> Option<u32> {
        self.grid.quantity(CellKey::new(sphere, cylinder))
    }

    /// Apply an edit, invalidate layout as needed and save the active session
    pub fn apply(&mut self, op: EditOp) -> Result<EditResult> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }

        let affects_layout = op.affects_layout();
        let mut result = EditResult::default();

        match op {
            EditOp::SetQuantity { cell, quantity } => {
                self.check_cell(cell)?;
                if self.grid.set_quantity(cell, quantity) {
                    result.changes.push(Change::Cell(cell));
                }
            }
            EditOp::SetField { field, value } => {
                if self.metadata.set(field, value) {
                    result.changes.push(Change::Field(field));
                }
            }
            EditOp::SetSign { axis, sign } => {
                if self.signs.get(axis) != sign {
                    self.signs.set(axis, sign);
                    result.changes.push(Change::Sign(axis));
                }
            }
        }

        if result.is_noop() {
            return Ok(result);
        }
        if affects_layout {
            self.layout.invalidate();
            result.layout_invalidated = true;
        }
        result.saved = self.autosave()?;
        Ok(result)
    }

    /// Flip the display sign of an axis
    pub fn toggle_sign(&mut self, axis: AxisKind) -> Result<EditResult> {
        let sign = self.signs.get(axis).flipped();
        self.apply(EditOp::set_sign(axis, sign))
    }

    /// Open the keypad on a cell
    pub fn select_cell(&mut self, sphere: usize, cylinder: usize) -> Result<&CellSelection> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }
        let cell = CellKey::new(sphere, cylinder);
        self.check_cell(cell)?;
        let current = self.grid.quantity(cell);
        Ok(self.selection.insert(CellSelection::new(cell, current)))
    }

    pub fn selection(&self) -> Option<&CellSelection> {
        self.selection.as_ref()
    }

    /// Keypad input for the selected cell
    pub fn keypad(&mut self) -> Option<&mut QuantityEntry> {
        self.selection.as_mut().map(|s| &mut s.entry)
    }

    /// Commit the keypad value to the selected cell and close the keypad
    pub fn confirm_quantity(&mut self) -> Result<EditResult> {
        let selection = self.selection.as_ref().ok_or(LensOrderError::NoSelection)?;
        let op = EditOp::SetQuantity {
            cell: selection.cell,
            quantity: selection.entry.value() as i64,
        };
        let result = self.apply(op)?;
        self.selection = None;
        Ok(result)
    }

    pub fn cancel_selection(&mut self) {
        self.selection = None;
    }

    /// Current print plan, recomputed after edits
    pub fn print_plan(&mut self) -> &PrintPlan {
        let sphere = self.sphere_axis();
        let cylinder = self.cylinder_axis();
        self.layout.plan(&self.grid, &sphere, &cylinder)
    }

    /// Render-ready invoice pages
    pub fn invoice(&mut self) -> InvoiceDocument {
        let sphere = self.sphere_axis();
        let cylinder = self.cylinder_axis();
        let plan = self.layout.plan(&self.grid, &sphere, &cylinder);
        InvoiceDocument::build(&self.metadata, &self.grid, plan)
    }

    /// Markup of every invoice page
    pub fn invoice_html(&mut self) -> String {
        let document = self.invoice();
        render::render_document_html(&document, self.layout.constraints())
    }

    /// Start a new named session with a blank order and make it active
    pub fn create_session(&mut self, name: &str) -> Result<Session> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }
        let session = self.store.create(name)?.clone();
        self.restore(&session);
        Ok(session)
    }

    /// Replace the editing context with a saved session
    pub fn load_session(&mut self, id: &str) -> Result<()> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }
        let session = self.store.load(id)?;
        self.restore(&session);
        Ok(())
    }

    /// Delete a session, loading its successor if it was active
    pub fn delete_session(&mut self, id: &str) -> Result<DeleteOutcome> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }
        let outcome = self.store.delete(id)?;
        if let DeleteOutcome::Activated(session) = &outcome {
            self.restore(session);
        }
        Ok(outcome)
    }

    /// Saved sessions, most recently updated first
    pub fn sessions(&self, search: Option<&str>) -> Vec<&Session> {
        self.store.list(search)
    }

    /// Remember the current client name and lens type for autocomplete
    pub fn commit_suggestions(&mut self) -> Result<()> {
        self.store.remember_suggestions(&self.metadata)?;
        Ok(())
    }

    /// Block edits and snapshot the invoice for export.
    ///
    /// Suggestions are left alone; callers commit them once the job succeeds.
    pub fn begin_export(&mut self) -> Result<ExportJob> {
        if self.exporting {
            return Err(LensOrderError::ExportInProgress);
        }
        self.selection = None;
        let document = self.invoice();
        self.exporting = true;
        Ok(ExportJob {
            document,
            order_id: self.metadata.order_id.clone(),
            constraints: *self.layout.constraints(),
            settings: self.export_settings.clone(),
        })
    }

    /// Unblock edits after an export finished or failed
    pub fn end_export(&mut self) {
        self.exporting = false;
    }

    /// Run a complete export while holding the editor
    pub async fn export<B: ExportBackend>(&mut self, backend: &mut B) -> Result<ExportReport> {
        let job = self.begin_export()?;
        let result = job.run(backend).await;
        self.end_export();
        let report = result?;
        self.commit_suggestions()?;
        Ok(report)
    }

    fn check_cell(&self, cell: CellKey) -> Result<()> {
        if cell.sphere >= self.sphere_axis().len() || cell.cylinder >= self.cylinder_axis().len() {
            return Err(LensOrderError::CellOutOfRange {
                sphere: cell.sphere,
                cylinder: cell.cylinder,
            });
        }
        Ok(())
    }

    fn restore(&mut self, session: &Session) {
        self.metadata = session.order_metadata.clone();
        self.signs = session.axis_signs;
        self.grid = PowerGrid::from_entries(
            &self.sphere_axis(),
            &self.cylinder_axis(),
            &session.grid_entries,
        );
        self.selection = None;
        self.layout.invalidate();
    }

    fn autosave(&mut self) -> Result<bool> {
        let Some(id) = self.store.active_id().map(str::to_string) else {
            return Ok(false);
        };
        let entries = self.grid.to_entries(&self.sphere_axis(), &self.cylinder_axis());
        self.store.save(&id, &self.metadata, entries, self.signs)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::SteppingClock;
    use time::macros::datetime;
    use time::Duration;

    fn editor() -> OrderEditor<MemoryStorage> {
        let clock = SteppingClock::new(datetime!(2024-06-01 8:00 UTC), Duration::seconds(30));
        OrderEditor::open(MemoryStorage::new(), Box::new(clock), InvoiceConfig::default()).unwrap()
    }

    #[test]
    fn test_create_editor() {
        let editor = editor();
        assert!(editor.grid().is_empty());
        assert!(editor.metadata().order_id.starts_with("#ORD-"));
        assert_eq!(editor.metadata().date, "2024-06-01");
        assert_eq!(editor.store().active_id(), None);
    }

    #[test]
    fn test_edits_without_session_are_not_saved() {
        let mut editor = editor();
        let result = editor.apply(EditOp::set_quantity(4, 1, 2)).unwrap();
        assert!(!result.saved);
        assert!(result.layout_invalidated);
        assert_eq!(editor.quantity(4, 1), Some(2));
    }

    #[test]
    fn test_edits_autosave_active_session() {
        let mut editor = editor();
        let id = editor.create_session("Walk-in").unwrap().id.clone();

        let result = editor
            .apply(EditOp::set_field(OrderField::ClientName, "Clearview"))
            .unwrap();
        assert!(result.saved);
        assert!(!result.layout_invalidated);

        editor.apply(EditOp::set_quantity(48, 8, 5)).unwrap();
        let session = editor.store().get(&id).unwrap();
        assert_eq!(session.order_metadata.client_name, "Clearview");
        assert_eq!(session.grid_entries.len(), 1);
        assert_eq!(session.grid_entries[0].row_axis, "-12.00");
    }

    #[test]
    fn test_noop_edit() {
        let mut editor = editor();
        let result = editor.apply(EditOp::set_quantity(1, 1, 0)).unwrap();
        assert!(result.is_noop());
        assert!(!result.saved);
    }

    #[test]
    fn test_out_of_range_cell() {
        let mut editor = editor();
        assert!(matches!(
            editor.apply(EditOp::set_quantity(81, 0, 1)),
            Err(LensOrderError::CellOutOfRange { .. })
        ));
        assert!(editor.select_cell(0, 25).is_err());
    }

    #[test]
    fn test_keypad_flow() {
        let mut editor = editor();
        editor.select_cell(2, 3).unwrap();
        let keypad = editor.keypad().unwrap();
        keypad.press('1');
        keypad.press('2');
        editor.confirm_quantity().unwrap();
        assert_eq!(editor.quantity(2, 3), Some(12));
        assert!(editor.selection().is_none());

        assert_eq!(editor.select_cell(2, 3).unwrap().entry.display(), "12");
        editor.keypad().unwrap().clear();
        editor.confirm_quantity().unwrap();
        assert_eq!(editor.quantity(2, 3), None);

        assert!(matches!(
            editor.confirm_quantity(),
            Err(LensOrderError::NoSelection)
        ));
    }

    #[test]
    fn test_sign_toggle_relabels_without_moving() {
        let mut editor = editor();
        editor.apply(EditOp::set_quantity(20, 4, 3)).unwrap();
        let before = editor.print_plan().clone();

        editor.toggle_sign(AxisKind::Sphere).unwrap();
        assert_eq!(editor.signs().row, AxisSign::Plus);
        assert_eq!(editor.quantity(20, 4), Some(3));

        let after = editor.print_plan().clone();
        assert_eq!(before.rows.len(), after.rows.len());
        assert_eq!(before.pages.len(), after.pages.len());
        assert_eq!(before.rows[20].label(), "-5.00");
        assert_eq!(after.rows[20].label(), "+5.00");
        assert_eq!(after.cols[4].label(), "-1.00");
    }

    #[test]
    fn test_load_and_delete_sessions() {
        let mut editor = editor();
        let first = editor.create_session("First").unwrap().id.clone();
        editor.apply(EditOp::set_quantity(10, 2, 4)).unwrap();
        editor.toggle_sign(AxisKind::Cylinder).unwrap();

        let second = editor.create_session("Second").unwrap().id.clone();
        assert!(editor.grid().is_empty());
        assert_eq!(editor.signs(), AxisSigns::default());

        editor.load_session(&first).unwrap();
        assert_eq!(editor.quantity(10, 2), Some(4));
        assert_eq!(editor.signs().col, AxisSign::Plus);

        editor.load_session(&second).unwrap();
        match editor.delete_session(&second).unwrap() {
            DeleteOutcome::Activated(session) => assert_eq!(session.id, first),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(editor.quantity(10, 2), Some(4));

        assert_eq!(
            editor.delete_session(&first).unwrap(),
            DeleteOutcome::NeedsNewSession
        );
        assert!(editor.sessions(None).is_empty());
    }

    #[test]
    fn test_reopen_restores_active_session() {
        let clock = SteppingClock::new(datetime!(2024-06-01 8:00 UTC), Duration::seconds(30));
        let mut editor =
            OrderEditor::open(MemoryStorage::new(), Box::new(clock), InvoiceConfig::default())
                .unwrap();
        editor.create_session("Persisted").unwrap();
        editor.apply(EditOp::set_quantity(7, 7, 7)).unwrap();

        let storage = editor.store().storage().clone();
        let reopened =
            OrderEditor::open(storage, Box::new(SystemClock), InvoiceConfig::default()).unwrap();
        assert_eq!(reopened.quantity(7, 7), Some(7));
    }

    #[test]
    fn test_export_blocks_edits() {
        let mut editor = editor();
        editor.apply(EditOp::set_quantity(0, 0, 1)).unwrap();
        editor
            .apply(EditOp::set_field(OrderField::LensType, "1.61 HMC"))
            .unwrap();

        let job = editor.begin_export().unwrap();
        assert_eq!(job.document.page_count(), 1);
        assert!(editor.is_exporting());
        assert!(matches!(
            editor.apply(EditOp::set_quantity(0, 0, 2)),
            Err(LensOrderError::ExportInProgress)
        ));
        assert!(matches!(
            editor.begin_export(),
            Err(LensOrderError::ExportInProgress)
        ));

        editor.end_export();
        assert!(editor.apply(EditOp::set_quantity(0, 0, 2)).is_ok());
        assert!(editor.store().lens_types().is_empty());
    }
}

//! Error types

use thiserror::Error;

/// Failures of the session store and its storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend refused a read or write (quota, unavailable, ...)
    #[error("storage error: {0}")]
    Storage(String),
    /// Persisted data could not be encoded or decoded
    #[error("corrupt session data: {0}")]
    Serde(#[from] serde_json::Error),
    /// No session with this id exists
    #[error("unknown session: {0}")]
    UnknownSession(String),
    /// Sessions need a non-blank name
    #[error("session name must not be empty")]
    EmptyName,
}

/// Failures of the invoice export pipeline.
///
/// The display text is the single message shown to the user.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Error: PDF template not found.")]
    MissingRenderTarget,
    #[error("No pages found to capture. Check if grid data exists.")]
    NoPrintablePages,
    #[error("{0} library not found. Please check your internet connection.")]
    MissingCapability(String),
    #[error("capturing page {page} failed: {reason}")]
    Rasterization { page: usize, reason: String },
    #[error("writing the document failed: {0}")]
    Output(String),
}

/// Top-level error for editor operations
#[derive(Debug, Error)]
pub enum LensOrderError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
    /// Edits are blocked while an invoice is being generated
    #[error("an export is in progress")]
    ExportInProgress,
    #[error("cell outside the power matrix: sphere {sphere}, cylinder {cylinder}")]
    CellOutOfRange { sphere: usize, cylinder: usize },
    #[error("no cell selected")]
    NoSelection,
}

pub type Result<T, E = LensOrderError> = std::result::Result<T, E>;

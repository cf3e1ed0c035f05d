use thiserror::Error;
use uuid::Uuid;

use crate::models::Category;
use crate::store::ApiError;

/// Editor-level error type.
///
/// Every transition on [`crate::editor::ResumeEditor`] converts its failure
/// into one of these at the operation boundary and records a status report;
/// nothing propagates as a panic. Each class is retryable by re-invoking the
/// transition.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Remote call failed (attach, detach, update, create, or reload).
    /// Local state is left in its last-known-consistent form.
    #[error("Remote error: {0}")]
    Remote(#[from] ApiError),

    /// Local required-field check failed. No remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A transition referenced a source or attachment id the editor does
    /// not know about.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A toggle for this source item is still outstanding; the second one
    /// is rejected rather than queued so an attach/detach can never be
    /// duplicated in flight.
    #[error("{category} toggle for source {source_id} is already in flight")]
    ToggleInFlight { category: Category, source_id: Uuid },
}

impl EditorError {
    /// Human-readable text for the status slot.
    pub fn status_text(&self) -> String {
        self.to_string()
    }
}

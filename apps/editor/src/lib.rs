//! Resume composition editor core.
//!
//! The state-management heart of the resume builder: a person assembles a
//! resume by attaching items drawn from their profile (the source pool) and
//! editing the attached copies locally before an explicit batch save.
//!
//! Three notions of truth are reconciled here:
//! 1. profile source data — read-only from this crate's perspective,
//! 2. attached copies owned by the resume,
//! 3. unsaved local edits held in the [`editor::EditBuffer`].
//!
//! Writes come in two explicitly distinct flavors:
//! - **apply-immediate** — [`editor::ResumeEditor::toggle`] and
//!   [`editor::ResumeEditor::create_direct`] hit the remote store right away
//!   and mutate local state only after remote confirmation;
//! - **buffer-then-flush** — [`editor::ResumeEditor::set_field`] and
//!   [`editor::ResumeEditor::set_core_field`] accumulate locally until
//!   [`editor::ResumeEditor::save`] flushes every pending edit concurrently.
//!
//! Presentation, routing, and authentication are external collaborators;
//! the remote store is consumed through the [`store::ResumeStore`] trait.

pub mod config;
pub mod editor;
pub mod errors;
pub mod logging;
pub mod models;
pub mod store;

pub use editor::{EditorSnapshot, ResumeEditor, SaveReport, StatusKind, ToggleOutcome};
pub use errors::EditorError;
pub use models::{AttachedItem, Category, FieldPatch, ItemFields, SourceItem};
pub use store::{ApiError, HttpResumeStore, ResumeStore};

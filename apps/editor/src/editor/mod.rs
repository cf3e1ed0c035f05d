//! The resume editor state machine.
//!
//! One object owns every piece of editor state and exposes a fixed set of
//! transitions; handlers never share implicit state. Transitions come in two
//! explicitly distinct write flavors:
//!
//! - **apply-immediate** ([`ResumeEditor::toggle`],
//!   [`ResumeEditor::create_direct`]): the remote store is mutated first and
//!   local state only after remote confirmation, so a failure needs no
//!   rollback.
//! - **buffer-then-flush** ([`ResumeEditor::set_field`],
//!   [`ResumeEditor::set_core_field`]): edits accumulate locally and are
//!   flushed by [`ResumeEditor::save`].
//!
//! Lock discipline: editor state lives in a `std::sync::Mutex` that is never
//! held across an `.await`. Each transition locks to decide, releases for the
//! remote call, then re-locks to commit.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::EditorError;
use crate::models::{AttachedItem, Category, FieldPatch};
use crate::store::{AttachRequest, ResumeStore};

pub mod buffer;
pub mod reload;
pub mod save;
pub mod state;
pub mod status;
pub mod validate;


pub use buffer::EditBuffer;
pub use reload::{FullReload, ReloadStrategy};
pub use save::{CoreFlushResult, ItemSaveResult, SaveReport};
pub use state::{CreationDraft, EditorSnapshot};
pub use status::{StatusKind, StatusReport};

use save::flush_pending;
use state::EditorState;

/// Result of a successful toggle.
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Attached(AttachedItem),
    Detached { attachment_id: Uuid },
}

enum TogglePlan {
    Attach(AttachRequest),
    Detach(Uuid),
}

pub struct ResumeEditor {
    store: Arc<dyn ResumeStore>,
    reload_strategy: Arc<dyn ReloadStrategy>,
    state: Mutex<EditorState>,
}

impl ResumeEditor {
    pub fn new(store: Arc<dyn ResumeStore>) -> Self {
        Self::with_reload_strategy(store, Arc::new(FullReload))
    }

    pub fn with_reload_strategy(
        store: Arc<dyn ResumeStore>,
        reload_strategy: Arc<dyn ReloadStrategy>,
    ) -> Self {
        Self {
            store,
            reload_strategy,
            state: Mutex::new(EditorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().expect("editor state lock poisoned")
    }

    /// Initial session load: source pool and attachment set together.
    pub async fn load(&self) -> Result<EditorSnapshot, EditorError> {
        self.reload().await
    }

    /// Re-derives all local state from the server. Clears the edit buffer,
    /// core buffer, and creation drafts.
    pub async fn reload(&self) -> Result<EditorSnapshot, EditorError> {
        match self.reload_strategy.load(self.store.as_ref()).await {
            Ok((pool, snapshot)) => {
                let mut state = self.state();
                state.apply_loaded(pool, snapshot);
                Ok(state.snapshot())
            }
            Err(api_error) => {
                warn!("reload failed: {api_error}");
                let error = EditorError::Remote(api_error);
                self.state().status.error(error.status_text());
                Err(error)
            }
        }
    }

    /// Post-mutation refresh: re-fetches pool and target but preserves
    /// still-pending edits. Returns the error text on failure instead of
    /// touching local state.
    async fn refresh(&self) -> Option<String> {
        match self.reload_strategy.load(self.store.as_ref()).await {
            Ok((pool, snapshot)) => {
                self.state().refresh(pool, snapshot);
                None
            }
            Err(api_error) => {
                warn!("refresh failed: {api_error}");
                Some(api_error.to_string())
            }
        }
    }

    /// Attach/detach the given source item (apply-immediate).
    ///
    /// Not attached: copies the source's current fields and attaches; the
    /// item shows as selected only after the remote call succeeds. Attached:
    /// detaches by the attachment's own id and discards its pending edits.
    /// A toggle for the same `(category, source_id)` while one is already in
    /// flight is rejected, never queued.
    pub async fn toggle(
        &self,
        category: Category,
        source_id: Uuid,
    ) -> Result<ToggleOutcome, EditorError> {
        let plan = {
            let mut state = self.state();
            if state.inflight.contains(&(category, source_id)) {
                let error = EditorError::ToggleInFlight {
                    category,
                    source_id,
                };
                state.status.error(error.status_text());
                return Err(error);
            }

            let plan = if let Some(existing) = state.attachments.find_by_source(category, source_id)
            {
                TogglePlan::Detach(existing.id)
            } else if let Some(source) = state.source_pool.find(category, source_id) {
                TogglePlan::Attach(AttachRequest {
                    source_id,
                    fields: source.fields.clone(),
                })
            } else {
                let error = EditorError::NotFound(format!(
                    "{category} source {source_id} is not in the profile"
                ));
                state.status.error(error.status_text());
                return Err(error);
            };

            state.inflight.insert((category, source_id));
            plan
        };

        let outcome = match plan {
            TogglePlan::Attach(request) => {
                debug!("attaching {category} source {source_id}");
                self.store
                    .attach(category, request)
                    .await
                    .map(ToggleOutcome::Attached)
            }
            TogglePlan::Detach(attachment_id) => {
                debug!("detaching {category} attachment {attachment_id}");
                self.store
                    .detach(category, attachment_id)
                    .await
                    .map(|_| ToggleOutcome::Detached { attachment_id })
            }
        };

        let mut state = self.state();
        state.inflight.remove(&(category, source_id));

        match outcome {
            Ok(ToggleOutcome::Attached(item)) => {
                state.attachments.push(item.clone());
                state.status.success(format!("Added {category} item to resume"));
                Ok(ToggleOutcome::Attached(item))
            }
            Ok(ToggleOutcome::Detached { attachment_id }) => {
                state.attachments.remove(category, attachment_id);
                state.buffer.clear(category, attachment_id);
                state
                    .status
                    .success(format!("Removed {category} item from resume"));
                Ok(ToggleOutcome::Detached { attachment_id })
            }
            Err(api_error) => {
                // No local mutation happened before remote confirmation, so
                // there is nothing to roll back.
                let error = EditorError::Remote(api_error);
                state.status.error(error.status_text());
                Err(error)
            }
        }
    }

    /// Removes an attachment by its own identity (apply-immediate). The only
    /// way to take a direct-created item (no `source_ref`) off the resume;
    /// also discards the attachment's pending edits.
    pub async fn remove(
        &self,
        category: Category,
        attachment_id: Uuid,
    ) -> Result<(), EditorError> {
        let guard_key = {
            let mut state = self.state();
            let source_ref = match state.attachments.get(category, attachment_id) {
                Some(item) => item.source_ref,
                None => {
                    let error = EditorError::NotFound(format!(
                        "{category} attachment {attachment_id} is not on the resume"
                    ));
                    state.status.error(error.status_text());
                    return Err(error);
                }
            };

            // Attachments with a source share the toggle guard so a remove
            // cannot race a toggle on the same source item.
            let key = source_ref.map(|source_id| (category, source_id));
            if let Some(key) = key {
                if !state.inflight.insert(key) {
                    let error = EditorError::ToggleInFlight {
                        category,
                        source_id: key.1,
                    };
                    state.status.error(error.status_text());
                    return Err(error);
                }
            }
            key
        };

        debug!("removing {category} attachment {attachment_id}");
        let result = self.store.detach(category, attachment_id).await;

        let mut state = self.state();
        if let Some(key) = guard_key {
            state.inflight.remove(&key);
        }
        match result {
            Ok(()) => {
                state.attachments.remove(category, attachment_id);
                state.buffer.clear(category, attachment_id);
                state
                    .status
                    .success(format!("Removed {category} item from resume"));
                Ok(())
            }
            Err(api_error) => {
                let error = EditorError::Remote(api_error);
                state.status.error(error.status_text());
                Err(error)
            }
        }
    }

    /// Buffers a field edit for an attached item (buffer-then-flush).
    /// Visible through merged reads immediately; persisted on `save`.
    pub fn set_field(
        &self,
        category: Category,
        attachment_id: Uuid,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), EditorError> {
        let mut state = self.state();
        if !state.attachments.contains(category, attachment_id) {
            let error = EditorError::NotFound(format!(
                "{category} attachment {attachment_id} is not on the resume"
            ));
            state.status.error(error.status_text());
            return Err(error);
        }
        state.buffer.set_field(category, attachment_id, field, value);
        Ok(())
    }

    /// Buffers an edit to the resume's own core fields (buffer-then-flush).
    pub fn set_core_field(&self, field: impl Into<String>, value: impl Into<Value>) {
        self.state().core_buffer.set(field, value);
    }

    /// Flushes every pending edit concurrently, then the core fields, then
    /// refreshes from the server regardless of outcome.
    ///
    /// Partial-failure semantics: each item update succeeds or fails
    /// independently; successful entries leave the buffer, failed ones stay
    /// pending so a second `save` retries only them.
    pub async fn save(&self) -> Result<SaveReport, EditorError> {
        let (pending, core_patch) = {
            let state = self.state();
            (state.buffer.pending(), state.core_buffer.clone())
        };

        debug!("saving: {} pending item(s)", pending.len());
        let outcomes = flush_pending(self.store.as_ref(), pending).await;

        let core_result = if core_patch.is_empty() {
            CoreFlushResult::Skipped
        } else {
            match self.store.update_core_fields(&core_patch).await {
                Ok(_) => CoreFlushResult::Saved,
                Err(api_error) => CoreFlushResult::Failed(api_error.to_string()),
            }
        };

        {
            let mut state = self.state();
            for outcome in &outcomes {
                if outcome.result.is_ok() {
                    state.buffer.remove_if_unchanged(
                        outcome.category,
                        outcome.attachment_id,
                        &outcome.patch,
                    );
                }
            }
            if core_result == CoreFlushResult::Saved && state.core_buffer == core_patch {
                state.core_buffer = FieldPatch::new();
            }
        }

        // The refresh starts only after every flush has settled.
        let refresh_error = self.refresh().await;

        let report = SaveReport {
            item_results: outcomes
                .iter()
                .map(|outcome| ItemSaveResult {
                    category: outcome.category,
                    attachment_id: outcome.attachment_id,
                    error: outcome.result.as_ref().err().map(|e| e.to_string()),
                })
                .collect(),
            core_result,
            refresh_error,
        };

        let (kind, text) = report.summary();
        self.state().status.report(kind, text);
        Ok(report)
    }

    /// Creates a new item directly under the resume, bypassing the source
    /// pool (apply-immediate). Validates required fields locally first; on
    /// validation failure no remote call is made.
    pub async fn create_direct(
        &self,
        category: Category,
        fields: FieldPatch,
    ) -> Result<AttachedItem, EditorError> {
        if let Err(error) = validate::validate_draft(category, &fields) {
            self.state().status.error(error.status_text());
            return Err(error);
        }

        match self.store.create_for_target(category, &fields).await {
            Ok(item) => {
                // Re-derive all state from the server rather than trusting
                // the returned payload's completeness.
                let refresh_error = self.refresh().await;
                let mut state = self.state();
                match refresh_error {
                    None => state.status.success(format!("Added new {category} item")),
                    Some(error) => state
                        .status
                        .error(format!("Item created but refresh failed: {error}")),
                }
                Ok(item)
            }
            Err(api_error) => {
                let error = EditorError::Remote(api_error);
                self.state().status.error(error.status_text());
                Err(error)
            }
        }
    }

    /// Submits the category's creation form. On success the draft is reset
    /// and the panel closed; on validation failure both stay untouched so
    /// the entered values survive.
    pub async fn submit_creation(&self, category: Category) -> Result<AttachedItem, EditorError> {
        let fields = self.state().draft_mut(category).fields.clone();
        let item = self.create_direct(category, fields).await?;

        let mut state = self.state();
        let draft = state.draft_mut(category);
        draft.fields = FieldPatch::new();
        draft.open = false;
        Ok(item)
    }

    pub fn open_creation(&self, category: Category) {
        self.state().draft_mut(category).open = true;
    }

    pub fn close_creation(&self, category: Category) {
        self.state().draft_mut(category).open = false;
    }

    pub fn set_creation_field(
        &self,
        category: Category,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.state().draft_mut(category).fields.set(field, value);
    }

    /// Immutable read model for the presentation layer.
    pub fn snapshot(&self) -> EditorSnapshot {
        self.state().snapshot()
    }

    /// Derived selection set for one category.
    pub fn selected_sources(&self, category: Category) -> HashSet<Uuid> {
        self.state().attachments.selected_sources(category)
    }

    /// Buffer-over-source read of one attachment's fields.
    pub fn merged_fields(
        &self,
        category: Category,
        attachment_id: Uuid,
    ) -> Option<Map<String, Value>> {
        let state = self.state();
        let item = state.attachments.get(category, attachment_id)?;
        Some(item.merged_fields(state.buffer.get(category, attachment_id)))
    }

    /// Buffer-over-source read of a single field.
    pub fn field_value(
        &self,
        category: Category,
        attachment_id: Uuid,
        field: &str,
    ) -> Option<Value> {
        self.merged_fields(category, attachment_id)?.get(field).cloned()
    }

    pub fn last_report(&self) -> Option<StatusReport> {
        self.state().status.current().cloned()
    }
}

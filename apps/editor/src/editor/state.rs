use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::editor::buffer::EditBuffer;
use crate::editor::status::{StatusReport, StatusSlot};
use crate::models::{AttachmentSet, Category, FieldPatch, ResumeCoreFields, ResumeSnapshot, SourcePool};

/// Per-category creation-form state: panel visibility plus the draft values.
#[derive(Debug, Clone, Default)]
pub struct CreationDraft {
    pub open: bool,
    pub fields: FieldPatch,
}

/// All mutable editor state in one place: source pool, attachment set,
/// buffers, creation drafts, status slot, and the in-flight toggle guard.
/// Mutated only through `ResumeEditor` transitions.
#[derive(Debug, Default)]
pub(crate) struct EditorState {
    pub source_pool: SourcePool,
    pub attachments: AttachmentSet,
    pub core: ResumeCoreFields,
    pub buffer: EditBuffer,
    pub core_buffer: FieldPatch,
    pub creation: BTreeMap<Category, CreationDraft>,
    pub status: StatusSlot,
    pub inflight: HashSet<(Category, Uuid)>,
}

impl EditorState {
    /// Explicit reload: replaces everything and re-derives all local truth
    /// from the server, dropping unsaved edits and drafts.
    pub fn apply_loaded(&mut self, pool: SourcePool, snapshot: ResumeSnapshot) {
        self.source_pool = pool;
        self.attachments = snapshot.attachments;
        self.core = snapshot.core;
        self.buffer.clear_all();
        self.core_buffer = FieldPatch::new();
        self.creation.clear();
    }

    /// Post-mutation refresh: replaces the remote-derived collections but
    /// keeps still-pending edits, dropping only entries whose attachment no
    /// longer exists remotely.
    pub fn refresh(&mut self, pool: SourcePool, snapshot: ResumeSnapshot) {
        self.source_pool = pool;
        self.attachments = snapshot.attachments;
        self.core = snapshot.core;
        let attachments = &self.attachments;
        self.buffer.retain(|category, id| attachments.contains(category, id));
    }

    pub fn draft_mut(&mut self, category: Category) -> &mut CreationDraft {
        self.creation.entry(category).or_default()
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            source_pool: self.source_pool.clone(),
            attachments: self.attachments.clone(),
            core: self.core.clone(),
            buffer: self.buffer.clone(),
            core_buffer: self.core_buffer.clone(),
            creation: self.creation.clone(),
            last_report: self.status.current().cloned(),
        }
    }
}

/// Immutable read model handed to the presentation layer: enough to render
/// selection state, merged field values, form state, and status.
#[derive(Debug, Clone)]
pub struct EditorSnapshot {
    pub source_pool: SourcePool,
    pub attachments: AttachmentSet,
    pub core: ResumeCoreFields,
    pub buffer: EditBuffer,
    pub core_buffer: FieldPatch,
    pub creation: BTreeMap<Category, CreationDraft>,
    pub last_report: Option<StatusReport>,
}

impl EditorSnapshot {
    /// The source ids currently attached, for rendering toggle state.
    pub fn selected_sources(&self, category: Category) -> HashSet<Uuid> {
        self.attachments.selected_sources(category)
    }

    /// Buffer-over-source read of one attachment's fields.
    pub fn merged_fields(&self, category: Category, attachment_id: Uuid) -> Option<Map<String, Value>> {
        let item = self.attachments.get(category, attachment_id)?;
        Some(item.merged_fields(self.buffer.get(category, attachment_id)))
    }

    /// Buffer-over-source read of a single field.
    pub fn field_value(&self, category: Category, attachment_id: Uuid, field: &str) -> Option<Value> {
        self.merged_fields(category, attachment_id)?
            .get(field)
            .cloned()
    }

    /// Core fields with unsaved core edits overlaid.
    pub fn merged_core(&self) -> Map<String, Value> {
        let mut object = match serde_json::to_value(&self.core) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        self.core_buffer.merge_over(&mut object);
        object
    }
}

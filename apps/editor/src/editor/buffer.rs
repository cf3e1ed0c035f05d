use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

use crate::models::{Category, FieldPatch};

/// In-memory accumulator of unsaved field edits, keyed by
/// `(category, attachment_id)`.
///
/// A pure local store: it never reads from or validates against the remote.
/// Entries are created/updated on every local field change and destroyed on
/// successful flush or on detach.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    entries: BTreeMap<Category, BTreeMap<Uuid, FieldPatch>>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `value` into the entry's partial map, creating the entry if
    /// absent.
    pub fn set_field(
        &mut self,
        category: Category,
        attachment_id: Uuid,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.entries
            .entry(category)
            .or_default()
            .entry(attachment_id)
            .or_default()
            .set(field, value);
    }

    pub fn get(&self, category: Category, attachment_id: Uuid) -> Option<&FieldPatch> {
        self.entries.get(&category)?.get(&attachment_id)
    }

    pub fn clear(&mut self, category: Category, attachment_id: Uuid) {
        if let Some(entries) = self.entries.get_mut(&category) {
            entries.remove(&attachment_id);
            if entries.is_empty() {
                self.entries.remove(&category);
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// All non-empty entries, cloned for flushing.
    pub fn pending(&self) -> Vec<(Category, Uuid, FieldPatch)> {
        self.entries
            .iter()
            .flat_map(|(category, entries)| {
                entries
                    .iter()
                    .filter(|(_, patch)| !patch.is_empty())
                    .map(|(attachment_id, patch)| (*category, *attachment_id, patch.clone()))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Removes an entry only if it still equals what was flushed, so an edit
    /// made while a save was in flight is never silently dropped.
    pub(crate) fn remove_if_unchanged(
        &mut self,
        category: Category,
        attachment_id: Uuid,
        flushed: &FieldPatch,
    ) {
        if let Some(entries) = self.entries.get_mut(&category) {
            if entries.get(&attachment_id) == Some(flushed) {
                entries.remove(&attachment_id);
            }
            if entries.is_empty() {
                self.entries.remove(&category);
            }
        }
    }

    /// Drops entries whose attachment no longer exists.
    pub(crate) fn retain(&mut self, keep: impl Fn(Category, Uuid) -> bool) {
        for (category, entries) in self.entries.iter_mut() {
            entries.retain(|attachment_id, _| keep(*category, *attachment_id));
        }
        self.entries.retain(|_, entries| !entries.is_empty());
    }
}

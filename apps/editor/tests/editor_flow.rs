//! End-to-end transition scenarios against a stateful in-memory store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use editor::editor::{CoreFlushResult, ResumeEditor, StatusKind, ToggleOutcome};
use editor::models::{
    AttachedItem, AttachmentSet, Category, ExperienceFields, FieldPatch, ItemFields,
    ResumeCoreFields, ResumeSnapshot, SourceItem, SourcePool,
};
use editor::store::{ApiError, AttachRequest, ResumeStore};
use editor::EditorError;

fn server_error(message: &str) -> ApiError {
    ApiError::Api {
        status: 500,
        message: message.to_string(),
    }
}

fn experience_source(title: &str) -> SourceItem {
    SourceItem {
        id: Uuid::new_v4(),
        fields: ItemFields::Experience(ExperienceFields {
            title: title.to_string(),
            organization: "Acme".to_string(),
            location: None,
            date_start: None,
            date_end: None,
            description: None,
        }),
        updated_at: Utc::now(),
    }
}

#[derive(Default)]
struct Remote {
    pool: SourcePool,
    attachments: AttachmentSet,
    core: ResumeCoreFields,
}

/// In-memory remote store that actually applies mutations, so reloads after
/// attach/update/create reflect server truth the way the real API would.
#[derive(Default)]
struct MockStore {
    remote: Mutex<Remote>,
    calls: Mutex<Vec<String>>,
    fail_update_for: Mutex<HashSet<Uuid>>,
    fail_attach: Mutex<bool>,
}

impl MockStore {
    fn with_experiences(titles: &[&str]) -> (Arc<Self>, Vec<Uuid>) {
        let sources: Vec<SourceItem> = titles.iter().map(|t| experience_source(t)).collect();
        let ids = sources.iter().map(|s| s.id).collect();
        let store = Self::default();
        store.remote.lock().unwrap().pool.experiences = sources;
        (Arc::new(store), ids)
    }

    fn log(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn fail_updates_for(&self, attachment_id: Uuid) {
        self.fail_update_for.lock().unwrap().insert(attachment_id);
    }

    fn heal_updates_for(&self, attachment_id: Uuid) {
        self.fail_update_for.lock().unwrap().remove(&attachment_id);
    }

    fn stored_title(&self, attachment_id: Uuid) -> Option<String> {
        let remote = self.remote.lock().unwrap();
        let item = remote.attachments.get(Category::Experience, attachment_id)?;
        match &item.fields {
            ItemFields::Experience(f) => Some(f.title.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl ResumeStore for MockStore {
    async fn get_source_pool(&self) -> Result<SourcePool, ApiError> {
        self.log("get_source_pool".to_string());
        Ok(self.remote.lock().unwrap().pool.clone())
    }

    async fn get_target(&self) -> Result<ResumeSnapshot, ApiError> {
        self.log("get_target".to_string());
        let remote = self.remote.lock().unwrap();
        Ok(ResumeSnapshot {
            attachments: remote.attachments.clone(),
            core: remote.core.clone(),
        })
    }

    async fn attach(
        &self,
        _category: Category,
        request: AttachRequest,
    ) -> Result<AttachedItem, ApiError> {
        self.log(format!("attach:{}", request.source_id));
        if *self.fail_attach.lock().unwrap() {
            return Err(server_error("attach failed"));
        }
        let item = AttachedItem {
            id: Uuid::new_v4(),
            source_ref: Some(request.source_id),
            fields: request.fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.remote.lock().unwrap().attachments.push(item.clone());
        Ok(item)
    }

    async fn detach(&self, category: Category, attachment_id: Uuid) -> Result<(), ApiError> {
        self.log(format!("detach:{attachment_id}"));
        self.remote
            .lock()
            .unwrap()
            .attachments
            .remove(category, attachment_id)
            .map(|_| ())
            .ok_or_else(|| server_error("no such attachment"))
    }

    async fn update(
        &self,
        category: Category,
        attachment_id: Uuid,
        patch: &FieldPatch,
    ) -> Result<AttachedItem, ApiError> {
        self.log(format!("update:{attachment_id}"));
        if self.fail_update_for.lock().unwrap().contains(&attachment_id) {
            return Err(server_error("update rejected"));
        }
        let mut remote = self.remote.lock().unwrap();
        let existing = remote
            .attachments
            .get(category, attachment_id)
            .cloned()
            .ok_or_else(|| server_error("no such attachment"))?;
        let merged = existing.merged_fields(Some(patch));
        let fields: ItemFields = serde_json::from_value(Value::Object(merged))?;
        remote.attachments.remove(category, attachment_id);
        let updated = AttachedItem {
            fields,
            updated_at: Utc::now(),
            ..existing
        };
        remote.attachments.push(updated.clone());
        Ok(updated)
    }

    async fn create_for_target(
        &self,
        category: Category,
        fields: &FieldPatch,
    ) -> Result<AttachedItem, ApiError> {
        self.log(format!("create:{category}"));
        let mut object = fields.0.clone();
        object.insert(
            "category".to_string(),
            Value::String(category.as_str().to_string()),
        );
        let item_fields: ItemFields = serde_json::from_value(Value::Object(object))?;
        let item = AttachedItem {
            id: Uuid::new_v4(),
            source_ref: None,
            fields: item_fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.remote.lock().unwrap().attachments.push(item.clone());
        Ok(item)
    }

    async fn update_core_fields(&self, patch: &FieldPatch) -> Result<ResumeCoreFields, ApiError> {
        self.log("update_core".to_string());
        let mut remote = self.remote.lock().unwrap();
        let mut object = match serde_json::to_value(&remote.core) {
            Ok(Value::Object(map)) => map,
            _ => Default::default(),
        };
        patch.merge_over(&mut object);
        remote.core = serde_json::from_value(Value::Object(object))?;
        Ok(remote.core.clone())
    }
}

async fn loaded_editor(store: Arc<MockStore>) -> ResumeEditor {
    let editor = ResumeEditor::new(store);
    editor.load().await.unwrap();
    editor
}

async fn attach(editor: &ResumeEditor, source_id: Uuid) -> AttachedItem {
    match editor.toggle(Category::Experience, source_id).await.unwrap() {
        ToggleOutcome::Attached(item) => item,
        other => panic!("expected attach, got {other:?}"),
    }
}

#[tokio::test]
async fn test_attach_then_detach_restores_selection() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store).await;

    let item = attach(&editor, ids[0]).await;
    assert!(editor.selected_sources(Category::Experience).contains(&ids[0]));

    let outcome = editor.toggle(Category::Experience, ids[0]).await.unwrap();
    assert!(matches!(outcome, ToggleOutcome::Detached { attachment_id } if attachment_id == item.id));
    assert!(editor.selected_sources(Category::Experience).is_empty());

    // No pending edit left behind and nothing attached.
    let snapshot = editor.snapshot();
    assert!(snapshot.buffer.is_empty());
    assert!(snapshot.attachments.items(Category::Experience).is_empty());
}

#[tokio::test]
async fn test_attach_failure_leaves_state_unchanged() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store.clone()).await;

    *store.fail_attach.lock().unwrap() = true;
    let result = editor.toggle(Category::Experience, ids[0]).await;

    assert!(matches!(result, Err(EditorError::Remote(_))));
    assert!(editor.selected_sources(Category::Experience).is_empty());
    assert!(editor.snapshot().attachments.items(Category::Experience).is_empty());
    assert_eq!(editor.last_report().unwrap().kind, StatusKind::Error);
}

#[tokio::test]
async fn test_buffered_edit_is_visible_before_save_and_flushed_once() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store.clone()).await;
    let item = attach(&editor, ids[0]).await;

    editor
        .set_field(Category::Experience, item.id, "title", "Senior Engineer")
        .unwrap();

    // Buffer-over-source: the edit is visible, the stored item is not.
    assert_eq!(
        editor.field_value(Category::Experience, item.id, "title"),
        Some(Value::String("Senior Engineer".to_string()))
    );
    assert_eq!(store.stored_title(item.id).unwrap(), "Engineer");

    let reloads_before = store.count_calls("get_target");
    let report = editor.save().await.unwrap();

    assert!(report.is_full_success());
    assert_eq!(store.count_calls(&format!("update:{}", item.id)), 1);
    assert_eq!(store.stored_title(item.id).unwrap(), "Senior Engineer");
    assert!(editor.snapshot().buffer.is_empty());
    assert_eq!(store.count_calls("get_target"), reloads_before + 1);

    let status = editor.last_report().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.text, "Resume saved");
}

#[tokio::test]
async fn test_detach_discards_pending_edits_and_save_skips_them() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store.clone()).await;
    let item = attach(&editor, ids[0]).await;

    editor
        .set_field(Category::Experience, item.id, "title", "Senior Engineer")
        .unwrap();
    editor.toggle(Category::Experience, ids[0]).await.unwrap();

    let report = editor.save().await.unwrap();
    assert!(report.item_results.is_empty());
    assert_eq!(store.count_calls("update:"), 0);
}

#[tokio::test]
async fn test_partial_save_retries_only_the_rejected_entry() {
    let (store, ids) = MockStore::with_experiences(&["Engineer", "Manager"]);
    let editor = loaded_editor(store.clone()).await;
    let first = attach(&editor, ids[0]).await;
    let second = attach(&editor, ids[1]).await;

    editor
        .set_field(Category::Experience, first.id, "title", "Staff Engineer")
        .unwrap();
    editor
        .set_field(Category::Experience, second.id, "title", "Director")
        .unwrap();
    store.fail_updates_for(second.id);

    let report = editor.save().await.unwrap();
    assert_eq!(report.items_succeeded(), 1);
    assert_eq!(report.items_failed(), 1);
    assert_eq!(editor.last_report().unwrap().kind, StatusKind::Error);

    // The accepted entry left the buffer; the rejected one is still pending.
    let snapshot = editor.snapshot();
    assert!(snapshot.buffer.get(Category::Experience, first.id).is_none());
    assert!(snapshot.buffer.get(Category::Experience, second.id).is_some());

    store.heal_updates_for(second.id);
    let report = editor.save().await.unwrap();
    assert!(report.is_full_success());
    assert_eq!(report.item_results.len(), 1);
    assert_eq!(report.item_results[0].attachment_id, second.id);
    assert_eq!(store.count_calls(&format!("update:{}", first.id)), 1);
    assert_eq!(store.count_calls(&format!("update:{}", second.id)), 2);
}

#[tokio::test]
async fn test_core_fields_flush_is_separate_and_independent() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store.clone()).await;
    let item = attach(&editor, ids[0]).await;

    // Item update fails, core update still goes through.
    editor
        .set_field(Category::Experience, item.id, "title", "Lead")
        .unwrap();
    store.fail_updates_for(item.id);
    editor.set_core_field("headline", "Systems engineer");

    let report = editor.save().await.unwrap();
    assert_eq!(report.items_failed(), 1);
    assert_eq!(report.core_result, CoreFlushResult::Saved);
    assert_eq!(store.count_calls("update_core"), 1);

    let snapshot = editor.snapshot();
    assert!(snapshot.core_buffer.is_empty());
    assert_eq!(snapshot.core.headline.as_deref(), Some("Systems engineer"));

    // Empty core buffer means no core call at all.
    store.heal_updates_for(item.id);
    let report = editor.save().await.unwrap();
    assert_eq!(report.core_result, CoreFlushResult::Skipped);
    assert_eq!(store.count_calls("update_core"), 1);
}

#[tokio::test]
async fn test_save_refreshes_even_when_every_update_fails() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store.clone()).await;
    let item = attach(&editor, ids[0]).await;

    editor
        .set_field(Category::Experience, item.id, "title", "Lead")
        .unwrap();
    store.fail_updates_for(item.id);

    let reloads_before = store.count_calls("get_target");
    let report = editor.save().await.unwrap();

    assert!(!report.is_full_success());
    assert_eq!(store.count_calls("get_target"), reloads_before + 1);
    // The failed entry survives the post-save refresh for retry.
    assert!(editor
        .snapshot()
        .buffer
        .get(Category::Experience, item.id)
        .is_some());
}

#[tokio::test]
async fn test_creation_validation_failure_makes_no_remote_call() {
    let (store, _) = MockStore::with_experiences(&[]);
    let editor = loaded_editor(store.clone()).await;

    editor.open_creation(Category::Experience);
    editor.set_creation_field(Category::Experience, "title", "Founder");
    // organization is required but missing

    let result = editor.submit_creation(Category::Experience).await;
    assert!(matches!(result, Err(EditorError::Validation(_))));
    assert_eq!(store.count_calls("create:"), 0);
    assert_eq!(editor.last_report().unwrap().kind, StatusKind::Error);

    // Form stays open with entered values intact.
    let snapshot = editor.snapshot();
    let draft = snapshot.creation.get(&Category::Experience).unwrap();
    assert!(draft.open);
    assert_eq!(draft.fields.get_str("title"), Some("Founder"));
}

#[tokio::test]
async fn test_creation_success_resets_form_and_reloads() {
    let (store, _) = MockStore::with_experiences(&[]);
    let editor = loaded_editor(store.clone()).await;

    editor.open_creation(Category::Experience);
    editor.set_creation_field(Category::Experience, "title", "Founder");
    editor.set_creation_field(Category::Experience, "organization", "Startup GmbH");

    let reloads_before = store.count_calls("get_target");
    let item = editor.submit_creation(Category::Experience).await.unwrap();
    assert!(item.source_ref.is_none());

    let snapshot = editor.snapshot();
    let draft = snapshot.creation.get(&Category::Experience).unwrap();
    assert!(!draft.open);
    assert!(draft.fields.is_empty());
    assert_eq!(store.count_calls("get_target"), reloads_before + 1);

    // The direct-created item arrived through the refresh, not a local insert.
    let items = snapshot.attachments.items(Category::Experience);
    assert_eq!(items.len(), 1);
    assert!(items[0].source_ref.is_none());
    assert_eq!(editor.last_report().unwrap().kind, StatusKind::Success);
}

#[tokio::test]
async fn test_remove_takes_a_direct_created_item_off_the_resume() {
    let (store, _) = MockStore::with_experiences(&[]);
    let editor = loaded_editor(store.clone()).await;

    let mut fields = FieldPatch::new();
    fields.set("title", "Founder");
    fields.set("organization", "Startup GmbH");
    let item = editor.create_direct(Category::Experience, fields).await.unwrap();

    editor
        .set_field(Category::Experience, item.id, "title", "CEO")
        .unwrap();
    editor.remove(Category::Experience, item.id).await.unwrap();

    let snapshot = editor.snapshot();
    assert!(snapshot.attachments.items(Category::Experience).is_empty());
    assert!(snapshot.buffer.is_empty());
    assert_eq!(store.count_calls(&format!("detach:{}", item.id)), 1);
}

#[tokio::test]
async fn test_set_field_for_unknown_attachment_is_rejected() {
    let (store, _) = MockStore::with_experiences(&[]);
    let editor = loaded_editor(store).await;

    let result = editor.set_field(Category::Experience, Uuid::new_v4(), "title", "Lead");
    assert!(matches!(result, Err(EditorError::NotFound(_))));
    assert!(editor.snapshot().buffer.is_empty());
}

#[tokio::test]
async fn test_explicit_reload_drops_unsaved_edits() {
    let (store, ids) = MockStore::with_experiences(&["Engineer"]);
    let editor = loaded_editor(store).await;
    let item = attach(&editor, ids[0]).await;

    editor
        .set_field(Category::Experience, item.id, "title", "Lead")
        .unwrap();
    editor.set_core_field("headline", "unsaved");

    let snapshot = editor.reload().await.unwrap();
    assert!(snapshot.buffer.is_empty());
    assert!(snapshot.core_buffer.is_empty());
    // The attachment itself survives: it was created remotely.
    assert_eq!(snapshot.attachments.items(Category::Experience).len(), 1);
}

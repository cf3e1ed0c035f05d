use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AttachedItem, Category, FieldPatch, ItemFields, ResumeCoreFields, ResumeSnapshot, SourcePool,
};

pub mod http;

pub use http::HttpResumeStore;

/// Remote store error. No automatic retry or backoff: every operation is
/// retryable by the user re-invoking it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Payload for attaching a source item: the source identity plus a full copy
/// of its fields taken at attach time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachRequest {
    pub source_id: Uuid,
    #[serde(flatten)]
    pub fields: ItemFields,
}

/// The remote persistence API for one resume and its owner's profile.
///
/// Marshalling only — no business logic. Carried by the editor as
/// `Arc<dyn ResumeStore>` so tests can substitute an in-memory store.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Profile-level items available for attachment.
    async fn get_source_pool(&self) -> Result<SourcePool, ApiError>;

    /// The resume's attached items per category plus its core fields.
    async fn get_target(&self) -> Result<ResumeSnapshot, ApiError>;

    /// Creates an attachment as a copy of a source item.
    async fn attach(
        &self,
        category: Category,
        request: AttachRequest,
    ) -> Result<AttachedItem, ApiError>;

    /// Removes an attachment by its own identity (not the source id).
    async fn detach(&self, category: Category, attachment_id: Uuid) -> Result<(), ApiError>;

    /// Applies a partial field update to an attachment.
    async fn update(
        &self,
        category: Category,
        attachment_id: Uuid,
        patch: &FieldPatch,
    ) -> Result<AttachedItem, ApiError>;

    /// Creates a new attachment directly under the resume, with no
    /// `source_ref`.
    async fn create_for_target(
        &self,
        category: Category,
        fields: &FieldPatch,
    ) -> Result<AttachedItem, ApiError>;

    /// Applies a partial update to the resume's core fields.
    async fn update_core_fields(&self, patch: &FieldPatch) -> Result<ResumeCoreFields, ApiError>;
}

//! Reload strategy — how the editor re-derives local state from the server.
//!
//! Default: `FullReload` re-fetches the entire source pool and resume after
//! any creating mutation rather than trusting the returned payload. Pluggable
//! so a cache-aware variant can replace full refetching without touching the
//! state machine's transition contracts.

use async_trait::async_trait;

use crate::models::{ResumeSnapshot, SourcePool};
use crate::store::{ApiError, ResumeStore};

#[async_trait]
pub trait ReloadStrategy: Send + Sync {
    async fn load(&self, store: &dyn ResumeStore)
        -> Result<(SourcePool, ResumeSnapshot), ApiError>;
}

/// Re-fetches pool and target together, in parallel.
pub struct FullReload;

#[async_trait]
impl ReloadStrategy for FullReload {
    async fn load(
        &self,
        store: &dyn ResumeStore,
    ) -> Result<(SourcePool, ResumeSnapshot), ApiError> {
        futures::try_join!(store.get_source_pool(), store.get_target())
    }
}

use futures::future::join_all;
use uuid::Uuid;

use crate::editor::status::StatusKind;
use crate::models::{AttachedItem, Category, FieldPatch};
use crate::store::{ApiError, ResumeStore};

/// Outcome of one per-item flush call, with the patch that was sent so the
/// buffer can be cleared only when the entry is unchanged.
pub(crate) struct FlushOutcome {
    pub category: Category,
    pub attachment_id: Uuid,
    pub patch: FieldPatch,
    pub result: Result<AttachedItem, ApiError>,
}

/// Issues one update per pending entry, all concurrently. No ordering between
/// categories or between items; each result is Ok or Err independently and
/// failures do not cancel siblings.
pub(crate) async fn flush_pending(
    store: &dyn ResumeStore,
    pending: Vec<(Category, Uuid, FieldPatch)>,
) -> Vec<FlushOutcome> {
    let calls = pending
        .into_iter()
        .map(|(category, attachment_id, patch)| async move {
            let result = store.update(category, attachment_id, &patch).await;
            FlushOutcome {
                category,
                attachment_id,
                patch,
                result,
            }
        });
    join_all(calls).await
}

#[derive(Debug, Clone)]
pub struct ItemSaveResult {
    pub category: Category,
    pub attachment_id: Uuid,
    /// `None` on success; the remote error text otherwise.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoreFlushResult {
    /// Core buffer was empty; no call was issued.
    Skipped,
    Saved,
    Failed(String),
}

/// Aggregate outcome of one save cycle. A save can leave some items updated
/// and others not; the report captures each independently.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub item_results: Vec<ItemSaveResult>,
    pub core_result: CoreFlushResult,
    /// Error text if the post-save refresh failed.
    pub refresh_error: Option<String>,
}

impl SaveReport {
    pub fn items_succeeded(&self) -> usize {
        self.item_results.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn items_failed(&self) -> usize {
        self.item_results.len() - self.items_succeeded()
    }

    pub fn is_full_success(&self) -> bool {
        self.items_failed() == 0
            && !matches!(self.core_result, CoreFlushResult::Failed(_))
            && self.refresh_error.is_none()
    }

    /// The single aggregate message shown in the status slot.
    pub fn summary(&self) -> (StatusKind, String) {
        let mut problems = Vec::new();
        let failed = self.items_failed();
        if failed > 0 {
            problems.push(format!(
                "{failed} of {} item update(s) failed",
                self.item_results.len()
            ));
        }
        if let CoreFlushResult::Failed(error) = &self.core_result {
            problems.push(format!("core fields not saved: {error}"));
        }
        if let Some(error) = &self.refresh_error {
            problems.push(format!("refresh failed: {error}"));
        }

        if problems.is_empty() {
            (StatusKind::Success, "Resume saved".to_string())
        } else {
            (
                StatusKind::Error,
                format!("Save finished with problems: {}", problems.join("; ")),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_result(error: Option<&str>) -> ItemSaveResult {
        ItemSaveResult {
            category: Category::Experience,
            attachment_id: Uuid::new_v4(),
            error: error.map(String::from),
        }
    }

    #[test]
    fn test_full_success_summary() {
        let report = SaveReport {
            item_results: vec![item_result(None), item_result(None)],
            core_result: CoreFlushResult::Skipped,
            refresh_error: None,
        };
        assert!(report.is_full_success());
        assert_eq!(report.summary().0, StatusKind::Success);
    }

    #[test]
    fn test_partial_failure_summary_names_each_problem() {
        let report = SaveReport {
            item_results: vec![item_result(None), item_result(Some("boom"))],
            core_result: CoreFlushResult::Failed("timeout".to_string()),
            refresh_error: None,
        };
        assert!(!report.is_full_success());
        let (kind, text) = report.summary();
        assert_eq!(kind, StatusKind::Error);
        assert!(text.contains("1 of 2 item update(s) failed"));
        assert!(text.contains("core fields not saved"));
    }
}

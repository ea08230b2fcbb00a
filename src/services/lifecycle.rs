//! Pull request lifecycle: lookups and the OPEN -> MERGED transition.

use std::sync::Arc;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestStatus};
use crate::services::now;

/// Reject reviewer changes on a pull request that can no longer change.
pub fn ensure_reviewers_mutable(pr: &PullRequest) -> Result<(), AppError> {
    if pr.is_merged() {
        return Err(AppError::PullRequestMerged {
            pr_id: pr.pull_request_id.clone(),
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct LifecycleController {
    store: Arc<dyn DirectoryStore>,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Get a pull request or fail with `PullRequestNotFound`.
    pub async fn find_pull_request(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        self.store
            .find_pull_request_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::PullRequestNotFound {
                pr_id: pr_id.to_string(),
            })
    }

    /// Merge a pull request.
    ///
    /// Merging an already merged PR is a no-op that returns the stored
    /// record unchanged; nothing is written.
    pub async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        let mut pr = self.find_pull_request(pr_id).await?;

        if !pr.status.can_transition_to(PullRequestStatus::Merged) {
            log::debug!("[lifecycle] PR {} already merged", pr_id);
            return Ok(pr);
        }

        pr.status = PullRequestStatus::Merged;
        pr.merged_at = Some(now());

        if let Err(e) = self.store.update_pull_request(&pr).await {
            log::error!("[lifecycle] merge update failed pr_id={}: {}", pr_id, e);
            return Err(e);
        }

        log::info!(
            "[lifecycle] PR merged pr_id={} merged_at={:?}",
            pr_id,
            pr.merged_at
        );
        Ok(pr)
    }

    /// Every pull request on which `user_id` is a reviewer, newest first.
    pub async fn find_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, AppError> {
        self.store.find_pull_requests_by_reviewer(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{put_open_pr, store_with_team};

    #[tokio::test]
    async fn test_merge_sets_status_and_timestamp() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        put_open_pr(&store, "p1", "a", &["b"]).await;
        let lifecycle = LifecycleController::new(store.clone());

        let merged = lifecycle.merge_pull_request("p1").await.unwrap();
        assert_eq!(merged.status, PullRequestStatus::Merged);
        assert!(merged.merged_at.is_some());
        assert_eq!(merged.assigned_reviewers, vec!["b"]);

        let stored = store.find_pull_request_by_id("p1").await.unwrap().unwrap();
        assert_eq!(stored, merged);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        put_open_pr(&store, "p1", "a", &["b"]).await;
        let lifecycle = LifecycleController::new(store.clone());

        let first = lifecycle.merge_pull_request("p1").await.unwrap();
        let second = lifecycle.merge_pull_request("p1").await.unwrap();

        assert_eq!(second.status, PullRequestStatus::Merged);
        assert_eq!(first.merged_at, second.merged_at);
        // Only the first merge wrote.
        assert_eq!(*store.pr_updates.lock().unwrap(), vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn test_merge_unknown_pr() {
        let store = store_with_team("core", &[("a", true)]).await;
        let lifecycle = LifecycleController::new(store);

        let err = lifecycle.merge_pull_request("nope").await.unwrap_err();
        assert!(matches!(err, AppError::PullRequestNotFound { pr_id } if pr_id == "nope"));
    }

    #[tokio::test]
    async fn test_merge_storage_failure_surfaces() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        put_open_pr(&store, "p1", "a", &["b"]).await;
        store.fail_update_pr.lock().unwrap().insert("p1".into());
        let lifecycle = LifecycleController::new(store.clone());

        let err = lifecycle.merge_pull_request("p1").await.unwrap_err();
        assert!(matches!(err, AppError::Database { .. }));

        let stored = store.find_pull_request_by_id("p1").await.unwrap().unwrap();
        assert!(stored.is_open());
        assert!(stored.merged_at.is_none());
    }

    #[test]
    fn test_ensure_reviewers_mutable() {
        let mut pr = PullRequest {
            pull_request_id: "p1".into(),
            pull_request_name: "x".into(),
            author_id: "a".into(),
            status: PullRequestStatus::Open,
            assigned_reviewers: vec![],
            created_at: now(),
            merged_at: None,
        };
        assert!(ensure_reviewers_mutable(&pr).is_ok());

        pr.status = PullRequestStatus::Merged;
        assert!(matches!(
            ensure_reviewers_mutable(&pr),
            Err(AppError::PullRequestMerged { .. })
        ));
    }
}

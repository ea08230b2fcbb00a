//! Reviewer assignment for new pull requests.

use std::sync::Arc;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::{NewPullRequest, PullRequest, PullRequestStatus, TeamMember};
use crate::services::membership::MembershipResolver;
use crate::services::now;
use crate::services::random::{sample_indices, RandomSource};

/// Upper bound on reviewers per pull request, whatever the caller asks for.
pub const MAX_REVIEWERS: usize = 2;

/// Choose up to `want` reviewers (never more than [`MAX_REVIEWERS`]) uniformly
/// at random from `candidates`.
///
/// An empty candidate list or `want == 0` yields an empty result. The order
/// of the returned ids carries no meaning.
pub fn select_reviewers(
    random: &dyn RandomSource,
    candidates: &[TeamMember],
    want: usize,
) -> Result<Vec<String>, AppError> {
    if candidates.is_empty() || want == 0 {
        return Ok(Vec::new());
    }

    let count = want.min(MAX_REVIEWERS).min(candidates.len());
    let picked = sample_indices(random, candidates.len(), count)?;

    Ok(picked
        .into_iter()
        .map(|i| candidates[i].user_id.clone())
        .collect())
}

/// Creates pull requests with an initial reviewer set drawn from the author's
/// active teammates.
#[derive(Clone)]
pub struct AssignmentEngine {
    store: Arc<dyn DirectoryStore>,
    membership: MembershipResolver,
    random: Arc<dyn RandomSource>,
}

impl AssignmentEngine {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        membership: MembershipResolver,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            store,
            membership,
            random,
        }
    }

    /// Create a pull request and assign up to two reviewers.
    ///
    /// The new PR is always `OPEN` with `created_at` set to now. Fails with
    /// `PullRequestExists` if the id is taken, with the membership errors
    /// (`AuthorNotFound`, `AuthorHasNoTeam`), or with a storage error, in
    /// which case nothing was created.
    pub async fn create_pull_request(&self, new_pr: NewPullRequest) -> Result<PullRequest, AppError> {
        if new_pr.pull_request_id.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "pull_request_id must not be empty",
                "pull_request_id",
            ));
        }
        if new_pr.author_id.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "author_id must not be empty",
                "author_id",
            ));
        }

        if self
            .store
            .find_pull_request_by_id(&new_pr.pull_request_id)
            .await?
            .is_some()
        {
            return Err(AppError::PullRequestExists {
                pr_id: new_pr.pull_request_id,
            });
        }

        let teammates = self.membership.active_teammates(&new_pr.author_id).await?;
        let reviewers = select_reviewers(self.random.as_ref(), &teammates, MAX_REVIEWERS)?;

        let pr = PullRequest {
            pull_request_id: new_pr.pull_request_id,
            pull_request_name: new_pr.pull_request_name,
            author_id: new_pr.author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            created_at: now(),
            merged_at: None,
        };

        if let Err(e) = self.store.create_pull_request(&pr).await {
            log::error!(
                "[assignment] create failed pr_id={} author={}: {}",
                pr.pull_request_id,
                pr.author_id,
                e
            );
            return Err(e);
        }

        log::info!(
            "[assignment] PR created pr_id={} author={} reviewers={:?}",
            pr.pull_request_id,
            pr.author_id,
            pr.assigned_reviewers
        );
        Ok(pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::random::OsRandom;
    use crate::services::test_support::{store_with_team, FailingRandom, ScriptedRandom};
    use std::collections::HashSet;

    fn members(ids: &[&str]) -> Vec<TeamMember> {
        ids.iter()
            .map(|id| TeamMember {
                user_id: id.to_string(),
                username: id.to_uppercase(),
                is_active: true,
            })
            .collect()
    }

    fn new_pr(id: &str, author: &str) -> NewPullRequest {
        NewPullRequest {
            pull_request_id: id.into(),
            pull_request_name: format!("PR {}", id),
            author_id: author.into(),
        }
    }

    fn engine(store: Arc<dyn DirectoryStore>, random: Arc<dyn RandomSource>) -> AssignmentEngine {
        AssignmentEngine::new(store.clone(), MembershipResolver::new(store), random)
    }

    #[test]
    fn test_select_reviewers_sizes() {
        let cases: Vec<(Vec<&str>, usize, usize)> = vec![
            (vec![], 2, 0),
            (vec!["u1"], 2, 1),
            (vec!["a", "b", "c"], 2, 2),
            (vec!["a", "b", "c"], 5, 2),
            (vec!["a", "b", "c"], 1, 1),
            (vec!["a", "b", "c"], 0, 0),
        ];

        for (ids, want, expected) in cases {
            let got = select_reviewers(&OsRandom, &members(&ids), want).unwrap();
            assert_eq!(got.len(), expected, "candidates={:?} want={}", ids, want);
            let unique: HashSet<&String> = got.iter().collect();
            assert_eq!(unique.len(), got.len());
            assert!(got.iter().all(|g| ids.contains(&g.as_str())));
        }
    }

    #[test]
    fn test_select_reviewers_surfaces_random_failure() {
        let err = select_reviewers(&FailingRandom, &members(&["a", "b"]), 2).unwrap_err();
        assert!(matches!(err, AppError::RandomSource { .. }));
    }

    #[tokio::test]
    async fn test_create_assigns_two_active_teammates() {
        let store = store_with_team("core", &[("a", true), ("b", true), ("c", true), ("d", false)]).await;
        let assigner = engine(store.clone(), Arc::new(OsRandom));

        for i in 0..20 {
            let pr = assigner
                .create_pull_request(new_pr(&format!("p{}", i), "a"))
                .await
                .unwrap();
            assert_eq!(pr.status, PullRequestStatus::Open);
            assert!(pr.merged_at.is_none());

            let set: HashSet<&str> = pr.assigned_reviewers.iter().map(String::as_str).collect();
            assert_eq!(set, HashSet::from(["b", "c"]));
        }

        let stored = store.find_pull_request_by_id("p0").await.unwrap().unwrap();
        assert_eq!(stored.assigned_reviewers.len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_single_teammate() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        let assigner = engine(store, Arc::new(ScriptedRandom::new(vec![])));

        let pr = assigner.create_pull_request(new_pr("p1", "a")).await.unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b"]);
    }

    #[tokio::test]
    async fn test_create_with_no_teammates_has_no_reviewers() {
        let store = store_with_team("core", &[("a", true), ("b", false)]).await;
        let assigner = engine(store, Arc::new(OsRandom));

        let pr = assigner.create_pull_request(new_pr("p1", "a")).await.unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        let assigner = engine(store, Arc::new(OsRandom));

        assigner.create_pull_request(new_pr("p1", "a")).await.unwrap();
        let err = assigner.create_pull_request(new_pr("p1", "b")).await.unwrap_err();
        assert!(matches!(err, AppError::PullRequestExists { .. }));
    }

    #[tokio::test]
    async fn test_create_propagates_membership_errors() {
        let store = store_with_team("core", &[("a", true)]).await;
        let assigner = engine(store.clone(), Arc::new(OsRandom));

        let err = assigner.create_pull_request(new_pr("p1", "ghost")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorNotFound { .. }));
        assert!(store.find_pull_request_by_id("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_storage_failure_creates_nothing() {
        let store = store_with_team("core", &[("a", true), ("b", true)]).await;
        *store.fail_create_pr.lock().unwrap() = true;
        let assigner = engine(store.clone(), Arc::new(OsRandom));

        let err = assigner.create_pull_request(new_pr("p1", "a")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Database { ref operation, .. } if operation.as_deref() == Some("create_pull_request")
        ));
        assert!(store.find_pull_request_by_id("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_ids() {
        let store = store_with_team("core", &[("a", true)]).await;
        let assigner = engine(store, Arc::new(OsRandom));

        let err = assigner.create_pull_request(new_pr("  ", "a")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}

//! Test doubles for the engine: scripted randomness and a fault-injecting store.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::db::{DirectoryStore, InMemoryStore};
use crate::error::AppError;
use crate::models::{PullRequest, Team, TeamMember, User};
use crate::services::random::RandomSource;

/// Returns scripted draws (reduced modulo `n`), then zeros.
pub struct ScriptedRandom {
    draws: Mutex<VecDeque<usize>>,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<usize>) -> Self {
        Self {
            draws: Mutex::new(draws.into()),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&self, n: usize) -> Result<usize, AppError> {
        let next = self.draws.lock().unwrap().pop_front().unwrap_or(0);
        Ok(next % n)
    }
}

/// An entropy source that always fails.
pub struct FailingRandom;

impl RandomSource for FailingRandom {
    fn index(&self, _n: usize) -> Result<usize, AppError> {
        Err(AppError::random_source("entropy source unavailable"))
    }
}

/// Wraps an `InMemoryStore` and fails selected operations.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    pub fail_deactivate: Mutex<HashSet<String>>,
    pub fail_list_by_reviewer: Mutex<HashSet<String>>,
    pub fail_update_pr: Mutex<HashSet<String>>,
    pub fail_create_pr: Mutex<bool>,
    pub fail_list_prs: Mutex<bool>,
    /// Every successful `update_pull_request`, in order.
    pub pr_updates: Mutex<Vec<String>>,
}

impl FlakyStore {
    fn injected(operation: &str, id: &str) -> AppError {
        AppError::storage(operation, id, "injected failure")
    }
}

#[async_trait]
impl DirectoryStore for FlakyStore {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.inner.find_user_by_id(user_id).await
    }

    async fn update_user_active(&self, user_id: &str, is_active: bool) -> Result<(), AppError> {
        if self.fail_deactivate.lock().unwrap().contains(user_id) {
            return Err(Self::injected("update_user_active", user_id));
        }
        self.inner.update_user_active(user_id, is_active).await
    }

    async fn list_all_users(&self) -> Result<Vec<User>, AppError> {
        self.inner.list_all_users().await
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, AppError> {
        self.inner.team_exists(team_name).await
    }

    async fn find_team_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError> {
        self.inner.find_team_by_name(team_name).await
    }

    async fn find_team_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError> {
        self.inner.find_team_members(team_name).await
    }

    async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        self.inner.create_team(team).await
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        if *self.fail_create_pr.lock().unwrap() {
            return Err(Self::injected("create_pull_request", &pr.pull_request_id));
        }
        self.inner.create_pull_request(pr).await
    }

    async fn find_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        self.inner.find_pull_request_by_id(pr_id).await
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        if self.fail_update_pr.lock().unwrap().contains(&pr.pull_request_id) {
            return Err(Self::injected("update_pull_request", &pr.pull_request_id));
        }
        self.inner.update_pull_request(pr).await?;
        self.pr_updates
            .lock()
            .unwrap()
            .push(pr.pull_request_id.clone());
        Ok(())
    }

    async fn find_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, AppError> {
        if self.fail_list_by_reviewer.lock().unwrap().contains(user_id) {
            return Err(Self::injected("find_pull_requests_by_reviewer", user_id));
        }
        self.inner.find_pull_requests_by_reviewer(user_id).await
    }

    async fn list_all_pull_requests(&self) -> Result<Vec<PullRequest>, AppError> {
        if *self.fail_list_prs.lock().unwrap() {
            return Err(AppError::storage_op("list_all_pull_requests", "injected failure"));
        }
        self.inner.list_all_pull_requests().await
    }
}

/// Build a flaky store holding one team; `members` are `(user_id, is_active)`.
pub async fn store_with_team(team_name: &str, members: &[(&str, bool)]) -> Arc<FlakyStore> {
    let store = Arc::new(FlakyStore::default());
    store
        .create_team(&Team {
            team_name: team_name.to_string(),
            members: members
                .iter()
                .map(|(id, active)| TeamMember {
                    user_id: id.to_string(),
                    username: id.to_uppercase(),
                    is_active: *active,
                })
                .collect(),
        })
        .await
        .unwrap();
    store
}

/// Insert an open pull request directly, bypassing assignment.
pub async fn put_open_pr(store: &FlakyStore, pr_id: &str, author: &str, reviewers: &[&str]) {
    store
        .inner
        .create_pull_request(&PullRequest {
            pull_request_id: pr_id.to_string(),
            pull_request_name: format!("PR {}", pr_id),
            author_id: author.to_string(),
            status: crate::models::PullRequestStatus::Open,
            assigned_reviewers: reviewers.iter().map(|r| r.to_string()).collect(),
            created_at: crate::services::now(),
            merged_at: None,
        })
        .await
        .unwrap();
}

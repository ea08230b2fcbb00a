//! In-memory implementation of `DirectoryStore`.
//!
//! All state lives in maps behind a single `RwLock` and is lost on restart.
//! Each trait call takes the lock once, so every write is atomic with
//! respect to other calls.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::DirectoryStore;
use crate::error::AppError;
use crate::models::{PullRequest, Team, TeamMember, User};

#[derive(Default)]
struct Directory {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    pull_requests: BTreeMap<String, PullRequest>,
}

impl Directory {
    fn members_of(&self, team_name: &str) -> Vec<TeamMember> {
        self.users
            .values()
            .filter(|u| u.team_name.as_deref() == Some(team_name))
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect()
    }

    /// Pull requests matching `filter`, newest first.
    fn pull_requests_where(&self, filter: impl Fn(&PullRequest) -> bool) -> Vec<PullRequest> {
        let mut prs: Vec<PullRequest> = self
            .pull_requests
            .values()
            .filter(|pr| filter(*pr))
            .cloned()
            .collect();
        prs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        prs
    }
}

/// In-memory directory store.
pub struct InMemoryStore {
    inner: RwLock<Directory>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Directory::default()),
        }
    }

    /// Insert or replace a user directly, bypassing team creation.
    ///
    /// Lets callers seed users with no team or with a team that was never
    /// registered.
    pub async fn put_user(&self, user: User) {
        let mut dir = self.inner.write().await;
        dir.users.insert(user.user_id.clone(), user);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.users.get(user_id).cloned())
    }

    async fn update_user_active(&self, user_id: &str, is_active: bool) -> Result<(), AppError> {
        let mut dir = self.inner.write().await;
        match dir.users.get_mut(user_id) {
            Some(user) => {
                user.is_active = is_active;
                Ok(())
            }
            None => Err(AppError::UserNotFound {
                user_id: user_id.to_string(),
            }),
        }
    }

    async fn list_all_users(&self) -> Result<Vec<User>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.users.values().cloned().collect())
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.teams.contains(team_name))
    }

    async fn find_team_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError> {
        let dir = self.inner.read().await;
        if !dir.teams.contains(team_name) {
            return Ok(None);
        }
        Ok(Some(Team {
            team_name: team_name.to_string(),
            members: dir.members_of(team_name),
        }))
    }

    async fn find_team_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.members_of(team_name))
    }

    async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        let mut dir = self.inner.write().await;
        if !dir.teams.insert(team.team_name.clone()) {
            return Err(AppError::storage(
                "create_team",
                &team.team_name,
                "UNIQUE constraint failed: teams.team_name",
            ));
        }
        for member in &team.members {
            dir.users.insert(
                member.user_id.clone(),
                User {
                    user_id: member.user_id.clone(),
                    username: member.username.clone(),
                    team_name: Some(team.team_name.clone()),
                    is_active: member.is_active,
                },
            );
        }
        Ok(())
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        let mut dir = self.inner.write().await;
        if dir.pull_requests.contains_key(&pr.pull_request_id) {
            return Err(AppError::storage(
                "create_pull_request",
                &pr.pull_request_id,
                "UNIQUE constraint failed: pull_requests.pull_request_id",
            ));
        }
        dir.pull_requests
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn find_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.pull_requests.get(pr_id).cloned())
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        let mut dir = self.inner.write().await;
        match dir.pull_requests.get_mut(&pr.pull_request_id) {
            Some(stored) => {
                stored.status = pr.status;
                stored.merged_at = pr.merged_at;
                stored.assigned_reviewers = pr.assigned_reviewers.clone();
                Ok(())
            }
            None => Err(AppError::PullRequestNotFound {
                pr_id: pr.pull_request_id.clone(),
            }),
        }
    }

    async fn find_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.pull_requests_where(|pr| pr.has_reviewer(user_id)))
    }

    async fn list_all_pull_requests(&self) -> Result<Vec<PullRequest>, AppError> {
        let dir = self.inner.read().await;
        Ok(dir.pull_requests_where(|_| true))
    }
}

//! Directory store abstraction.
//!
//! The `DirectoryStore` trait is the only way the engine touches durable
//! state. Implementations serialize each multi-statement write (for example
//! replacing a pull request's reviewer set) as a single transaction; the
//! engine itself holds no locks.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{PullRequest, Team, TeamMember, User};

/// Storage surface for users, teams and pull requests.
///
/// Lookups of a single entity return `Ok(None)` when it is absent; `Err` is
/// reserved for storage failures.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError>;

    /// Set a user's active flag. Fails with `UserNotFound` if no row changed.
    async fn update_user_active(&self, user_id: &str, is_active: bool) -> Result<(), AppError>;

    async fn list_all_users(&self) -> Result<Vec<User>, AppError>;

    async fn team_exists(&self, team_name: &str) -> Result<bool, AppError>;

    /// Get a team with all of its members ordered by user id.
    async fn find_team_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError>;

    /// All members of a team, active or not, ordered by user id.
    async fn find_team_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError>;

    /// Members of a team with `is_active = true`.
    async fn find_active_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError> {
        let members = self.find_team_members(team_name).await?;
        Ok(members.into_iter().filter(|m| m.is_active).collect())
    }

    /// Create a team and upsert each listed member as a user of that team.
    async fn create_team(&self, team: &Team) -> Result<(), AppError>;

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError>;

    async fn find_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError>;

    /// Replace status, merge timestamp and the full reviewer set atomically.
    async fn update_pull_request(&self, pr: &PullRequest) -> Result<(), AppError>;

    /// Pull requests where `user_id` is a reviewer, newest first.
    async fn find_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, AppError>;

    /// Every pull request, newest first.
    async fn list_all_pull_requests(&self) -> Result<Vec<PullRequest>, AppError>;
}

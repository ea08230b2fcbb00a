//! Membership resolution: who can review for a given user.

use std::sync::Arc;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::TeamMember;

/// Resolves a user's team and the teammates currently eligible to review.
#[derive(Clone)]
pub struct MembershipResolver {
    store: Arc<dyn DirectoryStore>,
}

impl MembershipResolver {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Active members of `user_id`'s team, excluding `user_id` itself.
    ///
    /// Fails with `AuthorNotFound` if the user is unknown and with
    /// `AuthorHasNoTeam` if the user's team is empty. No ordering is
    /// guaranteed.
    pub async fn active_teammates(&self, user_id: &str) -> Result<Vec<TeamMember>, AppError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::AuthorNotFound {
                author_id: user_id.to_string(),
            })?;

        let team_name = user.team().ok_or_else(|| AppError::AuthorHasNoTeam {
            author_id: user_id.to_string(),
        })?;

        let members = self.store.find_active_members(team_name).await?;

        Ok(members
            .into_iter()
            .filter(|m| m.user_id != user_id)
            .collect())
    }
}

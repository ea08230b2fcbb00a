//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A person who can author pull requests and review them.
///
/// Team membership lives on the user: `team_name` is `None` for users that
/// belong to no team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Team the user belongs to, if any.
    pub team_name: Option<String>,

    /// Whether the user is eligible for reviewer duty.
    pub is_active: bool,
}

impl User {
    /// The team name, treating an empty string the same as no team.
    pub fn team(&self) -> Option<&str> {
        self.team_name.as_deref().filter(|t| !t.is_empty())
    }

    /// Check whether this user is an active member of `team_name`.
    pub fn is_active_in(&self, team_name: &str) -> bool {
        self.is_active && self.team() == Some(team_name)
    }
}

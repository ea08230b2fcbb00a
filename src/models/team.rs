//! Team and team member models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A member entry inside a team view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// A team: its name plus the users whose `team_name` points at it.
///
/// Members are not stored on the team; they are resolved from users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique, human-readable team key.
    pub team_name: String,

    /// Members ordered by user id.
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl Team {
    /// A lookup that resolved to an empty name counts as "not found".
    pub fn is_resolved(&self) -> bool {
        !self.team_name.is_empty()
    }
}

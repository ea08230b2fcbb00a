//! Team registration and lookup.

use std::collections::HashSet;
use std::sync::Arc;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::Team;

#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn DirectoryStore>,
}

impl TeamService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Register a team and upsert its members as users of that team.
    ///
    /// Members that already exist move to the new team and take the listed
    /// name and active flag.
    pub async fn add_team(&self, team: Team) -> Result<Team, AppError> {
        if team.team_name.trim().is_empty() {
            return Err(AppError::invalid_input_field(
                "team_name must not be empty",
                "team_name",
            ));
        }

        let mut seen = HashSet::new();
        for member in &team.members {
            if member.user_id.trim().is_empty() {
                return Err(AppError::invalid_input_field(
                    "member user_id must not be empty",
                    "members",
                ));
            }
            if !seen.insert(member.user_id.as_str()) {
                return Err(AppError::invalid_input_field(
                    format!("duplicate member: {}", member.user_id),
                    "members",
                ));
            }
        }

        if self.store.team_exists(&team.team_name).await? {
            return Err(AppError::TeamExists {
                team_name: team.team_name,
            });
        }

        if let Err(e) = self.store.create_team(&team).await {
            log::error!("[team] create failed team_name={}: {}", team.team_name, e);
            return Err(e);
        }

        log::info!(
            "[team] created team_name={} members={}",
            team.team_name,
            team.members.len()
        );
        self.get_team_by_name(&team.team_name).await
    }

    /// Get a team with its members, or `TeamNotFound`.
    pub async fn get_team_by_name(&self, team_name: &str) -> Result<Team, AppError> {
        self.store
            .find_team_by_name(team_name)
            .await?
            .filter(Team::is_resolved)
            .ok_or_else(|| AppError::TeamNotFound {
                team_name: team_name.to_string(),
            })
    }
}

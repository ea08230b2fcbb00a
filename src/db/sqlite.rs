//! SQLite implementation of `DirectoryStore`.
//!
//! Timestamps are stored as Unix milliseconds. Reviewer sets live in
//! `pr_reviewers` with a `position` column so assignment order survives a
//! round trip.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::pool::DbPool;
use super::store::DirectoryStore;
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestStatus, Team, TeamMember, User};

const SELECT_PR_COLUMNS: &str = "SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at FROM pull_requests";

/// Raw `pull_requests` row before reviewers are attached.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: i64,
    merged_at: Option<i64>,
}

#[derive(Debug, FromRow)]
struct ReviewerRow {
    pull_request_id: String,
    user_id: String,
}

fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

impl PullRequestRow {
    fn into_model(self, assigned_reviewers: Vec<String>) -> PullRequest {
        PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: PullRequestStatus::from(self.status.as_str()),
            assigned_reviewers,
            created_at: from_millis(self.created_at),
            merged_at: self.merged_at.map(from_millis),
        }
    }
}

/// Join PR rows with their reviewers; reviewer rows must be ordered by position.
fn attach_reviewers(rows: Vec<PullRequestRow>, reviewers: Vec<ReviewerRow>) -> Vec<PullRequest> {
    let mut by_pr: HashMap<String, Vec<String>> = HashMap::new();
    for r in reviewers {
        by_pr.entry(r.pull_request_id).or_default().push(r.user_id);
    }

    rows.into_iter()
        .map(|row| {
            let reviewers = by_pr.remove(&row.pull_request_id).unwrap_or_default();
            row.into_model(reviewers)
        })
        .collect()
}

/// Directory store backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert the reviewer set for a PR inside an open transaction.
    async fn insert_reviewers(
        tx: &mut sqlx::SqliteConnection,
        pr: &PullRequest,
    ) -> Result<(), sqlx::Error> {
        for (position, reviewer) in pr.assigned_reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pr_reviewers (pull_request_id, user_id, position) VALUES (?, ?, ?)",
            )
            .bind(&pr.pull_request_id)
            .bind(reviewer)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::storage("find_user_by_id", user_id, e))
    }

    async fn update_user_active(&self, user_id: &str, is_active: bool) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!("[store] update_user_active failed user={}: {}", user_id, e);
                AppError::storage("update_user_active", user_id, e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }

        log::debug!("[store] user {} is_active={}", user_id, is_active);
        Ok(())
    }

    async fn list_all_users(&self) -> Result<Vec<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, username, team_name, is_active FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage_op("list_all_users", e))
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, AppError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?)")
                .bind(team_name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::storage("team_exists", team_name, e))?;
        Ok(exists.0)
    }

    async fn find_team_by_name(&self, team_name: &str) -> Result<Option<Team>, AppError> {
        if !self.team_exists(team_name).await? {
            return Ok(None);
        }

        let members = self.find_team_members(team_name).await?;
        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    async fn find_team_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError> {
        sqlx::query_as::<_, TeamMember>(
            "SELECT user_id, username, is_active FROM users WHERE team_name = ? ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("find_team_members", team_name, e))
    }

    async fn find_active_members(&self, team_name: &str) -> Result<Vec<TeamMember>, AppError> {
        sqlx::query_as::<_, TeamMember>(
            "SELECT user_id, username, is_active FROM users WHERE team_name = ? AND is_active = 1 ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::storage("find_active_members", team_name, e))
    }

    async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        let op = |e: sqlx::Error| {
            log::error!("[store] create_team failed team={}: {}", team.team_name, e);
            AppError::storage("create_team", &team.team_name, e)
        };

        let mut tx = self.pool.begin().await.map_err(op)?;

        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(&team.team_name)
            .execute(&mut *tx)
            .await
            .map_err(op)?;

        for member in &team.members {
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, team_name, is_active)
                VALUES (?, ?, ?, ?)
                ON CONFLICT (user_id) DO UPDATE SET
                    username = excluded.username,
                    team_name = excluded.team_name,
                    is_active = excluded.is_active
                "#,
            )
            .bind(&member.user_id)
            .bind(&member.username)
            .bind(&team.team_name)
            .bind(member.is_active)
            .execute(&mut *tx)
            .await
            .map_err(op)?;
        }

        tx.commit().await.map_err(op)?;
        Ok(())
    }

    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        let op = |e: sqlx::Error| {
            log::error!(
                "[store] create_pull_request failed pr={}: {}",
                pr.pull_request_id,
                e
            );
            AppError::storage("create_pull_request", &pr.pull_request_id, e)
        };

        let mut tx = self.pool.begin().await.map_err(op)?;

        sqlx::query(
            r#"
            INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(to_millis(&pr.created_at))
        .bind(pr.merged_at.as_ref().map(to_millis))
        .execute(&mut *tx)
        .await
        .map_err(op)?;

        Self::insert_reviewers(&mut *tx, pr).await.map_err(op)?;

        tx.commit().await.map_err(op)?;
        Ok(())
    }

    async fn find_pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, AppError> {
        let op = |e: sqlx::Error| AppError::storage("find_pull_request_by_id", pr_id, e);

        let row: Option<PullRequestRow> =
            sqlx::query_as(&format!("{} WHERE pull_request_id = ?", SELECT_PR_COLUMNS))
                .bind(pr_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(op)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviewers: Vec<ReviewerRow> = sqlx::query_as(
            "SELECT pull_request_id, user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY position",
        )
        .bind(pr_id)
        .fetch_all(&self.pool)
        .await
        .map_err(op)?;

        Ok(attach_reviewers(vec![row], reviewers).pop())
    }

    async fn update_pull_request(&self, pr: &PullRequest) -> Result<(), AppError> {
        let op = |e: sqlx::Error| {
            log::error!(
                "[store] update_pull_request failed pr={}: {}",
                pr.pull_request_id,
                e
            );
            AppError::storage("update_pull_request", &pr.pull_request_id, e)
        };

        let mut tx = self.pool.begin().await.map_err(op)?;

        let result =
            sqlx::query("UPDATE pull_requests SET status = ?, merged_at = ? WHERE pull_request_id = ?")
                .bind(pr.status.as_str())
                .bind(pr.merged_at.as_ref().map(to_millis))
                .bind(&pr.pull_request_id)
                .execute(&mut *tx)
                .await
                .map_err(op)?;

        if result.rows_affected() == 0 {
            return Err(AppError::PullRequestNotFound {
                pr_id: pr.pull_request_id.clone(),
            });
        }

        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ?")
            .bind(&pr.pull_request_id)
            .execute(&mut *tx)
            .await
            .map_err(op)?;

        Self::insert_reviewers(&mut *tx, pr).await.map_err(op)?;

        tx.commit().await.map_err(op)?;
        Ok(())
    }

    async fn find_pull_requests_by_reviewer(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequest>, AppError> {
        let op = |e: sqlx::Error| AppError::storage("find_pull_requests_by_reviewer", user_id, e);

        let rows: Vec<PullRequestRow> = sqlx::query_as(&format!(
            "{} WHERE pull_request_id IN (SELECT pull_request_id FROM pr_reviewers WHERE user_id = ?) ORDER BY created_at DESC, pull_request_id",
            SELECT_PR_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(op)?;

        let reviewers: Vec<ReviewerRow> = sqlx::query_as(
            r#"
            SELECT r.pull_request_id, r.user_id
            FROM pr_reviewers r
            WHERE r.pull_request_id IN (SELECT pull_request_id FROM pr_reviewers WHERE user_id = ?)
            ORDER BY r.pull_request_id, r.position
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(op)?;

        Ok(attach_reviewers(rows, reviewers))
    }

    async fn list_all_pull_requests(&self) -> Result<Vec<PullRequest>, AppError> {
        let op = |e: sqlx::Error| AppError::storage_op("list_all_pull_requests", e);

        let rows: Vec<PullRequestRow> = sqlx::query_as(&format!(
            "{} ORDER BY created_at DESC, pull_request_id",
            SELECT_PR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(op)?;

        let reviewers: Vec<ReviewerRow> = sqlx::query_as(
            "SELECT pull_request_id, user_id FROM pr_reviewers ORDER BY pull_request_id, position",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(op)?;

        Ok(attach_reviewers(rows, reviewers))
    }
}

//! Application error types.
//!
//! Every failure the service can report is a variant of [`AppError`]. Callers
//! branch on the variant (or on its coarse [`ErrorKind`]), never on the
//! rendered message.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification of an [`AppError`].
///
/// The presentation layer uses this to separate "nothing happened"
/// (not found, conflict, exhausted, invalid input) from storage trouble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A user, team or pull request is absent.
    NotFound,
    /// The operation is illegal in the current state.
    Conflict,
    /// No eligible replacement reviewer exists.
    Exhausted,
    /// The underlying store failed.
    StorageFailure,
    /// The request itself is malformed.
    InvalidInput,
    /// Anything else, including entropy source failure.
    Internal,
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// The author of a new pull request does not exist.
    #[error("author not found: {author_id}")]
    AuthorNotFound { author_id: String },

    /// The author exists but belongs to no team.
    #[error("author has no team: {author_id}")]
    AuthorHasNoTeam { author_id: String },

    #[error("PR not found: {pr_id}")]
    PullRequestNotFound { pr_id: String },

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("team not found: {team_name}")]
    TeamNotFound { team_name: String },

    #[error("PR id already exists: {pr_id}")]
    PullRequestExists { pr_id: String },

    #[error("team already exists: {team_name}")]
    TeamExists { team_name: String },

    /// Reviewers cannot change once the pull request is merged.
    #[error("cannot reassign on merged PR: {pr_id}")]
    PullRequestMerged { pr_id: String },

    #[error("reviewer {reviewer_id} is not assigned to PR {pr_id}")]
    ReviewerNotAssigned { pr_id: String, reviewer_id: String },

    /// No active teammate is left to take over a review.
    #[error("no active replacement candidate in team '{team_name}'")]
    NoReplacementCandidate { team_name: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
    },

    /// A batch deactivation stopped partway because a pull request update failed.
    ///
    /// Writes made before the failure are kept; `reassigned_pr_ids` lists them.
    #[error(
        "batch aborted while updating PR {failed_pr_id}: {message} (already reassigned: {reassigned_pr_ids:?})"
    )]
    BatchAborted {
        failed_pr_id: String,
        message: String,
        deactivated_count: usize,
        reassigned_pr_ids: Vec<String>,
    },

    /// The OS entropy source failed.
    #[error("random source error: {message}")]
    RandomSource { message: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthorNotFound { .. }
            | Self::AuthorHasNoTeam { .. }
            | Self::PullRequestNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::TeamNotFound { .. } => ErrorKind::NotFound,
            Self::PullRequestExists { .. }
            | Self::TeamExists { .. }
            | Self::PullRequestMerged { .. }
            | Self::ReviewerNotAssigned { .. } => ErrorKind::Conflict,
            Self::NoReplacementCandidate { .. } => ErrorKind::Exhausted,
            Self::Database { .. } | Self::BatchAborted { .. } => ErrorKind::StorageFailure,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::RandomSource { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Create a database error without context.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
            entity_id: None,
        }
    }

    /// Create a database error carrying the failed operation and the entity it touched.
    pub fn storage(
        operation: impl Into<String>,
        entity_id: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Database {
            message: message.to_string(),
            operation: Some(operation.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create a database error for an operation that spans no single entity.
    pub fn storage_op(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Database {
            message: message.to_string(),
            operation: Some(operation.into()),
            entity_id: None,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn random_source(err: impl std::fmt::Display) -> Self {
        Self::RandomSource {
            message: err.to_string(),
        }
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database(err.to_string())
    }
}

impl From<rand::Error> for AppError {
    fn from(err: rand::Error) -> Self {
        Self::random_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = AppError::storage("update_pull_request", "pr-1", "disk I/O error");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"Database\""));
        assert!(json.contains("\"operation\":\"update_pull_request\""));
        assert!(json.contains("\"entity_id\":\"pr-1\""));
    }

    #[test]
    fn test_optional_fields_not_serialized() {
        let err = AppError::database("error");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("operation"));
        assert!(!json.contains("entity_id"));
    }

    #[test]
    fn test_kinds() {
        let merged = AppError::PullRequestMerged { pr_id: "p1".into() };
        assert_eq!(merged.kind(), ErrorKind::Conflict);

        let exhausted = AppError::NoReplacementCandidate {
            team_name: "core".into(),
        };
        assert_eq!(exhausted.kind(), ErrorKind::Exhausted);

        let missing = AppError::AuthorHasNoTeam {
            author_id: "u1".into(),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        assert_eq!(
            AppError::random_source("no entropy").kind(),
            ErrorKind::Internal
        );
        assert_eq!(AppError::database("boom").kind(), ErrorKind::StorageFailure);
    }

    #[test]
    fn test_display_impl() {
        let err = AppError::ReviewerNotAssigned {
            pr_id: "pr-1".into(),
            reviewer_id: "u2".into(),
        };
        assert_eq!(format!("{}", err), "reviewer u2 is not assigned to PR pr-1");
    }
}

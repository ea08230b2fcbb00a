//! Pull request model and its status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a pull request.
///
/// `Open` is initial, `Merged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    /// The only legal transition is OPEN -> MERGED.
    pub fn can_transition_to(self, next: PullRequestStatus) -> bool {
        matches!((self, next), (Self::Open, Self::Merged))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl From<&str> for PullRequestStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MERGED" => Self::Merged,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data required to create a pull request.
///
/// Status, reviewers and timestamps are decided by the assignment engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// A pull request with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Caller-supplied unique identifier.
    pub pull_request_id: String,

    /// Display name.
    pub pull_request_name: String,

    /// Author's user id.
    pub author_id: String,

    /// Current status: `OPEN` or `MERGED`.
    pub status: PullRequestStatus,

    /// Reviewer user ids, in assignment order.
    pub assigned_reviewers: Vec<String>,

    /// Set once at creation.
    pub created_at: DateTime<Utc>,

    /// Set once, on the OPEN -> MERGED transition.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Check if the PR is open.
    pub fn is_open(&self) -> bool {
        self.status == PullRequestStatus::Open
    }

    /// Check if the PR is merged.
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// Reviewer set with `user_id` removed, order preserved.
    pub fn reviewers_without(&self, user_id: &str) -> Vec<String> {
        self.assigned_reviewers
            .iter()
            .filter(|r| r.as_str() != user_id)
            .cloned()
            .collect()
    }

    /// Short form used by reviewer listings.
    pub fn to_short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Pull request without reviewers or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(reviewers: &[&str]) -> PullRequest {
        PullRequest {
            pull_request_id: "pr-1".into(),
            pull_request_name: "Add search".into(),
            author_id: "a".into(),
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now(),
            merged_at: None,
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!(PullRequestStatus::from("OPEN"), PullRequestStatus::Open);
        assert_eq!(PullRequestStatus::from("merged"), PullRequestStatus::Merged);
        assert_eq!(PullRequestStatus::from("unknown"), PullRequestStatus::Open);
    }

    #[test]
    fn test_status_transitions() {
        use PullRequestStatus::*;
        assert!(Open.can_transition_to(Merged));
        assert!(!Merged.can_transition_to(Open));
        assert!(!Merged.can_transition_to(Merged));
        assert!(!Open.can_transition_to(Open));
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&PullRequestStatus::Merged).unwrap();
        assert_eq!(json, "\"MERGED\"");
    }

    #[test]
    fn test_reviewers_without_keeps_order() {
        let pr = pr(&["b", "c", "d"]);
        assert_eq!(pr.reviewers_without("c"), vec!["b", "d"]);
        assert!(pr.has_reviewer("d"));
        assert!(!pr.has_reviewer("a"));
    }
}

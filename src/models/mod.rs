//! Data models for the application.
//!
//! These models represent the entities kept by the directory store and the
//! payloads returned over HTTP.

pub mod pull_request;
pub mod statistics;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{NewPullRequest, PullRequest, PullRequestShort, PullRequestStatus};
pub use statistics::{BatchDeactivateResult, Statistics, StatusCounts, UserError};
pub use team::{Team, TeamMember};
pub use user::User;

//! Read-only aggregates over pull requests and batch operation results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pull request counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub open: usize,
    pub merged: usize,
}

/// Assignment statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Total reviewer slots across all pull requests.
    pub total_assignments: usize,

    /// Reviewer slots per user id.
    pub by_user: BTreeMap<String, usize>,

    pub by_status: StatusCounts,
}

/// A per-user failure recorded during batch deactivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    pub user_id: String,
    pub error: String,
}

/// Outcome of a batch deactivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeactivateResult {
    pub deactivated_count: usize,
    pub reassigned_count: usize,
    pub errors: Vec<UserError>,
}

impl BatchDeactivateResult {
    pub(crate) fn record_error(&mut self, user_id: &str, error: impl Into<String>) {
        self.errors.push(UserError {
            user_id: user_id.to_string(),
            error: error.into(),
        });
    }
}

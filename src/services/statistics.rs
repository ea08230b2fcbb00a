//! Assignment statistics over all pull requests.

use std::sync::Arc;

use thiserror::Error;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestStatus, Statistics};

/// A scan that failed, with whatever was counted before the failure.
///
/// The store returns pull requests in a single call, so a failure there
/// leaves `partial` zeroed.
#[derive(Debug, Error)]
#[error("statistics scan failed: {source}")]
pub struct PartialStatistics {
    pub partial: Statistics,
    #[source]
    pub source: AppError,
}

impl From<PartialStatistics> for AppError {
    fn from(err: PartialStatistics) -> Self {
        err.source
    }
}

/// Fold one pull request into `stats`.
fn tally(stats: &mut Statistics, pr: &PullRequest) {
    for reviewer in &pr.assigned_reviewers {
        *stats.by_user.entry(reviewer.clone()).or_insert(0) += 1;
        stats.total_assignments += 1;
    }
    match pr.status {
        PullRequestStatus::Open => stats.by_status.open += 1,
        PullRequestStatus::Merged => stats.by_status.merged += 1,
    }
}

#[derive(Clone)]
pub struct StatisticsAggregator {
    store: Arc<dyn DirectoryStore>,
}

impl StatisticsAggregator {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Scan every pull request once and count reviewer slots per user and
    /// pull requests per status.
    pub async fn compute_statistics(&self) -> Result<Statistics, PartialStatistics> {
        let mut stats = Statistics::default();

        let prs = match self.store.list_all_pull_requests().await {
            Ok(prs) => prs,
            Err(source) => {
                log::error!("[stats] scan failed: {}", source);
                return Err(PartialStatistics {
                    partial: stats,
                    source,
                });
            }
        };

        for pr in &prs {
            tally(&mut stats, pr);
        }

        log::debug!(
            "[stats] scanned {} PRs, {} assignments",
            prs.len(),
            stats.total_assignments
        );
        Ok(stats)
    }
}

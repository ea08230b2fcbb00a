//! Reviewer reassignment: single swaps and team-wide batch deactivation.

use std::sync::Arc;

use serde::Serialize;

use crate::db::DirectoryStore;
use crate::error::AppError;
use crate::models::{BatchDeactivateResult, PullRequest, TeamMember, User};
use crate::services::assignment::MAX_REVIEWERS;
use crate::services::lifecycle::ensure_reviewers_mutable;
use crate::services::random::{choose, RandomSource};

/// Result of a successful single swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

#[derive(Clone)]
pub struct ReassignmentEngine {
    store: Arc<dyn DirectoryStore>,
    random: Arc<dyn RandomSource>,
}

impl ReassignmentEngine {
    pub fn new(store: Arc<dyn DirectoryStore>, random: Arc<dyn RandomSource>) -> Self {
        Self { store, random }
    }

    /// Replace `old_reviewer_id` on an open pull request with a random active
    /// teammate of the old reviewer.
    ///
    /// The candidate pool excludes the old reviewer and everyone already on
    /// the PR. It does not exclude the author.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, AppError> {
        let pr = self
            .store
            .find_pull_request_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::PullRequestNotFound {
                pr_id: pr_id.to_string(),
            })?;

        ensure_reviewers_mutable(&pr)?;

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(AppError::ReviewerNotAssigned {
                pr_id: pr_id.to_string(),
                reviewer_id: old_reviewer_id.to_string(),
            });
        }

        let old_reviewer = self
            .store
            .find_user_by_id(old_reviewer_id)
            .await?
            .ok_or_else(|| AppError::UserNotFound {
                user_id: old_reviewer_id.to_string(),
            })?;

        let team_name = old_reviewer.team().unwrap_or_default().to_string();
        let pool: Vec<TeamMember> = if team_name.is_empty() {
            Vec::new()
        } else {
            self.store
                .find_active_members(&team_name)
                .await?
                .into_iter()
                .filter(|m| m.user_id != old_reviewer_id && !pr.has_reviewer(&m.user_id))
                .collect()
        };

        let Some(replacement) = choose(self.random.as_ref(), &pool)? else {
            log::warn!(
                "[reassign] no candidate pr_id={} old={} team={}",
                pr_id,
                old_reviewer_id,
                team_name
            );
            return Err(AppError::NoReplacementCandidate { team_name });
        };
        let replaced_by = replacement.user_id.clone();

        let mut updated = pr;
        updated.assigned_reviewers = updated.reviewers_without(old_reviewer_id);
        updated.assigned_reviewers.push(replaced_by.clone());

        self.store.update_pull_request(&updated).await?;

        log::info!(
            "[reassign] pr_id={} old={} new={}",
            pr_id,
            old_reviewer_id,
            replaced_by
        );
        Ok(Reassignment {
            pull_request: updated,
            replaced_by,
        })
    }

    /// Deactivate `user_ids` and move their open reviews onto the rest of
    /// `team_name`.
    ///
    /// The replacement pool is computed once, before any write: active
    /// members of the team that are not being deactivated. An empty pool
    /// fails the call with `NoReplacementCandidate` and nothing changes.
    ///
    /// Deactivation and listing failures are collected per user. A failed
    /// pull request update stops the batch with `BatchAborted`; earlier writes
    /// stay in place and are listed in the error.
    pub async fn deactivate_users_and_reassign(
        &self,
        team_name: &str,
        user_ids: &[String],
    ) -> Result<BatchDeactivateResult, AppError> {
        let team_found = self
            .store
            .find_team_by_name(team_name)
            .await?
            .is_some_and(|t| t.is_resolved());
        if !team_found {
            return Err(AppError::TeamNotFound {
                team_name: team_name.to_string(),
            });
        }

        let mut targets: Vec<&str> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if !targets.contains(&id.as_str()) {
                targets.push(id);
            }
        }

        let pool: Vec<User> = self
            .store
            .list_all_users()
            .await?
            .into_iter()
            .filter(|u| u.is_active_in(team_name) && !targets.contains(&u.user_id.as_str()))
            .collect();
        if pool.is_empty() {
            log::warn!(
                "[reassign] batch refused, empty pool team={} targets={:?}",
                team_name,
                targets
            );
            return Err(AppError::NoReplacementCandidate {
                team_name: team_name.to_string(),
            });
        }

        log::info!(
            "[reassign] batch start team={} targets={} pool={}",
            team_name,
            targets.len(),
            pool.len()
        );

        let mut result = BatchDeactivateResult::default();
        let mut reassigned_pr_ids: Vec<String> = Vec::new();

        for user_id in targets {
            if let Err(e) = self.store.update_user_active(user_id, false).await {
                log::warn!("[reassign] deactivate failed user_id={}: {}", user_id, e);
                result.record_error(user_id, format!("failed to deactivate: {}", e));
                continue;
            }
            result.deactivated_count += 1;

            let prs = match self.store.find_pull_requests_by_reviewer(user_id).await {
                Ok(prs) => prs,
                Err(e) => {
                    log::warn!("[reassign] list PRs failed user_id={}: {}", user_id, e);
                    result.record_error(user_id, format!("failed to list PRs: {}", e));
                    continue;
                }
            };

            for pr in prs.into_iter().filter(PullRequest::is_open) {
                let mut reviewers = pr.reviewers_without(user_id);

                if reviewers.len() < MAX_REVIEWERS {
                    let eligible: Vec<&User> = pool
                        .iter()
                        .filter(|m| m.user_id != pr.author_id && !reviewers.contains(&m.user_id))
                        .collect();
                    match choose(self.random.as_ref(), &eligible) {
                        Ok(Some(member)) => reviewers.push(member.user_id.clone()),
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!(
                                "[reassign] random selection failed pr_id={}: {}",
                                pr.pull_request_id,
                                e
                            );
                            result.record_error(user_id, format!("random selection failed: {}", e));
                            continue;
                        }
                    }
                }

                let updated = PullRequest {
                    assigned_reviewers: reviewers,
                    ..pr
                };
                if let Err(e) = self.store.update_pull_request(&updated).await {
                    log::error!(
                        "[reassign] batch aborted pr_id={} after {} PRs: {}",
                        updated.pull_request_id,
                        reassigned_pr_ids.len(),
                        e
                    );
                    return Err(AppError::BatchAborted {
                        failed_pr_id: updated.pull_request_id,
                        message: e.to_string(),
                        deactivated_count: result.deactivated_count,
                        reassigned_pr_ids,
                    });
                }

                reassigned_pr_ids.push(updated.pull_request_id);
                result.reassigned_count += 1;
            }
        }

        log::info!(
            "[reassign] batch done team={} deactivated={} reassigned={} errors={}",
            team_name,
            result.deactivated_count,
            result.reassigned_count,
            result.errors.len()
        );
        Ok(result)
    }
}

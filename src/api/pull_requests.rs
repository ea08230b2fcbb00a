//! Pull request routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{json_body, ApiErr, AppState};
use crate::models::{NewPullRequest, PullRequest};
use crate::services::Reassignment;

#[derive(Serialize)]
struct PullRequestResponse {
    pr: PullRequest,
}

#[derive(Deserialize)]
struct MergeRequest {
    pull_request_id: String,
}

#[derive(Deserialize)]
struct ReassignRequest {
    pull_request_id: String,
    old_user_id: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create))
        .route("/pullRequest/merge", post(merge))
        .route("/pullRequest/reassign", post(reassign))
}

/// POST /pullRequest/create: create a PR and assign reviewers.
async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewPullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let new_pr = json_body(payload)?;
    let pr = state.services.assignment.create_pull_request(new_pr).await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// POST /pullRequest/merge: idempotent.
async fn merge(
    State(state): State<AppState>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let req = json_body(payload)?;
    let pr = state
        .services
        .lifecycle
        .merge_pull_request(&req.pull_request_id)
        .await?;
    Ok(Json(PullRequestResponse { pr }))
}

/// POST /pullRequest/reassign
async fn reassign(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let req = json_body(payload)?;
    let outcome = state
        .services
        .reassignment
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(outcome))
}

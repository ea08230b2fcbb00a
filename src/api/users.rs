//! User routes: active flag, review listing and batch deactivation.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{json_body, query_params, required, ApiErr, AppState};
use crate::error::AppError;
use crate::models::{BatchDeactivateResult, PullRequestShort, User};

#[derive(Deserialize)]
struct SetActiveRequest {
    user_id: String,
    is_active: bool,
}

#[derive(Serialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
struct ReviewQuery {
    #[serde(default)]
    user_id: String,
}

#[derive(Serialize)]
struct ReviewResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

#[derive(Deserialize)]
struct DeactivateBatchRequest {
    team_name: String,
    #[serde(default)]
    user_ids: Vec<String>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/users/deactivateBatch", post(deactivate_batch))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let req = json_body(payload)?;
    let user = state
        .services
        .users
        .set_user_active(&req.user_id, req.is_active)
        .await?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/getReview?user_id=: PRs the user reviews, newest first.
///
/// An unknown user simply has no reviews.
async fn get_review(
    State(state): State<AppState>,
    params: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let params = query_params(params)?;
    required(&params.user_id, "user_id")?;

    let prs = state
        .services
        .lifecycle
        .find_pull_requests_by_reviewer(&params.user_id)
        .await?;

    Ok(Json(ReviewResponse {
        pull_requests: prs.iter().map(|pr| pr.to_short()).collect(),
        user_id: params.user_id,
    }))
}

/// POST /users/deactivateBatch
async fn deactivate_batch(
    State(state): State<AppState>,
    payload: Result<Json<DeactivateBatchRequest>, JsonRejection>,
) -> Result<Json<BatchDeactivateResult>, ApiErr> {
    let req = json_body(payload)?;
    if req.user_ids.is_empty() {
        return Err(ApiErr(AppError::invalid_input_field(
            "user_ids cannot be empty",
            "user_ids",
        )));
    }

    let result = state
        .services
        .reassignment
        .deactivate_users_and_reassign(&req.team_name, &req.user_ids)
        .await?;
    Ok(Json(result))
}

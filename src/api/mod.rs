//! HTTP API.
//!
//! Thin axum handlers over [`Services`]. Handlers decode the request, call
//! one service operation and map the result; every domain failure becomes
//! a `{"error": {"code", "message"}}` body with a status chosen from the
//! error variant.

mod pull_requests;
mod stats;
mod team;
mod users;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, ErrorKind};
use crate::services::Services;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(pub AppError);

impl ApiErr {
    /// Status code and wire code for an error.
    fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
        match err {
            AppError::TeamExists { .. } => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
            AppError::PullRequestExists { .. } => (StatusCode::CONFLICT, "PR_EXISTS"),
            AppError::PullRequestMerged { .. } => (StatusCode::CONFLICT, "PR_MERGED"),
            AppError::ReviewerNotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
            AppError::NoReplacementCandidate { .. } => (StatusCode::CONFLICT, "NO_CANDIDATE"),
            _ => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = Self::status_and_code(&self.0);

        let message = if status.is_server_error() {
            log::error!("[api] {}", self.0);
            match &self.0 {
                // Partial progress is part of the answer.
                AppError::BatchAborted { .. } => self.0.to_string(),
                _ => "internal server error".to_string(),
            }
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid query: {}",
            rejection.body_text()
        )))
    }
}

/// Unwrap a JSON body, turning a decode failure into `INVALID_REQUEST`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiErr> {
    let Json(value) = payload?;
    Ok(value)
}

/// Unwrap query parameters, turning a decode failure into `INVALID_REQUEST`.
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiErr> {
    let Query(value) = params?;
    Ok(value)
}

/// Reject a missing or blank required parameter.
fn required(value: &str, name: &str) -> Result<(), ApiErr> {
    if value.trim().is_empty() {
        return Err(ApiErr(AppError::invalid_input_field(
            format!("{} parameter is required", name),
            name,
        )));
    }
    Ok(())
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the full router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(team::routes())
        .merge(users::routes())
        .merge(pull_requests::routes())
        .merge(stats::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

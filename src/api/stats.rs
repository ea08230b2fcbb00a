//! Statistics and liveness.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::{ApiErr, AppState};
use crate::error::AppError;
use crate::models::Statistics;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/health", get(health))
}

/// GET /stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<Statistics>, ApiErr> {
    let stats = state
        .services
        .statistics
        .compute_statistics()
        .await
        .map_err(AppError::from)?;
    Ok(Json(stats))
}

/// GET /health
async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

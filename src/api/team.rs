//! Team routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{json_body, query_params, required, ApiErr, AppState};
use crate::models::Team;

#[derive(Deserialize)]
struct TeamQuery {
    #[serde(default)]
    team_name: String,
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
}

/// POST /team/add: create a team and upsert its members.
async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let team = json_body(payload)?;
    let team = state.services.teams.add_team(team).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// GET /team/get?team_name=: a team with all of its members.
async fn get_team(
    State(state): State<AppState>,
    params: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let params = query_params(params)?;
    required(&params.team_name, "team_name")?;
    let team = state.services.teams.get_team_by_name(&params.team_name).await?;
    Ok(Json(team))
}

//! # REST API for Goals
//!
//! The weekly and monthly goal cells hold what is left to spend in the
//! current fiscal week and month. History writes adjust them; PUT here
//! overwrites one outright (e.g. when a new period starts).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use shared::SetGoalRequest;
use tracing::info;

use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::goal_mapper::GoalMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_goals).put(set_goal))
}

pub async fn get_goals(State(state): State<AppState>) -> Response {
    info!("GET /api/goals");

    match state.goal_service.goals().await {
        Ok(goals) => (StatusCode::OK, Json(GoalMapper::to_dto(goals))).into_response(),
        Err(e) => error_response("Failed to read goals", e),
    }
}

pub async fn set_goal(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SetGoalRequest>,
) -> Response {
    info!("PUT /api/goals - request: {:?}", request);

    let kind = GoalMapper::kind_to_domain(request.kind);
    match state.goal_service.set_goal(kind, request.amount).await {
        Ok(goals) => (StatusCode::OK, Json(GoalMapper::to_dto(goals))).into_response(),
        Err(e) => error_response("Failed to set goal", e),
    }
}

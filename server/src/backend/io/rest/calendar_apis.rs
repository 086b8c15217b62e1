//! # REST API for the Calendar View

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use shared::CalendarMonthQuery;
use tracing::info;

use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::ApiQuery;
use crate::backend::io::rest::mappers::calendar_mapper::CalendarMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/month", get(get_calendar_month))
}

/// A Sunday-first month grid with each day's entries and scheduled items
pub async fn get_calendar_month(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CalendarMonthQuery>,
) -> Response {
    info!("GET /api/calendar/month - {}-{:02}", query.year, query.month);

    match state.calendar_service.month(query.year, query.month).await {
        Ok(month) => (StatusCode::OK, Json(CalendarMapper::to_dto(month))).into_response(),
        Err(e) => error_response("Failed to build calendar month", e),
    }
}

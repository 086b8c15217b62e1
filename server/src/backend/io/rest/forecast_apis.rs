//! # REST API for the Cash-Flow Forecast

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Local;
use shared::ForecastQuery as ForecastRequest;
use tracing::info;

use crate::backend::domain::commands::forecast::ForecastQuery;
use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::ApiQuery;
use crate::backend::io::rest::mappers::forecast_mapper::ForecastMapper;
use crate::backend::AppState;

const DEFAULT_FORECAST_DAYS: u32 = 30;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_forecast))
}

pub async fn get_forecast(
    State(state): State<AppState>,
    ApiQuery(request): ApiQuery<ForecastRequest>,
) -> Response {
    info!("GET /api/forecast - query: {:?}", request);

    let query = ForecastQuery {
        start_balance: request.start_balance,
        from: request.from.unwrap_or_else(|| Local::now().date_naive()),
        days: request.days.unwrap_or(DEFAULT_FORECAST_DAYS),
    };

    match state.forecast_service.forecast(query).await {
        Ok(result) => (StatusCode::OK, Json(ForecastMapper::to_response(result))).into_response(),
        Err(e) => error_response("Failed to build forecast", e),
    }
}

//! # REST API for Fiscal Periods
//!
//! Read access to the cached fiscal calendar plus a refresh hook for when
//! the Fiscal sheet has been edited.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use shared::{FiscalPeriodListResponse, FiscalRefreshResponse, ResolveDateQuery};
use tracing::info;

use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::ApiQuery;
use crate::backend::io::rest::mappers::fiscal_mapper::FiscalMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_periods))
        .route("/current", get(current_position))
        .route("/resolve", get(resolve_date))
        .route("/refresh", post(refresh_calendar))
}

pub async fn list_periods(State(state): State<AppState>) -> Response {
    info!("GET /api/fiscal");

    match state.fiscal_service.list().await {
        Ok(periods) => {
            let response = FiscalPeriodListResponse {
                periods: periods.into_iter().map(FiscalMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to list fiscal periods", e),
    }
}

/// Fiscal year, month and week containing today
pub async fn current_position(State(state): State<AppState>) -> Response {
    info!("GET /api/fiscal/current");

    match state.fiscal_service.current().await {
        Ok(position) => {
            (StatusCode::OK, Json(FiscalMapper::to_position_dto(position))).into_response()
        }
        Err(e) => error_response("Failed to resolve current fiscal period", e),
    }
}

pub async fn resolve_date(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ResolveDateQuery>,
) -> Response {
    info!("GET /api/fiscal/resolve - date: {}", query.date);

    match state.fiscal_service.resolve(query.date).await {
        Ok(position) => {
            (StatusCode::OK, Json(FiscalMapper::to_position_dto(position))).into_response()
        }
        Err(e) => error_response("Failed to resolve fiscal period", e),
    }
}

pub async fn refresh_calendar(State(state): State<AppState>) -> Response {
    info!("POST /api/fiscal/refresh");

    match state.fiscal_service.refresh().await {
        Ok(periods) => (StatusCode::OK, Json(FiscalRefreshResponse { periods })).into_response(),
        Err(e) => error_response("Failed to refresh fiscal calendar", e),
    }
}

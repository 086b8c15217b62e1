//! Error translation from domain failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::backend::domain::BudgetError;

/// Status code for a service error. Only typed [`BudgetError`]s map to
/// client errors; anything else is a server failure.
pub fn status_for(error: &anyhow::Error) -> StatusCode {
    match error.downcast_ref::<BudgetError>() {
        Some(BudgetError::Validation(_)) => StatusCode::BAD_REQUEST,
        Some(BudgetError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Some(BudgetError::NoFiscalPeriod(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(BudgetError::MissingColumn { .. }) | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "error": ... }` body with the matching status, logged on the way out
pub fn error_response(context: &str, error: anyhow::Error) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!("{}: {:#}", context, error);
    } else {
        warn!("{}: {}", context, error);
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!("Rejected request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

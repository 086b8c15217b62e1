//! Optional shared-secret guard for the `/api` routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::warn;

use crate::backend::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without the configured `x-api-key`. A no-op when no key
/// is configured.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        return next.run(request).await;
    }

    warn!("Rejected {} {} without a valid API key", request.method(), request.uri().path());
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Missing or invalid API key".to_string(),
        }),
    )
        .into_response()
}

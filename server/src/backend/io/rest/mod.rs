//! # REST API
//!
//! axum routers, one module per area, each exposing `router()` to be
//! nested under `/api` by [`crate::backend::create_router`]. Handlers turn
//! DTOs from the `shared` crate into domain commands through the mappers
//! and translate failures with [`error::error_response`].

pub mod auth;
pub mod calendar_apis;
pub mod error;
pub mod expenses_apis;
pub mod extract;
pub mod fiscal_apis;
pub mod forecast_apis;
pub mod goal_apis;
pub mod hsa_apis;
pub mod mappers;
pub mod notification_apis;

use axum::Json;
use serde_json::{json, Value};

/// Liveness check; not behind the API key
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

//! Request extractors for the REST handlers.
//!
//! Wrap axum's `Json` and `Query` so a body or query string that does not
//! deserialize gets the same `400 {"error": ...}` answer as any other
//! validation failure instead of axum's plain-text rejection.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    response::{IntoResponse, Response},
};

use crate::backend::io::rest::error::bad_request;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(RejectedRequest))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RejectedRequest))]
pub struct ApiQuery<T>(pub T);

/// A request axum could not turn into the handler's DTO
#[derive(Debug)]
pub struct RejectedRequest(String);

impl From<JsonRejection> for RejectedRequest {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl From<QueryRejection> for RejectedRequest {
    fn from(rejection: QueryRejection) -> Self {
        Self(rejection.body_text())
    }
}

impl IntoResponse for RejectedRequest {
    fn into_response(self) -> Response {
        bad_request(self.0)
    }
}

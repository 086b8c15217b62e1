//! # REST API for HSA Reimbursements
//!
//! Lists HSA-eligible expenses that have not been paid back and marks a
//! selection of them reimbursed.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use shared::ReimburseRequest;
use tracing::info;

use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::io::rest::mappers::entry_mapper::EntryMapper;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_outstanding))
        .route("/reimburse", post(reimburse))
}

pub async fn get_outstanding(State(state): State<AppState>) -> Response {
    info!("GET /api/hsa");

    match state.hsa_service.outstanding().await {
        Ok(summary) => {
            (StatusCode::OK, Json(EntryMapper::to_hsa_summary_response(summary))).into_response()
        }
        Err(e) => error_response("Failed to list outstanding HSA expenses", e),
    }
}

pub async fn reimburse(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReimburseRequest>,
) -> Response {
    info!("POST /api/hsa/reimburse - request: {:?}", request);

    match state
        .hsa_service
        .reimburse(EntryMapper::to_reimburse_command(request))
        .await
    {
        Ok(result) => {
            (StatusCode::OK, Json(EntryMapper::to_reimburse_response(result))).into_response()
        }
        Err(e) => error_response("Failed to reimburse HSA expenses", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::test_support::{send, test_app_state, test_router};
    use axum::http::{Method, StatusCode};
    use axum::Router;
    use serde_json::json;

    async fn add_entry(app: &Router, date: &str, amount: f64, hsa: bool) -> String {
        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/expenses",
            Some(json!({
                "resource": "history",
                "date": date,
                "amount": amount,
                "kind": "Expense",
                "category": "Medical",
                "description": "Pharmacy",
                "hsa": hsa
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["entry"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_outstanding_and_reimburse() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let later = add_entry(&app, "2025-01-20", 40.0, true).await;
        let earlier = add_entry(&app, "2025-01-03", 15.25, true).await;
        let plain = add_entry(&app, "2025-01-04", 9.0, false).await;

        let (status, body) = send(app.clone(), Method::GET, "/api/hsa", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outstanding_total"], 55.25);
        assert_eq!(body["entries"][0]["id"], earlier.as_str());
        assert_eq!(body["entries"][1]["id"], later.as_str());

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/hsa/reimburse",
            Some(json!({ "ids": [earlier, plain, "missing"], "date": "2025-02-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reimbursed_ids"], json!([earlier]));
        assert_eq!(body["reimbursed_total"], 15.25);
        assert_eq!(body["rejected_ids"], json!([plain]));
        assert_eq!(body["not_found_ids"], json!(["missing"]));
        assert_eq!(
            body["success_message"],
            "Marked 1 entry ($15.25) reimbursed on 2025-02-01"
        );

        let (_, body) = send(app, Method::GET, "/api/hsa", None).await;
        assert_eq!(body["outstanding_total"], 40.0);
    }

    #[tokio::test]
    async fn test_reimburse_requires_ids() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, body) = send(
            app,
            Method::POST,
            "/api/hsa/reimburse",
            Some(json!({ "ids": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

//! # REST API for Expenses
//!
//! One endpoint for both the History and the Recurring sheet. The HTTP
//! method picks the operation; `resource` (query string for GET/DELETE,
//! JSON tag for POST/PUT) picks the sheet. History writes answer with the
//! adjusted goals.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use shared::{
    DeleteResponse, ExpenseCreateRequest, ExpenseDeleteQuery, ExpenseListQuery, ExpenseResource,
    ExpenseUpdateRequest, RecurringListResponse,
};
use tracing::info;

use crate::backend::io::rest::error::error_response;
use crate::backend::io::rest::extract::{ApiJson, ApiQuery};
use crate::backend::io::rest::mappers::entry_mapper::EntryMapper;
use crate::backend::io::rest::mappers::recurring_mapper::RecurringMapper;
use crate::backend::AppState;

/// Create a router for the expenses endpoint
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(list_expenses)
            .post(create_expense)
            .put(update_expense)
            .delete(delete_expense),
    )
}

/// List history entries (filtered, newest first) or recurring items
pub async fn list_expenses(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpenseListQuery>,
) -> Response {
    info!("GET /api/expenses - query: {:?}", query);

    match query.resource {
        ExpenseResource::History => {
            match state.history_service.list(EntryMapper::to_list_query(&query)).await {
                Ok(result) => {
                    (StatusCode::OK, Json(EntryMapper::to_list_response(result))).into_response()
                }
                Err(e) => error_response("Failed to list history entries", e),
            }
        }
        ExpenseResource::Recurring => match state.recurring_service.list().await {
            Ok(items) => {
                let response = RecurringListResponse {
                    items: items.into_iter().map(RecurringMapper::to_dto).collect(),
                };
                (StatusCode::OK, Json(response)).into_response()
            }
            Err(e) => error_response("Failed to list recurring items", e),
        },
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ExpenseCreateRequest>,
) -> Response {
    info!("POST /api/expenses - request: {:?}", request);

    match request {
        ExpenseCreateRequest::History(body) => {
            match state
                .history_service
                .create(EntryMapper::to_create_command(body))
                .await
            {
                Ok(result) => (
                    StatusCode::CREATED,
                    Json(EntryMapper::to_entry_response(result)),
                )
                    .into_response(),
                Err(e) => error_response("Failed to create history entry", e),
            }
        }
        ExpenseCreateRequest::Recurring(body) => {
            match state
                .recurring_service
                .create(RecurringMapper::to_create_command(body))
                .await
            {
                Ok(result) => (
                    StatusCode::CREATED,
                    Json(RecurringMapper::to_item_response(result)),
                )
                    .into_response(),
                Err(e) => error_response("Failed to create recurring item", e),
            }
        }
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ExpenseUpdateRequest>,
) -> Response {
    info!("PUT /api/expenses - request: {:?}", request);

    match request {
        ExpenseUpdateRequest::History(body) => {
            match state
                .history_service
                .update(EntryMapper::to_update_command(body))
                .await
            {
                Ok(result) => {
                    (StatusCode::OK, Json(EntryMapper::to_entry_response(result))).into_response()
                }
                Err(e) => error_response("Failed to update history entry", e),
            }
        }
        ExpenseUpdateRequest::Recurring(body) => {
            match state
                .recurring_service
                .update(RecurringMapper::to_update_command(body))
                .await
            {
                Ok(result) => (
                    StatusCode::OK,
                    Json(RecurringMapper::to_item_response(result)),
                )
                    .into_response(),
                Err(e) => error_response("Failed to update recurring item", e),
            }
        }
    }
}

pub async fn delete_expense(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExpenseDeleteQuery>,
) -> Response {
    info!("DELETE /api/expenses - query: {:?}", query);

    match query.resource {
        ExpenseResource::History => match state.history_service.delete(&query.id).await {
            Ok(result) => {
                (StatusCode::OK, Json(EntryMapper::to_delete_response(result))).into_response()
            }
            Err(e) => error_response("Failed to delete history entry", e),
        },
        ExpenseResource::Recurring => match state.recurring_service.delete(&query.id).await {
            Ok(deleted_id) => {
                let response = DeleteResponse {
                    deleted_id,
                    goals: None,
                    success_message: "Recurring item deleted successfully".to_string(),
                };
                (StatusCode::OK, Json(response)).into_response()
            }
            Err(e) => error_response("Failed to delete recurring item", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::test_support::{send, test_app_state, test_router};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn groceries(date: &str, amount: f64) -> serde_json::Value {
        json!({
            "resource": "history",
            "date": date,
            "amount": amount,
            "kind": "Expense",
            "category": "Groceries",
            "description": "Milk",
            "paid_by": "Sam"
        })
    }

    #[tokio::test]
    async fn test_create_history_entry_adjusts_goals() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/expenses",
            Some(groceries("2025-01-07", 12.5)),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["entry"]["amount"], 12.5);
        assert_eq!(body["entry"]["category"], "Groceries");
        assert_eq!(body["goals"]["weekly"], 187.5);
        assert_eq!(body["goals"]["monthly"], 787.5);
        assert_eq!(body["success_message"], "Entry added successfully");

        let (status, body) = send(app, Method::GET, "/api/expenses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
        assert_eq!(body["total_expenses"], 12.5);
    }

    #[tokio::test]
    async fn test_list_history_filters_and_orders_newest_first() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        for (date, amount) in [("2025-01-02", 5.0), ("2025-01-20", 7.0), ("2025-02-03", 9.0)] {
            let (status, _) = send(
                app.clone(),
                Method::POST,
                "/api/expenses",
                Some(groceries(date, amount)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(
            app,
            Method::GET,
            "/api/expenses?resource=history&start=2025-01-01&end=2025-01-31",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["date"], "2025-01-20");
        assert_eq!(entries[1]["date"], "2025-01-02");
        assert_eq!(body["total_expenses"], 12.0);
    }

    #[tokio::test]
    async fn test_update_and_delete_history_entry() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (_, created) = send(
            app.clone(),
            Method::POST,
            "/api/expenses",
            Some(groceries("2025-01-07", 20.0)),
        )
        .await;
        let id = created["entry"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            "/api/expenses",
            Some(json!({ "resource": "history", "id": id, "amount": 30.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entry"]["amount"], 30.0);
        assert_eq!(body["entry"]["description"], "Milk");
        assert_eq!(body["goals"]["weekly"], 170.0);

        let uri = format!("/api/expenses?resource=history&id={}", id);
        let (status, body) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_id"], id.as_str());
        assert_eq!(body["goals"]["weekly"], 200.0);

        let (status, body) = send(app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_create_history_entry_rejects_bad_amount() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, body) = send(
            app,
            Method::POST,
            "/api/expenses",
            Some(groceries("2025-01-07", -3.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_kind_is_case_insensitive() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let mut body = groceries("2025-01-07", 10.0);
        body["kind"] = json!("expense");
        let (status, created) = send(app.clone(), Method::POST, "/api/expenses", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["entry"]["kind"], "Expense");
        assert_eq!(created["goals"]["weekly"], 190.0);

        let (status, listed) =
            send(app, Method::GET, "/api/expenses?kind=EXPENSE", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_fields_get_json_bad_request() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/expenses",
            Some(groceries("07/01/2025", 10.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let mut unknown_kind = groceries("2025-01-07", 10.0);
        unknown_kind["kind"] = json!("Transfer");
        let (status, body) =
            send(app.clone(), Method::POST, "/api/expenses", Some(unknown_kind)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Transfer"));

        let (status, body) =
            send(app, Method::GET, "/api/expenses?start=yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_and_deletes_through_the_endpoint() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let creates: Vec<_> = (0..20)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move {
                    let (status, body) = send(
                        app,
                        Method::POST,
                        "/api/expenses",
                        Some(groceries("2025-01-07", 1.0)),
                    )
                    .await;
                    assert_eq!(status, StatusCode::CREATED);
                    body["entry"]["id"].as_str().unwrap().to_string()
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in creates {
            ids.push(handle.await.unwrap());
        }

        let (_, goals) = send(app.clone(), Method::GET, "/api/goals", None).await;
        assert_eq!(goals["weekly"], 180.0);
        assert_eq!(goals["monthly"], 780.0);

        let deletes: Vec<_> = ids[..10]
            .iter()
            .cloned()
            .map(|id| {
                let app = app.clone();
                tokio::spawn(async move {
                    let uri = format!("/api/expenses?resource=history&id={}", id);
                    let (status, body) = send(app, Method::DELETE, &uri, None).await;
                    assert_eq!(status, StatusCode::OK);
                    assert_eq!(body["deleted_id"], id.as_str());
                })
            })
            .collect();
        for handle in deletes {
            handle.await.unwrap();
        }

        let (_, listed) = send(app.clone(), Method::GET, "/api/expenses", None).await;
        let mut remaining: Vec<String> = listed["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect();
        remaining.sort();
        let mut expected = ids[10..].to_vec();
        expected.sort();
        assert_eq!(remaining, expected);

        let (_, goals) = send(app, Method::GET, "/api/goals", None).await;
        assert_eq!(goals["weekly"], 190.0);
    }

    #[tokio::test]
    async fn test_recurring_crud_through_single_endpoint() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, created) = send(
            app.clone(),
            Method::POST,
            "/api/expenses",
            Some(json!({
                "resource": "recurring",
                "name": "Rent",
                "amount": 1500.0,
                "kind": "Expense",
                "frequency": "Monthly",
                "start_date": "2025-01-01",
                "category": "Housing"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["item"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            "/api/expenses",
            Some(json!({ "resource": "recurring", "id": id, "amount": 1550.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["amount"], 1550.0);
        assert_eq!(body["item"]["frequency"], "Monthly");

        let (status, body) =
            send(app.clone(), Method::GET, "/api/expenses?resource=recurring", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["name"], "Rent");

        let uri = format!("/api/expenses?resource=recurring&id={}", id);
        let (status, body) = send(app.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["goals"].is_null());

        let (_, body) = send(app, Method::GET, "/api/expenses?resource=recurring", None).await;
        assert!(body["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_resource_is_rejected() {
        let env = TestEnvironment::new().await.unwrap();
        let app = test_router(test_app_state(&env));

        let (status, body) = send(app, Method::GET, "/api/expenses?resource=budget", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("budget"));
    }
}

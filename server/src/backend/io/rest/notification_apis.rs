//! # REST API for Push Notifications
//!
//! Device registration for FCM tokens and a manual broadcast endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use shared::{
    BroadcastResponse, DeviceListResponse, DeviceResponse, RegisterDeviceRequest,
    RegisteredDevice, SendNotificationRequest, UnregisterDeviceRequest,
};
use tracing::info;

use crate::backend::io::messaging::{abbreviate_token, PushMessage};
use crate::backend::io::rest::error::{bad_request, error_response};
use crate::backend::io::rest::extract::ApiJson;
use crate::backend::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/devices",
            get(list_devices).post(register_device).delete(unregister_device),
        )
        .route("/send", post(send_notification))
}

pub async fn list_devices(State(state): State<AppState>) -> Response {
    info!("GET /api/notifications/devices");

    match state.notification_service.devices().await {
        Ok(devices) => {
            let response = DeviceListResponse {
                devices: devices
                    .into_iter()
                    .map(|d| RegisteredDevice {
                        token: d.token,
                        label: d.label,
                    })
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to list devices", e),
    }
}

pub async fn register_device(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterDeviceRequest>,
) -> Response {
    info!(
        "POST /api/notifications/devices - token: {}",
        abbreviate_token(&request.token)
    );

    match state
        .notification_service
        .register_device(&request.token, request.label.as_deref())
        .await
    {
        Ok(()) => {
            let response = DeviceResponse {
                token: request.token.trim().to_string(),
                success_message: "Device registered for notifications".to_string(),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to register device", e),
    }
}

pub async fn unregister_device(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UnregisterDeviceRequest>,
) -> Response {
    info!(
        "DELETE /api/notifications/devices - token: {}",
        abbreviate_token(&request.token)
    );

    match state.notification_service.unregister_device(&request.token).await {
        Ok(()) => {
            let response = DeviceResponse {
                token: request.token.trim().to_string(),
                success_message: "Device unregistered".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to unregister device", e),
    }
}

/// Send an ad-hoc message to every registered device
pub async fn send_notification(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendNotificationRequest>,
) -> Response {
    info!("POST /api/notifications/send - title: {}", request.title);

    if request.title.trim().is_empty() {
        return bad_request("Title cannot be empty");
    }
    let mut message = PushMessage::new(request.title, request.body);
    message.link = request.link;

    match state.notification_service.broadcast(&message).await {
        Ok(result) => {
            let response = BroadcastResponse {
                sent: result.sent,
                failed: result.failed,
                removed: result.removed,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("Failed to send notification", e),
    }
}

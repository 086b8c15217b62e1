//! Firebase Cloud Messaging HTTP v1 sender.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{abbreviate_token, Messenger, PushMessage, SendOutcome};
use crate::backend::google::GoogleAuth;

const FCM_BASE_URL: &str = "https://fcm.googleapis.com";

#[derive(Clone)]
pub struct FcmMessenger {
    client: Client,
    auth: GoogleAuth,
    project_id: String,
    base_url: String,
}

impl FcmMessenger {
    pub fn new(client: Client, auth: GoogleAuth, project_id: impl Into<String>) -> Self {
        Self {
            client,
            auth,
            project_id: project_id.into(),
            base_url: FCM_BASE_URL.to_string(),
        }
    }

    fn send_url(&self) -> String {
        format!("{}/v1/projects/{}/messages:send", self.base_url, self.project_id)
    }
}

/// Request body for `messages:send`
pub fn message_body(token: &str, message: &PushMessage) -> Value {
    let mut body = json!({
        "message": {
            "token": token,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
        }
    });
    if let Some(link) = &message.link {
        body["message"]["webpush"] = json!({ "fcm_options": { "link": link } });
    }
    body
}

/// FCM answers 404 (or 400 with an `UNREGISTERED` error code) for tokens
/// belonging to uninstalled apps or expired registrations
pub fn is_unregistered(status: StatusCode, body: &str) -> bool {
    status == StatusCode::NOT_FOUND || body.contains("UNREGISTERED")
}

#[async_trait]
impl Messenger for FcmMessenger {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<SendOutcome> {
        let access_token = self.auth.access_token().await?;
        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&message_body(token, message))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("FCM delivered to {}", abbreviate_token(token));
            return Ok(SendOutcome::Delivered);
        }

        let body = response.text().await.unwrap_or_default();
        if is_unregistered(status, &body) {
            warn!("FCM reports {} as unregistered", abbreviate_token(token));
            return Ok(SendOutcome::Unregistered);
        }
        Err(anyhow!("FCM send failed with {}: {}", status, body))
    }
}

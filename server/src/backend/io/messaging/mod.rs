//! Outbound push messaging.
//!
//! [`Messenger`] sends one message to one device token. `FcmMessenger` talks
//! to Firebase Cloud Messaging; `LogMessenger` only logs, for running without
//! a Firebase project.

pub mod fcm;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

pub use fcm::FcmMessenger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Page to open when the notification is clicked
    pub link: Option<String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The token is no longer valid and should be forgotten
    Unregistered,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<SendOutcome>;
}

pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, token: &str, message: &PushMessage) -> Result<SendOutcome> {
        info!(
            "Push to {}: {} | {}",
            abbreviate_token(token),
            message.title,
            message.body
        );
        Ok(SendOutcome::Delivered)
    }
}

/// First few characters of a token, enough to tell devices apart in logs
pub fn abbreviate_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.len() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

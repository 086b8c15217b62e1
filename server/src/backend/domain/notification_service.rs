//! Push notifications to every registered device.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::commands::notifications::BroadcastResult;
use crate::backend::domain::fiscal_service::FiscalService;
use crate::backend::domain::goal_service::GoalService;
use crate::backend::domain::models::entry::HistoryEntry;
use crate::backend::domain::models::fiscal::FiscalPeriodKind;
use crate::backend::domain::BudgetError;
use crate::backend::io::messaging::{abbreviate_token, Messenger, PushMessage, SendOutcome};
use crate::backend::storage::traits::{DeviceToken, DeviceTokenStore};

#[derive(Clone)]
pub struct NotificationService {
    messenger: Arc<dyn Messenger>,
    tokens: Arc<dyn DeviceTokenStore>,
}

impl NotificationService {
    pub fn new(messenger: Arc<dyn Messenger>, tokens: Arc<dyn DeviceTokenStore>) -> Self {
        Self { messenger, tokens }
    }

    /// Send `message` to each stored token. Tokens the messenger reports as
    /// unregistered are removed; other send failures are only counted.
    pub async fn broadcast(&self, message: &PushMessage) -> Result<BroadcastResult> {
        let tokens = self.tokens.list_tokens().await?;
        let mut result = BroadcastResult::default();

        for device in &tokens {
            match self.messenger.send(&device.token, message).await {
                Ok(SendOutcome::Delivered) => result.sent += 1,
                Ok(SendOutcome::Unregistered) => {
                    result.failed += 1;
                    match self.tokens.remove_token(&device.token).await {
                        Ok(true) => result.removed += 1,
                        Ok(false) => {}
                        Err(e) => warn!(
                            "Could not remove stale token {}: {}",
                            abbreviate_token(&device.token),
                            e
                        ),
                    }
                }
                Err(e) => {
                    result.failed += 1;
                    warn!("Push to {} failed: {}", abbreviate_token(&device.token), e);
                }
            }
        }

        info!(
            "Broadcast '{}' to {} devices: {} sent, {} failed, {} removed",
            message.title,
            tokens.len(),
            result.sent,
            result.failed,
            result.removed
        );
        Ok(result)
    }

    pub async fn register_device(&self, token: &str, label: Option<&str>) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BudgetError::validation("Device token cannot be empty").into());
        }
        let label = label.map(str::trim).filter(|l| !l.is_empty());
        self.tokens.register_token(token, label).await
    }

    pub async fn unregister_device(&self, token: &str) -> Result<()> {
        if self.tokens.remove_token(token.trim()).await? {
            info!("Unregistered device {}", abbreviate_token(token));
            Ok(())
        } else {
            Err(BudgetError::not_found("Device token", abbreviate_token(token)).into())
        }
    }

    pub async fn devices(&self) -> Result<Vec<DeviceToken>> {
        self.tokens.list_tokens().await
    }
}

pub fn entry_added_message(entry: &HistoryEntry) -> PushMessage {
    let who = entry
        .paid_by
        .as_deref()
        .map(|name| format!(" by {}", name))
        .unwrap_or_default();
    let mut message = PushMessage::new(
        format!("New {}: ${:.2}", entry.kind.as_str().to_lowercase(), entry.amount),
        format!("{} ({}){} on {}", entry.description, entry.category, who, entry.date),
    );
    message.link = Some("/history".to_string());
    message
}

/// "What is left this week" summary for the scheduled weekly push
pub async fn weekly_summary(
    goal_service: &GoalService,
    fiscal_service: &FiscalService,
    today: NaiveDate,
) -> Result<PushMessage> {
    let goals = goal_service.goals().await?;
    let week = fiscal_service
        .period_for(FiscalPeriodKind::Week, today)
        .await?
        .map(|p| p.name)
        .unwrap_or_else(|| "This week".to_string());

    Ok(PushMessage::new(
        format!("{} budget", week),
        format!(
            "${:.2} left for the week, ${:.2} left for the month",
            goals.weekly, goals.monthly
        ),
    ))
}

//! History entries: expenses, refunds and income recorded in the History tab.
//!
//! Every create, update and delete is followed by a goal adjustment for the
//! current fiscal week and month. A failed adjustment is logged and reported
//! as `goals: None`; the row change itself stands.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::backend::domain::commands::history::{
    CreateHistoryEntryCommand, DeleteHistoryEntryResult, HistoryEntryResult, HistoryListQuery,
    HistoryListResult, UpdateHistoryEntryCommand,
};
use crate::backend::domain::goal_service::GoalService;
use crate::backend::domain::models::entry::HistoryEntry;
use crate::backend::domain::models::goal::Goals;
use crate::backend::domain::notification_service::{entry_added_message, NotificationService};
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;
use crate::backend::storage::repositories::HistoryRepository;

#[derive(Clone)]
pub struct HistoryService {
    repository: HistoryRepository,
    goal_service: GoalService,
    notifications: NotificationService,
    fixed_today: Option<NaiveDate>,
}

impl HistoryService {
    pub fn new(
        repository: HistoryRepository,
        goal_service: GoalService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            repository,
            goal_service,
            notifications,
            fixed_today: None,
        }
    }

    /// Pin "today" for goal adjustment instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Matching entries, newest first
    pub async fn list(&self, query: HistoryListQuery) -> Result<HistoryListResult> {
        info!("Listing history entries: {:?}", query);
        let mut entries: Vec<HistoryEntry> = self
            .repository
            .list_entries()
            .await?
            .into_iter()
            .filter(|e| matches_query(e, &query))
            .collect();

        // Later rows first among entries on the same day
        entries.reverse();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        let total_expenses = round_cents(
            entries
                .iter()
                .filter(|e| e.kind.is_expense())
                .map(|e| e.amount)
                .sum(),
        );
        let total_income = round_cents(
            entries
                .iter()
                .filter(|e| !e.kind.is_expense())
                .map(|e| e.amount)
                .sum(),
        );

        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }

        Ok(HistoryListResult {
            entries,
            total_expenses,
            total_income,
        })
    }

    pub async fn get(&self, id: &str) -> Result<HistoryEntry> {
        self.repository
            .get_entry(id)
            .await?
            .ok_or_else(|| BudgetError::not_found("History entry", id).into())
    }

    pub async fn create(&self, command: CreateHistoryEntryCommand) -> Result<HistoryEntryResult> {
        info!("Creating history entry: {:?}", command);

        let entry = HistoryEntry {
            id: HistoryEntry::generate_id(),
            date: command.date,
            amount: round_cents(command.amount),
            kind: command.kind,
            category: command.category.trim().to_string(),
            description: command.description.trim().to_string(),
            paid_by: clean_optional(command.paid_by),
            hsa: command.hsa,
            reimbursed: false,
            reimbursed_on: None,
        };
        entry.validate()?;

        self.repository.store_entry(&entry).await?;
        let goals = self.adjust_goals(None, Some(&entry)).await;

        if command.notify {
            let notifications = self.notifications.clone();
            let message = entry_added_message(&entry);
            tokio::spawn(async move {
                if let Err(e) = notifications.broadcast(&message).await {
                    error!("New-entry notification failed: {}", e);
                }
            });
        }

        info!("Created history entry {}", entry.id);
        Ok(HistoryEntryResult {
            entry,
            goals,
            success_message: "Entry added successfully".to_string(),
        })
    }

    pub async fn update(&self, command: UpdateHistoryEntryCommand) -> Result<HistoryEntryResult> {
        info!("Updating history entry: {:?}", command);
        let _edit = self.repository.lock_edits().await;
        let before = self.get(&command.id).await?;

        let mut after = before.clone();
        if let Some(date) = command.date {
            after.date = date;
        }
        if let Some(amount) = command.amount {
            after.amount = round_cents(amount);
        }
        if let Some(kind) = command.kind {
            after.kind = kind;
        }
        if let Some(category) = command.category {
            after.category = category.trim().to_string();
        }
        if let Some(description) = command.description {
            after.description = description.trim().to_string();
        }
        if command.paid_by.is_some() {
            after.paid_by = clean_optional(command.paid_by);
        }
        if let Some(hsa) = command.hsa {
            after.hsa = hsa;
        }
        after.validate()?;

        if !self.repository.update_entry(&after).await? {
            // Deleted between the read and the write
            return Err(BudgetError::not_found("History entry", &command.id).into());
        }
        let goals = self.adjust_goals(Some(&before), Some(&after)).await;

        info!("Updated history entry {}", after.id);
        Ok(HistoryEntryResult {
            entry: after,
            goals,
            success_message: "Entry updated successfully".to_string(),
        })
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteHistoryEntryResult> {
        info!("Deleting history entry {}", id);
        let _edit = self.repository.lock_edits().await;
        let deleted = self
            .repository
            .delete_entry(id)
            .await?
            .ok_or_else(|| BudgetError::not_found("History entry", id))?;
        let goals = self.adjust_goals(Some(&deleted), None).await;

        Ok(DeleteHistoryEntryResult {
            deleted_id: deleted.id,
            goals,
            success_message: "Entry deleted successfully".to_string(),
        })
    }

    async fn adjust_goals(
        &self,
        before: Option<&HistoryEntry>,
        after: Option<&HistoryEntry>,
    ) -> Option<Goals> {
        match self.goal_service.apply_change(before, after, self.today()).await {
            Ok(goals) => goals,
            Err(e) => {
                error!("Goal adjustment failed: {}", e);
                None
            }
        }
    }
}

fn matches_query(entry: &HistoryEntry, query: &HistoryListQuery) -> bool {
    if query.start.map_or(false, |start| entry.date < start) {
        return false;
    }
    if query.end.map_or(false, |end| entry.date > end) {
        return false;
    }
    if query.kind.map_or(false, |kind| entry.kind != kind) {
        return false;
    }
    if let Some(category) = &query.category {
        if !entry.category.eq_ignore_ascii_case(category.trim()) {
            return false;
        }
    }
    if query.hsa.map_or(false, |hsa| entry.hsa != hsa) {
        return false;
    }
    true
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

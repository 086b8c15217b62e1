//! Recurring income and expenses (paychecks, rent, subscriptions).
//!
//! Recurring items never touch the goal cells; they only feed the calendar
//! and forecast projections.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::backend::domain::commands::recurring::{
    CreateRecurringItemCommand, RecurringItemResult, UpdateRecurringItemCommand,
};
use crate::backend::domain::models::recurring::{RecurringItem, ScheduledOccurrence};
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;
use crate::backend::storage::repositories::RecurringRepository;

#[derive(Clone)]
pub struct RecurringService {
    repository: RecurringRepository,
}

impl RecurringService {
    pub fn new(repository: RecurringRepository) -> Self {
        Self { repository }
    }

    /// All items ordered by name
    pub async fn list(&self) -> Result<Vec<RecurringItem>> {
        let mut items = self.repository.list_items().await?;
        items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> Result<RecurringItem> {
        self.repository
            .get_item(id)
            .await?
            .ok_or_else(|| BudgetError::not_found("Recurring item", id).into())
    }

    pub async fn create(&self, command: CreateRecurringItemCommand) -> Result<RecurringItemResult> {
        info!("Creating recurring item: {:?}", command);
        let item = RecurringItem {
            id: RecurringItem::generate_id(),
            name: command.name.trim().to_string(),
            amount: round_cents(command.amount),
            kind: command.kind,
            frequency: command.frequency,
            start_date: command.start_date,
            end_date: command.end_date,
            category: command.category.trim().to_string(),
        };
        item.validate()?;
        self.repository.store_item(&item).await?;

        Ok(RecurringItemResult {
            item,
            success_message: "Recurring item added successfully".to_string(),
        })
    }

    pub async fn update(&self, command: UpdateRecurringItemCommand) -> Result<RecurringItemResult> {
        info!("Updating recurring item: {:?}", command);
        let _edit = self.repository.lock_edits().await;
        let mut item = self.get(&command.id).await?;

        if let Some(name) = command.name {
            item.name = name.trim().to_string();
        }
        if let Some(amount) = command.amount {
            item.amount = round_cents(amount);
        }
        if let Some(kind) = command.kind {
            item.kind = kind;
        }
        if let Some(frequency) = command.frequency {
            item.frequency = frequency;
        }
        if let Some(start) = command.start_date {
            item.start_date = start;
        }
        if command.clear_end_date {
            item.end_date = None;
        } else if let Some(end) = command.end_date {
            item.end_date = Some(end);
        }
        if let Some(category) = command.category {
            item.category = category.trim().to_string();
        }
        item.validate()?;

        if !self.repository.update_item(&item).await? {
            return Err(BudgetError::not_found("Recurring item", &command.id).into());
        }
        Ok(RecurringItemResult {
            item,
            success_message: "Recurring item updated successfully".to_string(),
        })
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        info!("Deleting recurring item {}", id);
        if !self.repository.delete_item(id).await? {
            return Err(BudgetError::not_found("Recurring item", id).into());
        }
        Ok(id.to_string())
    }

    /// Every occurrence of every item within `[from, to]`, by date then name
    pub async fn occurrences(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ScheduledOccurrence>> {
        if to < from {
            return Err(BudgetError::validation(format!(
                "Range end {} is before start {}",
                to, from
            ))
            .into());
        }

        let mut occurrences: Vec<ScheduledOccurrence> = self
            .repository
            .list_items()
            .await?
            .iter()
            .flat_map(|item| {
                item.occurrences_between(from, to)
                    .into_iter()
                    .map(move |date| ScheduledOccurrence {
                        recurring_id: item.id.clone(),
                        name: item.name.clone(),
                        date,
                        amount: item.amount,
                        kind: item.kind,
                    })
            })
            .collect();
        occurrences.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(occurrences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::entry::EntryKind;
    use crate::backend::domain::models::recurring::Frequency;
    use crate::backend::storage::csv::test_utils::{date, TestEnvironment};

    fn paycheck() -> CreateRecurringItemCommand {
        CreateRecurringItemCommand {
            name: "Paycheck".to_string(),
            amount: 2500.0,
            kind: EntryKind::Income,
            frequency: Frequency::Biweekly,
            start_date: date(2025, 1, 3),
            end_date: None,
            category: "Salary".to_string(),
        }
    }

    fn rent() -> CreateRecurringItemCommand {
        CreateRecurringItemCommand {
            name: "Rent".to_string(),
            amount: 1800.0,
            kind: EntryKind::Expense,
            frequency: Frequency::Monthly,
            start_date: date(2025, 1, 1),
            end_date: None,
            category: "Housing".to_string(),
        }
    }

    async fn setup() -> (RecurringService, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        (RecurringService::new(RecurringRepository::new(env.tables.clone())), env)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_partial_updates_all_stick() {
        let (service, _env) = setup().await;
        let created = service.create(rent()).await.unwrap().item;
        service.create(paycheck()).await.unwrap();

        let renamed = {
            let service = service.clone();
            let id = created.id.clone();
            tokio::spawn(async move {
                service
                    .update(UpdateRecurringItemCommand {
                        id,
                        name: Some("Mortgage".to_string()),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
            })
        };
        let repriced = {
            let service = service.clone();
            let id = created.id.clone();
            tokio::spawn(async move {
                service
                    .update(UpdateRecurringItemCommand {
                        id,
                        amount: Some(1900.0),
                        ..Default::default()
                    })
                    .await
                    .unwrap()
            })
        };
        renamed.await.unwrap();
        repriced.await.unwrap();

        let stored = service.get(&created.id).await.unwrap();
        assert_eq!(stored.name, "Mortgage");
        assert_eq!(stored.amount, 1900.0);
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let (service, _env) = setup().await;
        let created = service.create(paycheck()).await.unwrap().item;

        let updated = service
            .update(UpdateRecurringItemCommand {
                id: created.id.clone(),
                end_date: Some(date(2025, 6, 30)),
                amount: Some(2600.0),
                ..Default::default()
            })
            .await
            .unwrap()
            .item;
        assert_eq!(updated.end_date, Some(date(2025, 6, 30)));
        assert_eq!(updated.amount, 2600.0);

        let cleared = service
            .update(UpdateRecurringItemCommand {
                id: created.id.clone(),
                clear_end_date: true,
                ..Default::default()
            })
            .await
            .unwrap()
            .item;
        assert_eq!(cleared.end_date, None);
        assert_eq!(service.get(&created.id).await.unwrap(), cleared);
    }

    #[tokio::test]
    async fn test_validation() {
        let (service, _env) = setup().await;

        let mut refund = paycheck();
        refund.kind = EntryKind::Refund;
        assert!(service.create(refund).await.is_err());

        let mut reversed = paycheck();
        reversed.end_date = Some(date(2024, 12, 1));
        assert!(service.create(reversed).await.is_err());

        let created = service.create(paycheck()).await.unwrap().item;
        let err = service
            .update(UpdateRecurringItemCommand {
                id: created.id,
                end_date: Some(date(2024, 1, 1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BudgetError>(),
            Some(BudgetError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let (service, _env) = setup().await;
        let created = service.create(rent()).await.unwrap().item;
        assert_eq!(service.delete(&created.id).await.unwrap(), created.id);
        assert!(service.delete(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_occurrences_sorted_across_items() {
        let (service, _env) = setup().await;
        service.create(paycheck()).await.unwrap();
        service.create(rent()).await.unwrap();

        let occurrences = service
            .occurrences(date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();
        let summary: Vec<(NaiveDate, &str)> = occurrences
            .iter()
            .map(|o| (o.date, o.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (date(2025, 1, 1), "Rent"),
                (date(2025, 1, 3), "Paycheck"),
                (date(2025, 1, 17), "Paycheck"),
                (date(2025, 1, 31), "Paycheck"),
            ]
        );
        assert!(service.occurrences(date(2025, 2, 1), date(2025, 1, 1)).await.is_err());
    }
}

//! Cash-flow forecast from recurring items.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::info;

use crate::backend::domain::commands::forecast::{ForecastDay, ForecastQuery, ForecastResult};
use crate::backend::domain::models::recurring::ScheduledOccurrence;
use crate::backend::domain::recurring_service::RecurringService;
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;

pub const MAX_FORECAST_DAYS: u32 = 366;

#[derive(Clone)]
pub struct ForecastService {
    recurring: RecurringService,
}

impl ForecastService {
    pub fn new(recurring: RecurringService) -> Self {
        Self { recurring }
    }

    /// Day-by-day balance starting at `from`. `days` above the cap is
    /// clamped to [`MAX_FORECAST_DAYS`].
    pub async fn forecast(&self, query: ForecastQuery) -> Result<ForecastResult> {
        if !query.start_balance.is_finite() {
            return Err(BudgetError::validation("Start balance must be a number").into());
        }
        if query.days == 0 {
            return Err(BudgetError::validation("Forecast must cover at least one day").into());
        }
        let days = query.days.min(MAX_FORECAST_DAYS);
        let to = query
            .from
            .checked_add_signed(Duration::days(days as i64 - 1))
            .ok_or_else(|| {
                BudgetError::validation(format!(
                    "A {} day forecast from {} runs past the last supported date",
                    days, query.from
                ))
            })?;
        info!("Forecasting {} days from {}", days, query.from);

        let occurrences = self.recurring.occurrences(query.from, to).await?;
        Ok(project(query.start_balance, query.from, days, occurrences))
    }
}

fn project(
    start_balance: f64,
    from: NaiveDate,
    days: u32,
    occurrences: Vec<ScheduledOccurrence>,
) -> ForecastResult {
    let mut by_date: BTreeMap<NaiveDate, Vec<ScheduledOccurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        by_date.entry(occurrence.date).or_default().push(occurrence);
    }

    let mut balance = start_balance;
    let mut lowest_balance = start_balance;
    let mut lowest_balance_date = from;
    let mut points = Vec::with_capacity(days as usize);

    // The caller has checked that `days` fits before the last representable date
    for date in from.iter_days().take(days as usize) {
        let items = by_date.remove(&date).unwrap_or_default();
        balance = round_cents(balance + items.iter().map(ScheduledOccurrence::signed_amount).sum::<f64>());
        if balance < lowest_balance {
            lowest_balance = balance;
            lowest_balance_date = date;
        }
        points.push(ForecastDay {
            date,
            balance,
            items,
        });
    }

    ForecastResult {
        start_balance,
        ending_balance: balance,
        lowest_balance,
        lowest_balance_date,
        days: points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::recurring::CreateRecurringItemCommand;
    use crate::backend::domain::models::entry::EntryKind;
    use crate::backend::domain::models::recurring::Frequency;
    use crate::backend::storage::csv::test_utils::{date, TestEnvironment};
    use crate::backend::storage::repositories::RecurringRepository;

    async fn setup() -> (ForecastService, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let recurring = RecurringService::new(RecurringRepository::new(env.tables.clone()));
        recurring
            .create(CreateRecurringItemCommand {
                name: "Rent".to_string(),
                amount: 1800.0,
                kind: EntryKind::Expense,
                frequency: Frequency::Monthly,
                start_date: date(2025, 1, 1),
                end_date: None,
                category: "Housing".to_string(),
            })
            .await
            .unwrap();
        recurring
            .create(CreateRecurringItemCommand {
                name: "Paycheck".to_string(),
                amount: 1000.0,
                kind: EntryKind::Income,
                frequency: Frequency::Biweekly,
                start_date: date(2025, 1, 3),
                end_date: None,
                category: "Salary".to_string(),
            })
            .await
            .unwrap();
        (ForecastService::new(recurring), env)
    }

    #[tokio::test]
    async fn test_forecast_tracks_lowest_balance() {
        let (service, _env) = setup().await;
        let result = service
            .forecast(ForecastQuery {
                start_balance: 1000.0,
                from: date(2025, 1, 1),
                days: 31,
            })
            .await
            .unwrap();

        assert_eq!(result.days.len(), 31);
        assert_eq!(result.days[0].balance, -800.0);
        assert_eq!(result.lowest_balance, -800.0);
        assert_eq!(result.lowest_balance_date, date(2025, 1, 1));
        // Paychecks on the 3rd, 17th and 31st
        assert_eq!(result.ending_balance, 2200.0);
        assert_eq!(result.days[2].items[0].name, "Paycheck");
    }

    #[tokio::test]
    async fn test_forecast_without_items_is_flat() {
        let env = TestEnvironment::new().await.unwrap();
        let service = ForecastService::new(RecurringService::new(RecurringRepository::new(
            env.tables.clone(),
        )));
        let result = service
            .forecast(ForecastQuery {
                start_balance: 50.0,
                from: date(2025, 1, 1),
                days: 3,
            })
            .await
            .unwrap();
        assert!(result.days.iter().all(|d| d.balance == 50.0));
        assert_eq!(result.lowest_balance_date, date(2025, 1, 1));
    }

    #[tokio::test]
    async fn test_days_are_capped_and_validated() {
        let (service, _env) = setup().await;
        let capped = service
            .forecast(ForecastQuery {
                start_balance: 0.0,
                from: date(2025, 1, 1),
                days: 5000,
            })
            .await
            .unwrap();
        assert_eq!(capped.days.len(), MAX_FORECAST_DAYS as usize);

        assert!(service
            .forecast(ForecastQuery {
                start_balance: 0.0,
                from: date(2025, 1, 1),
                days: 0,
            })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_range_past_last_date_is_invalid() {
        let (service, _env) = setup().await;
        let near_end = NaiveDate::MAX - Duration::days(10);
        let err = service
            .forecast(ForecastQuery {
                start_balance: 0.0,
                from: near_end,
                days: 30,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BudgetError>(),
            Some(BudgetError::Validation(_))
        ));
    }
}

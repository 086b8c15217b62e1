//! Goal adjuster.
//!
//! The workbook keeps two goal cells: what is left to spend this fiscal week
//! and this fiscal month. Every history change moves those cells by the
//! difference between the entry's old and new contribution, so the cells
//! stay consistent with the History tab without re-summing it.
//!
//! A contribution is the entry's signed amount (expenses negative) when its
//! date falls inside the period, and zero otherwise:
//!
//! ```text
//! goal' = goal - contribution(before) + contribution(after)
//! ```
//!
//! Each adjustment reads and rewrites the cells under one lock shared by
//! every clone of the service, so concurrent changes never lose a delta.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::backend::domain::fiscal_service::FiscalService;
use crate::backend::domain::models::entry::HistoryEntry;
use crate::backend::domain::models::fiscal::FiscalPeriod;
use crate::backend::domain::models::goal::{GoalKind, Goals};
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;
use crate::backend::storage::repositories::GoalRepository;

#[derive(Clone)]
pub struct GoalService {
    repository: GoalRepository,
    fiscal_service: FiscalService,
    cells: Arc<Mutex<()>>,
}

impl GoalService {
    pub fn new(repository: GoalRepository, fiscal_service: FiscalService) -> Self {
        Self {
            repository,
            fiscal_service,
            cells: Arc::new(Mutex::new(())),
        }
    }

    pub async fn goals(&self) -> Result<Goals> {
        self.repository.get_goals().await
    }

    /// Overwrite one goal cell. Negative values are allowed (overspent).
    pub async fn set_goal(&self, kind: GoalKind, amount: f64) -> Result<Goals> {
        if !amount.is_finite() {
            return Err(BudgetError::validation("Goal must be a finite number").into());
        }
        let _guard = self.cells.lock().await;
        self.repository.set_goal(kind, round_cents(amount)).await?;
        self.goals().await
    }

    /// Adjust both goal cells for a history change made `today`.
    ///
    /// `before` is the stored entry prior to the change (`None` on create),
    /// `after` the stored entry once it is done (`None` on delete). Returns
    /// the goals after adjustment, or `None` when today is outside every
    /// fiscal period and nothing was touched.
    pub async fn apply_change(
        &self,
        before: Option<&HistoryEntry>,
        after: Option<&HistoryEntry>,
        today: NaiveDate,
    ) -> Result<Option<Goals>> {
        let calendar = self.fiscal_service.calendar().await?;
        let position = calendar.resolve(today);
        if position.is_empty() {
            warn!("No fiscal period contains {}; goals left unchanged", today);
            return Ok(None);
        }

        let _guard = self.cells.lock().await;
        for kind in GoalKind::ALL {
            let Some(period) = position.period(kind.period_kind()) else {
                warn!("No fiscal {} period contains {}", kind.period_kind(), today);
                continue;
            };
            if !touches_period(before, period) && !touches_period(after, period) {
                continue;
            }

            let goal = self.repository.get_goal(kind).await?;
            let adjusted = adjusted_goal(goal, before, after, period);
            if adjusted != goal {
                self.repository.set_goal(kind, adjusted).await?;
                info!(
                    "Adjusted {} goal for {} from {:.2} to {:.2}",
                    kind, period.name, goal, adjusted
                );
            }
        }

        Ok(Some(self.goals().await?))
    }
}

fn touches_period(entry: Option<&HistoryEntry>, period: &FiscalPeriod) -> bool {
    entry.map_or(false, |e| period.contains(e.date))
}

/// Signed amount of `entry` if it falls inside `period`, else zero
pub fn contribution(entry: Option<&HistoryEntry>, period: &FiscalPeriod) -> f64 {
    match entry {
        Some(e) if period.contains(e.date) => e.signed_amount(),
        _ => 0.0,
    }
}

/// New goal value after replacing `before` with `after`, rounded to cents
pub fn adjusted_goal(
    goal: f64,
    before: Option<&HistoryEntry>,
    after: Option<&HistoryEntry>,
    period: &FiscalPeriod,
) -> f64 {
    round_cents(goal - contribution(before, period) + contribution(after, period))
}

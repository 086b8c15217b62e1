use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::info;

use crate::backend::domain::models::goal::{GoalKind, Goals};
use crate::backend::storage::a1::CellRef;
use crate::backend::storage::cell_values::{format_amount, parse_amount};
use crate::backend::storage::traits::SheetStore;

/// The two single-cell goals (remaining weekly and monthly budget)
#[derive(Clone)]
pub struct GoalRepository {
    store: Arc<dyn SheetStore>,
    weekly_cell: CellRef,
    monthly_cell: CellRef,
}

impl GoalRepository {
    pub fn new(store: Arc<dyn SheetStore>, weekly_cell: CellRef, monthly_cell: CellRef) -> Self {
        Self {
            store,
            weekly_cell,
            monthly_cell,
        }
    }

    pub fn cell(&self, kind: GoalKind) -> &CellRef {
        match kind {
            GoalKind::Weekly => &self.weekly_cell,
            GoalKind::Monthly => &self.monthly_cell,
        }
    }

    /// An empty goal cell reads as zero
    pub async fn get_goal(&self, kind: GoalKind) -> Result<f64> {
        let cell = self.cell(kind);
        match self.store.read_cell(cell).await? {
            Some(text) => {
                parse_amount(&text).ok_or_else(|| anyhow!("Goal cell {} holds '{}', not a number", cell, text))
            }
            None => Ok(0.0),
        }
    }

    pub async fn get_goals(&self) -> Result<Goals> {
        Ok(Goals {
            weekly: self.get_goal(GoalKind::Weekly).await?,
            monthly: self.get_goal(GoalKind::Monthly).await?,
        })
    }

    pub async fn set_goal(&self, kind: GoalKind, value: f64) -> Result<()> {
        let cell = self.cell(kind);
        self.store.write_cell(cell, &format_amount(value)).await?;
        info!("Set {} goal in {} to {:.2}", kind, cell, value);
        Ok(())
    }
}

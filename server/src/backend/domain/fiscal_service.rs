//! Fiscal period resolver.
//!
//! The `Fiscal` tab is read once and kept as an immutable calendar; lookups
//! scan it in sheet order. `refresh` swaps in a freshly read copy.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::backend::domain::models::fiscal::{
    FiscalCalendar, FiscalPeriod, FiscalPeriodKind, FiscalPosition,
};
use crate::backend::domain::BudgetError;
use crate::backend::storage::repositories::FiscalRepository;

#[derive(Clone)]
pub struct FiscalService {
    repository: FiscalRepository,
    calendar: Arc<RwLock<Option<Arc<FiscalCalendar>>>>,
}

impl FiscalService {
    pub fn new(repository: FiscalRepository) -> Self {
        Self {
            repository,
            calendar: Arc::new(RwLock::new(None)),
        }
    }

    /// The cached calendar, loading it on first use
    pub async fn calendar(&self) -> Result<Arc<FiscalCalendar>> {
        if let Some(calendar) = self.calendar.read().await.as_ref() {
            return Ok(calendar.clone());
        }

        let mut slot = self.calendar.write().await;
        // Another task may have loaded it while we waited for the lock
        if let Some(calendar) = slot.as_ref() {
            return Ok(calendar.clone());
        }
        let calendar = Arc::new(self.repository.load_calendar().await?);
        info!("Loaded {} fiscal periods", calendar.len());
        *slot = Some(calendar.clone());
        Ok(calendar)
    }

    /// Re-read the Fiscal tab. Returns the number of periods now cached.
    pub async fn refresh(&self) -> Result<usize> {
        let calendar = Arc::new(self.repository.load_calendar().await?);
        let count = calendar.len();
        *self.calendar.write().await = Some(calendar);
        info!("Refreshed fiscal calendar: {} periods", count);
        Ok(count)
    }

    pub async fn list(&self) -> Result<Vec<FiscalPeriod>> {
        Ok(self.calendar().await?.periods().to_vec())
    }

    /// Year, month and week containing `date`. Fails with
    /// [`BudgetError::NoFiscalPeriod`] when no period of any kind does.
    pub async fn resolve(&self, date: NaiveDate) -> Result<FiscalPosition> {
        let position = self.calendar().await?.resolve(date);
        if position.is_empty() {
            return Err(BudgetError::NoFiscalPeriod(date).into());
        }
        debug!("Resolved {} to {:?}", date, position);
        Ok(position)
    }

    pub async fn period_for(
        &self,
        kind: FiscalPeriodKind,
        date: NaiveDate,
    ) -> Result<Option<FiscalPeriod>> {
        Ok(self.calendar().await?.find(kind, date).cloned())
    }

    pub async fn current(&self) -> Result<FiscalPosition> {
        self.resolve(Local::now().date_naive()).await
    }
}

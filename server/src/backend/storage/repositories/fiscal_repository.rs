use anyhow::{anyhow, Result};
use tracing::warn;

use crate::backend::domain::models::fiscal::{FiscalCalendar, FiscalPeriod, FiscalPeriodKind};
use crate::backend::storage::cell_values::parse_date;
use crate::backend::storage::sheets::{SheetData, SheetRecord, SheetTables};

pub const FISCAL_SHEET: &str = "Fiscal";
pub const FISCAL_COLUMNS: [&str; 4] = ["TYPE", "NAME", "START DATE", "END DATE"];

/// Read-only access to the fiscal period table
#[derive(Clone)]
pub struct FiscalRepository {
    tables: SheetTables,
}

impl FiscalRepository {
    pub fn new(tables: SheetTables) -> Self {
        Self { tables }
    }

    /// Load every period in sheet order
    pub async fn load_calendar(&self) -> Result<FiscalCalendar> {
        let data = self.tables.get_sheet_data(FISCAL_SHEET).await?;
        data.mapping.require(FISCAL_SHEET, &FISCAL_COLUMNS)?;

        let mut periods = Vec::with_capacity(data.records.len());
        for record in &data.records {
            match Self::from_record(&data, record) {
                Ok(period) => periods.push(period),
                Err(e) => warn!("Skipping {} row {}: {}", FISCAL_SHEET, record.row_number, e),
            }
        }
        Ok(FiscalCalendar::new(periods))
    }

    fn from_record(data: &SheetData, record: &SheetRecord) -> Result<FiscalPeriod> {
        let get = |column: &str| data.value(record, column);
        let kind: FiscalPeriodKind = get("TYPE").ok_or_else(|| anyhow!("missing TYPE"))?.parse()?;
        let start_text = get("START DATE").ok_or_else(|| anyhow!("missing START DATE"))?;
        let end_text = get("END DATE").ok_or_else(|| anyhow!("missing END DATE"))?;
        let start_date =
            parse_date(start_text).ok_or_else(|| anyhow!("bad START DATE '{}'", start_text))?;
        let end_date = parse_date(end_text).ok_or_else(|| anyhow!("bad END DATE '{}'", end_text))?;
        if end_date < start_date {
            return Err(anyhow!("END DATE {} is before START DATE {}", end_date, start_date));
        }

        Ok(FiscalPeriod {
            kind,
            name: get("NAME").unwrap_or_default().to_string(),
            start_date,
            end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::storage::traits::SheetStore;

    #[tokio::test]
    async fn test_load_seeded_calendar() {
        let env = TestEnvironment::new().await.unwrap();
        let calendar = FiscalRepository::new(env.tables.clone())
            .load_calendar()
            .await
            .unwrap();
        assert!(!calendar.is_empty());
        assert_eq!(calendar.periods()[0].kind, FiscalPeriodKind::Year);
    }

    #[tokio::test]
    async fn test_reversed_rows_are_skipped() {
        let env = TestEnvironment::empty().await.unwrap();
        env.workbook.ensure_sheet(FISCAL_SHEET, &FISCAL_COLUMNS).await.unwrap();
        let row = |v: [&str; 4]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        env.workbook
            .append_row(FISCAL_SHEET, &row(["week", "W1", "2025-01-05", "2025-01-11"]))
            .await
            .unwrap();
        env.workbook
            .append_row(FISCAL_SHEET, &row(["week", "Bad", "2025-01-11", "2025-01-05"]))
            .await
            .unwrap();

        let calendar = FiscalRepository::new(env.tables.clone())
            .load_calendar()
            .await
            .unwrap();
        assert_eq!(calendar.len(), 1);
        assert_eq!(calendar.periods()[0].name, "W1");
    }
}

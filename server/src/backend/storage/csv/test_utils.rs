/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// `TestEnvironment` owns a temporary workbook directory that is removed when
/// it goes out of scope, even if the test panics.
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::CsvWorkbook;
use super::seed_budget_workbook;
use crate::backend::storage::a1::CellRef;
use crate::backend::storage::cell_values::format_date;
use crate::backend::storage::repositories::{GoalRepository, FISCAL_SHEET};
use crate::backend::storage::sheets::SheetTables;
use crate::backend::storage::traits::SheetStore;

pub const WEEKLY_GOAL_CELL: &str = "Goals!B2";
pub const MONTHLY_GOAL_CELL: &str = "Goals!B3";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub workbook: CsvWorkbook,
    pub tables: SheetTables,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    /// A workbook with every sheet, a fiscal calendar for the first quarter
    /// of FY2025 and goals of 200 (weekly) / 800 (monthly).
    ///
    /// FY2025 starts Sunday 2024-12-29. Months: Jan 12/29-1/25, Feb
    /// 1/26-2/22, Mar 2/23-3/29. Weeks W1..W13 run Sunday to Saturday.
    pub async fn new() -> Result<Self> {
        let env = Self::empty().await?;
        let weekly: CellRef = WEEKLY_GOAL_CELL.parse()?;
        let monthly: CellRef = MONTHLY_GOAL_CELL.parse()?;

        env.workbook.ensure_sheet("Goals", &["GOAL", "AMOUNT"]).await?;
        seed_budget_workbook(&env.workbook, &[&weekly, &monthly]).await?;
        env.workbook.write_cell(&CellRef::new("Goals", 2, 0), "Weekly").await?;
        env.workbook.write_cell(&weekly, "200.00").await?;
        env.workbook.write_cell(&CellRef::new("Goals", 3, 0), "Monthly").await?;
        env.workbook.write_cell(&monthly, "800.00").await?;

        for row in fiscal_rows() {
            env.workbook.append_row(FISCAL_SHEET, &row).await?;
        }
        Ok(env)
    }

    /// A workbook directory with no sheets at all
    pub async fn empty() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let workbook = CsvWorkbook::new(&base_path)?;
        let tables = SheetTables::new(Arc::new(workbook.clone()));

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            workbook,
            tables,
            base_path,
        })
    }

    pub fn store(&self) -> Arc<dyn SheetStore> {
        self.tables.store().clone()
    }

    pub fn goal_repository(&self) -> GoalRepository {
        GoalRepository::new(
            self.store(),
            WEEKLY_GOAL_CELL.parse().unwrap(),
            MONTHLY_GOAL_CELL.parse().unwrap(),
        )
    }
}

fn fiscal_rows() -> Vec<Vec<String>> {
    let row = |kind: &str, name: String, start: NaiveDate, end: NaiveDate| {
        vec![kind.to_string(), name, format_date(start), format_date(end)]
    };

    let mut rows = vec![row("Year", "FY2025".to_string(), date(2024, 12, 29), date(2025, 12, 27))];
    rows.push(row("Month", "January".to_string(), date(2024, 12, 29), date(2025, 1, 25)));
    rows.push(row("Month", "February".to_string(), date(2025, 1, 26), date(2025, 2, 22)));
    rows.push(row("Month", "March".to_string(), date(2025, 2, 23), date(2025, 3, 29)));

    let mut start = date(2024, 12, 29);
    for week in 1..=13 {
        let end = start + Duration::days(6);
        rows.push(row("Week", format!("W{}", week), start, end));
        start = end + Duration::days(1);
    }
    rows
}

//! Local workbook backend: one CSV file per sheet.

pub mod connection;
#[cfg(test)]
pub mod test_utils;

pub use connection::CsvWorkbook;

use anyhow::Result;
use tracing::info;

use crate::backend::storage::a1::CellRef;
use crate::backend::storage::device_tokens::{DEVICES_COLUMNS, DEVICES_SHEET};
use crate::backend::storage::repositories::{
    FISCAL_COLUMNS, FISCAL_SHEET, HISTORY_COLUMNS, HISTORY_SHEET, RECURRING_COLUMNS,
    RECURRING_SHEET,
};
use crate::backend::storage::traits::SheetStore;

/// Give a fresh local workbook the sheets and goal cells the app expects
pub async fn seed_budget_workbook(
    workbook: &CsvWorkbook,
    goal_cells: &[&CellRef],
) -> Result<()> {
    workbook.ensure_sheet(HISTORY_SHEET, &HISTORY_COLUMNS).await?;
    workbook.ensure_sheet(RECURRING_SHEET, &RECURRING_COLUMNS).await?;
    workbook.ensure_sheet(FISCAL_SHEET, &FISCAL_COLUMNS).await?;
    workbook.ensure_sheet(DEVICES_SHEET, &DEVICES_COLUMNS).await?;

    for cell in goal_cells {
        if workbook.read_cell(cell).await?.is_none() {
            workbook.write_cell(cell, "0.00").await?;
            info!("Initialised empty goal cell {}", cell);
        }
    }
    Ok(())
}

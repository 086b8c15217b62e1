use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::backend::domain::models::entry::{EntryKind, HistoryEntry};
use crate::backend::storage::cell_values::{
    format_amount, format_bool, format_date, parse_amount, parse_bool, parse_date,
};
use crate::backend::storage::column_mapping::{fields, FieldValues};
use crate::backend::storage::sheets::{SheetData, SheetRecord, SheetTables};

pub const HISTORY_SHEET: &str = "History";
pub const HISTORY_COLUMNS: [&str; 10] = [
    "ID",
    "DATE",
    "AMOUNT",
    "TYPE",
    "CATEGORY",
    "DESCRIPTION",
    "PAID BY",
    "HSA",
    "REIMBURSED",
    "REIMBURSED DATE",
];
const REQUIRED_COLUMNS: [&str; 4] = ["ID", "DATE", "AMOUNT", "TYPE"];

/// History sheet access: one row per expense, refund or income
#[derive(Clone)]
pub struct HistoryRepository {
    tables: SheetTables,
    edits: Arc<Mutex<()>>,
}

impl HistoryRepository {
    pub fn new(tables: SheetTables) -> Self {
        Self {
            tables,
            edits: Arc::new(Mutex::new(())),
        }
    }

    /// Held by read-modify-write callers so an entry is not edited from a
    /// stale copy. Shared by every clone of the repository.
    pub async fn lock_edits(&self) -> OwnedMutexGuard<()> {
        self.edits.clone().lock_owned().await
    }

    /// All parseable entries in sheet order. Broken rows are skipped.
    pub async fn list_entries(&self) -> Result<Vec<HistoryEntry>> {
        let data = self.tables.get_sheet_data(HISTORY_SHEET).await?;
        data.mapping.require(HISTORY_SHEET, &REQUIRED_COLUMNS)?;

        let mut entries = Vec::with_capacity(data.records.len());
        for record in &data.records {
            match Self::from_record(&data, record) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping {} row {}: {}", HISTORY_SHEET, record.row_number, e),
            }
        }
        Ok(entries)
    }

    pub async fn get_entry(&self, id: &str) -> Result<Option<HistoryEntry>> {
        match self.tables.find_record(HISTORY_SHEET, "ID", id).await? {
            Some((data, record)) => Ok(Some(Self::from_record(&data, &record)?)),
            None => Ok(None),
        }
    }

    pub async fn store_entry(&self, entry: &HistoryEntry) -> Result<()> {
        self.tables
            .append_data_to_sheet(HISTORY_SHEET, &Self::to_fields(entry))
            .await?;
        info!("Stored history entry {}", entry.id);
        Ok(())
    }

    /// Returns false when no row carries the entry's id
    pub async fn update_entry(&self, entry: &HistoryEntry) -> Result<bool> {
        let updated = self
            .tables
            .update_record(HISTORY_SHEET, "ID", &entry.id, &Self::to_fields(entry))
            .await?;
        Ok(updated.is_some())
    }

    /// Remove the entry's row, returning what it held
    pub async fn delete_entry(&self, id: &str) -> Result<Option<HistoryEntry>> {
        match self.tables.delete_record(HISTORY_SHEET, "ID", id).await? {
            Some((data, record)) => Ok(Some(Self::from_record(&data, &record)?)),
            None => Ok(None),
        }
    }

    pub fn to_fields(entry: &HistoryEntry) -> FieldValues {
        fields([
            ("ID", entry.id.clone()),
            ("DATE", format_date(entry.date)),
            ("AMOUNT", format_amount(entry.amount)),
            ("TYPE", entry.kind.to_string()),
            ("CATEGORY", entry.category.clone()),
            ("DESCRIPTION", entry.description.clone()),
            ("PAID BY", entry.paid_by.clone().unwrap_or_default()),
            ("HSA", format_bool(entry.hsa)),
            ("REIMBURSED", format_bool(entry.reimbursed)),
            (
                "REIMBURSED DATE",
                entry.reimbursed_on.map(format_date).unwrap_or_default(),
            ),
        ])
    }

    pub fn from_record(data: &SheetData, record: &SheetRecord) -> Result<HistoryEntry> {
        let get = |column: &str| data.value(record, column);
        let id = get("ID").ok_or_else(|| anyhow!("missing ID"))?;
        let date_text = get("DATE").ok_or_else(|| anyhow!("missing DATE"))?;
        let date = parse_date(date_text).ok_or_else(|| anyhow!("bad DATE '{}'", date_text))?;
        let amount_text = get("AMOUNT").ok_or_else(|| anyhow!("missing AMOUNT"))?;
        let amount = parse_amount(amount_text)
            .ok_or_else(|| anyhow!("bad AMOUNT '{}'", amount_text))?
            .abs();
        let kind: EntryKind = get("TYPE").ok_or_else(|| anyhow!("missing TYPE"))?.parse()?;

        Ok(HistoryEntry {
            id: id.to_string(),
            date,
            amount,
            kind,
            category: get("CATEGORY").unwrap_or_default().to_string(),
            description: get("DESCRIPTION").unwrap_or_default().to_string(),
            paid_by: get("PAID BY").map(str::to_string),
            hsa: get("HSA").and_then(parse_bool).unwrap_or(false),
            reimbursed: get("REIMBURSED").and_then(parse_bool).unwrap_or(false),
            reimbursed_on: get("REIMBURSED DATE").and_then(parse_date),
        })
    }
}

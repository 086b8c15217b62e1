use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::backend::domain::models::entry::EntryKind;
use crate::backend::domain::models::recurring::{Frequency, RecurringItem};
use crate::backend::storage::cell_values::{format_amount, format_date, parse_amount, parse_date};
use crate::backend::storage::column_mapping::{fields, FieldValues};
use crate::backend::storage::sheets::{SheetData, SheetRecord, SheetTables};

pub const RECURRING_SHEET: &str = "Recurring";
pub const RECURRING_COLUMNS: [&str; 8] = [
    "ID",
    "NAME",
    "AMOUNT",
    "TYPE",
    "FREQUENCY",
    "START DATE",
    "END DATE",
    "CATEGORY",
];
const REQUIRED_COLUMNS: [&str; 5] = ["ID", "AMOUNT", "TYPE", "FREQUENCY", "START DATE"];

#[derive(Clone)]
pub struct RecurringRepository {
    tables: SheetTables,
    edits: Arc<Mutex<()>>,
}

impl RecurringRepository {
    pub fn new(tables: SheetTables) -> Self {
        Self {
            tables,
            edits: Arc::new(Mutex::new(())),
        }
    }

    /// Held while an item is read, merged and written back
    pub async fn lock_edits(&self) -> OwnedMutexGuard<()> {
        self.edits.clone().lock_owned().await
    }

    pub async fn list_items(&self) -> Result<Vec<RecurringItem>> {
        let data = self.tables.get_sheet_data(RECURRING_SHEET).await?;
        data.mapping.require(RECURRING_SHEET, &REQUIRED_COLUMNS)?;

        let mut items = Vec::with_capacity(data.records.len());
        for record in &data.records {
            match Self::from_record(&data, record) {
                Ok(item) => items.push(item),
                Err(e) => warn!("Skipping {} row {}: {}", RECURRING_SHEET, record.row_number, e),
            }
        }
        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> Result<Option<RecurringItem>> {
        match self.tables.find_record(RECURRING_SHEET, "ID", id).await? {
            Some((data, record)) => Ok(Some(Self::from_record(&data, &record)?)),
            None => Ok(None),
        }
    }

    pub async fn store_item(&self, item: &RecurringItem) -> Result<()> {
        self.tables
            .append_data_to_sheet(RECURRING_SHEET, &Self::to_fields(item))
            .await?;
        info!("Stored recurring item {}", item.id);
        Ok(())
    }

    pub async fn update_item(&self, item: &RecurringItem) -> Result<bool> {
        let updated = self
            .tables
            .update_record(RECURRING_SHEET, "ID", &item.id, &Self::to_fields(item))
            .await?;
        Ok(updated.is_some())
    }

    pub async fn delete_item(&self, id: &str) -> Result<bool> {
        let deleted = self.tables.delete_record(RECURRING_SHEET, "ID", id).await?;
        Ok(deleted.is_some())
    }

    pub fn to_fields(item: &RecurringItem) -> FieldValues {
        fields([
            ("ID", item.id.clone()),
            ("NAME", item.name.clone()),
            ("AMOUNT", format_amount(item.amount)),
            ("TYPE", item.kind.to_string()),
            ("FREQUENCY", item.frequency.to_string()),
            ("START DATE", format_date(item.start_date)),
            ("END DATE", item.end_date.map(format_date).unwrap_or_default()),
            ("CATEGORY", item.category.clone()),
        ])
    }

    pub fn from_record(data: &SheetData, record: &SheetRecord) -> Result<RecurringItem> {
        let get = |column: &str| data.value(record, column);
        let id = get("ID").ok_or_else(|| anyhow!("missing ID"))?;
        let amount_text = get("AMOUNT").ok_or_else(|| anyhow!("missing AMOUNT"))?;
        let amount = parse_amount(amount_text)
            .ok_or_else(|| anyhow!("bad AMOUNT '{}'", amount_text))?
            .abs();
        let kind: EntryKind = get("TYPE").ok_or_else(|| anyhow!("missing TYPE"))?.parse()?;
        let frequency: Frequency = get("FREQUENCY")
            .ok_or_else(|| anyhow!("missing FREQUENCY"))?
            .parse()?;
        let start_text = get("START DATE").ok_or_else(|| anyhow!("missing START DATE"))?;
        let start_date =
            parse_date(start_text).ok_or_else(|| anyhow!("bad START DATE '{}'", start_text))?;
        let end_date = match get("END DATE") {
            Some(text) => Some(parse_date(text).ok_or_else(|| anyhow!("bad END DATE '{}'", text))?),
            None => None,
        };

        Ok(RecurringItem {
            id: id.to_string(),
            name: get("NAME").unwrap_or_default().to_string(),
            amount,
            kind,
            frequency,
            start_date,
            end_date,
            category: get("CATEGORY").unwrap_or_default().to_string(),
        })
    }
}

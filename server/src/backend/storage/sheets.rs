//! Generic sheet helpers shared by every repository.
//!
//! Rows are addressed by field name through each sheet's [`ColumnMapping`],
//! which is discovered from the header row on first use and cached.
//!
//! Row numbers shift whenever a row above them is deleted, so every write
//! that targets a record by id looks the record up and writes it while
//! holding that sheet's lock.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::column_mapping::{ColumnMapping, FieldValues};
use super::traits::SheetStore;

/// One data row of a sheet together with its spreadsheet row number
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRecord {
    /// 1-based row number; the header is row 1 so data starts at 2
    pub row_number: usize,
    pub values: Vec<String>,
}

/// Header mapping plus data rows of a sheet
#[derive(Debug, Clone)]
pub struct SheetData {
    pub mapping: ColumnMapping,
    pub records: Vec<SheetRecord>,
}

impl SheetData {
    pub fn value<'a>(&self, record: &'a SheetRecord, column: &str) -> Option<&'a str> {
        self.mapping.value(&record.values, column)
    }
}

#[derive(Clone)]
pub struct SheetTables {
    store: Arc<dyn SheetStore>,
    mappings: Arc<RwLock<HashMap<String, ColumnMapping>>>,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SheetTables {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self {
            store,
            mappings: Arc::new(RwLock::new(HashMap::new())),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<dyn SheetStore> {
        &self.store
    }

    /// Read a whole sheet and refresh its cached mapping
    pub async fn get_sheet_data(&self, sheet: &str) -> Result<SheetData> {
        let mut rows = self.store.read_rows(sheet).await?.into_iter();
        let mapping = match rows.next() {
            Some(header) => ColumnMapping::from_header(&header),
            None => ColumnMapping::default(),
        };

        let records = rows
            .enumerate()
            .filter(|(_, values)| values.iter().any(|v| !v.trim().is_empty()))
            .map(|(i, values)| SheetRecord {
                row_number: i + 2,
                values,
            })
            .collect::<Vec<_>>();

        debug!("Read {} records from sheet '{}'", records.len(), sheet);
        self.mappings
            .write()
            .await
            .insert(sheet.to_string(), mapping.clone());

        Ok(SheetData { mapping, records })
    }

    /// Cached mapping for a sheet, reading the header on a miss
    pub async fn column_mapping(&self, sheet: &str) -> Result<ColumnMapping> {
        if let Some(mapping) = self.mappings.read().await.get(sheet) {
            return Ok(mapping.clone());
        }

        let rows = self.store.read_rows(sheet).await?;
        let header = rows
            .first()
            .ok_or_else(|| anyhow!("Sheet '{}' has no header row", sheet))?;
        let mapping = ColumnMapping::from_header(header);
        self.mappings
            .write()
            .await
            .insert(sheet.to_string(), mapping.clone());
        Ok(mapping)
    }

    /// Build the row array for `fields` in the sheet's column order
    pub async fn create_sheet_row(&self, sheet: &str, fields: &FieldValues) -> Result<Vec<String>> {
        let mapping = self.column_mapping(sheet).await?;
        if mapping.is_empty() {
            return Err(anyhow!("Sheet '{}' has an empty header row", sheet));
        }
        Ok(mapping.build_row(fields))
    }

    /// Serializes row writes to one sheet across every clone of these tables
    async fn lock_sheet(&self, sheet: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(sheet.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn append_data_to_sheet(&self, sheet: &str, fields: &FieldValues) -> Result<Vec<String>> {
        let _guard = self.lock_sheet(sheet).await;
        let row = self.create_sheet_row(sheet, fields).await?;
        self.store.append_row(sheet, &row).await?;
        info!("Appended row to sheet '{}'", sheet);
        Ok(row)
    }

    /// Write `fields` over a record read earlier. Fails when the row at
    /// `record.row_number` no longer holds what was read, since a delete or
    /// another edit has landed in between.
    pub async fn update_sheet_row(
        &self,
        sheet: &str,
        record: &SheetRecord,
        fields: &FieldValues,
    ) -> Result<Vec<String>> {
        let _guard = self.lock_sheet(sheet).await;
        let data = self.get_sheet_data(sheet).await?;
        let unchanged = data
            .records
            .iter()
            .any(|current| current == record);
        if !unchanged {
            return Err(anyhow!(
                "Row {} of sheet '{}' changed since it was read",
                record.row_number,
                sheet
            ));
        }
        self.write_cells(sheet, &data.mapping, record, fields).await
    }

    /// Write `fields` over the record whose `id_column` equals `id`. Only the
    /// named cells are sent to the store. Returns the merged row, or `None`
    /// when no record matches.
    pub async fn update_record(
        &self,
        sheet: &str,
        id_column: &str,
        id: &str,
        fields: &FieldValues,
    ) -> Result<Option<Vec<String>>> {
        let _guard = self.lock_sheet(sheet).await;
        match self.find_record(sheet, id_column, id).await? {
            Some((data, record)) => {
                let row = self.write_cells(sheet, &data.mapping, &record, fields).await?;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    /// Remove the record whose `id_column` equals `id`, returning it
    pub async fn delete_record(
        &self,
        sheet: &str,
        id_column: &str,
        id: &str,
    ) -> Result<Option<(SheetData, SheetRecord)>> {
        let _guard = self.lock_sheet(sheet).await;
        match self.find_record(sheet, id_column, id).await? {
            Some((data, record)) => {
                self.remove_row(sheet, record.row_number).await?;
                Ok(Some((data, record)))
            }
            None => Ok(None),
        }
    }

    /// Update the matching record, or append `fields` as a new row when none
    /// matches. Returns true when a row was appended.
    pub async fn upsert_record(
        &self,
        sheet: &str,
        id_column: &str,
        id: &str,
        fields: &FieldValues,
    ) -> Result<bool> {
        let _guard = self.lock_sheet(sheet).await;
        match self.find_record(sheet, id_column, id).await? {
            Some((data, record)) => {
                self.write_cells(sheet, &data.mapping, &record, fields).await?;
                Ok(false)
            }
            None => {
                let row = self.create_sheet_row(sheet, fields).await?;
                self.store.append_row(sheet, &row).await?;
                info!("Appended row to sheet '{}'", sheet);
                Ok(true)
            }
        }
    }

    async fn write_cells(
        &self,
        sheet: &str,
        mapping: &ColumnMapping,
        record: &SheetRecord,
        fields: &FieldValues,
    ) -> Result<Vec<String>> {
        let cells = mapping.cells(fields);
        self.store.update_cells(sheet, record.row_number, &cells).await?;
        info!("Updated row {} of sheet '{}'", record.row_number, sheet);
        Ok(mapping.merge_row(&record.values, fields))
    }

    async fn remove_row(&self, sheet: &str, row_number: usize) -> Result<()> {
        if row_number < 2 {
            return Err(anyhow!("Refusing to delete header row of sheet '{}'", sheet));
        }
        self.store.delete_row(sheet, row_number).await?;
        info!("Deleted row {} of sheet '{}'", row_number, sheet);
        Ok(())
    }

    /// First record whose `id_column` equals `id`
    pub async fn find_record(
        &self,
        sheet: &str,
        id_column: &str,
        id: &str,
    ) -> Result<Option<(SheetData, SheetRecord)>> {
        let data = self.get_sheet_data(sheet).await?;
        let found = data
            .records
            .iter()
            .find(|record| data.value(record, id_column) == Some(id))
            .cloned();
        Ok(found.map(|record| (data, record)))
    }
}

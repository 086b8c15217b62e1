use anyhow::{anyhow, Result};
use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::storage::a1::CellRef;
use crate::backend::storage::traits::SheetStore;

/// A workbook kept on disk as one `<Sheet>.csv` file per tab.
///
/// Used for local development and tests in place of the Google spreadsheet.
#[derive(Clone)]
pub struct CsvWorkbook {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvWorkbook {
    /// Open (and create if needed) a workbook directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created workbook directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File backing a sheet. Path separators in the name are replaced.
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        let file_name: String = sheet
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.base_directory.join(format!("{}.csv", file_name))
    }

    /// Create the sheet with `header` as its first row unless it already has rows
    pub async fn ensure_sheet(&self, sheet: &str, header: &[&str]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let rows = self.load(sheet)?;
        if rows.is_empty() {
            let header: Vec<String> = header.iter().map(|s| s.to_string()).collect();
            info!("Seeding sheet '{}' with {} columns", sheet, header.len());
            self.save(sheet, &[header])?;
        }
        Ok(())
    }

    fn load(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }
        Ok(rows)
    }

    fn save(&self, sheet: &str, rows: &[Vec<String>]) -> Result<()> {
        let path = self.sheet_path(sheet);
        let temp_path = path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .from_writer(BufWriter::new(file));
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }

        // Atomic move from temp to final file
        fs::rename(&temp_path, &path)?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

fn check_row(sheet: &str, rows: &[Vec<String>], row: usize) -> Result<usize> {
    if row == 0 || row > rows.len() {
        return Err(anyhow!("Row {} does not exist in sheet '{}'", row, sheet));
    }
    Ok(row - 1)
}

#[async_trait]
impl SheetStore for CsvWorkbook {
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let mut rows = self.load(sheet)?;
        // Sheets omits trailing blank rows; do the same
        while rows.last().map_or(false, |r| r.iter().all(|v| v.trim().is_empty())) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(sheet)?;
        rows.push(values.to_vec());
        self.save(sheet, &rows)
    }

    async fn update_cells(&self, sheet: &str, row: usize, cells: &[(usize, String)]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(sheet)?;
        let index = check_row(sheet, &rows, row)?;
        let target = &mut rows[index];
        for (column, value) in cells {
            if target.len() <= *column {
                target.resize(column + 1, String::new());
            }
            target[*column] = value.clone();
        }
        self.save(sheet, &rows)
    }

    async fn delete_row(&self, sheet: &str, row: usize) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.load(sheet)?;
        let index = check_row(sheet, &rows, row)?;
        rows.remove(index);
        self.save(sheet, &rows)
    }

    async fn read_cell(&self, cell: &CellRef) -> Result<Option<String>> {
        let rows = self.load(&cell.sheet)?;
        Ok(cell
            .row
            .checked_sub(1)
            .and_then(|index| rows.get(index))
            .and_then(|r| r.get(cell.column))
            .filter(|v| !v.trim().is_empty())
            .cloned())
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if cell.row == 0 {
            return Err(anyhow!("Row 0 does not exist in sheet '{}'", cell.sheet));
        }
        let mut rows = self.load(&cell.sheet)?;
        if rows.len() < cell.row {
            rows.resize(cell.row, vec![String::new()]);
        }
        let row = &mut rows[cell.row - 1];
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        row[cell.column] = value.to_string();
        self.save(&cell.sheet, &rows)
    }
}

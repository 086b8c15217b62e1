//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! spreadsheet backends (Google Sheets, a local directory of CSV tabs) to be
//! used interchangeably by the repositories and the domain layer.

use anyhow::Result;
use async_trait::async_trait;

use super::a1::CellRef;

/// Row and cell access to a workbook made of named sheets.
///
/// Row numbers are 1-based as the spreadsheet shows them; row 1 is the
/// header row.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// All rows of a sheet including the header. A missing or empty sheet
    /// yields an empty vector.
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    /// Append a row after the last non-empty row
    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<()>;

    /// Overwrite the given `(zero-based column, value)` cells of an existing
    /// row. Cells not listed, formulas included, are left untouched.
    async fn update_cells(&self, sheet: &str, row: usize, cells: &[(usize, String)]) -> Result<()>;

    /// Remove a row, shifting the rows below it up
    async fn delete_row(&self, sheet: &str, row: usize) -> Result<()>;

    async fn read_cell(&self, cell: &CellRef) -> Result<Option<String>>;

    async fn write_cell(&self, cell: &CellRef, value: &str) -> Result<()>;
}

/// A push-notification device registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken {
    pub token: String,
    pub label: Option<String>,
}

/// Where FCM registration tokens are kept
#[async_trait]
pub trait DeviceTokenStore: Send + Sync {
    async fn list_tokens(&self) -> Result<Vec<DeviceToken>>;

    /// Registering a known token again only refreshes its label
    async fn register_token(&self, token: &str, label: Option<&str>) -> Result<()>;

    /// Returns true if the token was found and removed
    async fn remove_token(&self, token: &str) -> Result<bool>;
}

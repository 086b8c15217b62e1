//! # Storage Module
//!
//! The workbook is the system of record. [`traits::SheetStore`] abstracts it
//! so the repositories run unchanged against Google Sheets in production and
//! a directory of CSV files locally and in tests. Device tokens for push
//! notifications sit behind [`traits::DeviceTokenStore`].

pub mod a1;
pub mod cell_values;
pub mod column_mapping;
pub mod csv;
pub mod device_tokens;
pub mod firestore;
pub mod google_sheets;
pub mod repositories;
pub mod sheets;
pub mod traits;

pub use self::csv::CsvWorkbook;
pub use device_tokens::SheetDeviceTokenStore;
pub use firestore::FirestoreTokenStore;
pub use google_sheets::GoogleSheetsStore;
pub use sheets::SheetTables;
pub use traits::{DeviceToken, DeviceTokenStore, SheetStore};

//! Family budget server: a JSON API over a Google Sheets workbook.

pub mod backend;

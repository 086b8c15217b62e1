//! Google Sheets API v4 backend for [`SheetStore`].

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::a1::{quote_sheet_name, CellRef};
use super::traits::SheetStore;
use crate::backend::google::GoogleAuth;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Clone)]
pub struct GoogleSheetsStore {
    client: Client,
    auth: GoogleAuth,
    spreadsheet_id: String,
    base_url: String,
    /// Tab title -> numeric sheet id, needed by `deleteDimension`
    sheet_ids: Arc<RwLock<HashMap<String, i64>>>,
}

impl GoogleSheetsStore {
    pub fn new(client: Client, auth: GoogleAuth, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client,
            auth,
            spreadsheet_id: spreadsheet_id.into(),
            base_url: SHEETS_BASE_URL.to_string(),
            sheet_ids: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// `.../spreadsheets/{id}/values/{range}` with the range percent-encoded
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = self.spreadsheet_url("")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets base URL cannot take path segments"))?
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    fn spreadsheet_url(&self, suffix: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}{}{}",
            self.base_url, self.spreadsheet_id, suffix
        ))?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.access_token().await?;
        Ok(request.bearer_auth(token).send().await?)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        let response = self
            .send(self.client.get(url).query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ]))
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("Unable to parse range") {
                debug!("Range {} does not exist yet", range);
                return Ok(Vec::new());
            }
            return Err(anyhow!("Sheets read of {} failed: {}", range, body));
        }
        let response = check(response, "read", range).await?;
        let value_range: ValueRange = response.json().await?;
        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn put_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let url = self.values_url(range, "")?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .query(&[("valueInputOption", "USER_ENTERED")])
                    .json(&json!({ "range": range, "majorDimension": "ROWS", "values": rows })),
            )
            .await?;
        check(response, "write", range).await?;
        Ok(())
    }

    async fn sheet_id(&self, sheet: &str) -> Result<i64> {
        if let Some(id) = self.sheet_ids.read().await.get(sheet) {
            return Ok(*id);
        }

        let url = self.spreadsheet_url("")?;
        let response = self
            .send(
                self.client
                    .get(url)
                    .query(&[("fields", "sheets.properties(sheetId,title)")]),
            )
            .await?;
        let metadata: SpreadsheetMetadata = check(response, "read metadata of", sheet)
            .await?
            .json()
            .await?;

        let mut ids = self.sheet_ids.write().await;
        for entry in metadata.sheets {
            ids.insert(entry.properties.title, entry.properties.sheet_id);
        }
        ids.get(sheet)
            .copied()
            .ok_or_else(|| anyhow!("Spreadsheet has no sheet named '{}'", sheet))
    }
}

/// Text of a cell as the UI shows it
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        other => other.to_string(),
    }
}

/// `values:batchUpdate` body writing one single-cell range per column, so
/// cells outside `cells` (formulas in particular) are never overwritten
pub fn cell_update_body(sheet: &str, row: usize, cells: &[(usize, String)]) -> Value {
    let data: Vec<Value> = cells
        .iter()
        .map(|(column, value)| {
            let range = CellRef::new(sheet, row, *column).to_string();
            json!({ "range": range, "majorDimension": "ROWS", "values": [[value]] })
        })
        .collect();
    json!({ "valueInputOption": "USER_ENTERED", "data": data })
}

async fn check(response: Response, action: &str, range: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("Sheets {} {} failed with {}: {}", action, range, status, body))
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        self.get_values(&quote_sheet_name(sheet)).await
    }

    async fn append_row(&self, sheet: &str, values: &[String]) -> Result<()> {
        let range = quote_sheet_name(sheet);
        let url = self.values_url(&range, ":append")?;
        let response = self
            .send(
                self.client
                    .post(url)
                    .query(&[
                        ("valueInputOption", "USER_ENTERED"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&json!({ "majorDimension": "ROWS", "values": [values] })),
            )
            .await?;
        check(response, "append to", &range).await?;
        info!("Appended row to Google sheet '{}'", sheet);
        Ok(())
    }

    async fn update_cells(&self, sheet: &str, row: usize, cells: &[(usize, String)]) -> Result<()> {
        if row == 0 {
            return Err(anyhow!("Row 0 does not exist in sheet '{}'", sheet));
        }
        if cells.is_empty() {
            return Ok(());
        }
        let url = self.spreadsheet_url("/values:batchUpdate")?;
        let body = cell_update_body(sheet, row, cells);
        let response = self.send(self.client.post(url).json(&body)).await?;
        check(response, "update row in", sheet).await?;
        debug!("Wrote {} cells of row {} in Google sheet '{}'", cells.len(), row, sheet);
        Ok(())
    }

    async fn delete_row(&self, sheet: &str, row: usize) -> Result<()> {
        if row == 0 {
            return Err(anyhow!("Row 0 does not exist in sheet '{}'", sheet));
        }
        let sheet_id = self.sheet_id(sheet).await?;
        let url = self.spreadsheet_url(":batchUpdate")?;
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    }
                }
            }]
        });
        let response = self.send(self.client.post(url).json(&body)).await?;
        check(response, "delete row in", sheet).await?;
        info!("Deleted row {} of Google sheet '{}'", row, sheet);
        Ok(())
    }

    async fn read_cell(&self, cell: &CellRef) -> Result<Option<String>> {
        let rows = self.get_values(&cell.to_string()).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .filter(|v| !v.trim().is_empty()))
    }

    async fn write_cell(&self, cell: &CellRef, value: &str) -> Result<()> {
        self.put_values(&cell.to_string(), vec![vec![value.to_string()]]).await
    }
}

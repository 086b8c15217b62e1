use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::column_mapping::fields;
use super::sheets::SheetTables;
use super::traits::{DeviceToken, DeviceTokenStore};

pub const DEVICES_SHEET: &str = "Devices";
pub const DEVICES_COLUMNS: [&str; 2] = ["TOKEN", "LABEL"];

/// Device tokens kept in a tab of the workbook, for setups without Firestore
#[derive(Clone)]
pub struct SheetDeviceTokenStore {
    tables: SheetTables,
}

impl SheetDeviceTokenStore {
    pub fn new(tables: SheetTables) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl DeviceTokenStore for SheetDeviceTokenStore {
    async fn list_tokens(&self) -> Result<Vec<DeviceToken>> {
        let data = self.tables.get_sheet_data(DEVICES_SHEET).await?;
        Ok(data
            .records
            .iter()
            .filter_map(|record| {
                data.value(record, "TOKEN").map(|token| DeviceToken {
                    token: token.to_string(),
                    label: data.value(record, "LABEL").map(str::to_string),
                })
            })
            .collect())
    }

    async fn register_token(&self, token: &str, label: Option<&str>) -> Result<()> {
        let values = fields([("TOKEN", token), ("LABEL", label.unwrap_or_default())]);
        if self
            .tables
            .upsert_record(DEVICES_SHEET, "TOKEN", token, &values)
            .await?
        {
            info!("Registered new device token");
        }
        Ok(())
    }

    async fn remove_token(&self, token: &str) -> Result<bool> {
        let removed = self.tables.delete_record(DEVICES_SHEET, "TOKEN", token).await?;
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let env = TestEnvironment::new().await.unwrap();
        let store = SheetDeviceTokenStore::new(env.tables.clone());

        store.register_token("tok-a", Some("Phone")).await.unwrap();
        store.register_token("tok-a", Some("Old phone")).await.unwrap();
        store.register_token("tok-b", None).await.unwrap();

        let tokens = store.list_tokens().await.unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].label.as_deref(), Some("Old phone"));
        assert_eq!(tokens[1].label, None);
    }

    #[tokio::test]
    async fn test_remove_token() {
        let env = TestEnvironment::new().await.unwrap();
        let store = SheetDeviceTokenStore::new(env.tables.clone());
        store.register_token("tok-a", None).await.unwrap();

        assert!(store.remove_token("tok-a").await.unwrap());
        assert!(!store.remove_token("tok-a").await.unwrap());
        assert!(store.list_tokens().await.unwrap().is_empty());
    }
}

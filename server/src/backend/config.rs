//! Environment configuration.
//!
//! Every setting comes from a `BUDGET_*` (or Google/Firebase) environment
//! variable, optionally loaded from a `.env` file by `main`.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::backend::storage::a1::CellRef;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} is required when {reason}")]
    Missing { name: &'static str, reason: &'static str },
    #[error("{name}='{value}' is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where the workbook lives
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    /// Local directory of `<Sheet>.csv` files
    Csv { data_dir: PathBuf },
    /// A Google spreadsheet
    Sheets { spreadsheet_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub allowed_origin: String,
    pub storage: StorageConfig,
    pub google_access_token: Option<String>,
    /// Enables Firestore device tokens and FCM delivery
    pub firebase_project_id: Option<String>,
    pub fcm_token_collection: String,
    pub weekly_goal_cell: CellRef,
    pub monthly_goal_cell: CellRef,
    /// Shared secret expected in `x-api-key` on `/api` routes
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_text = get("BUDGET_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string());
        let bind_addr = bind_text.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "BUDGET_BIND_ADDR",
            value: bind_text.clone(),
            reason: e.to_string(),
        })?;

        let storage_kind = get("BUDGET_STORAGE").unwrap_or_else(|| "csv".to_string());
        let storage = match storage_kind.to_ascii_lowercase().as_str() {
            "csv" => StorageConfig::Csv {
                data_dir: PathBuf::from(
                    get("BUDGET_DATA_DIR").unwrap_or_else(|| "./budget-data".to_string()),
                ),
            },
            "sheets" => StorageConfig::Sheets {
                spreadsheet_id: get("BUDGET_SPREADSHEET_ID").ok_or(ConfigError::Missing {
                    name: "BUDGET_SPREADSHEET_ID",
                    reason: "BUDGET_STORAGE=sheets",
                })?,
            },
            _ => {
                return Err(ConfigError::Invalid {
                    name: "BUDGET_STORAGE",
                    value: storage_kind,
                    reason: "expected 'csv' or 'sheets'".to_string(),
                })
            }
        };

        let cell = |name: &'static str, default: &str| -> Result<CellRef, ConfigError> {
            let text = get(name).unwrap_or_else(|| default.to_string());
            text.parse().map_err(|e: crate::backend::domain::BudgetError| ConfigError::Invalid {
                name,
                value: text.clone(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            bind_addr,
            allowed_origin: get("BUDGET_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            storage,
            google_access_token: get("GOOGLE_ACCESS_TOKEN"),
            firebase_project_id: get("FIREBASE_PROJECT_ID"),
            fcm_token_collection: get("BUDGET_FCM_TOKEN_COLLECTION")
                .unwrap_or_else(|| "fcmTokens".to_string()),
            weekly_goal_cell: cell("BUDGET_WEEKLY_GOAL_CELL", "Goals!B2")?,
            monthly_goal_cell: cell("BUDGET_MONTHLY_GOAL_CELL", "Goals!B3")?,
            api_key: get("BUDGET_API_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.allowed_origin, "http://localhost:8080");
        assert_eq!(
            config.storage,
            StorageConfig::Csv {
                data_dir: PathBuf::from("./budget-data")
            }
        );
        assert_eq!(config.fcm_token_collection, "fcmTokens");
        assert_eq!(config.weekly_goal_cell, CellRef::new("Goals", 2, 1));
        assert_eq!(config.monthly_goal_cell, CellRef::new("Goals", 3, 1));
        assert!(config.api_key.is_none());
        assert!(config.firebase_project_id.is_none());
    }

    #[test]
    fn test_sheets_requires_spreadsheet_id() {
        let err = config(&[("BUDGET_STORAGE", "sheets")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "BUDGET_SPREADSHEET_ID", .. }));

        let config = config(&[("BUDGET_STORAGE", "Sheets"), ("BUDGET_SPREADSHEET_ID", "abc")]).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sheets {
                spreadsheet_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("BUDGET_BIND_ADDR", "localhost")]).unwrap_err(),
            ConfigError::Invalid { name: "BUDGET_BIND_ADDR", .. }
        ));
        assert!(matches!(
            config(&[("BUDGET_STORAGE", "sqlite")]).unwrap_err(),
            ConfigError::Invalid { name: "BUDGET_STORAGE", .. }
        ));
        assert!(matches!(
            config(&[("BUDGET_WEEKLY_GOAL_CELL", "B2")]).unwrap_err(),
            ConfigError::Invalid { name: "BUDGET_WEEKLY_GOAL_CELL", .. }
        ));
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = config(&[("BUDGET_API_KEY", "  "), ("BUDGET_MONTHLY_GOAL_CELL", "'Budget Goals'!C4")]).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.monthly_goal_cell, CellRef::new("Budget Goals", 4, 2));
    }
}

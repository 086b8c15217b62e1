//! # Backend Module
//!
//! Everything behind the HTTP boundary of the family budget server:
//!
//! ```text
//! IO Layer (REST API, push messaging)
//!     ↓
//! Domain Layer (fiscal periods, goals, history, recurring, HSA, ...)
//!     ↓
//! Storage Layer (workbook: Google Sheets or CSV; device tokens)
//! ```
//!
//! [`initialize_backend`] wires the layers together from an [`AppConfig`];
//! [`create_router`] exposes them over axum.

pub mod config;
pub mod domain;
pub mod google;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::config::{AppConfig, StorageConfig};
use crate::backend::domain::{
    CalendarService, FiscalService, ForecastService, GoalService, HistoryService, HsaService,
    NotificationService, RecurringService,
};
use crate::backend::google::GoogleAuth;
use crate::backend::io::messaging::{FcmMessenger, LogMessenger, Messenger};
use crate::backend::io::rest;
use crate::backend::storage::csv::{seed_budget_workbook, CsvWorkbook};
use crate::backend::storage::repositories::{
    FiscalRepository, GoalRepository, HistoryRepository, RecurringRepository,
};
use crate::backend::storage::{
    DeviceTokenStore, FirestoreTokenStore, GoogleSheetsStore, SheetDeviceTokenStore, SheetStore,
    SheetTables,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub history_service: HistoryService,
    pub recurring_service: RecurringService,
    pub fiscal_service: FiscalService,
    pub goal_service: GoalService,
    pub hsa_service: HsaService,
    pub calendar_service: CalendarService,
    pub forecast_service: ForecastService,
    pub notification_service: NotificationService,
    pub api_key: Option<String>,
}

impl AppState {
    /// Wire every service on top of an opened workbook
    pub fn new(
        tables: SheetTables,
        goal_repository: GoalRepository,
        messenger: Arc<dyn Messenger>,
        tokens: Arc<dyn DeviceTokenStore>,
        api_key: Option<String>,
    ) -> Self {
        let history_repository = HistoryRepository::new(tables.clone());
        let fiscal_service = FiscalService::new(FiscalRepository::new(tables.clone()));
        let goal_service = GoalService::new(goal_repository, fiscal_service.clone());
        let notification_service = NotificationService::new(messenger, tokens);
        let recurring_service = RecurringService::new(RecurringRepository::new(tables));

        Self {
            history_service: HistoryService::new(
                history_repository.clone(),
                goal_service.clone(),
                notification_service.clone(),
            ),
            hsa_service: HsaService::new(history_repository.clone()),
            calendar_service: CalendarService::new(history_repository, recurring_service.clone()),
            forecast_service: ForecastService::new(recurring_service.clone()),
            recurring_service,
            fiscal_service,
            goal_service,
            notification_service,
            api_key,
        }
    }

    /// Pin the date goal adjustments are made against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.history_service = self.history_service.with_today(today);
        self
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("family-budget/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let auth = GoogleAuth::from_config(client.clone(), config.google_access_token.as_deref());

    info!("Setting up workbook storage");
    let store: Arc<dyn SheetStore> = match &config.storage {
        StorageConfig::Csv { data_dir } => {
            let workbook = CsvWorkbook::new(data_dir)?;
            seed_budget_workbook(&workbook, &[&config.weekly_goal_cell, &config.monthly_goal_cell])
                .await?;
            info!("Using CSV workbook at {}", workbook.base_directory().display());
            Arc::new(workbook)
        }
        StorageConfig::Sheets { spreadsheet_id } => {
            info!("Using Google spreadsheet {}", spreadsheet_id);
            Arc::new(GoogleSheetsStore::new(client.clone(), auth.clone(), spreadsheet_id.clone()))
        }
    };
    let tables = SheetTables::new(store.clone());
    let goal_repository = GoalRepository::new(
        store,
        config.weekly_goal_cell.clone(),
        config.monthly_goal_cell.clone(),
    );

    info!("Setting up notifications");
    let (messenger, tokens): (Arc<dyn Messenger>, Arc<dyn DeviceTokenStore>) =
        match &config.firebase_project_id {
            Some(project_id) => (
                Arc::new(FcmMessenger::new(client.clone(), auth.clone(), project_id.clone())),
                Arc::new(FirestoreTokenStore::new(
                    client,
                    auth,
                    project_id,
                    &config.fcm_token_collection,
                )),
            ),
            None => {
                info!("FIREBASE_PROJECT_ID not set; push messages are only logged");
                (
                    Arc::new(LogMessenger),
                    Arc::new(SheetDeviceTokenStore::new(tables.clone())),
                )
            }
        };

    info!("Setting up application state");
    Ok(AppState::new(
        tables,
        goal_repository,
        messenger,
        tokens,
        config.api_key.clone(),
    ))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, allowed_origin: HeaderValue) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/expenses", rest::expenses_apis::router())
        .nest("/fiscal", rest::fiscal_apis::router())
        .nest("/goals", rest::goal_apis::router())
        .nest("/calendar", rest::calendar_apis::router())
        .nest("/forecast", rest::forecast_apis::router())
        .nest("/hsa", rest::hsa_apis::router())
        .nest("/notifications", rest::notification_apis::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            rest::auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(rest::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

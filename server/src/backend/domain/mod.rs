//! # Domain Module
//!
//! Budget rules and services: fiscal periods, goal adjustment, history and
//! recurring items, HSA reimbursement, calendar and forecast views, and
//! push notifications. Services work against the storage repositories and
//! return `anyhow::Result`, with [`BudgetError`] for failures the REST layer
//! distinguishes.

pub mod calendar;
pub mod commands;
pub mod errors;
pub mod fiscal_service;
pub mod forecast_service;
pub mod goal_service;
pub mod history_service;
pub mod hsa_service;
pub mod models;
pub mod notification_service;
pub mod recurring_service;

pub use calendar::CalendarService;
pub use errors::BudgetError;
pub use fiscal_service::FiscalService;
pub use forecast_service::ForecastService;
pub use goal_service::GoalService;
pub use history_service::HistoryService;
pub use hsa_service::HsaService;
pub use notification_service::NotificationService;
pub use recurring_service::RecurringService;

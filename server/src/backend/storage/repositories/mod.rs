//! Repositories translate between sheet rows and domain models.

pub mod fiscal_repository;
pub mod goal_repository;
pub mod history_repository;
pub mod recurring_repository;

pub use fiscal_repository::{FiscalRepository, FISCAL_COLUMNS, FISCAL_SHEET};
pub use goal_repository::GoalRepository;
pub use history_repository::{HistoryRepository, HISTORY_COLUMNS, HISTORY_SHEET};
pub use recurring_repository::{RecurringRepository, RECURRING_COLUMNS, RECURRING_SHEET};

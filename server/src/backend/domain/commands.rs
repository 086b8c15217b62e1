//! Domain-level command and query types.
//!
//! Services take and return these; the REST layer maps the public DTOs from
//! the `shared` crate onto them.

pub mod history {
    use chrono::NaiveDate;

    use crate::backend::domain::models::entry::{EntryKind, HistoryEntry};
    use crate::backend::domain::models::goal::Goals;

    /// Filters for listing history entries. All are optional.
    #[derive(Debug, Clone, Default)]
    pub struct HistoryListQuery {
        pub start: Option<NaiveDate>,
        pub end: Option<NaiveDate>,
        pub kind: Option<EntryKind>,
        pub category: Option<String>,
        pub hsa: Option<bool>,
        pub limit: Option<usize>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateHistoryEntryCommand {
        pub date: NaiveDate,
        pub amount: f64,
        pub kind: EntryKind,
        pub category: String,
        pub description: String,
        pub paid_by: Option<String>,
        pub hsa: bool,
        pub notify: bool,
    }

    /// Fields left as `None` keep their stored value
    #[derive(Debug, Clone, Default)]
    pub struct UpdateHistoryEntryCommand {
        pub id: String,
        pub date: Option<NaiveDate>,
        pub amount: Option<f64>,
        pub kind: Option<EntryKind>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub paid_by: Option<String>,
        pub hsa: Option<bool>,
    }

    #[derive(Debug, Clone)]
    pub struct HistoryListResult {
        pub entries: Vec<HistoryEntry>,
        pub total_expenses: f64,
        pub total_income: f64,
    }

    #[derive(Debug, Clone)]
    pub struct HistoryEntryResult {
        pub entry: HistoryEntry,
        /// `None` when no goal adjustment happened
        pub goals: Option<Goals>,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteHistoryEntryResult {
        pub deleted_id: String,
        pub goals: Option<Goals>,
        pub success_message: String,
    }
}

pub mod recurring {
    use chrono::NaiveDate;

    use crate::backend::domain::models::entry::EntryKind;
    use crate::backend::domain::models::recurring::{Frequency, RecurringItem};

    #[derive(Debug, Clone)]
    pub struct CreateRecurringItemCommand {
        pub name: String,
        pub amount: f64,
        pub kind: EntryKind,
        pub frequency: Frequency,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub category: String,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateRecurringItemCommand {
        pub id: String,
        pub name: Option<String>,
        pub amount: Option<f64>,
        pub kind: Option<EntryKind>,
        pub frequency: Option<Frequency>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub clear_end_date: bool,
        pub category: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct RecurringItemResult {
        pub item: RecurringItem,
        pub success_message: String,
    }
}

pub mod hsa {
    use chrono::NaiveDate;

    use crate::backend::domain::models::entry::HistoryEntry;

    #[derive(Debug, Clone)]
    pub struct ReimburseCommand {
        pub ids: Vec<String>,
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone)]
    pub struct HsaSummary {
        pub entries: Vec<HistoryEntry>,
        pub outstanding_total: f64,
    }

    #[derive(Debug, Clone)]
    pub struct ReimburseResult {
        pub reimbursed_ids: Vec<String>,
        pub reimbursed_total: f64,
        pub not_found_ids: Vec<String>,
        pub rejected_ids: Vec<String>,
        pub success_message: String,
    }
}

pub mod forecast {
    use chrono::NaiveDate;

    use crate::backend::domain::models::recurring::ScheduledOccurrence;

    #[derive(Debug, Clone)]
    pub struct ForecastQuery {
        pub start_balance: f64,
        pub from: NaiveDate,
        pub days: u32,
    }

    #[derive(Debug, Clone)]
    pub struct ForecastDay {
        pub date: NaiveDate,
        /// Balance at the end of the day
        pub balance: f64,
        pub items: Vec<ScheduledOccurrence>,
    }

    #[derive(Debug, Clone)]
    pub struct ForecastResult {
        pub start_balance: f64,
        pub ending_balance: f64,
        pub lowest_balance: f64,
        pub lowest_balance_date: NaiveDate,
        pub days: Vec<ForecastDay>,
    }
}

pub mod notifications {
    /// Outcome of sending one message to every registered device
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct BroadcastResult {
        pub sent: usize,
        pub failed: usize,
        pub removed: usize,
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `Deserialize` for a unit-variant enum matching variant names without
/// regard to case or surrounding whitespace, so "expense" reads as `Expense`
macro_rules! case_insensitive_deserialize {
    ($name:ident: $($variant:ident),+ $(,)?) => {
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                const VARIANTS: &[&str] = &[$(stringify!($variant)),+];
                let text = String::deserialize(deserializer)?;
                $(
                    if text.trim().eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok($name::$variant);
                    }
                )+
                Err(serde::de::Error::unknown_variant(&text, VARIANTS))
            }
        }
    };
}

/// Kind of a history entry or recurring item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Money spent
    Expense,
    /// Money returned for an earlier expense
    Refund,
    /// Money received
    Income,
}

case_insensitive_deserialize!(EntryKind: Expense, Refund, Income);

/// How often a recurring item repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

case_insensitive_deserialize!(Frequency: Weekly, Biweekly, Monthly, Yearly);

/// A recorded expense, refund or income row from the History sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    /// Always positive; `kind` carries the direction
    pub amount: f64,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    /// Family member who paid
    pub paid_by: Option<String>,
    /// Eligible for reimbursement from the health savings account
    pub hsa: bool,
    pub reimbursed: bool,
    pub reimbursed_on: Option<NaiveDate>,
}

/// A recurring income or expense row from the Recurring sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub kind: EntryKind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category: String,
}

/// Request body for creating a history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHistoryEntryRequest {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub hsa: bool,
    /// Push a "new entry" notification to every registered device
    #[serde(default)]
    pub notify: bool,
}

/// Request body for editing a history entry; absent fields are left unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateHistoryEntryRequest {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub paid_by: Option<String>,
    pub hsa: Option<bool>,
}

/// Request body for creating a recurring item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecurringItemRequest {
    pub name: String,
    pub amount: f64,
    pub kind: EntryKind,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub category: String,
}

/// Request body for editing a recurring item; absent fields are left unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecurringItemRequest {
    pub id: String,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<EntryKind>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Remove the end date so the item repeats indefinitely
    #[serde(default)]
    pub clear_end_date: bool,
    pub category: Option<String>,
}

/// Body of a POST to the expenses endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum ExpenseCreateRequest {
    History(CreateHistoryEntryRequest),
    Recurring(CreateRecurringItemRequest),
}

/// Body of a PUT to the expenses endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum ExpenseUpdateRequest {
    History(UpdateHistoryEntryRequest),
    Recurring(UpdateRecurringItemRequest),
}

/// Which table of the expenses endpoint a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseResource {
    #[default]
    History,
    Recurring,
}

/// Query string of a GET to the expenses endpoint. Filters apply to history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListQuery {
    #[serde(default)]
    pub resource: ExpenseResource,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub category: Option<String>,
    pub hsa: Option<bool>,
    pub limit: Option<usize>,
}

/// Query string of a DELETE to the expenses endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDeleteQuery {
    #[serde(default)]
    pub resource: ExpenseResource,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub entries: Vec<HistoryEntry>,
    pub total_expenses: f64,
    pub total_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringListResponse {
    pub items: Vec<RecurringItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntryResponse {
    pub entry: HistoryEntry,
    /// Goal values after the change was applied
    pub goals: Option<Goals>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItemResponse {
    pub item: RecurringItem,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted_id: String,
    pub goals: Option<Goals>,
    pub success_message: String,
}

/// Granularity of a fiscal period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiscalPeriodKind {
    Year,
    Month,
    Week,
}

/// A named fiscal interval, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub kind: FiscalPeriodKind,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The fiscal year, month and week that contain a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPosition {
    pub date: NaiveDate,
    pub year: Option<FiscalPeriod>,
    pub month: Option<FiscalPeriod>,
    pub week: Option<FiscalPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriodListResponse {
    pub periods: Vec<FiscalPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveDateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalRefreshResponse {
    pub periods: usize,
}

/// Remaining spending goals held in the workbook's goal cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub weekly: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalKind {
    Weekly,
    Monthly,
}

case_insensitive_deserialize!(GoalKind: Weekly, Monthly);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetGoalRequest {
    pub kind: GoalKind,
    pub amount: f64,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding day after the end of the month to complete the last week
    PaddingAfter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonthQuery {
    pub year: i32,
    pub month: u32,
}

/// A projected occurrence of a recurring item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub recurring_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
}

/// Represents a single day in the calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub day_type: CalendarDayType,
    pub entries: Vec<HistoryEntry>,
    pub scheduled: Vec<ScheduledItem>,
    /// Signed sum of the day's entries and scheduled items
    pub net: f64,
}

/// Represents a calendar month with its associated entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
    /// 0 = Sunday, 1 = Monday, etc.
    pub first_day_of_week: u32,
}

/// Query string of the forecast endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub start_balance: f64,
    /// Defaults to 30, capped at 366
    pub days: Option<u32>,
    /// Defaults to today
    pub from: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub balance: f64,
    pub items: Vec<ScheduledItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub start_balance: f64,
    pub ending_balance: f64,
    pub lowest_balance: f64,
    pub lowest_balance_date: NaiveDate,
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsaSummaryResponse {
    pub entries: Vec<HistoryEntry>,
    pub outstanding_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimburseRequest {
    pub ids: Vec<String>,
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimburseResponse {
    pub reimbursed_ids: Vec<String>,
    pub reimbursed_total: f64,
    pub not_found_ids: Vec<String>,
    /// Ids that exist but are not HSA-eligible expenses
    pub rejected_ids: Vec<String>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    pub token: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnregisterDeviceRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub sent: usize,
    pub failed: usize,
    /// Unregistered tokens dropped from the device store
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredDevice {
    pub token: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceListResponse {
    pub devices: Vec<RegisteredDevice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub token: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

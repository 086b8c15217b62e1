//! Domain model for a recurring income or expense.
use chrono::{Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::entry::{validate_amount, validate_text, EntryKind};
use crate::backend::domain::BudgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    /// The n-th occurrence counting from `start` (n = 0 is `start` itself).
    /// Monthly and yearly steps land on the last day of shorter months.
    pub fn nth_after(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => start.checked_add_signed(Duration::weeks(n as i64)),
            Frequency::Biweekly => start.checked_add_signed(Duration::weeks(2 * n as i64)),
            Frequency::Monthly => start.checked_add_months(Months::new(n)),
            Frequency::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }

    /// Smallest n whose occurrence could fall on or after `from`
    fn first_index_from(&self, start: NaiveDate, from: NaiveDate) -> u32 {
        if from <= start {
            return 0;
        }
        let days = (from - start).num_days();
        let estimate = match self {
            Frequency::Weekly => days / 7,
            Frequency::Biweekly => days / 14,
            Frequency::Monthly => days / 31,
            Frequency::Yearly => days / 366,
        };
        estimate.clamp(0, u32::MAX as i64) as u32
    }
}

impl FromStr for Frequency {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "").as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" | "fortnightly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" | "annual" | "annually" => Ok(Frequency::Yearly),
            other => Err(BudgetError::validation(format!("Unknown frequency '{}'", other))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
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

impl RecurringItem {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        validate_text("Name", &self.name, 128)?;
        validate_text("Category", &self.category, 64)?;
        validate_amount(self.amount)?;
        if self.kind == EntryKind::Refund {
            return Err(BudgetError::validation(
                "Recurring items must be Income or Expense",
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(BudgetError::validation("End date cannot be before start date"));
            }
        }
        Ok(())
    }

    /// Dates this item occurs on within `[from, to]`, ascending
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let last = match self.end_date {
            Some(end) if end < to => end,
            _ => to,
        };
        if last < from || last < self.start_date {
            return Vec::new();
        }

        let mut dates = Vec::new();
        let mut n = self.frequency.first_index_from(self.start_date, from);
        while let Some(date) = self.frequency.nth_after(self.start_date, n) {
            if date > last {
                break;
            }
            if date >= from {
                dates.push(date);
            }
            n += 1;
        }
        dates
    }
}

/// One projected occurrence of a recurring item
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledOccurrence {
    pub recurring_id: String,
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
}

impl ScheduledOccurrence {
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(frequency: Frequency, start: NaiveDate, end: Option<NaiveDate>) -> RecurringItem {
        RecurringItem {
            id: "r-1".to_string(),
            name: "Rent".to_string(),
            amount: 1500.0,
            kind: EntryKind::Expense,
            frequency,
            start_date: start,
            end_date: end,
            category: "Housing".to_string(),
        }
    }

    #[test]
    fn test_weekly_occurrences() {
        let rent = item(Frequency::Weekly, date(2025, 1, 3), None);
        let dates = rent.occurrences_between(date(2025, 1, 10), date(2025, 1, 31));
        assert_eq!(dates, vec![date(2025, 1, 10), date(2025, 1, 17), date(2025, 1, 24), date(2025, 1, 31)]);
    }

    #[test]
    fn test_biweekly_occurrences_skip_to_window() {
        let pay = item(Frequency::Biweekly, date(2024, 1, 5), None);
        let dates = pay.occurrences_between(date(2025, 1, 1), date(2025, 1, 31));
        assert_eq!(dates, vec![date(2025, 1, 3), date(2025, 1, 17), date(2025, 1, 31)]);
    }

    #[test]
    fn test_monthly_clamps_to_month_end() {
        let bill = item(Frequency::Monthly, date(2025, 1, 31), None);
        let dates = bill.occurrences_between(date(2025, 1, 1), date(2025, 4, 30));
        assert_eq!(dates, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]);
    }

    #[test]
    fn test_yearly_and_end_date() {
        let fee = item(Frequency::Yearly, date(2020, 6, 1), Some(date(2023, 12, 31)));
        let dates = fee.occurrences_between(date(2019, 1, 1), date(2030, 1, 1));
        assert_eq!(dates, vec![date(2020, 6, 1), date(2021, 6, 1), date(2022, 6, 1), date(2023, 6, 1)]);
    }

    #[test]
    fn test_window_before_start_is_empty() {
        let rent = item(Frequency::Monthly, date(2025, 6, 1), None);
        assert!(rent.occurrences_between(date(2025, 1, 1), date(2025, 5, 31)).is_empty());
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("bi-weekly".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert_eq!("MONTHLY".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("Annual".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!("daily".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_validation_rejects_refund_and_reversed_dates() {
        let mut refund = item(Frequency::Monthly, date(2025, 1, 1), None);
        refund.kind = EntryKind::Refund;
        assert!(refund.validate().is_err());

        let reversed = item(Frequency::Monthly, date(2025, 2, 1), Some(date(2025, 1, 1)));
        assert!(reversed.validate().is_err());

        assert!(item(Frequency::Monthly, date(2025, 1, 1), None).validate().is_ok());
    }
}

//! Fiscal calendar: named year/month/week intervals that need not line up
//! with calendar months.
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::backend::domain::BudgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FiscalPeriodKind {
    Year,
    Month,
    Week,
}

impl FiscalPeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FiscalPeriodKind::Year => "Year",
            FiscalPeriodKind::Month => "Month",
            FiscalPeriodKind::Week => "Week",
        }
    }
}

impl FromStr for FiscalPeriodKind {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(FiscalPeriodKind::Year),
            "month" => Ok(FiscalPeriodKind::Month),
            "week" => Ok(FiscalPeriodKind::Week),
            other => Err(BudgetError::validation(format!("Unknown fiscal period type '{}'", other))),
        }
    }
}

impl fmt::Display for FiscalPeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiscalPeriod {
    pub kind: FiscalPeriodKind,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FiscalPeriod {
    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// The periods of each kind that contain a date
#[derive(Debug, Clone, PartialEq)]
pub struct FiscalPosition {
    pub date: NaiveDate,
    pub year: Option<FiscalPeriod>,
    pub month: Option<FiscalPeriod>,
    pub week: Option<FiscalPeriod>,
}

impl FiscalPosition {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.week.is_none()
    }

    pub fn period(&self, kind: FiscalPeriodKind) -> Option<&FiscalPeriod> {
        match kind {
            FiscalPeriodKind::Year => self.year.as_ref(),
            FiscalPeriodKind::Month => self.month.as_ref(),
            FiscalPeriodKind::Week => self.week.as_ref(),
        }
    }
}

/// All fiscal periods in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiscalCalendar {
    periods: Vec<FiscalPeriod>,
}

impl FiscalCalendar {
    pub fn new(periods: Vec<FiscalPeriod>) -> Self {
        Self { periods }
    }

    pub fn periods(&self) -> &[FiscalPeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// First period of `kind` containing `date`. Rows are scanned in sheet
    /// order, so when periods overlap the earlier row wins.
    pub fn find(&self, kind: FiscalPeriodKind, date: NaiveDate) -> Option<&FiscalPeriod> {
        self.periods
            .iter()
            .find(|p| p.kind == kind && p.contains(date))
    }

    pub fn resolve(&self, date: NaiveDate) -> FiscalPosition {
        FiscalPosition {
            date,
            year: self.find(FiscalPeriodKind::Year, date).cloned(),
            month: self.find(FiscalPeriodKind::Month, date).cloned(),
            week: self.find(FiscalPeriodKind::Week, date).cloned(),
        }
    }
}

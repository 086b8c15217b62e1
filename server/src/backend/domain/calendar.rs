//! Month calendar view.
//!
//! A Sunday-first grid for one calendar month: padding cells before the 1st
//! and after the last day complete the first and last weeks. Each real day
//! carries its recorded history entries, the recurring items projected onto
//! it, and the signed net of both.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use tracing::info;

use crate::backend::domain::models::entry::HistoryEntry;
use crate::backend::domain::models::recurring::ScheduledOccurrence;
use crate::backend::domain::recurring_service::RecurringService;
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;
use crate::backend::storage::repositories::HistoryRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarDayType {
    PaddingBefore,
    MonthDay,
    PaddingAfter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    /// Day of month; 0 for padding cells
    pub day: u32,
    pub day_type: CalendarDayType,
    pub entries: Vec<HistoryEntry>,
    pub scheduled: Vec<ScheduledOccurrence>,
    pub net: f64,
}

impl CalendarDay {
    fn padding(day_type: CalendarDayType) -> Self {
        Self {
            day: 0,
            day_type,
            entries: Vec::new(),
            scheduled: Vec::new(),
            net: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub days: Vec<CalendarDay>,
    /// 0 = Sunday
    pub first_day_of_week: u32,
}

#[derive(Clone)]
pub struct CalendarService {
    history: HistoryRepository,
    recurring: RecurringService,
}

impl CalendarService {
    pub fn new(history: HistoryRepository, recurring: RecurringService) -> Self {
        Self { history, recurring }
    }

    pub async fn month(&self, year: i32, month: u32) -> Result<CalendarMonth> {
        let (first, last) = month_bounds(year, month)?;
        info!("Building calendar for {}-{:02}", year, month);

        let entries: Vec<HistoryEntry> = self
            .history
            .list_entries()
            .await?
            .into_iter()
            .filter(|e| first <= e.date && e.date <= last)
            .collect();
        let scheduled = self.recurring.occurrences(first, last).await?;

        Ok(generate_calendar_month(year, month, entries, scheduled))
    }
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), BudgetError> {
    let invalid = || BudgetError::validation(format!("Invalid month {}-{}", year, month));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

/// Lay out a month. Entries and occurrences outside the month are ignored.
pub fn generate_calendar_month(
    year: i32,
    month: u32,
    entries: Vec<HistoryEntry>,
    scheduled: Vec<ScheduledOccurrence>,
) -> CalendarMonth {
    let mut entries_by_day: HashMap<u32, Vec<HistoryEntry>> = HashMap::new();
    for entry in entries {
        if entry.date.year() == year && entry.date.month() == month {
            entries_by_day.entry(entry.date.day()).or_default().push(entry);
        }
    }
    let mut scheduled_by_day: HashMap<u32, Vec<ScheduledOccurrence>> = HashMap::new();
    for occurrence in scheduled {
        if occurrence.date.year() == year && occurrence.date.month() == month {
            scheduled_by_day
                .entry(occurrence.date.day())
                .or_default()
                .push(occurrence);
        }
    }

    let Ok((first, last)) = month_bounds(year, month) else {
        return CalendarMonth {
            month,
            year,
            days: Vec::new(),
            first_day_of_week: 0,
        };
    };
    let first_day_of_week = first.weekday().num_days_from_sunday();

    let mut days: Vec<CalendarDay> = (0..first_day_of_week)
        .map(|_| CalendarDay::padding(CalendarDayType::PaddingBefore))
        .collect();

    for day in 1..=last.day() {
        let entries = entries_by_day.remove(&day).unwrap_or_default();
        let scheduled = scheduled_by_day.remove(&day).unwrap_or_default();
        let net = entries.iter().map(HistoryEntry::signed_amount).sum::<f64>()
            + scheduled
                .iter()
                .map(ScheduledOccurrence::signed_amount)
                .sum::<f64>();
        days.push(CalendarDay {
            day,
            day_type: CalendarDayType::MonthDay,
            entries,
            scheduled,
            net: round_cents(net),
        });
    }

    while days.len() % 7 != 0 {
        days.push(CalendarDay::padding(CalendarDayType::PaddingAfter));
    }

    CalendarMonth {
        month,
        year,
        days,
        first_day_of_week,
    }
}

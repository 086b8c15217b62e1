//! Domain model for a history entry (one row of the History sheet).
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

use crate::backend::domain::BudgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Expense,
    Refund,
    Income,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Expense => "Expense",
            EntryKind::Refund => "Refund",
            EntryKind::Income => "Income",
        }
    }

    /// Goal arithmetic treats anything that is not an expense as income
    pub fn is_expense(&self) -> bool {
        self.as_str().eq_ignore_ascii_case("expense")
    }

    /// +1 for money coming in, -1 for money going out
    pub fn sign(&self) -> f64 {
        if self.is_expense() {
            -1.0
        } else {
            1.0
        }
    }
}

impl FromStr for EntryKind {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(EntryKind::Expense),
            "refund" => Ok(EntryKind::Refund),
            "income" => Ok(EntryKind::Income),
            other => Err(BudgetError::validation(format!("Unknown entry type '{}'", other))),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: EntryKind,
    pub category: String,
    pub description: String,
    pub paid_by: Option<String>,
    pub hsa: bool,
    pub reimbursed: bool,
    pub reimbursed_on: Option<NaiveDate>,
}

impl HistoryEntry {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Amount with its direction applied: expenses are negative
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }

    /// An HSA-eligible expense that has not been paid back yet
    pub fn is_outstanding_hsa(&self) -> bool {
        self.hsa && self.kind.is_expense() && !self.reimbursed
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        validate_amount(self.amount)?;
        validate_text("Description", &self.description, 256)?;
        validate_text("Category", &self.category, 64)?;
        Ok(())
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), BudgetError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(BudgetError::validation("Amount must be a positive number"));
    }
    Ok(())
}

pub(crate) fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), BudgetError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BudgetError::validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(BudgetError::validation(format!(
            "{} cannot exceed {} characters",
            field, max_len
        )));
    }
    Ok(())
}

use chrono::NaiveDate;

/// Typed failures the REST layer maps onto status codes.
///
/// Services return `anyhow::Result`; these travel inside it and are
/// recovered with `downcast_ref`.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("{0}")]
    Validation(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("Sheet '{sheet}' is missing the '{column}' column")]
    MissingColumn { sheet: String, column: String },
    #[error("No fiscal period contains {0}")]
    NoFiscalPeriod(NaiveDate),
}

impl BudgetError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

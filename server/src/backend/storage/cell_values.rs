//! Conversions between spreadsheet cell text and typed values.
//!
//! `USER_ENTERED` writes let Sheets reformat what we store, so the parsers
//! accept the common display forms as well as the canonical ones.

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse `12.5`, `$1,234.00`, `-3` or accounting-style `(3.00)`
pub fn parse_amount(value: &str) -> Option<f64> {
    let value = value.trim();
    let (negative, body) = match value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, value),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let parsed: f64 = cleaned.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    Some(if negative { -parsed } else { parsed })
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", round_cents(amount))
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Checkbox-style cells; an empty cell is false
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "x" => Some(true),
        "false" | "no" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

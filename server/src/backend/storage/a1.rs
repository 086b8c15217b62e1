//! A1-notation cell addresses (`Goals!B2`, `'Monthly Plan'!C10`).

use std::fmt;
use std::str::FromStr;

use crate::backend::domain::BudgetError;

/// A single cell in a named sheet
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub sheet: String,
    /// 1-based row number, as the spreadsheet shows it
    pub row: usize,
    /// 0-based column index
    pub column: usize,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            column,
        }
    }

    /// Sheet name as it must appear in a range, quoted when needed
    pub fn quoted_sheet(&self) -> String {
        quote_sheet_name(&self.sheet)
    }
}

/// Quote a sheet name for use in an A1 range
pub fn quote_sheet_name(sheet: &str) -> String {
    if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Convert a 0-based column index to letters: 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Convert column letters to a 0-based index; `None` for empty or non-letter input
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let value = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        n = n.checked_mul(26)?.checked_add(value)?;
    }
    Some(n - 1)
}

impl FromStr for CellRef {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BudgetError::Validation(format!("Invalid cell reference '{}'", s));

        let (sheet_part, cell_part) = s.trim().rsplit_once('!').ok_or_else(invalid)?;
        let sheet = if sheet_part.len() >= 2 && sheet_part.starts_with('\'') && sheet_part.ends_with('\'') {
            sheet_part[1..sheet_part.len() - 1].replace("''", "'")
        } else {
            sheet_part.to_string()
        };
        if sheet.is_empty() {
            return Err(invalid());
        }

        let split = cell_part
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cell_part.split_at(split);
        let column = column_index(letters).ok_or_else(invalid)?;
        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(CellRef { sheet, row, column })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}{}", self.quoted_sheet(), column_letters(self.column), self.row)
    }
}

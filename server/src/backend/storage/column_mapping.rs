//! Header-driven column mapping.
//!
//! Every sheet in the workbook starts with a header row. The mapping turns
//! that row into `UPPERCASED NAME -> zero-based column index` so rows can be
//! read and written by field name no matter how the columns are ordered.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::backend::domain::BudgetError;

/// Field values keyed by column name, as handed to the row builders
pub type FieldValues = BTreeMap<String, String>;

/// Build a `FieldValues` map from `(name, value)` pairs
pub fn fields<I, K, V>(pairs: I) -> FieldValues
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (normalize(k.as_ref()), v.into()))
        .collect()
}

fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: HashMap<String, usize>,
    width: usize,
}

impl ColumnMapping {
    /// Build the mapping from a header row. Blank headers are skipped and the
    /// first occurrence of a repeated header wins.
    pub fn from_header(header: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            let key = normalize(name);
            if key.is_empty() {
                continue;
            }
            columns.entry(key).or_insert(index);
        }
        Self {
            columns,
            width: header.len(),
        }
    }

    /// Number of columns in the header row
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get(&normalize(name)).copied()
    }

    /// Fail with the first column in `names` that the header lacks
    pub fn require(&self, sheet: &str, names: &[&str]) -> Result<(), BudgetError> {
        match names.iter().find(|name| self.index_of(name).is_none()) {
            Some(missing) => Err(BudgetError::MissingColumn {
                sheet: sheet.to_string(),
                column: normalize(missing),
            }),
            None => Ok(()),
        }
    }

    /// Trimmed, non-empty value of the named column in `row`
    pub fn value<'a>(&self, row: &'a [String], name: &str) -> Option<&'a str> {
        let index = self.index_of(name)?;
        row.get(index)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Lay out `values` as a full row, one cell per header column.
    pub fn build_row(&self, values: &FieldValues) -> Vec<String> {
        self.merge_row(&[], values)
    }

    /// Overlay `values` onto `existing`; columns not named in `values` keep
    /// their current contents.
    pub fn merge_row(&self, existing: &[String], values: &FieldValues) -> Vec<String> {
        let mut row: Vec<String> = existing.to_vec();
        if row.len() < self.width {
            row.resize(self.width, String::new());
        }
        for (index, value) in self.cells(values) {
            if index >= row.len() {
                row.resize(index + 1, String::new());
            }
            row[index] = value;
        }
        row
    }

    /// `(column index, value)` for every field that names a header column,
    /// in column order. These are the only cells an update writes.
    pub fn cells(&self, values: &FieldValues) -> Vec<(usize, String)> {
        let mut cells: Vec<(usize, String)> = values
            .iter()
            .filter_map(|(name, value)| match self.index_of(name) {
                Some(index) => Some((index, value.clone())),
                None => {
                    debug!("Ignoring field '{}' with no matching column", name);
                    None
                }
            })
            .collect();
        cells.sort_by_key(|(index, _)| *index);
        cells
    }
}

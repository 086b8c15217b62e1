//! Health savings account reimbursement tracking.
//!
//! HSA-flagged expenses are paid out of pocket first and reimbursed from the
//! HSA later. Reimbursing only marks rows; it never moves the goal cells.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::backend::domain::commands::hsa::{HsaSummary, ReimburseCommand, ReimburseResult};
use crate::backend::domain::models::entry::HistoryEntry;
use crate::backend::domain::BudgetError;
use crate::backend::storage::cell_values::round_cents;
use crate::backend::storage::repositories::HistoryRepository;

#[derive(Clone)]
pub struct HsaService {
    repository: HistoryRepository,
}

impl HsaService {
    pub fn new(repository: HistoryRepository) -> Self {
        Self { repository }
    }

    /// Unreimbursed HSA expenses, oldest first
    pub async fn outstanding(&self) -> Result<HsaSummary> {
        let mut entries: Vec<HistoryEntry> = self
            .repository
            .list_entries()
            .await?
            .into_iter()
            .filter(HistoryEntry::is_outstanding_hsa)
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));

        let outstanding_total = round_cents(entries.iter().map(|e| e.amount).sum());
        Ok(HsaSummary {
            entries,
            outstanding_total,
        })
    }

    pub async fn reimburse(&self, command: ReimburseCommand) -> Result<ReimburseResult> {
        info!("Reimbursing HSA entries: {:?}", command);
        if command.ids.is_empty() {
            return Err(BudgetError::validation("No entries selected for reimbursement").into());
        }
        let date = command
            .date
            .unwrap_or_else(|| Local::now().date_naive());

        let _edit = self.repository.lock_edits().await;
        let mut by_id: HashMap<String, HistoryEntry> = self
            .repository
            .list_entries()
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();

        let mut reimbursed_ids = Vec::new();
        let mut not_found_ids = Vec::new();
        let mut rejected_ids = Vec::new();
        let mut reimbursed_total = 0.0;

        for id in command.ids {
            let Some(entry) = by_id.get_mut(&id) else {
                not_found_ids.push(id);
                continue;
            };
            if !entry.is_outstanding_hsa() {
                warn!("Entry {} is not an outstanding HSA expense", id);
                rejected_ids.push(id);
                continue;
            }

            entry.reimbursed = true;
            entry.reimbursed_on = Some(date);
            if !self.repository.update_entry(entry).await? {
                warn!("Entry {} disappeared before it could be marked", id);
                not_found_ids.push(id);
                continue;
            }
            reimbursed_total += entry.amount;
            reimbursed_ids.push(id);
        }

        let reimbursed_total = round_cents(reimbursed_total);
        Ok(ReimburseResult {
            success_message: reimburse_message(reimbursed_ids.len(), reimbursed_total, date),
            reimbursed_ids,
            reimbursed_total,
            not_found_ids,
            rejected_ids,
        })
    }
}

fn reimburse_message(count: usize, total: f64, date: NaiveDate) -> String {
    match count {
        0 => "No entries were reimbursed".to_string(),
        1 => format!("Marked 1 entry (${:.2}) reimbursed on {}", total, date),
        n => format!("Marked {} entries (${:.2}) reimbursed on {}", n, total, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::entry::EntryKind;
    use crate::backend::storage::a1::CellRef;
    use crate::backend::storage::csv::test_utils::{date, TestEnvironment};
    use crate::backend::storage::csv::CsvWorkbook;
    use crate::backend::storage::repositories::HISTORY_SHEET;
    use crate::backend::storage::sheets::SheetTables;
    use crate::backend::storage::traits::SheetStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Removes the first History data row just before the second read of
    /// that sheet, the way an edit in the spreadsheet UI would
    struct RowRemovedMidway {
        inner: CsvWorkbook,
        history_reads: AtomicUsize,
    }

    #[async_trait]
    impl SheetStore for RowRemovedMidway {
        async fn read_rows(&self, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
            if sheet == HISTORY_SHEET && self.history_reads.fetch_add(1, Ordering::SeqCst) == 1 {
                self.inner.delete_row(sheet, 2).await?;
            }
            self.inner.read_rows(sheet).await
        }

        async fn append_row(&self, sheet: &str, values: &[String]) -> anyhow::Result<()> {
            self.inner.append_row(sheet, values).await
        }

        async fn update_cells(
            &self,
            sheet: &str,
            row: usize,
            cells: &[(usize, String)],
        ) -> anyhow::Result<()> {
            self.inner.update_cells(sheet, row, cells).await
        }

        async fn delete_row(&self, sheet: &str, row: usize) -> anyhow::Result<()> {
            self.inner.delete_row(sheet, row).await
        }

        async fn read_cell(&self, cell: &CellRef) -> anyhow::Result<Option<String>> {
            self.inner.read_cell(cell).await
        }

        async fn write_cell(&self, cell: &CellRef, value: &str) -> anyhow::Result<()> {
            self.inner.write_cell(cell, value).await
        }
    }

    fn entry(id: &str, on: NaiveDate, amount: f64, hsa: bool, kind: EntryKind) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            date: on,
            amount,
            kind,
            category: "Medical".to_string(),
            description: format!("Visit {}", id),
            paid_by: None,
            hsa,
            reimbursed: false,
            reimbursed_on: None,
        }
    }

    async fn setup() -> (HsaService, HistoryRepository, TestEnvironment) {
        let env = TestEnvironment::new().await.unwrap();
        let repo = HistoryRepository::new(env.tables.clone());
        for e in [
            entry("late", date(2025, 2, 1), 80.0, true, EntryKind::Expense),
            entry("early", date(2025, 1, 5), 20.5, true, EntryKind::Expense),
            entry("plain", date(2025, 1, 6), 10.0, false, EntryKind::Expense),
            entry("refund", date(2025, 1, 7), 5.0, true, EntryKind::Refund),
        ] {
            repo.store_entry(&e).await.unwrap();
        }
        (HsaService::new(repo.clone()), repo, env)
    }

    #[tokio::test]
    async fn test_outstanding_oldest_first() {
        let (service, _repo, _env) = setup().await;
        let summary = service.outstanding().await.unwrap();
        let ids: Vec<&str> = summary.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(summary.outstanding_total, 100.5);
    }

    #[tokio::test]
    async fn test_reimburse_reports_each_id() {
        let (service, repo, _env) = setup().await;
        let result = service
            .reimburse(ReimburseCommand {
                ids: vec![
                    "early".to_string(),
                    "plain".to_string(),
                    "ghost".to_string(),
                    "refund".to_string(),
                ],
                date: Some(date(2025, 3, 1)),
            })
            .await
            .unwrap();

        assert_eq!(result.reimbursed_ids, vec!["early"]);
        assert_eq!(result.reimbursed_total, 20.5);
        assert_eq!(result.not_found_ids, vec!["ghost"]);
        assert_eq!(result.rejected_ids, vec!["plain", "refund"]);

        let stored = repo.get_entry("early").await.unwrap().unwrap();
        assert!(stored.reimbursed);
        assert_eq!(stored.reimbursed_on, Some(date(2025, 3, 1)));

        let summary = service.outstanding().await.unwrap();
        assert_eq!(summary.outstanding_total, 80.0);
    }

    #[tokio::test]
    async fn test_reimbursing_twice_is_rejected() {
        let (service, _repo, _env) = setup().await;
        let command = ReimburseCommand {
            ids: vec!["late".to_string()],
            date: None,
        };
        service.reimburse(command.clone()).await.unwrap();
        let again = service.reimburse(command).await.unwrap();
        assert!(again.reimbursed_ids.is_empty());
        assert_eq!(again.rejected_ids, vec!["late"]);
        assert_eq!(again.success_message, "No entries were reimbursed");
    }

    #[tokio::test]
    async fn test_row_deleted_before_write_is_not_found() {
        let (_service, _repo, env) = setup().await;
        let store = RowRemovedMidway {
            inner: env.workbook.clone(),
            history_reads: AtomicUsize::new(0),
        };
        let repo = HistoryRepository::new(SheetTables::new(Arc::new(store)));
        let service = HsaService::new(repo);

        // "late" is the first data row; it vanishes once the selection is read
        let result = service
            .reimburse(ReimburseCommand {
                ids: vec!["late".to_string()],
                date: Some(date(2025, 3, 1)),
            })
            .await
            .unwrap();

        assert!(result.reimbursed_ids.is_empty());
        assert_eq!(result.reimbursed_total, 0.0);
        assert_eq!(result.not_found_ids, vec!["late"]);
        assert_eq!(result.success_message, "No entries were reimbursed");
    }

    #[tokio::test]
    async fn test_empty_selection_is_invalid() {
        let (service, _repo, _env) = setup().await;
        let err = service
            .reimburse(ReimburseCommand { ids: vec![], date: None })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<BudgetError>().is_some());
    }
}

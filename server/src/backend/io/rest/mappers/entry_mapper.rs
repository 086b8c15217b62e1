use shared::{
    CreateHistoryEntryRequest, DeleteResponse, EntryKind as DtoEntryKind, ExpenseListQuery,
    HistoryEntry as DtoHistoryEntry, HistoryEntryResponse, HistoryListResponse,
    HsaSummaryResponse, ReimburseRequest, ReimburseResponse, UpdateHistoryEntryRequest,
};

use crate::backend::domain::commands::history::{
    CreateHistoryEntryCommand, DeleteHistoryEntryResult, HistoryEntryResult, HistoryListQuery,
    HistoryListResult, UpdateHistoryEntryCommand,
};
use crate::backend::domain::commands::hsa::{HsaSummary, ReimburseCommand, ReimburseResult};
use crate::backend::domain::models::entry::{EntryKind, HistoryEntry};
use crate::backend::io::rest::mappers::goal_mapper::GoalMapper;

pub struct EntryMapper;

impl EntryMapper {
    pub fn kind_to_domain(kind: DtoEntryKind) -> EntryKind {
        match kind {
            DtoEntryKind::Expense => EntryKind::Expense,
            DtoEntryKind::Refund => EntryKind::Refund,
            DtoEntryKind::Income => EntryKind::Income,
        }
    }

    pub fn kind_to_dto(kind: EntryKind) -> DtoEntryKind {
        match kind {
            EntryKind::Expense => DtoEntryKind::Expense,
            EntryKind::Refund => DtoEntryKind::Refund,
            EntryKind::Income => DtoEntryKind::Income,
        }
    }

    pub fn to_dto(entry: HistoryEntry) -> DtoHistoryEntry {
        DtoHistoryEntry {
            id: entry.id,
            date: entry.date,
            amount: entry.amount,
            kind: Self::kind_to_dto(entry.kind),
            category: entry.category,
            description: entry.description,
            paid_by: entry.paid_by,
            hsa: entry.hsa,
            reimbursed: entry.reimbursed,
            reimbursed_on: entry.reimbursed_on,
        }
    }

    pub fn to_dto_list(entries: Vec<HistoryEntry>) -> Vec<DtoHistoryEntry> {
        entries.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_list_query(query: &ExpenseListQuery) -> HistoryListQuery {
        HistoryListQuery {
            start: query.start,
            end: query.end,
            kind: query.kind.map(Self::kind_to_domain),
            category: query.category.clone(),
            hsa: query.hsa,
            limit: query.limit,
        }
    }

    pub fn to_create_command(request: CreateHistoryEntryRequest) -> CreateHistoryEntryCommand {
        CreateHistoryEntryCommand {
            date: request.date,
            amount: request.amount,
            kind: Self::kind_to_domain(request.kind),
            category: request.category,
            description: request.description,
            paid_by: request.paid_by,
            hsa: request.hsa,
            notify: request.notify,
        }
    }

    pub fn to_update_command(request: UpdateHistoryEntryRequest) -> UpdateHistoryEntryCommand {
        UpdateHistoryEntryCommand {
            id: request.id,
            date: request.date,
            amount: request.amount,
            kind: request.kind.map(Self::kind_to_domain),
            category: request.category,
            description: request.description,
            paid_by: request.paid_by,
            hsa: request.hsa,
        }
    }

    pub fn to_list_response(result: HistoryListResult) -> HistoryListResponse {
        HistoryListResponse {
            entries: Self::to_dto_list(result.entries),
            total_expenses: result.total_expenses,
            total_income: result.total_income,
        }
    }

    pub fn to_entry_response(result: HistoryEntryResult) -> HistoryEntryResponse {
        HistoryEntryResponse {
            entry: Self::to_dto(result.entry),
            goals: result.goals.map(GoalMapper::to_dto),
            success_message: result.success_message,
        }
    }

    pub fn to_delete_response(result: DeleteHistoryEntryResult) -> DeleteResponse {
        DeleteResponse {
            deleted_id: result.deleted_id,
            goals: result.goals.map(GoalMapper::to_dto),
            success_message: result.success_message,
        }
    }

    pub fn to_hsa_summary_response(summary: HsaSummary) -> HsaSummaryResponse {
        HsaSummaryResponse {
            entries: Self::to_dto_list(summary.entries),
            outstanding_total: summary.outstanding_total,
        }
    }

    pub fn to_reimburse_command(request: ReimburseRequest) -> ReimburseCommand {
        ReimburseCommand {
            ids: request.ids,
            date: request.date,
        }
    }

    pub fn to_reimburse_response(result: ReimburseResult) -> ReimburseResponse {
        ReimburseResponse {
            reimbursed_ids: result.reimbursed_ids,
            reimbursed_total: result.reimbursed_total,
            not_found_ids: result.not_found_ids,
            rejected_ids: result.rejected_ids,
            success_message: result.success_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_update_command_keeps_absent_fields_unset() {
        let command = EntryMapper::to_update_command(UpdateHistoryEntryRequest {
            id: "e-1".to_string(),
            date: None,
            amount: Some(3.0),
            kind: Some(DtoEntryKind::Refund),
            category: None,
            description: None,
            paid_by: None,
            hsa: None,
        });
        assert_eq!(command.amount, Some(3.0));
        assert_eq!(command.kind, Some(EntryKind::Refund));
        assert!(command.date.is_none() && command.category.is_none());
    }

    #[test]
    fn test_to_dto() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let dto = EntryMapper::to_dto(HistoryEntry {
            id: "e-1".to_string(),
            date,
            amount: 9.0,
            kind: EntryKind::Income,
            category: "Gift".to_string(),
            description: "Birthday".to_string(),
            paid_by: None,
            hsa: false,
            reimbursed: false,
            reimbursed_on: None,
        });
        assert_eq!(dto.kind, DtoEntryKind::Income);
        assert_eq!(dto.date, date);
        assert_eq!(dto.description, "Birthday");
    }
}

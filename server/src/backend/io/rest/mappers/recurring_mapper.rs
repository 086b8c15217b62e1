use shared::{
    CreateRecurringItemRequest, Frequency as DtoFrequency, RecurringItem as DtoRecurringItem,
    RecurringItemResponse, ScheduledItem, UpdateRecurringItemRequest,
};

use crate::backend::domain::commands::recurring::{
    CreateRecurringItemCommand, RecurringItemResult, UpdateRecurringItemCommand,
};
use crate::backend::domain::models::recurring::{Frequency, RecurringItem, ScheduledOccurrence};
use crate::backend::io::rest::mappers::entry_mapper::EntryMapper;

pub struct RecurringMapper;

impl RecurringMapper {
    pub fn frequency_to_domain(frequency: DtoFrequency) -> Frequency {
        match frequency {
            DtoFrequency::Weekly => Frequency::Weekly,
            DtoFrequency::Biweekly => Frequency::Biweekly,
            DtoFrequency::Monthly => Frequency::Monthly,
            DtoFrequency::Yearly => Frequency::Yearly,
        }
    }

    pub fn frequency_to_dto(frequency: Frequency) -> DtoFrequency {
        match frequency {
            Frequency::Weekly => DtoFrequency::Weekly,
            Frequency::Biweekly => DtoFrequency::Biweekly,
            Frequency::Monthly => DtoFrequency::Monthly,
            Frequency::Yearly => DtoFrequency::Yearly,
        }
    }

    pub fn to_dto(item: RecurringItem) -> DtoRecurringItem {
        DtoRecurringItem {
            id: item.id,
            name: item.name,
            amount: item.amount,
            kind: EntryMapper::kind_to_dto(item.kind),
            frequency: Self::frequency_to_dto(item.frequency),
            start_date: item.start_date,
            end_date: item.end_date,
            category: item.category,
        }
    }

    pub fn to_create_command(request: CreateRecurringItemRequest) -> CreateRecurringItemCommand {
        CreateRecurringItemCommand {
            name: request.name,
            amount: request.amount,
            kind: EntryMapper::kind_to_domain(request.kind),
            frequency: Self::frequency_to_domain(request.frequency),
            start_date: request.start_date,
            end_date: request.end_date,
            category: request.category,
        }
    }

    pub fn to_update_command(request: UpdateRecurringItemRequest) -> UpdateRecurringItemCommand {
        UpdateRecurringItemCommand {
            id: request.id,
            name: request.name,
            amount: request.amount,
            kind: request.kind.map(EntryMapper::kind_to_domain),
            frequency: request.frequency.map(Self::frequency_to_domain),
            start_date: request.start_date,
            end_date: request.end_date,
            clear_end_date: request.clear_end_date,
            category: request.category,
        }
    }

    pub fn to_item_response(result: RecurringItemResult) -> RecurringItemResponse {
        RecurringItemResponse {
            item: Self::to_dto(result.item),
            success_message: result.success_message,
        }
    }

    pub fn to_scheduled_dto(occurrence: ScheduledOccurrence) -> ScheduledItem {
        ScheduledItem {
            recurring_id: occurrence.recurring_id,
            name: occurrence.name,
            date: occurrence.date,
            amount: occurrence.amount,
            kind: EntryMapper::kind_to_dto(occurrence.kind),
        }
    }
}

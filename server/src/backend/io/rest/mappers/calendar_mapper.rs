use shared::{
    CalendarDay as DtoCalendarDay, CalendarDayType as DtoCalendarDayType,
    CalendarMonth as DtoCalendarMonth,
};

use crate::backend::domain::calendar::{CalendarDay, CalendarDayType, CalendarMonth};
use crate::backend::io::rest::mappers::entry_mapper::EntryMapper;
use crate::backend::io::rest::mappers::recurring_mapper::RecurringMapper;

pub struct CalendarMapper;

impl CalendarMapper {
    fn day_type_to_dto(day_type: CalendarDayType) -> DtoCalendarDayType {
        match day_type {
            CalendarDayType::PaddingBefore => DtoCalendarDayType::PaddingBefore,
            CalendarDayType::MonthDay => DtoCalendarDayType::MonthDay,
            CalendarDayType::PaddingAfter => DtoCalendarDayType::PaddingAfter,
        }
    }

    fn day_to_dto(day: CalendarDay) -> DtoCalendarDay {
        DtoCalendarDay {
            day: day.day,
            day_type: Self::day_type_to_dto(day.day_type),
            entries: EntryMapper::to_dto_list(day.entries),
            scheduled: day
                .scheduled
                .into_iter()
                .map(RecurringMapper::to_scheduled_dto)
                .collect(),
            net: day.net,
        }
    }

    pub fn to_dto(month: CalendarMonth) -> DtoCalendarMonth {
        DtoCalendarMonth {
            month: month.month,
            year: month.year,
            days: month.days.into_iter().map(Self::day_to_dto).collect(),
            first_day_of_week: month.first_day_of_week,
        }
    }
}

use shared::{ForecastPoint, ForecastResponse};

use crate::backend::domain::commands::forecast::{ForecastDay, ForecastResult};
use crate::backend::io::rest::mappers::recurring_mapper::RecurringMapper;

pub struct ForecastMapper;

impl ForecastMapper {
    fn to_point(day: ForecastDay) -> ForecastPoint {
        ForecastPoint {
            date: day.date,
            balance: day.balance,
            items: day
                .items
                .into_iter()
                .map(RecurringMapper::to_scheduled_dto)
                .collect(),
        }
    }

    pub fn to_response(result: ForecastResult) -> ForecastResponse {
        ForecastResponse {
            start_balance: result.start_balance,
            ending_balance: result.ending_balance,
            lowest_balance: result.lowest_balance,
            lowest_balance_date: result.lowest_balance_date,
            points: result.days.into_iter().map(Self::to_point).collect(),
        }
    }
}

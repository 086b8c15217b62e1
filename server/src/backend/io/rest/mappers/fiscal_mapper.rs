use shared::{
    FiscalPeriod as DtoFiscalPeriod, FiscalPeriodKind as DtoFiscalPeriodKind,
    FiscalPosition as DtoFiscalPosition,
};

use crate::backend::domain::models::fiscal::{FiscalPeriod, FiscalPeriodKind, FiscalPosition};

pub struct FiscalMapper;

impl FiscalMapper {
    pub fn kind_to_dto(kind: FiscalPeriodKind) -> DtoFiscalPeriodKind {
        match kind {
            FiscalPeriodKind::Year => DtoFiscalPeriodKind::Year,
            FiscalPeriodKind::Month => DtoFiscalPeriodKind::Month,
            FiscalPeriodKind::Week => DtoFiscalPeriodKind::Week,
        }
    }

    pub fn to_dto(period: FiscalPeriod) -> DtoFiscalPeriod {
        DtoFiscalPeriod {
            kind: Self::kind_to_dto(period.kind),
            name: period.name,
            start_date: period.start_date,
            end_date: period.end_date,
        }
    }

    pub fn to_position_dto(position: FiscalPosition) -> DtoFiscalPosition {
        DtoFiscalPosition {
            date: position.date,
            year: position.year.map(Self::to_dto),
            month: position.month.map(Self::to_dto),
            week: position.week.map(Self::to_dto),
        }
    }
}

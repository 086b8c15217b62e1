//! Conversions between `shared` DTOs and domain types.

pub mod calendar_mapper;
pub mod entry_mapper;
pub mod fiscal_mapper;
pub mod forecast_mapper;
pub mod goal_mapper;
pub mod recurring_mapper;

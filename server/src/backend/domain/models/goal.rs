use std::fmt;

use super::fiscal::FiscalPeriodKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalKind {
    Weekly,
    Monthly,
}

impl GoalKind {
    pub const ALL: [GoalKind; 2] = [GoalKind::Weekly, GoalKind::Monthly];

    /// Fiscal period a goal is tracked against
    pub fn period_kind(&self) -> FiscalPeriodKind {
        match self {
            GoalKind::Weekly => FiscalPeriodKind::Week,
            GoalKind::Monthly => FiscalPeriodKind::Month,
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalKind::Weekly => f.write_str("weekly"),
            GoalKind::Monthly => f.write_str("monthly"),
        }
    }
}

/// Remaining spending goals for the current fiscal week and month
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Goals {
    pub weekly: f64,
    pub monthly: f64,
}

impl Goals {
    pub fn get(&self, kind: GoalKind) -> f64 {
        match kind {
            GoalKind::Weekly => self.weekly,
            GoalKind::Monthly => self.monthly,
        }
    }

    pub fn set(&mut self, kind: GoalKind, value: f64) {
        match kind {
            GoalKind::Weekly => self.weekly = value,
            GoalKind::Monthly => self.monthly = value,
        }
    }
}

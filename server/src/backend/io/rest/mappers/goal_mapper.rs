use shared::{GoalKind as DtoGoalKind, Goals as DtoGoals};

use crate::backend::domain::models::goal::{GoalKind, Goals};

pub struct GoalMapper;

impl GoalMapper {
    pub fn to_dto(goals: Goals) -> DtoGoals {
        DtoGoals {
            weekly: goals.weekly,
            monthly: goals.monthly,
        }
    }

    pub fn kind_to_domain(kind: DtoGoalKind) -> GoalKind {
        match kind {
            DtoGoalKind::Weekly => GoalKind::Weekly,
            DtoGoalKind::Monthly => GoalKind::Monthly,
        }
    }
}

use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use serde::Serialize;
use std::sync::Arc;

/// What the plan calls for on the next event.
#[derive(Debug, Clone, Serialize)]
pub struct StakePreview {
    pub plan_id: String,
    pub stake: f64,
    pub current_capital: f64,
    pub remaining_events: u32,
    pub remaining_wins: u32,
    pub quota: f64,
    pub target_capital: f64,
}

pub struct StakeUseCase {
    plans: Arc<dyn PlanRepository>,
}

impl StakeUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub fn preview(&self) -> Result<StakePreview, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        Ok(StakePreview {
            stake: plan.next_stake(),
            plan_id: plan.id,
            current_capital: plan.current_capital,
            remaining_events: plan.remaining_events,
            remaining_wins: plan.remaining_wins,
            quota: plan.quota,
            target_capital: plan.target_capital,
        })
    }
}

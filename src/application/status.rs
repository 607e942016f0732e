use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use serde::Serialize;
use std::sync::Arc;

/// Lineage-level aggregates shown alongside the active plan.
#[derive(Debug, Clone, Serialize)]
pub struct LineageSummary {
    pub generations: u32,
    pub total_banked: f64,
    pub original_capital: f64,
    /// Current capital plus everything banked, net of the original stake.
    pub global_profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub plan: Plan,
    pub next_stake: f64,
    pub lineage: LineageSummary,
}

pub struct StatusUseCase {
    plans: Arc<dyn PlanRepository>,
}

impl StatusUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub fn report(&self) -> Result<StatusReport, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        let lineage = super::lineage_context(self.plans.as_ref(), &plan)?;
        let total_banked = lineage.historical_banked_total + plan.accumulated_amount;
        Ok(StatusReport {
            next_stake: plan.next_stake(),
            lineage: LineageSummary {
                generations: plan.generation,
                total_banked,
                original_capital: lineage.original_initial_capital,
                global_profit: plan.current_capital + total_banked
                    - lineage.original_initial_capital,
            },
            plan,
        })
    }
}

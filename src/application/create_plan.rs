use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::values::config::PlanConfig;
use std::sync::Arc;

pub struct CreatePlanUseCase {
    plans: Arc<dyn PlanRepository>,
}

impl CreatePlanUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    /// Start a new lineage and point the active-plan pointer at it.
    pub fn execute(&self, config: PlanConfig) -> Result<Plan, DomainError> {
        let plan = Plan::new(config)?;
        self.plans.save_plan(&plan)?;
        self.plans.set_active_plan_id(Some(&plan.id))?;
        Ok(plan)
    }
}

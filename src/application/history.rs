use crate::domain::entities::event::Event;
use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::{PlanFilter, PlanRepository};
use crate::domain::values::status::PlanStatus;
use std::sync::Arc;

pub struct HistoryUseCase {
    plans: Arc<dyn PlanRepository>,
}

impl HistoryUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub fn list_plans(
        &self,
        status: Option<PlanStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Plan>, DomainError> {
        self.plans.list_plans(&PlanFilter { status, limit })
    }

    /// Event log of one plan (the active one when no id is given), for
    /// export and audit tooling.
    pub fn plan_events(&self, plan_id: Option<&str>) -> Result<Vec<Event>, DomainError> {
        let plan = match plan_id {
            Some(id) => self
                .plans
                .get_plan(id)?
                .ok_or_else(|| DomainError::NotFound(format!("Plan not found: {id}")))?,
            None => super::active_plan(self.plans.as_ref())?,
        };
        Ok(plan.events)
    }
}

use crate::application::apply_outcome::OutcomeReport;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::rules::{close_manually, RuleOutcome};
use std::sync::Arc;

pub struct ClosePlanUseCase {
    plans: Arc<dyn PlanRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl ClosePlanUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { plans, settings }
    }

    /// Operator-initiated close of the active plan: banks the accumulation
    /// share of the cycle profit and opens the next generation.
    pub fn execute(&self) -> Result<OutcomeReport, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        if !plan.is_active() {
            return Err(DomainError::InvalidInput(format!(
                "Plan {} is {}, only active plans can be closed",
                plan.id, plan.status
            )));
        }
        let rules = self.settings.get_rule_set()?.unwrap_or_default();
        let lineage = super::lineage_context(self.plans.as_ref(), &plan)?;

        match close_manually(plan, &rules, &lineage) {
            RuleOutcome::Closed { closed, successor } => {
                self.plans.save_plan(&closed)?;
                self.plans.save_plan(&successor)?;
                self.plans.set_active_plan_id(Some(&successor.id))?;
                Ok(OutcomeReport {
                    plan: successor.clone(),
                    triggered_rule: closed.triggered_rule,
                    banked_amount: Some(closed.accumulated_amount),
                    closed_plan: Some(closed),
                    successor: Some(successor),
                })
            }
            // Manual close always produces a closure.
            other => Err(DomainError::InvalidInput(format!(
                "Unexpected close outcome: {other:?}"
            ))),
        }
    }
}

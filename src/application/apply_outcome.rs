use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::rules::{evaluate, RuleKind, RuleOutcome};
use crate::domain::values::outcome::BetOutcome;
use serde::Serialize;
use std::sync::Arc;

/// What happened to the active plan after an outcome was applied and the
/// rule list ran.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    /// The plan to treat as current from now on.
    pub plan: Plan,
    /// Set when a closure rule fired: the frozen generation.
    pub closed_plan: Option<Plan>,
    /// Set when a closure rule fired: the freshly spawned generation
    /// (same value as `plan`).
    pub successor: Option<Plan>,
    pub triggered_rule: Option<RuleKind>,
    pub banked_amount: Option<f64>,
}

pub struct ApplyOutcomeUseCase {
    plans: Arc<dyn PlanRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl ApplyOutcomeUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { plans, settings }
    }

    pub fn execute(
        &self,
        outcome: BetOutcome,
        odds_override: Option<f64>,
    ) -> Result<OutcomeReport, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        let rules = self.settings.get_rule_set()?.unwrap_or_default();
        let lineage = super::lineage_context(self.plans.as_ref(), &plan)?;

        let snapshot = plan.apply_outcome(outcome, odds_override, &rules.active_tags())?;
        let report = match evaluate(snapshot, &rules, &lineage) {
            RuleOutcome::Continue(next) => {
                self.plans.save_plan(&next)?;
                OutcomeReport {
                    plan: next,
                    closed_plan: None,
                    successor: None,
                    triggered_rule: None,
                    banked_amount: None,
                }
            }
            RuleOutcome::Failed(failed) => {
                self.plans.save_plan(&failed)?;
                OutcomeReport {
                    triggered_rule: failed.triggered_rule,
                    plan: failed,
                    closed_plan: None,
                    successor: None,
                    banked_amount: None,
                }
            }
            RuleOutcome::Closed { closed, successor } => {
                self.plans.save_plan(&closed)?;
                self.plans.save_plan(&successor)?;
                self.plans.set_active_plan_id(Some(&successor.id))?;
                OutcomeReport {
                    plan: successor.clone(),
                    triggered_rule: closed.triggered_rule,
                    banked_amount: Some(closed.accumulated_amount),
                    closed_plan: Some(closed),
                    successor: Some(successor),
                }
            }
        };
        Ok(report)
    }
}

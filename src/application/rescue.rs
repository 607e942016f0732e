use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::values::rescue::{suggest_rescue, RescueSuggestion};
use std::sync::Arc;

pub struct RescueUseCase {
    plans: Arc<dyn PlanRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl RescueUseCase {
    pub fn new(plans: Arc<dyn PlanRepository>, settings: Arc<dyn SettingsRepository>) -> Self {
        Self { plans, settings }
    }

    /// Propose an extension for the active plan, or `None` when it is
    /// healthy or no safe extension exists.
    pub fn suggest(&self, extra_capital: f64) -> Result<Option<RescueSuggestion>, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        Ok(suggest_rescue(&plan, extra_capital))
    }

    /// Apply a rescue to the active plan.
    pub fn apply(
        &self,
        events_to_add: u32,
        wins_to_add: u32,
        extra_capital: f64,
        target_override: Option<f64>,
        max_losses_override: Option<u32>,
    ) -> Result<Plan, DomainError> {
        let plan = super::active_plan(self.plans.as_ref())?;
        let rules = self.settings.get_rule_set()?.unwrap_or_default();
        let rescued = plan.activate_rescue(
            events_to_add,
            wins_to_add,
            extra_capital,
            target_override,
            max_losses_override,
            &rules.active_tags(),
        )?;
        self.plans.save_plan(&rescued)?;
        Ok(rescued)
    }
}

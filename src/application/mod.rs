pub mod apply_outcome;
pub mod close_plan;
pub mod create_plan;
pub mod history;
pub mod rescue;
pub mod rules;
pub mod stake;
pub mod status;

use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::rules::LineageContext;

/// Walk the parent chain to collect what the milestone rule needs: the
/// total banked by earlier generations and the lineage's original capital.
pub(crate) fn lineage_context(
    plans: &dyn PlanRepository,
    plan: &Plan,
) -> Result<LineageContext, DomainError> {
    let mut banked = 0.0;
    let mut original = plan.start_capital;
    let mut parent_id = plan.parent_id.clone();
    let mut hops = 0u32;
    while let Some(id) = parent_id {
        let parent = plans
            .get_plan(&id)?
            .ok_or_else(|| DomainError::NotFound(format!("Parent plan not found: {id}")))?;
        banked += parent.accumulated_amount;
        original = parent.start_capital;
        parent_id = parent.parent_id.clone();
        hops += 1;
        if hops > 10_000 {
            return Err(DomainError::Database(format!(
                "Lineage of plan {} does not terminate",
                plan.id
            )));
        }
    }
    Ok(LineageContext {
        historical_banked_total: banked,
        original_initial_capital: original,
    })
}

/// Load the plan the active pointer designates.
pub(crate) fn active_plan(plans: &dyn PlanRepository) -> Result<Plan, DomainError> {
    let id = plans
        .active_plan_id()?
        .ok_or_else(|| DomainError::NotFound("No active plan; run `init` first".to_string()))?;
    plans
        .get_plan(&id)?
        .ok_or_else(|| DomainError::NotFound(format!("Active plan not found: {id}")))
}

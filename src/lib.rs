pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::apply_outcome::{ApplyOutcomeUseCase, OutcomeReport};
use crate::application::close_plan::ClosePlanUseCase;
use crate::application::create_plan::CreatePlanUseCase;
use crate::application::history::HistoryUseCase;
use crate::application::rescue::RescueUseCase;
use crate::application::rules::RulesUseCase;
use crate::application::stake::{StakePreview, StakeUseCase};
use crate::application::status::{StatusReport, StatusUseCase};
use crate::domain::entities::event::Event;
use crate::domain::entities::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::plan_repository::PlanRepository;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::rules::{RuleKind, RuleSet};
use crate::domain::values::config::PlanConfig;
use crate::domain::values::outcome::BetOutcome;
use crate::domain::values::rescue::RescueSuggestion;
use crate::domain::values::status::PlanStatus;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::plan_repo::SqlitePlanRepo;
use crate::infrastructure::sqlite::settings_repo::SqliteSettingsRepo;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// The pure engine surface, re-exported for collaborators that bring
// their own persistence.
pub use crate::domain::rules::evaluate as evaluate_rules;
pub use crate::domain::values::projection::max_net_profit;
pub use crate::domain::values::rescue::suggest_rescue;
pub use crate::domain::values::staking::next_stake;

pub struct Masaniello {
    create_plan_uc: CreatePlanUseCase,
    stake_uc: StakeUseCase,
    apply_outcome_uc: ApplyOutcomeUseCase,
    close_plan_uc: ClosePlanUseCase,
    rescue_uc: RescueUseCase,
    status_uc: StatusUseCase,
    history_uc: HistoryUseCase,
    rules_uc: RulesUseCase,
}

impl Masaniello {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        Self::with_connection(conn)
    }

    /// Wire the use cases over one shared connection. Tests pass an
    /// `:memory:` connection here.
    pub fn with_connection(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn)?;
        let conn = Arc::new(Mutex::new(conn));
        let plans: Arc<dyn PlanRepository> = Arc::new(SqlitePlanRepo::new(conn.clone()));
        let settings: Arc<dyn SettingsRepository> = Arc::new(SqliteSettingsRepo::new(conn));

        Ok(Self {
            create_plan_uc: CreatePlanUseCase::new(plans.clone()),
            stake_uc: StakeUseCase::new(plans.clone()),
            apply_outcome_uc: ApplyOutcomeUseCase::new(plans.clone(), settings.clone()),
            close_plan_uc: ClosePlanUseCase::new(plans.clone(), settings.clone()),
            rescue_uc: RescueUseCase::new(plans.clone(), settings.clone()),
            status_uc: StatusUseCase::new(plans.clone()),
            history_uc: HistoryUseCase::new(plans),
            rules_uc: RulesUseCase::new(settings),
        })
    }

    // Delegating methods
    pub fn create_plan(&self, config: PlanConfig) -> Result<Plan, DomainError> {
        self.create_plan_uc.execute(config)
    }

    pub fn next_stake(&self) -> Result<StakePreview, DomainError> {
        self.stake_uc.preview()
    }

    pub fn apply_outcome(
        &self,
        outcome: BetOutcome,
        odds_override: Option<f64>,
    ) -> Result<OutcomeReport, DomainError> {
        self.apply_outcome_uc.execute(outcome, odds_override)
    }

    pub fn close_active_plan(&self) -> Result<OutcomeReport, DomainError> {
        self.close_plan_uc.execute()
    }

    pub fn suggest_rescue(&self, extra_capital: f64) -> Result<Option<RescueSuggestion>, DomainError> {
        self.rescue_uc.suggest(extra_capital)
    }

    pub fn activate_rescue(
        &self,
        events_to_add: u32,
        wins_to_add: u32,
        extra_capital: f64,
        target_override: Option<f64>,
        max_losses_override: Option<u32>,
    ) -> Result<Plan, DomainError> {
        self.rescue_uc.apply(
            events_to_add,
            wins_to_add,
            extra_capital,
            target_override,
            max_losses_override,
        )
    }

    pub fn status(&self) -> Result<StatusReport, DomainError> {
        self.status_uc.report()
    }

    pub fn list_plans(
        &self,
        status: Option<PlanStatus>,
        limit: Option<usize>,
    ) -> Result<Vec<Plan>, DomainError> {
        self.history_uc.list_plans(status, limit)
    }

    pub fn plan_events(&self, plan_id: Option<&str>) -> Result<Vec<Event>, DomainError> {
        self.history_uc.plan_events(plan_id)
    }

    pub fn rules(&self) -> Result<RuleSet, DomainError> {
        self.rules_uc.current()
    }

    pub fn set_rule(&self, kind: RuleKind, enabled: bool) -> Result<RuleSet, DomainError> {
        self.rules_uc.set_rule(kind, enabled)
    }
}

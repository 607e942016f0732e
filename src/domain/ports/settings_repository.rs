use crate::domain::error::DomainError;
use crate::domain::rules::RuleSet;

/// Storage for operator-level settings that outlive any single plan.
pub trait SettingsRepository: Send + Sync {
    /// The enabled optional rules; `None` when never configured.
    fn get_rule_set(&self) -> Result<Option<RuleSet>, DomainError>;
    fn save_rule_set(&self, rules: &RuleSet) -> Result<(), DomainError>;
}

use crate::domain::error::DomainError;
use crate::domain::ports::settings_repository::SettingsRepository;
use crate::domain::rules::{RuleKind, RuleSet};
use std::sync::Arc;

pub struct RulesUseCase {
    settings: Arc<dyn SettingsRepository>,
}

impl RulesUseCase {
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    pub fn current(&self) -> Result<RuleSet, DomainError> {
        Ok(self.settings.get_rule_set()?.unwrap_or_default())
    }

    pub fn set_rule(&self, kind: RuleKind, enabled: bool) -> Result<RuleSet, DomainError> {
        if !kind.is_toggleable() {
            return Err(DomainError::InvalidInput(format!(
                "Rule {kind} cannot be toggled"
            )));
        }
        let mut rules = self.current()?;
        if enabled {
            rules.enable(kind);
        } else {
            rules.disable(kind);
        }
        self.settings.save_rule_set(&rules)?;
        Ok(rules)
    }
}

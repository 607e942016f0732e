use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// Immutable per-plan parameters chosen by the operator.
///
/// Validated once at construction; the staking/projection code downstream
/// may assume `expected_wins <= total_events` and `quota > 1` hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub initial_capital: f64,
    /// Average decimal odds: a win of stake `s` returns `s * quota`.
    pub quota: f64,
    pub total_events: u32,
    pub expected_wins: u32,
    /// Percent of cycle profit banked when a generation closes.
    pub accumulation_percent: f64,
    /// Percent above start capital that defines the weekly target.
    pub weekly_target_percent: f64,
    /// Percent of global profit banked when a capital milestone is crossed.
    pub milestone_bank_percent: f64,
    /// Consecutive full losses tolerated before the plan hard-fails.
    pub max_consecutive_losses: Option<u32>,
    /// Percent of start capital below which the operator wants out.
    pub stop_loss_percent: Option<f64>,
}

impl PlanConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initial_capital: f64,
        quota: f64,
        total_events: u32,
        expected_wins: u32,
        accumulation_percent: f64,
        weekly_target_percent: f64,
        milestone_bank_percent: f64,
        max_consecutive_losses: Option<u32>,
        stop_loss_percent: Option<f64>,
    ) -> Result<Self, DomainError> {
        let config = Self {
            initial_capital,
            quota,
            total_events,
            expected_wins,
            accumulation_percent,
            weekly_target_percent,
            milestone_bank_percent,
            max_consecutive_losses,
            stop_loss_percent,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Initial capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !self.quota.is_finite() || self.quota <= 1.0 {
            return Err(DomainError::InvalidInput(format!(
                "Quota must be greater than 1, got {}",
                self.quota
            )));
        }
        if self.expected_wins == 0 || self.expected_wins > self.total_events {
            return Err(DomainError::InvalidInput(format!(
                "Expected wins must satisfy 0 < wins <= events, got {}/{}",
                self.expected_wins, self.total_events
            )));
        }
        for (name, value) in [
            ("accumulation_percent", self.accumulation_percent),
            ("weekly_target_percent", self.weekly_target_percent),
            ("milestone_bank_percent", self.milestone_bank_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidInput(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if let Some(stop) = self.stop_loss_percent {
            if !stop.is_finite() || stop < 0.0 {
                return Err(DomainError::InvalidInput(format!(
                    "stop_loss_percent must be a non-negative number, got {stop}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            initial_capital: 1000.0,
            quota: 2.0,
            total_events: 10,
            expected_wins: 6,
            accumulation_percent: 50.0,
            weekly_target_percent: 10.0,
            milestone_bank_percent: 30.0,
            max_consecutive_losses: None,
            stop_loss_percent: None,
        }
    }
}

use crate::domain::entities::event::{Event, EventSnapshot};
use crate::domain::error::DomainError;
use crate::domain::rules::RuleKind;
use crate::domain::values::config::PlanConfig;
use crate::domain::values::outcome::{BetOutcome, EventOutcome};
use crate::domain::values::projection::max_net_profit;
use crate::domain::values::staking::next_stake;
use crate::domain::values::status::PlanStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generation of a Masaniello staking lineage.
///
/// Treated as copy-on-write throughout: applying an outcome or closing the
/// plan produces a new `Plan` value, so the current and historical
/// references never alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub generation: u32,
    pub start_capital: f64,
    pub current_capital: f64,
    pub target_capital: f64,
    pub quota: f64,
    pub total_events: u32,
    pub expected_wins: u32,
    pub remaining_events: u32,
    pub remaining_wins: u32,
    pub wins: u32,
    pub losses: u32,
    pub current_consecutive_losses: u32,
    pub max_consecutive_losses: Option<u32>,
    pub is_rescued: bool,
    /// Latched once capital dips below start capital; drives the
    /// back-positive closure rule.
    pub was_negative: bool,
    pub status: PlanStatus,
    pub triggered_rule: Option<RuleKind>,
    pub events: Vec<Event>,
    /// Amount banked when this generation closed.
    pub accumulated_amount: f64,
    /// Absolute weekly-target capital, frozen at creation so later config
    /// edits don't move an in-flight cycle's goal.
    pub current_weekly_target: f64,
    /// Largest integer multiple of the lineage's original capital already
    /// banked against. Carried across generations so a milestone fires once.
    pub milestone_high_water: u32,
    pub parent_id: Option<String>,
    pub children_ids: Vec<String>,
    pub config: PlanConfig,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Plan {
    /// Root plan of a new lineage.
    pub fn new(config: PlanConfig) -> Result<Self, DomainError> {
        config.validate()?;
        let capital = config.initial_capital;
        let profit = max_net_profit(
            capital,
            config.total_events,
            config.expected_wins,
            config.quota,
            config.max_consecutive_losses.unwrap_or(0),
        );
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            generation: 1,
            start_capital: capital,
            current_capital: capital,
            target_capital: capital + profit,
            quota: config.quota,
            total_events: config.total_events,
            expected_wins: config.expected_wins,
            remaining_events: config.total_events,
            remaining_wins: config.expected_wins,
            wins: 0,
            losses: 0,
            current_consecutive_losses: 0,
            max_consecutive_losses: config.max_consecutive_losses,
            is_rescued: false,
            was_negative: false,
            status: PlanStatus::Active,
            triggered_rule: None,
            events: Vec::new(),
            accumulated_amount: 0.0,
            current_weekly_target: capital * (1.0 + config.weekly_target_percent / 100.0),
            milestone_high_water: 1,
            parent_id: None,
            children_ids: Vec::new(),
            config,
            created_at: Utc::now(),
            closed_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }

    /// Realized profit of this cycle so far.
    pub fn cycle_profit(&self) -> f64 {
        self.current_capital - self.start_capital
    }

    /// Net profit projected at plan creation.
    pub fn projected_max_profit(&self) -> f64 {
        self.target_capital - self.start_capital
    }

    pub fn played_events(&self) -> u32 {
        self.total_events.saturating_sub(self.remaining_events)
    }

    /// Stake the plan calls for on the immediate next event. A terminal
    /// plan calls for nothing.
    pub fn next_stake(&self) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        next_stake(
            self.current_capital,
            self.remaining_events,
            self.remaining_wins,
            self.quota,
            self.target_capital,
        )
    }

    /// Apply a bet outcome, producing the candidate successor snapshot.
    ///
    /// The snapshot has the event appended and all live counters moved;
    /// rule evaluation decides what happens to it afterwards.
    pub fn apply_outcome(
        &self,
        outcome: BetOutcome,
        odds_override: Option<f64>,
        active_rules: &[RuleKind],
    ) -> Result<Plan, DomainError> {
        if !self.is_active() {
            return Err(DomainError::InvalidInput(format!(
                "Plan {} is {}, outcomes can only be applied to active plans",
                self.id, self.status
            )));
        }
        let odds = odds_override.unwrap_or(self.quota);
        let stake = next_stake(
            self.current_capital,
            self.remaining_events,
            self.remaining_wins,
            odds,
            self.target_capital,
        );

        let mut next = self.clone();
        let (classification, is_system, message): (EventOutcome, bool, Option<String>) =
            match outcome {
                BetOutcome::FullWin => {
                    next.current_capital += stake * (odds - 1.0);
                    next.record_win();
                    (EventOutcome::Win, false, None)
                }
                BetOutcome::FullLoss => {
                    next.current_capital = (next.current_capital - stake).max(0.0);
                    next.record_loss();
                    (EventOutcome::Loss, false, None)
                }
                BetOutcome::PartialWin { fraction } => {
                    let f = validated_fraction(fraction)?;
                    next.current_capital += stake * (odds - 1.0) * f;
                    next.record_win();
                    (
                        EventOutcome::Win,
                        false,
                        Some(format!("Partial win at {:.0}% of full payout", f * 100.0)),
                    )
                }
                BetOutcome::PartialLoss { fraction } => {
                    let f = validated_fraction(fraction)?;
                    next.current_capital = (next.current_capital - stake * f).max(0.0);
                    next.record_loss();
                    (
                        EventOutcome::Loss,
                        false,
                        Some(format!("Partial loss of {:.0}% of stake", f * 100.0)),
                    )
                }
                // A voided bet refunds the stake and consumes nothing.
                BetOutcome::Void => (
                    EventOutcome::Void,
                    false,
                    Some("Bet voided, stake refunded".to_string()),
                ),
                BetOutcome::Adjustment { amount } => {
                    if !amount.is_finite() {
                        return Err(DomainError::InvalidInput(format!(
                            "Adjustment amount must be finite, got {amount}"
                        )));
                    }
                    if next.current_capital + amount < 0.0 {
                        return Err(DomainError::InvalidInput(format!(
                            "Adjustment of {amount} would take capital below zero"
                        )));
                    }
                    next.current_capital += amount;
                    (
                        EventOutcome::Void,
                        true,
                        Some(format!("Manual capital adjustment of {amount:.2}")),
                    )
                }
            };

        if next.current_capital < next.start_capital {
            next.was_negative = true;
        }
        next.push_event(stake, classification, odds, message, is_system, active_rules);
        Ok(next)
    }

    fn record_win(&mut self) {
        self.wins += 1;
        self.remaining_wins = self.remaining_wins.saturating_sub(1);
        self.remaining_events = self.remaining_events.saturating_sub(1);
        self.current_consecutive_losses = 0;
    }

    fn record_loss(&mut self) {
        self.losses += 1;
        self.remaining_events = self.remaining_events.saturating_sub(1);
        self.current_consecutive_losses += 1;
    }

    /// Append an event carrying the current audit snapshot.
    pub fn push_event(
        &mut self,
        stake: f64,
        outcome: EventOutcome,
        odds: f64,
        message: Option<String>,
        is_system: bool,
        active_rules: &[RuleKind],
    ) {
        let event = Event {
            seq: self.events.len() as u32 + 1,
            stake,
            outcome,
            capital_after: self.current_capital,
            events_remaining_after: self.remaining_events,
            wins_remaining_after: self.remaining_wins,
            odds,
            message,
            is_system,
            snapshot: EventSnapshot {
                version: EventSnapshot::CURRENT_VERSION,
                quota: self.quota,
                target_capital: self.target_capital,
                remaining_events: self.remaining_events,
                remaining_wins: self.remaining_wins,
                accumulation_percent: self.config.accumulation_percent,
                active_rules: active_rules.to_vec(),
            },
            created_at: Utc::now(),
        };
        self.events.push(event);
    }

    /// Operator-triggered rescue: extend the event/win budget, optionally
    /// inject capital, re-project the target, and reset the loss streak.
    pub fn activate_rescue(
        &self,
        events_to_add: u32,
        wins_to_add: u32,
        extra_capital: f64,
        target_override: Option<f64>,
        max_losses_override: Option<u32>,
        active_rules: &[RuleKind],
    ) -> Result<Plan, DomainError> {
        if !self.is_active() {
            return Err(DomainError::InvalidInput(format!(
                "Plan {} is {}, only active plans can be rescued",
                self.id, self.status
            )));
        }
        if !extra_capital.is_finite() || extra_capital < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Extra capital must be non-negative, got {extra_capital}"
            )));
        }
        let mut next = self.clone();
        next.remaining_events += events_to_add;
        next.remaining_wins += wins_to_add;
        next.total_events += events_to_add;
        next.expected_wins += wins_to_add;
        next.current_capital += extra_capital;
        if let Some(cap) = max_losses_override {
            next.max_consecutive_losses = Some(cap);
        }
        next.target_capital = match target_override {
            Some(target) if target.is_finite() && target > 0.0 => target,
            Some(target) => {
                return Err(DomainError::InvalidInput(format!(
                    "Target override must be positive, got {target}"
                )))
            }
            None => {
                next.current_capital
                    + max_net_profit(
                        next.current_capital,
                        next.remaining_events,
                        next.remaining_wins,
                        next.quota,
                        next.max_consecutive_losses.unwrap_or(0),
                    )
            }
        };
        next.current_consecutive_losses = 0;
        next.is_rescued = true;
        next.push_event(
            0.0,
            EventOutcome::Void,
            next.quota,
            Some(format!(
                "RESCUE: +{events_to_add} events, +{wins_to_add} wins, +{extra_capital:.2} capital"
            )),
            true,
            active_rules,
        );
        Ok(next)
    }
}

fn validated_fraction(fraction: f64) -> Result<f64, DomainError> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(DomainError::InvalidInput(format!(
            "Fraction must be between 0.0 and 1.0, got {fraction}"
        )));
    }
    Ok(fraction)
}

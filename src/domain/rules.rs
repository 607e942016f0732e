//! Plan-transition state machine.
//!
//! After every capital-affecting event the candidate snapshot runs through
//! a fixed-priority rule list. Evaluation is strictly sequential and
//! short-circuiting: the first matching rule decides the transition, and
//! hard failure always pre-empts any banking rule. A firing closure rule
//! banks part of the profit, freezes the generation and spawns its
//! successor; a failure rule terminates the lineage.

use crate::domain::entities::plan::Plan;
use crate::domain::values::outcome::EventOutcome;
use crate::domain::values::projection::max_net_profit;
use crate::domain::values::status::PlanStatus;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closure/failure tags, in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    MaxLosses,
    FirstWinClose,
    BackPositiveClose,
    Profit90Reset,
    AllWins,
    RescueTargetReached,
    AutoBank100,
    ProfitMilestone,
    Impossible,
    SmartAutoClose,
    ManualClose,
}

impl RuleKind {
    /// Rules the operator can toggle. Hard failure, completion, rescue
    /// recovery and manual close always apply.
    pub const TOGGLEABLE: [RuleKind; 7] = [
        RuleKind::FirstWinClose,
        RuleKind::BackPositiveClose,
        RuleKind::Profit90Reset,
        RuleKind::AutoBank100,
        RuleKind::ProfitMilestone,
        RuleKind::Impossible,
        RuleKind::SmartAutoClose,
    ];

    pub fn is_toggleable(&self) -> bool {
        Self::TOGGLEABLE.contains(self)
    }

    /// Rules that terminate the lineage instead of spawning a successor.
    pub fn is_failure(&self) -> bool {
        matches!(self, RuleKind::MaxLosses | RuleKind::Impossible)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RuleKind::MaxLosses => "max_losses",
            RuleKind::FirstWinClose => "first_win_close",
            RuleKind::BackPositiveClose => "back_positive_close",
            RuleKind::Profit90Reset => "profit_90_reset",
            RuleKind::AllWins => "all_wins",
            RuleKind::RescueTargetReached => "rescue_target_reached",
            RuleKind::AutoBank100 => "auto_bank_100",
            RuleKind::ProfitMilestone => "profit_milestone",
            RuleKind::Impossible => "impossible",
            RuleKind::SmartAutoClose => "smart_auto_close",
            RuleKind::ManualClose => "manual_close",
        };
        write!(f, "{tag}")
    }
}

impl FromStr for RuleKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "max_losses" => Ok(RuleKind::MaxLosses),
            "first_win_close" => Ok(RuleKind::FirstWinClose),
            "back_positive_close" => Ok(RuleKind::BackPositiveClose),
            "profit_90_reset" => Ok(RuleKind::Profit90Reset),
            "all_wins" => Ok(RuleKind::AllWins),
            "rescue_target_reached" => Ok(RuleKind::RescueTargetReached),
            "auto_bank_100" => Ok(RuleKind::AutoBank100),
            "profit_milestone" => Ok(RuleKind::ProfitMilestone),
            "impossible" => Ok(RuleKind::Impossible),
            "smart_auto_close" => Ok(RuleKind::SmartAutoClose),
            "manual_close" => Ok(RuleKind::ManualClose),
            _ => Err(format!("Unknown rule: {s}")),
        }
    }
}

/// The set of optional rules currently enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    enabled: Vec<RuleKind>,
}

impl RuleSet {
    pub fn new(enabled: Vec<RuleKind>) -> Self {
        let mut set = Self { enabled: Vec::new() };
        for kind in enabled {
            set.enable(kind);
        }
        set
    }

    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn enable(&mut self, kind: RuleKind) {
        if kind.is_toggleable() && !self.enabled.contains(&kind) {
            self.enabled.push(kind);
        }
    }

    pub fn disable(&mut self, kind: RuleKind) {
        self.enabled.retain(|k| *k != kind);
    }

    pub fn active_tags(&self) -> Vec<RuleKind> {
        self.enabled.clone()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(vec![
            RuleKind::BackPositiveClose,
            RuleKind::Profit90Reset,
            RuleKind::Impossible,
        ])
    }
}

/// Lineage-level figures the milestone rule needs: the sum of everything
/// banked by earlier generations and the original capital the lineage
/// started from.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineageContext {
    pub historical_banked_total: f64,
    pub original_initial_capital: f64,
}

/// Result of running the rule list over a candidate snapshot.
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    /// No rule fired; the snapshot replaces the active plan.
    Continue(Plan),
    /// Terminal failure, lineage ends.
    Failed(Plan),
    /// A closure rule fired: the frozen generation and its successor.
    Closed { closed: Plan, successor: Plan },
}

/// Evaluate the fixed-priority rule list against a candidate snapshot.
pub fn evaluate(snapshot: Plan, rules: &RuleSet, lineage: &LineageContext) -> RuleOutcome {
    // 1. Hard failure: loss streak over the cap. Checked before any
    //    banking logic can run.
    if let Some(cap) = snapshot.max_consecutive_losses {
        if snapshot.current_consecutive_losses > cap {
            return fail_plan(snapshot, RuleKind::MaxLosses, rules);
        }
    }

    // 2. First recorded win with a clean sheet.
    if rules.is_enabled(RuleKind::FirstWinClose) && snapshot.wins == 1 && snapshot.losses == 0 {
        return close_plan(snapshot, RuleKind::FirstWinClose, rules, lineage);
    }

    // 3. Recovered to start capital after having been in loss.
    if rules.is_enabled(RuleKind::BackPositiveClose)
        && snapshot.was_negative
        && snapshot.current_capital >= snapshot.start_capital
    {
        return close_plan(snapshot, RuleKind::BackPositiveClose, rules, lineage);
    }

    // 4. 90% of the originally projected profit already realized.
    if rules.is_enabled(RuleKind::Profit90Reset)
        && snapshot.projected_max_profit() > 0.0
        && snapshot.cycle_profit() >= 0.9 * snapshot.projected_max_profit()
    {
        return close_plan(snapshot, RuleKind::Profit90Reset, rules, lineage);
    }

    // 5. Win quota met. A rescued plan still under water keeps playing.
    if snapshot.remaining_wins == 0
        && !(snapshot.is_rescued && snapshot.current_capital < snapshot.start_capital)
    {
        return close_plan(snapshot, RuleKind::AllWins, rules, lineage);
    }

    // 6. Rescue recovered enough of the start capital.
    if snapshot.is_rescued
        && snapshot.start_capital > 0.0
        && snapshot.current_capital / snapshot.start_capital >= 0.90
    {
        return close_plan(snapshot, RuleKind::RescueTargetReached, rules, lineage);
    }

    // 7. Weekly target reached; the target is an absolute value frozen at
    //    cycle start so later config edits don't move it retroactively.
    if rules.is_enabled(RuleKind::AutoBank100)
        && snapshot.current_capital >= snapshot.current_weekly_target
        && snapshot.cycle_profit() > 0.0
    {
        return close_plan(snapshot, RuleKind::AutoBank100, rules, lineage);
    }

    // 8. Total worth crossed a new integer multiple of the original
    //    capital. The high-water mark is inherited across generations so
    //    a milestone fires exactly once.
    if rules.is_enabled(RuleKind::ProfitMilestone) && lineage.original_initial_capital > 0.0 {
        let worth = snapshot.current_capital + lineage.historical_banked_total;
        let multiple = (worth / lineage.original_initial_capital).floor() as u32;
        if multiple > snapshot.milestone_high_water {
            return close_plan(snapshot, RuleKind::ProfitMilestone, rules, lineage);
        }
    }

    // 9. Mathematically impossible: more wins owed than events left.
    if rules.is_enabled(RuleKind::Impossible)
        && snapshot.remaining_events < snapshot.remaining_wins
    {
        return fail_plan(snapshot, RuleKind::Impossible, rules);
    }

    // 10. Protective close late in the plan with capital intact.
    if rules.is_enabled(RuleKind::SmartAutoClose) && snapshot.total_events > 0 {
        let played = snapshot.played_events() as f64 / snapshot.total_events as f64;
        if played >= 0.65 && snapshot.current_capital >= 0.9 * snapshot.start_capital {
            return close_plan(snapshot, RuleKind::SmartAutoClose, rules, lineage);
        }
    }

    RuleOutcome::Continue(snapshot)
}

/// Operator-initiated close of an active plan; banks like any other
/// cycle-profit close and spawns the successor.
pub fn close_manually(plan: Plan, rules: &RuleSet, lineage: &LineageContext) -> RuleOutcome {
    close_plan(plan, RuleKind::ManualClose, rules, lineage)
}

fn fail_plan(mut snapshot: Plan, rule: RuleKind, rules: &RuleSet) -> RuleOutcome {
    let quota = snapshot.quota;
    snapshot.status = PlanStatus::Failed;
    snapshot.triggered_rule = Some(rule);
    snapshot.closed_at = Some(Utc::now());
    snapshot.push_event(
        0.0,
        EventOutcome::Void,
        quota,
        Some(format!("PLAN FAILED: {rule}")),
        true,
        &rules.active_tags(),
    );
    RuleOutcome::Failed(snapshot)
}

fn close_plan(
    mut snapshot: Plan,
    rule: RuleKind,
    rules: &RuleSet,
    lineage: &LineageContext,
) -> RuleOutcome {
    let banked = amount_to_bank(&snapshot, rule, lineage);
    let quota = snapshot.quota;
    snapshot.status = if rule == RuleKind::AllWins {
        PlanStatus::Completed
    } else {
        PlanStatus::Closed
    };
    snapshot.triggered_rule = Some(rule);
    snapshot.accumulated_amount = banked;
    snapshot.closed_at = Some(Utc::now());
    snapshot.push_event(
        0.0,
        EventOutcome::Void,
        quota,
        Some(format!("BANKING: {banked:.2} banked on {rule} close")),
        true,
        &rules.active_tags(),
    );

    let successor = spawn_successor(&snapshot, rule, lineage);
    snapshot.children_ids.push(successor.id.clone());
    RuleOutcome::Closed {
        closed: snapshot,
        successor,
    }
}

/// Banked amount for a firing rule. Milestone closes bank against global
/// profit with a cap at half the live capital; every other close banks the
/// accumulation share of the positive cycle profit.
fn amount_to_bank(plan: &Plan, rule: RuleKind, lineage: &LineageContext) -> f64 {
    match rule {
        RuleKind::ProfitMilestone => {
            let global_profit = plan.current_capital + lineage.historical_banked_total
                - lineage.original_initial_capital;
            let amount = global_profit * plan.config.milestone_bank_percent / 100.0;
            amount.clamp(0.0, 0.5 * plan.current_capital)
        }
        _ => {
            let cycle = plan.cycle_profit();
            if cycle > 0.0 {
                cycle * plan.config.accumulation_percent / 100.0
            } else {
                0.0
            }
        }
    }
}

fn spawn_successor(closed: &Plan, rule: RuleKind, lineage: &LineageContext) -> Plan {
    let config = closed.config.clone();
    let start = (closed.current_capital - closed.accumulated_amount).max(0.0);
    let profit = max_net_profit(
        start,
        config.total_events,
        config.expected_wins,
        config.quota,
        config.max_consecutive_losses.unwrap_or(0),
    );
    let weekly_target = if rule == RuleKind::AutoBank100 {
        start * (1.0 + config.weekly_target_percent / 100.0)
    } else {
        closed.current_weekly_target
    };
    let high_water = if rule == RuleKind::ProfitMilestone && lineage.original_initial_capital > 0.0
    {
        let worth = closed.current_capital + lineage.historical_banked_total;
        ((worth / lineage.original_initial_capital).floor() as u32).max(closed.milestone_high_water)
    } else {
        closed.milestone_high_water
    };

    Plan {
        id: uuid::Uuid::new_v4().to_string(),
        generation: closed.generation + 1,
        start_capital: start,
        current_capital: start,
        target_capital: start + profit,
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
        current_weekly_target: weekly_target,
        milestone_high_water: high_water,
        parent_id: Some(closed.id.clone()),
        children_ids: Vec::new(),
        config,
        created_at: Utc::now(),
        closed_at: None,
    }
}

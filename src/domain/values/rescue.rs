//! Rescue search for plans in jeopardy.
//!
//! A struggling plan can be extended with extra events and wins so that
//! break-even becomes statistically reachable again. The search scans
//! candidate (events, wins) configurations, prices each one with the
//! stake calculator, and prefers gentle recoveries: many events, stake a
//! small fraction of the bankroll.

use crate::domain::entities::plan::Plan;
use crate::domain::values::projection::max_net_profit;
use crate::domain::values::staking::next_stake;
use serde::Serialize;

const EPSILON: f64 = 1e-6;

/// Stake-to-capital band considered a comfortable recovery.
const RATIO_LOW: f64 = 0.04;
const RATIO_HIGH: f64 = 0.15;
const RATIO_IDEAL: f64 = 0.10;

/// Stake share of capital above which a plan counts as strained.
const STRAINED_STAKE_RATIO: f64 = 0.20;

/// Share of the allowed errors that marks a plan as structurally at risk.
const ERROR_BUDGET_RATIO: f64 = 0.70;

/// A proposed plan extension restoring reachability of break-even.
#[derive(Debug, Clone, Serialize)]
pub struct RescueSuggestion {
    /// Events to add on top of the current remaining counter.
    pub events_to_add: u32,
    /// Wins to add on top of the current remaining counter.
    pub wins_to_add: u32,
    /// Capital the rescued plan re-targets (the break-even point).
    pub target_capital: f64,
    /// Stake the rescued configuration would call for next.
    pub estimated_stake: f64,
    /// `estimated_stake / effective_capital`.
    pub stake_ratio: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    events: u32,
    wins: u32,
    stake: f64,
    ratio: f64,
}

/// Propose a revised (events, wins) configuration for a plan in jeopardy,
/// or `None` when the plan is healthy or no safe extension exists within
/// the plan's original event budget.
pub fn suggest_rescue(plan: &Plan, extra_capital: f64) -> Option<RescueSuggestion> {
    let extra = if extra_capital.is_finite() && extra_capital > 0.0 {
        extra_capital
    } else {
        0.0
    };
    let break_even = plan.start_capital;
    let effective = plan.current_capital + extra;

    // Already at or above break-even: nothing to rescue.
    if plan.current_capital >= break_even - EPSILON {
        return None;
    }
    if !needs_rescue(plan, break_even) {
        return None;
    }
    if effective <= 0.0 || plan.quota <= 1.0 {
        return None;
    }

    // One candidate per event count: the smallest win quota that makes
    // break-even reachable again.
    let mut candidates: Vec<Candidate> = Vec::new();
    for events in 2..=plan.total_events {
        for wins in 1..=events {
            let projected = max_net_profit(effective, events, wins, plan.quota, 0);
            if effective + projected >= break_even - EPSILON {
                let stake = next_stake(effective, events, wins, plan.quota, break_even);
                candidates.push(Candidate {
                    events,
                    wins,
                    stake,
                    ratio: stake / effective,
                });
                break;
            }
        }
    }
    if candidates.is_empty() {
        return None;
    }

    // Prefer the gentlest comfortable candidate: largest event count with
    // the stake inside the band; otherwise closest to the ideal ratio.
    let winner = candidates
        .iter()
        .filter(|c| c.ratio >= RATIO_LOW && c.ratio <= RATIO_HIGH)
        .max_by_key(|c| c.events)
        .copied()
        .or_else(|| {
            candidates
                .iter()
                .min_by(|a, b| {
                    let da = (a.ratio - RATIO_IDEAL).abs();
                    let db = (b.ratio - RATIO_IDEAL).abs();
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .copied()
        })?;

    Some(RescueSuggestion {
        events_to_add: winner.events.saturating_sub(plan.remaining_events),
        wins_to_add: winner.wins.saturating_sub(plan.remaining_wins),
        target_capital: break_even,
        estimated_stake: winner.stake,
        stake_ratio: winner.ratio,
    })
}

/// The trigger gate: a plan qualifies for rescue only when it shows at
/// least one concrete sign of jeopardy.
fn needs_rescue(plan: &Plan, break_even: f64) -> bool {
    if plan.is_rescued {
        return true;
    }
    // Win quota used up with the bankroll still under water.
    if plan.remaining_wins == 0 && plan.current_capital < break_even {
        return true;
    }
    // The next stake would strain the bankroll.
    if plan.current_capital > 0.0 {
        let stake = plan.next_stake();
        if stake > STRAINED_STAKE_RATIO * plan.current_capital {
            return true;
        }
    }
    // Structural errors close to the plan's error budget.
    let allowed = plan.total_events.saturating_sub(plan.expected_wins);
    if allowed > 0 && plan.losses as f64 >= ERROR_BUDGET_RATIO * allowed as f64 {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::config::PlanConfig;

    fn plan(events: u32, wins: u32) -> Plan {
        let config = PlanConfig {
            initial_capital: 1000.0,
            quota: 2.0,
            total_events: events,
            expected_wins: wins,
            accumulation_percent: 50.0,
            weekly_target_percent: 10.0,
            milestone_bank_percent: 30.0,
            max_consecutive_losses: None,
            stop_loss_percent: None,
        };
        Plan::new(config).unwrap()
    }

    #[test]
    fn test_healthy_plan_is_never_rescued() {
        let p = plan(10, 6);
        assert!(suggest_rescue(&p, 0.0).is_none());
    }

    #[test]
    fn test_plan_at_break_even_is_never_rescued() {
        let mut p = plan(10, 6);
        p.current_capital = 1000.0;
        p.losses = 9; // even with heavy losses, capital decides
        assert!(suggest_rescue(&p, 0.0).is_none());
    }

    #[test]
    fn test_wins_exhausted_below_break_even_triggers() {
        let mut p = plan(10, 6);
        p.current_capital = 600.0;
        p.was_negative = true;
        p.wins = 6;
        p.remaining_wins = 0;
        p.remaining_events = 2;
        p.losses = 2;
        let suggestion = suggest_rescue(&p, 0.0);
        assert!(suggestion.is_some());
        let s = suggestion.unwrap();
        assert!(s.wins_to_add >= 1, "exhausted quota must regain wins");
        assert!((s.target_capital - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_budget_triggers() {
        let mut p = plan(10, 6);
        // 3 of 4 allowed errors burned, capital under water.
        p.current_capital = 820.0;
        p.was_negative = true;
        p.losses = 3;
        p.wins = 2;
        p.remaining_wins = 4;
        p.remaining_events = 5;
        assert!(suggest_rescue(&p, 0.0).is_some());
    }

    #[test]
    fn test_below_break_even_without_jeopardy_is_none() {
        let mut p = plan(20, 4);
        // Slightly down, one loss, next stake small: no gate holds.
        p.current_capital = 980.0;
        p.was_negative = true;
        p.losses = 1;
        p.wins = 0;
        p.remaining_wins = 4;
        p.remaining_events = 19;
        assert!(suggest_rescue(&p, 0.0).is_none());
    }

    #[test]
    fn test_rescued_flag_keeps_gate_open() {
        let mut p = plan(10, 6);
        p.current_capital = 900.0;
        p.was_negative = true;
        p.is_rescued = true;
        p.losses = 1;
        p.wins = 2;
        p.remaining_wins = 3;
        p.remaining_events = 6;
        assert!(suggest_rescue(&p, 0.0).is_some());
    }

    #[test]
    fn test_deltas_relative_to_remaining_counters() {
        let mut p = plan(10, 6);
        p.current_capital = 500.0;
        p.was_negative = true;
        p.wins = 6;
        p.remaining_wins = 0;
        p.remaining_events = 1;
        p.losses = 3;
        let s = suggest_rescue(&p, 0.0).unwrap();
        // Chosen configuration never shrinks what is already remaining.
        assert!(s.events_to_add <= p.total_events);
        assert!(s.wins_to_add >= 1);
    }

    #[test]
    fn test_extra_capital_reduces_estimated_stake_ratio() {
        let mut p = plan(10, 6);
        p.current_capital = 550.0;
        p.was_negative = true;
        p.wins = 6;
        p.remaining_wins = 0;
        p.remaining_events = 2;
        p.losses = 2;
        let without = suggest_rescue(&p, 0.0).unwrap();
        let with = suggest_rescue(&p, 300.0).unwrap();
        assert!(with.stake_ratio <= without.stake_ratio + 1e-9);
    }

    #[test]
    fn test_suggestion_restores_reachability() {
        let mut p = plan(12, 7);
        p.current_capital = 480.0;
        p.was_negative = true;
        p.wins = 7;
        p.remaining_wins = 0;
        p.remaining_events = 1;
        p.losses = 4;
        let s = suggest_rescue(&p, 0.0).unwrap();
        let events = p.remaining_events + s.events_to_add;
        let wins = p.remaining_wins + s.wins_to_add;
        let projected = max_net_profit(p.current_capital, events, wins, p.quota, 0);
        assert!(p.current_capital + projected >= p.start_capital - 1e-6);
    }
}

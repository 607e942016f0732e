mod common;

use common::setup;
use masaniello::domain::rules::RuleKind;
use masaniello::domain::values::config::PlanConfig;
use masaniello::domain::values::outcome::BetOutcome;
use masaniello::domain::values::status::PlanStatus;

fn capped_config(max_losses: u32) -> PlanConfig {
    PlanConfig::new(
        1000.0,
        2.0,
        10,
        6,
        50.0,
        10.0,
        30.0,
        Some(max_losses),
        None,
    )
    .unwrap()
}

#[test]
fn test_exceeding_loss_cap_fails_the_lineage() {
    let app = setup();
    app.create_plan(capped_config(3)).unwrap();

    for _ in 0..3 {
        let report = app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
        assert_eq!(report.plan.status, PlanStatus::Active);
    }

    let report = app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
    assert_eq!(report.plan.status, PlanStatus::Failed);
    assert_eq!(report.plan.triggered_rule, Some(RuleKind::MaxLosses));
    assert_eq!(report.plan.current_consecutive_losses, 4);
    assert!(report.successor.is_none(), "failure must not spawn");

    // The lineage is over: further outcomes are rejected.
    assert!(app.apply_outcome(BetOutcome::FullLoss, None).is_err());
}

#[test]
fn test_failed_plan_stays_visible_in_status() {
    let app = setup();
    app.create_plan(capped_config(1)).unwrap();
    app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
    app.apply_outcome(BetOutcome::FullLoss, None).unwrap();

    // The pointer still designates the failed plan so the operator sees
    // what happened; only a new init starts over.
    let status = app.status().unwrap();
    assert_eq!(status.plan.status, PlanStatus::Failed);
    assert_eq!(status.next_stake, 0.0);
}

#[test]
fn test_manual_close_banks_half_of_cycle_profit() {
    let app = setup();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    // Lift the cycle profit to exactly 200, then close by hand.
    app.apply_outcome(BetOutcome::Adjustment { amount: 200.0 }, None)
        .unwrap();
    let report = app.close_active_plan().unwrap();

    let closed = report.closed_plan.unwrap();
    assert_eq!(closed.triggered_rule, Some(RuleKind::ManualClose));
    assert!((closed.accumulated_amount - 100.0).abs() < 1e-9);
    let successor = report.successor.unwrap();
    assert!((successor.start_capital - 1100.0).abs() < 1e-9);
}

#[test]
fn test_losing_close_banks_nothing() {
    let app = setup();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();
    app.apply_outcome(BetOutcome::FullLoss, None).unwrap();

    let report = app.close_active_plan().unwrap();
    let closed = report.closed_plan.unwrap();
    assert_eq!(closed.accumulated_amount, 0.0);
    let successor = report.successor.unwrap();
    assert!((successor.start_capital - closed.current_capital).abs() < 1e-9);
}

#[test]
fn test_back_positive_close_after_recovery() {
    let app = setup();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
    // Recover past the start capital with a manual adjustment; the
    // back-positive rule closes the cycle.
    let report = app
        .apply_outcome(BetOutcome::Adjustment { amount: 400.0 }, None)
        .unwrap();
    let closed = report.closed_plan.expect("should close on recovery");
    assert_eq!(closed.triggered_rule, Some(RuleKind::BackPositiveClose));
    assert!(closed.current_capital >= 1000.0);
}

#[test]
fn test_first_win_close_when_enabled() {
    let app = setup();
    app.set_rule(RuleKind::FirstWinClose, true).unwrap();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    let report = app.apply_outcome(BetOutcome::FullWin, None).unwrap();
    let closed = report.closed_plan.expect("first win should close");
    assert_eq!(closed.triggered_rule, Some(RuleKind::FirstWinClose));
    assert_eq!(closed.wins, 1);
    assert_eq!(closed.losses, 0);
}

#[test]
fn test_auto_bank_fires_on_frozen_weekly_target() {
    let app = setup();
    app.set_rule(RuleKind::AutoBank100, true).unwrap();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    // Weekly target was frozen at 1100 on creation.
    let report = app
        .apply_outcome(BetOutcome::Adjustment { amount: 150.0 }, None)
        .unwrap();
    let closed = report.closed_plan.expect("weekly target reached");
    assert_eq!(closed.triggered_rule, Some(RuleKind::AutoBank100));
    assert!((closed.accumulated_amount - 75.0).abs() < 1e-9);

    // The successor re-derives its weekly target from its own start.
    let successor = report.successor.unwrap();
    assert!((successor.start_capital - 1075.0).abs() < 1e-9);
    assert!((successor.current_weekly_target - 1182.5).abs() < 1e-9);
}

#[test]
fn test_milestone_banks_once_across_generations() {
    let app = setup();
    app.set_rule(RuleKind::ProfitMilestone, true).unwrap();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    // Worth crosses 2x the original capital.
    let report = app
        .apply_outcome(BetOutcome::Adjustment { amount: 1200.0 }, None)
        .unwrap();
    let closed = report.closed_plan.expect("milestone should close");
    assert_eq!(closed.triggered_rule, Some(RuleKind::ProfitMilestone));
    // Global profit 1200 at 30% milestone banking.
    assert!((closed.accumulated_amount - 360.0).abs() < 1e-9);
    let successor = report.successor.unwrap();
    assert_eq!(successor.milestone_high_water, 2);

    // Successor worth (1840 live + 360 banked) still sits above 2x; the
    // recorded mark keeps the rule quiet until 3x.
    let report = app
        .apply_outcome(BetOutcome::Adjustment { amount: 10.0 }, None)
        .unwrap();
    assert!(report.closed_plan.is_none());
}

#[test]
fn test_impossible_plan_fails() {
    let app = setup();
    // 6 allowed losses on 10 events with the impossible rule on by
    // default: the 5th loss leaves 5 events for 6 owed wins.
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();
    for _ in 0..4 {
        let report = app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
        assert_eq!(report.plan.status, PlanStatus::Active);
    }
    let report = app.apply_outcome(BetOutcome::FullLoss, None).unwrap();
    assert_eq!(report.plan.status, PlanStatus::Failed);
    assert_eq!(report.plan.triggered_rule, Some(RuleKind::Impossible));
    assert!(report.successor.is_none());
}

#[test]
fn test_smart_auto_close_protects_late_capital() {
    let app = setup();
    // Isolate the protective close from the earlier recovery rules.
    app.set_rule(RuleKind::BackPositiveClose, false).unwrap();
    app.set_rule(RuleKind::Profit90Reset, false).unwrap();
    app.set_rule(RuleKind::SmartAutoClose, true).unwrap();
    app.create_plan(common::config(1000.0, 2.0, 10, 6)).unwrap();

    // Alternate outcomes: the seventh event crosses the 65% played mark
    // with the bankroll above 90% of start.
    let mut last = None;
    for i in 0..7 {
        let outcome = if i % 2 == 0 {
            BetOutcome::FullWin
        } else {
            BetOutcome::FullLoss
        };
        let report = app.apply_outcome(outcome, None).unwrap();
        last = Some(report);
    }
    let report = last.unwrap();
    let closed = report.closed_plan.expect("seventh event should close");
    assert_eq!(closed.triggered_rule, Some(RuleKind::SmartAutoClose));
    assert!(closed.current_capital >= 0.9 * closed.start_capital);
    assert!(closed.remaining_wins > 0, "closed before the quota was met");
}

#[test]
fn test_rule_toggling_persists() {
    let app = setup();
    let rules = app.rules().unwrap();
    assert!(rules.is_enabled(RuleKind::BackPositiveClose));
    assert!(!rules.is_enabled(RuleKind::AutoBank100));

    let rules = app.set_rule(RuleKind::AutoBank100, true).unwrap();
    assert!(rules.is_enabled(RuleKind::AutoBank100));
    let rules = app.set_rule(RuleKind::BackPositiveClose, false).unwrap();
    assert!(!rules.is_enabled(RuleKind::BackPositiveClose));

    // Non-toggleable rules are rejected.
    assert!(app.set_rule(RuleKind::MaxLosses, true).is_err());
    assert!(app.set_rule(RuleKind::AllWins, false).is_err());
}

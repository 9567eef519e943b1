use approx::assert_abs_diff_eq;
use finance_core::simulation::{project, solve_required_daily_rate, GoalOutcome, GoalSolver};

#[test]
fn goal_already_met_needs_no_growth() {
    assert_eq!(
        solve_required_daily_rate(100.0, 100.0, 5.0, 10.0),
        Some(GoalOutcome::Rate(0.0))
    );
    assert_eq!(
        solve_required_daily_rate(50.0, 100.0, 0.0, 3.0),
        Some(GoalOutcome::Rate(0.0))
    );
}

#[test]
fn recovers_the_rate_behind_a_projection() {
    let goal = project(100.0, 0.05, 10.0, 0.0).totals.final_balance;
    let rate = solve_required_daily_rate(goal, 100.0, 0.0, 10.0)
        .and_then(GoalOutcome::rate)
        .unwrap();
    assert_abs_diff_eq!(rate, 0.05, epsilon = 1e-6);
}

#[test]
fn recovers_rates_with_contributions() {
    let goal = project(20.0, 0.012, 60.0, 3.0).totals.final_balance;
    let rate = solve_required_daily_rate(goal, 20.0, 3.0, 60.0)
        .and_then(GoalOutcome::rate)
        .unwrap();
    assert_abs_diff_eq!(rate, 0.012, epsilon = 1e-6);
}

#[test]
fn unreachable_goals_are_signalled() {
    let outcome = solve_required_daily_rate(1e12, 1.0, 0.0, 1.0).unwrap();
    assert!(outcome.is_unreachable());
    assert_eq!(outcome.rate(), None);
}

#[test]
fn zero_horizon_has_no_answer() {
    assert_eq!(solve_required_daily_rate(500.0, 1.0, 0.0, 0.0), None);
    assert_eq!(solve_required_daily_rate(500.0, 1.0, 0.0, 0.7), None);
    assert_eq!(solve_required_daily_rate(500.0, 1.0, 0.0, -3.0), None);
}

#[test]
fn custom_ceiling_limits_reachability() {
    let solver = GoalSolver {
        ceiling: 0.01,
        ..GoalSolver::default()
    };
    let goal = project(100.0, 0.05, 10.0, 0.0).totals.final_balance;
    assert_eq!(
        solver.solve(goal, 100.0, 0.0, 10.0),
        Some(GoalOutcome::Unreachable)
    );
}

#[test]
fn contributions_that_overshoot_yield_negative_rates() {
    let rate = solve_required_daily_rate(120.0, 100.0, 10.0, 5.0)
        .and_then(GoalOutcome::rate)
        .unwrap();
    assert!(rate < 0.0);
    let reached = project(100.0, rate, 5.0, 10.0).totals.final_balance;
    assert_abs_diff_eq!(reached, 120.0, epsilon = 1e-6);
}

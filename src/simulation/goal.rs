//! Inverse of the projection: the constant daily rate that reaches a target balance.
//!
//! Bisection assumes the final balance is non-decreasing in the rate for fixed
//! principal, horizon, and contribution. That holds for non-negative
//! contributions; large withdrawals can break it, in which case the returned
//! rate is not guaranteed to be a root.

use tracing::{debug, warn};

use super::projection::final_balance;
use crate::currency::{sanitize, whole_days};

/// Lowest searched daily rate; kept away from `-1` so the base never collapses to zero.
pub const RATE_FLOOR: f64 = -0.9999;
/// Highest searched daily rate (1000% per day).
pub const RATE_CEILING: f64 = 10.0;
/// Bracket halvings; `(RATE_CEILING - RATE_FLOOR) / 2^80` is far below f64 resolution.
pub const BISECTION_ROUNDS: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalOutcome {
    /// Approximate constant daily rate that reaches the goal.
    Rate(f64),
    /// Even [`RATE_CEILING`] leaves the final balance below the goal.
    Unreachable,
}

impl GoalOutcome {
    pub fn rate(self) -> Option<f64> {
        match self {
            GoalOutcome::Rate(rate) => Some(rate),
            GoalOutcome::Unreachable => None,
        }
    }

    pub fn is_unreachable(self) -> bool {
        matches!(self, GoalOutcome::Unreachable)
    }
}

/// Bisection bounds and round count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSolver {
    pub floor: f64,
    pub ceiling: f64,
    pub rounds: u32,
}

impl Default for GoalSolver {
    fn default() -> Self {
        Self {
            floor: RATE_FLOOR,
            ceiling: RATE_CEILING,
            rounds: BISECTION_ROUNDS,
        }
    }
}

impl GoalSolver {
    /// Returns `None` when `days` coerces to zero; see [`solve_required_daily_rate`].
    pub fn solve(
        &self,
        goal: f64,
        principal: f64,
        daily_contribution: f64,
        days: f64,
    ) -> Option<GoalOutcome> {
        let days = whole_days(days);
        if days == 0 {
            return None;
        }
        let goal = sanitize(goal);
        let principal = sanitize(principal);
        let contribution = sanitize(daily_contribution);

        if goal <= principal {
            return Some(GoalOutcome::Rate(0.0));
        }
        if contribution < 0.0 {
            warn!(
                contribution,
                "goal solver assumes a balance monotonic in rate; negative contributions may break it"
            );
        }

        let evaluate = |rate: f64| final_balance(principal, rate, days, contribution);

        if evaluate(self.ceiling) < goal {
            debug!(goal, days, ceiling = self.ceiling, "goal unreachable");
            return Some(GoalOutcome::Unreachable);
        }

        let (mut low, mut high) = (self.floor, self.ceiling);
        for _ in 0..self.rounds {
            let mid = (low + high) / 2.0;
            if evaluate(mid) < goal {
                low = mid;
            } else {
                high = mid;
            }
        }
        let rate = (low + high) / 2.0;
        debug!(goal, days, rate, "required daily rate solved");
        Some(GoalOutcome::Rate(rate))
    }
}

/// Finds the constant daily rate that grows `principal` (plus the daily
/// contribution) to `goal` after `days` days.
///
/// * `None` when `days` is not positive.
/// * `Rate(0.0)` when the goal is already met.
/// * `Unreachable` when even the rate ceiling falls short.
pub fn solve_required_daily_rate(
    goal: f64,
    principal: f64,
    daily_contribution: f64,
    days: f64,
) -> Option<GoalOutcome> {
    GoalSolver::default().solve(goal, principal, daily_contribution, days)
}

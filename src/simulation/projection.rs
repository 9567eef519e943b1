//! Day-by-day compound-interest projection.
//!
//! For day `d` in `1..=days`:
//!
//! ```text
//! base    = opening + contribution
//! interest = base * rate
//! closing = base + interest
//! ```
//!
//! Day 1 opens at the principal and each later day opens at the previous close.
//! Nothing is rounded here.

use serde::Serialize;
use tracing::debug;

use super::scenario::ScenarioParams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayEntry {
    /// 1-based day index.
    pub day: u32,
    pub opening_balance: f64,
    pub contribution: f64,
    pub interest: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProjectionTotals {
    pub contributed: f64,
    pub interest_earned: f64,
    pub final_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub schedule: Vec<DayEntry>,
    pub totals: ProjectionTotals,
}

/// Projects a scenario from raw numbers; see [`ScenarioParams::new`] for the coercion rules.
pub fn project(principal: f64, daily_rate: f64, days: f64, daily_contribution: f64) -> Projection {
    project_params(&ScenarioParams::new(
        principal,
        daily_rate,
        days,
        daily_contribution,
    ))
}

pub fn project_params(params: &ScenarioParams) -> Projection {
    let mut schedule = Vec::new();
    let mut totals = ProjectionTotals {
        final_balance: params.principal,
        ..ProjectionTotals::default()
    };

    let mut balance = params.principal;
    for day in 1..=params.days {
        let (interest, closing) = accrue(balance, params.daily_rate, params.daily_contribution);
        schedule.push(DayEntry {
            day,
            opening_balance: balance,
            contribution: params.daily_contribution,
            interest,
            closing_balance: closing,
        });
        totals.contributed += params.daily_contribution;
        totals.interest_earned += interest;
        balance = closing;
    }
    totals.final_balance = balance;

    debug!(
        days = params.days,
        final_balance = totals.final_balance,
        "projection computed"
    );
    Projection { schedule, totals }
}

/// Closing balance after `days` steps without materialising the schedule.
pub(crate) fn final_balance(principal: f64, daily_rate: f64, days: u32, contribution: f64) -> f64 {
    (0..days).fold(principal, |balance, _| {
        accrue(balance, daily_rate, contribution).1
    })
}

/// One day of the recurrence: returns `(interest, closing_balance)`.
#[inline]
fn accrue(opening: f64, daily_rate: f64, contribution: f64) -> (f64, f64) {
    let base = opening + contribution;
    let interest = base * daily_rate;
    (interest, base + interest)
}

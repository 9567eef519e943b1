use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::{parse_amount, parse_days, parse_percent, sanitize, whole_days, LocaleConfig};

pub const DEFAULT_PRINCIPAL: &str = "10";
pub const DEFAULT_RATE_PERCENT: &str = "10";
pub const DEFAULT_DAYS: &str = "7";
pub const DEFAULT_CONTRIBUTION: &str = "0";

/// Longest horizon the scenario services accept: one hundred years of days.
/// The engines themselves take any `u32`.
pub const MAX_HORIZON_DAYS: u32 = 36_500;

/// A named compound-interest configuration as the user typed it.
///
/// Numeric fields keep the raw text so a half-typed value survives a save;
/// [`Scenario::params`] coerces them for the engines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub principal: String,
    /// Daily rate in percent (`"10"` means 10% per day).
    #[serde(default, alias = "taxaPercentDia")]
    pub rate_percent: String,
    #[serde(default, alias = "dias")]
    pub days: String,
    #[serde(default, alias = "aporteDiario")]
    pub daily_contribution: String,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            principal: DEFAULT_PRINCIPAL.into(),
            rate_percent: DEFAULT_RATE_PERCENT.into(),
            days: DEFAULT_DAYS.into(),
            daily_contribution: DEFAULT_CONTRIBUTION.into(),
            updated_at: Some(now),
        }
    }

    pub fn params(&self, locale: &LocaleConfig) -> ScenarioParams {
        ScenarioParams {
            principal: parse_amount(&self.principal, locale),
            daily_rate: parse_percent(&self.rate_percent, locale),
            days: parse_days(&self.days, locale),
            daily_contribution: parse_amount(&self.daily_contribution, locale),
        }
    }

    /// Applies every field present in `patch`, returning whether anything changed.
    pub fn apply(&mut self, patch: ScenarioPatch, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        let fields = [
            (&mut self.name, patch.name),
            (&mut self.principal, patch.principal),
            (&mut self.rate_percent, patch.rate_percent),
            (&mut self.days, patch.days),
            (&mut self.daily_contribution, patch.daily_contribution),
        ];
        for (slot, value) in fields {
            if let Some(value) = value {
                if *slot != value {
                    *slot = value;
                    changed = true;
                }
            }
        }
        if changed {
            self.updated_at = Some(now);
        }
        changed
    }
}

/// Partial update for a [`Scenario`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ScenarioPatch {
    pub name: Option<String>,
    pub principal: Option<String>,
    pub rate_percent: Option<String>,
    pub days: Option<String>,
    pub daily_contribution: Option<String>,
}

/// Coerced, engine-ready scenario inputs. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioParams {
    pub principal: f64,
    /// Decimal rate per day (`0.1` is 10%).
    pub daily_rate: f64,
    pub days: u32,
    pub daily_contribution: f64,
}

impl ScenarioParams {
    /// Builds parameters from raw numbers, zeroing non-finite values and
    /// clamping `days` to `max(0, floor(days))`.
    pub fn new(principal: f64, daily_rate: f64, days: f64, daily_contribution: f64) -> Self {
        Self {
            principal: sanitize(principal),
            daily_rate: sanitize(daily_rate),
            days: whole_days(days),
            daily_contribution: sanitize(daily_contribution),
        }
    }
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ledger::ExpenseLedger;
use crate::simulation::{CompletionMarkers, Scenario};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Everything persisted for one user, saved and loaded as a whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserData {
    pub scenarios: Vec<Scenario>,
    #[serde(alias = "currentScenarioId")]
    pub current_scenario_id: Option<String>,
    /// Completion markers keyed by scenario id.
    pub completed_days: BTreeMap<String, CompletionMarkers>,
    pub expenses: ExpenseLedger,
    pub schema_version: u8,
    /// Single-scenario fields of documents that predate the scenario list.
    /// Consumed by [`UserData::ensure_default_scenario`].
    #[serde(flatten)]
    pub legacy: LegacyScenarioFields,
}

impl Default for UserData {
    fn default() -> Self {
        Self {
            scenarios: Vec::new(),
            current_scenario_id: None,
            completed_days: BTreeMap::new(),
            expenses: ExpenseLedger::default(),
            schema_version: CURRENT_SCHEMA_VERSION,
            legacy: LegacyScenarioFields::default(),
        }
    }
}

/// Flat `principal`/`taxaPercentDia`/`dias`/`aporteDiario` fields, stored as
/// either strings or numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegacyScenarioFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(rename = "taxaPercentDia", skip_serializing_if = "Option::is_none")]
    pub rate_percent: Option<Value>,
    #[serde(rename = "dias", skip_serializing_if = "Option::is_none")]
    pub days: Option<Value>,
    #[serde(rename = "aporteDiario", skip_serializing_if = "Option::is_none")]
    pub daily_contribution: Option<Value>,
}

impl LegacyScenarioFields {
    pub fn is_empty(&self) -> bool {
        self.principal.is_none()
            && self.rate_percent.is_none()
            && self.days.is_none()
            && self.daily_contribution.is_none()
    }

    /// Copies every readable field onto `scenario`; the rest keep their defaults.
    fn apply_to(self, scenario: &mut Scenario) {
        let fields = [
            (&mut scenario.principal, self.principal),
            (&mut scenario.rate_percent, self.rate_percent),
            (&mut scenario.days, self.days),
            (&mut scenario.daily_contribution, self.daily_contribution),
        ];
        for (slot, value) in fields {
            if let Some(text) = value.as_ref().and_then(legacy_text) {
                *slot = text;
            }
        }
    }
}

fn legacy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => {
            let mut text = number.to_string();
            // A lone separator followed by three digits reads as grouping.
            if text.split_once('.').is_some_and(|(_, fraction)| fraction.len() == 3) {
                text.push('0');
            }
            Some(text)
        }
        _ => None,
    }
}

impl UserData {
    /// A fresh snapshot holding one default scenario.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut data = Self::default();
        data.ensure_default_scenario(now);
        data
    }

    /// Seeds a scenario when none exist and repairs a dangling active id.
    /// Flat legacy fields seed that scenario's values and are then dropped.
    /// Returns whether the snapshot changed.
    pub fn ensure_default_scenario(&mut self, now: DateTime<Utc>) -> bool {
        let legacy = std::mem::take(&mut self.legacy);
        let mut changed = !legacy.is_empty();
        if self.scenarios.is_empty() {
            let mut scenario = Scenario::new("Scenario 1", now);
            legacy.apply_to(&mut scenario);
            self.scenarios.push(scenario);
            changed = true;
        }
        let active_exists = self
            .current_scenario_id
            .as_deref()
            .is_some_and(|id| self.scenario(id).is_some());
        if !active_exists {
            self.current_scenario_id = self.scenarios.first().map(|s| s.id.clone());
            changed = true;
        }
        changed
    }

    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id == id)
    }

    pub fn scenario_mut(&mut self, id: &str) -> Option<&mut Scenario> {
        self.scenarios.iter_mut().find(|scenario| scenario.id == id)
    }

    pub fn active_scenario(&self) -> Option<&Scenario> {
        self.current_scenario_id
            .as_deref()
            .and_then(|id| self.scenario(id))
    }

    pub fn markers(&self, scenario_id: &str) -> Option<&CompletionMarkers> {
        self.completed_days.get(scenario_id)
    }

    pub fn markers_mut(&mut self, scenario_id: &str) -> &mut CompletionMarkers {
        self.completed_days
            .entry(scenario_id.to_string())
            .or_default()
    }
}

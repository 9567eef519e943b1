use tracing::info;

use crate::core::user_data::UserData;
use crate::currency::{parse_amount, parse_days, LocaleConfig};
use crate::errors::FinanceError;
use crate::simulation::{
    project_params, GoalOutcome, GoalSolver, Projection, Scenario, ScenarioParams,
    ScenarioPatch, MAX_HORIZON_DAYS,
};
use crate::time::Clock;

use super::{ServiceError, ServiceResult};

pub struct ScenarioService;

impl ScenarioService {
    pub fn list(data: &UserData) -> &[Scenario] {
        &data.scenarios
    }

    /// Adds a scenario with default inputs and makes it active.
    ///
    /// A blank or missing name becomes `Scenario N`, N being the new count.
    pub fn create(
        data: &mut UserData,
        name: Option<&str>,
        clock: &dyn Clock,
    ) -> ServiceResult<String> {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Scenario {}", data.scenarios.len() + 1),
        };
        let scenario = Scenario::new(name, clock.now());
        let id = scenario.id.clone();
        info!(scenario = %id, name = %scenario.name, "scenario created");
        data.scenarios.push(scenario);
        data.current_scenario_id = Some(id.clone());
        Ok(id)
    }

    /// Returns whether any field changed. A `days` value past
    /// [`MAX_HORIZON_DAYS`] is rejected and nothing is applied.
    pub fn update(
        data: &mut UserData,
        id: &str,
        patch: ScenarioPatch,
        locale: &LocaleConfig,
        clock: &dyn Clock,
    ) -> ServiceResult<bool> {
        if let Some(days) = patch.days.as_deref() {
            Self::validate_horizon(parse_days(days, locale))?;
        }
        Self::apply_patch(data, id, patch, clock)
    }

    pub fn rename(
        data: &mut UserData,
        id: &str,
        name: &str,
        clock: &dyn Clock,
    ) -> ServiceResult<()> {
        let patch = ScenarioPatch {
            name: Some(name.to_string()),
            ..ScenarioPatch::default()
        };
        Self::apply_patch(data, id, patch, clock).map(|_| ())
    }

    fn apply_patch(
        data: &mut UserData,
        id: &str,
        patch: ScenarioPatch,
        clock: &dyn Clock,
    ) -> ServiceResult<bool> {
        if let Some(name) = patch.name.as_deref() {
            Self::validate_name(name)?;
        }
        let patch = ScenarioPatch {
            name: patch.name.map(|name| name.trim().to_string()),
            ..patch
        };
        let scenario = Self::find_mut(data, id)?;
        let changed = scenario.apply(patch, clock.now());
        if changed {
            info!(scenario = %id, "scenario updated");
        }
        Ok(changed)
    }

    /// Removes the scenario and its completion markers. Deleting the active
    /// scenario activates the first remaining one, if any.
    pub fn delete(data: &mut UserData, id: &str) -> ServiceResult<Scenario> {
        let index = data
            .scenarios
            .iter()
            .position(|scenario| scenario.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        let removed = data.scenarios.remove(index);
        data.completed_days.remove(id);
        if data.current_scenario_id.as_deref() == Some(id) {
            data.current_scenario_id = data.scenarios.first().map(|s| s.id.clone());
        }
        info!(scenario = %id, remaining = data.scenarios.len(), "scenario deleted");
        Ok(removed)
    }

    pub fn select(data: &mut UserData, id: &str) -> ServiceResult<()> {
        if data.scenario(id).is_none() {
            return Err(Self::not_found(id));
        }
        data.current_scenario_id = Some(id.to_string());
        Ok(())
    }

    pub fn active(data: &UserData) -> Option<&Scenario> {
        data.active_scenario()
    }

    pub fn project_active(data: &UserData, locale: &LocaleConfig) -> ServiceResult<Projection> {
        let params = Self::bounded_params(Self::require_active(data)?, locale)?;
        Ok(project_params(&params))
    }

    /// Required daily rate for the active scenario to reach `goal`, parsed in
    /// the same grammar as the scenario fields. `None` when the horizon is zero.
    pub fn solve_active(
        data: &UserData,
        goal: &str,
        locale: &LocaleConfig,
    ) -> ServiceResult<Option<GoalOutcome>> {
        let params = Self::bounded_params(Self::require_active(data)?, locale)?;
        Ok(GoalSolver::default().solve(
            parse_amount(goal, locale),
            params.principal,
            params.daily_contribution,
            f64::from(params.days),
        ))
    }

    /// Toggles day `day` of the active scenario, returning the new state.
    pub fn toggle_day(data: &mut UserData, day: u32) -> ServiceResult<bool> {
        if day == 0 {
            return Err(ServiceError::Invalid("Days are numbered from 1".into()));
        }
        let id = Self::require_active(data)?.id.clone();
        Ok(data.markers_mut(&id).toggle(day))
    }

    /// Fraction of the active scenario's horizon marked done.
    pub fn progress(data: &UserData, locale: &LocaleConfig) -> ServiceResult<f64> {
        let scenario = Self::require_active(data)?;
        let horizon = scenario.params(locale).days;
        Ok(data
            .markers(&scenario.id)
            .map_or(0.0, |markers| markers.progress(horizon)))
    }

    fn require_active(data: &UserData) -> ServiceResult<&Scenario> {
        data.active_scenario()
            .ok_or_else(|| ServiceError::Invalid("No active scenario".into()))
    }

    /// Stored documents can carry any horizon, so the engines only see
    /// scenarios within [`MAX_HORIZON_DAYS`].
    fn bounded_params(
        scenario: &Scenario,
        locale: &LocaleConfig,
    ) -> ServiceResult<ScenarioParams> {
        let params = scenario.params(locale);
        Self::validate_horizon(params.days)?;
        Ok(params)
    }

    fn validate_horizon(days: u32) -> ServiceResult<()> {
        if days > MAX_HORIZON_DAYS {
            return Err(ServiceError::Invalid(format!(
                "Horizon of {days} days exceeds the {MAX_HORIZON_DAYS}-day limit"
            )));
        }
        Ok(())
    }

    fn find_mut<'a>(data: &'a mut UserData, id: &str) -> ServiceResult<&'a mut Scenario> {
        data.scenario_mut(id).ok_or_else(|| Self::not_found(id))
    }

    fn validate_name(name: &str) -> ServiceResult<()> {
        if name.trim().is_empty() {
            Err(ServiceError::Invalid("Scenario name cannot be empty".into()))
        } else {
            Ok(())
        }
    }

    fn not_found(id: &str) -> ServiceError {
        FinanceError::NotFound(format!("scenario `{id}`")).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::FixedClock;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2025, 4, 10).unwrap())
    }

    fn locale() -> LocaleConfig {
        LocaleConfig::pt_br()
    }

    #[test]
    fn create_names_and_activates() {
        let mut data = UserData::seeded(clock().0);
        let id = ScenarioService::create(&mut data, None, &clock()).unwrap();
        assert_eq!(data.scenarios.len(), 2);
        assert_eq!(data.scenarios[1].name, "Scenario 2");
        assert_eq!(data.current_scenario_id.as_deref(), Some(id.as_str()));

        ScenarioService::create(&mut data, Some("  Aggressive "), &clock()).unwrap();
        assert_eq!(data.scenarios[2].name, "Aggressive");
    }

    #[test]
    fn update_touches_timestamp_only_on_change() {
        let mut data = UserData::seeded(clock().0);
        let id = data.scenarios[0].id.clone();
        let later = FixedClock(clock().0 + Duration::hours(2));

        let unchanged = ScenarioPatch {
            principal: Some("10".into()),
            ..ScenarioPatch::default()
        };
        assert!(!ScenarioService::update(&mut data, &id, unchanged, &locale(), &later).unwrap());
        assert_eq!(data.scenarios[0].updated_at, Some(clock().0));

        let patch = ScenarioPatch {
            principal: Some("250,00".into()),
            days: Some("30".into()),
            ..ScenarioPatch::default()
        };
        assert!(ScenarioService::update(&mut data, &id, patch, &locale(), &later).unwrap());
        assert_eq!(data.scenarios[0].principal, "250,00");
        assert_eq!(data.scenarios[0].updated_at, Some(later.0));
    }

    #[test]
    fn rename_rejects_blank_names() {
        let mut data = UserData::seeded(clock().0);
        let id = data.scenarios[0].id.clone();
        let err = ScenarioService::rename(&mut data, &id, "   ", &clock()).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        ScenarioService::rename(&mut data, &id, " Retirement ", &clock()).unwrap();
        assert_eq!(data.scenarios[0].name, "Retirement");
    }

    #[test]
    fn deleting_active_falls_back_and_drops_markers() {
        let mut data = UserData::seeded(clock().0);
        let first = data.scenarios[0].id.clone();
        let second = ScenarioService::create(&mut data, None, &clock()).unwrap();
        ScenarioService::toggle_day(&mut data, 2).unwrap();
        assert!(data.completed_days.contains_key(&second));

        ScenarioService::delete(&mut data, &second).unwrap();
        assert!(!data.completed_days.contains_key(&second));
        assert_eq!(data.current_scenario_id.as_deref(), Some(first.as_str()));

        ScenarioService::delete(&mut data, &first).unwrap();
        assert!(data.current_scenario_id.is_none());
        assert!(ScenarioService::project_active(&data, &locale()).is_err());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut data = UserData::seeded(clock().0);
        let err = ScenarioService::select(&mut data, "missing").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Finance(FinanceError::NotFound(_))
        ));
        assert!(ScenarioService::delete(&mut data, "missing").is_err());
    }

    #[test]
    fn projects_active_scenario_from_text_fields() {
        let mut data = UserData::seeded(clock().0);
        let id = data.scenarios[0].id.clone();
        let patch = ScenarioPatch {
            days: Some("3".into()),
            ..ScenarioPatch::default()
        };
        ScenarioService::update(&mut data, &id, patch, &locale(), &clock()).unwrap();
        let projection = ScenarioService::project_active(&data, &locale()).unwrap();
        assert_eq!(projection.schedule.len(), 3);
        assert_abs_diff_eq!(projection.totals.final_balance, 13.31, epsilon = 1e-9);
    }

    #[test]
    fn solves_active_scenario_goal() {
        let data = UserData::seeded(clock().0);
        let outcome = ScenarioService::solve_active(&data, "R$ 19,487171", &locale())
            .unwrap()
            .and_then(GoalOutcome::rate)
            .unwrap();
        assert_abs_diff_eq!(outcome, 0.1, epsilon = 1e-6);

        let met = ScenarioService::solve_active(&data, "5", &locale()).unwrap();
        assert_eq!(met, Some(GoalOutcome::Rate(0.0)));
    }

    #[test]
    fn progress_counts_days_within_horizon() {
        let mut data = UserData::seeded(clock().0);
        assert_eq!(ScenarioService::progress(&data, &locale()).unwrap(), 0.0);
        for day in [1, 2, 3, 4, 5, 6, 7, 8] {
            ScenarioService::toggle_day(&mut data, day).unwrap();
        }
        assert_eq!(ScenarioService::progress(&data, &locale()).unwrap(), 1.0);
        assert!(!ScenarioService::toggle_day(&mut data, 8).unwrap());
        assert!(ScenarioService::toggle_day(&mut data, 0).is_err());
    }

    #[test]
    fn oversized_horizons_are_rejected() {
        let mut data = UserData::seeded(clock().0);
        let id = data.scenarios[0].id.clone();
        let patch = ScenarioPatch {
            days: Some("99999999999".into()),
            rate_percent: Some("1".into()),
            ..ScenarioPatch::default()
        };
        let err = ScenarioService::update(&mut data, &id, patch, &locale(), &clock()).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(data.scenarios[0].days, "7");
        assert_eq!(data.scenarios[0].rate_percent, "10");

        let at_limit = ScenarioPatch {
            days: Some(MAX_HORIZON_DAYS.to_string()),
            ..ScenarioPatch::default()
        };
        assert!(ScenarioService::update(&mut data, &id, at_limit, &locale(), &clock()).unwrap());
        let projection = ScenarioService::project_active(&data, &locale()).unwrap();
        assert_eq!(projection.schedule.len(), MAX_HORIZON_DAYS as usize);
    }

    #[test]
    fn stored_oversized_horizon_is_not_projected() {
        let mut data = UserData::seeded(clock().0);
        data.scenarios[0].days = "4294967295".into();
        assert!(matches!(
            ScenarioService::project_active(&data, &locale()),
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            ScenarioService::solve_active(&data, "1000", &locale()),
            Err(ServiceError::Invalid(_))
        ));
        assert_eq!(ScenarioService::progress(&data, &locale()).unwrap(), 0.0);
    }
}

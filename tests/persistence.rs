mod common;

use std::fs;

use common::{clock_on, setup_test_env, temp_base};
use finance_core::config::{Config, ConfigManager};
use finance_core::core::DataManager;
use finance_core::errors::FinanceError;
use finance_core::storage::json_backend::load_from_path;
use finance_core::storage::{JsonStorage, UserDataStore};

#[test]
fn saved_snapshot_reloads_intact() {
    let (mut manager, _, base) = setup_test_env();
    let clock = clock_on(2025, 4, 10);
    manager.open("Ana@Example.com", &clock).unwrap();
    {
        let data = manager.data_mut();
        data.expenses.income = 4200.0;
        data.expenses.savings_goal = 500.0;
        let id = data.scenarios[0].id.clone();
        data.markers_mut(&id).toggle(3);
    }
    manager.save().unwrap();

    let path = base.join("users").join("ana_example_com.json");
    assert!(path.is_file());
    let stored = load_from_path(&path).unwrap();
    assert_eq!(&stored, manager.data());

    let storage = JsonStorage::new(Some(base), Some(3)).unwrap();
    let mut reopened = DataManager::new(Box::new(storage));
    let data = reopened.open("ana@example.com", &clock).unwrap();
    assert_eq!(data.expenses.income, 4200.0);
    let active = data.active_scenario().unwrap();
    assert!(data.markers(&active.id).unwrap().is_done(3));
}

#[test]
fn partial_documents_load_with_defaults() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone()), None).unwrap();
    fs::write(
        storage.user_path("bia"),
        r#"{
            "expenses": {
                "income": 1500,
                "expenses": [
                    {"id": "e1", "name": "Mercado", "amount": 80.5, "date": "2025-03-02T14:00:00.000Z"}
                ],
                "recurring": [
                    {"id": "r1", "name": "Luz", "amount": 120, "dayOfMonth": 12}
                ]
            }
        }"#,
    )
    .unwrap();

    let mut manager = DataManager::new(Box::new(storage));
    let data = manager.open("bia", &clock_on(2025, 3, 20)).unwrap();
    assert_eq!(data.expenses.income, 1500.0);
    assert_eq!(data.expenses.savings_goal, 0.0);
    assert_eq!(data.expenses.recurring[0].preferred_day, 12);
    assert_eq!(data.scenarios.len(), 1);
    assert_eq!(
        data.current_scenario_id.as_deref(),
        Some(data.scenarios[0].id.as_str())
    );
}

#[test]
fn web_app_documents_load_through_the_manager() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone()), None).unwrap();
    fs::write(
        storage.user_path("gabi"),
        r#"{
            "scenarios": [
                {"id": "a", "name": "Reserva", "principal": "100", "taxaPercentDia": "5",
                 "dias": "30", "aporteDiario": "2", "updatedAt": "2025-03-01T10:00:00.000Z"}
            ],
            "currentScenarioId": "a"
        }"#,
    )
    .unwrap();
    fs::write(
        storage.user_path("hugo"),
        r#"{"principal": 500, "taxaPercentDia": 2, "dias": 90, "aporteDiario": 5}"#,
    )
    .unwrap();

    let mut manager = DataManager::new(Box::new(storage));
    let clock = clock_on(2025, 3, 20);
    let data = manager.open("gabi", &clock).unwrap();
    assert_eq!(data.current_scenario_id.as_deref(), Some("a"));
    let scenario = data.active_scenario().unwrap();
    assert_eq!(scenario.days, "30");
    assert!(scenario.updated_at.is_some());

    let data = manager.open("hugo", &clock).unwrap();
    assert_eq!(data.scenarios.len(), 1);
    let scenario = data.active_scenario().unwrap();
    assert_eq!(
        (
            scenario.principal.as_str(),
            scenario.rate_percent.as_str(),
            scenario.days.as_str(),
            scenario.daily_contribution.as_str()
        ),
        ("500", "2", "90", "5")
    );
    manager.save().unwrap();

    let stored = fs::read_to_string(base.join("users").join("hugo.json")).unwrap();
    assert!(!stored.contains("\"dias\""));
    assert!(stored.contains("\"days\": \"90\""));
}

#[test]
fn invalid_documents_surface_storage_errors() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base), None).unwrap();
    fs::write(storage.user_path("carla"), "{ not json").unwrap();
    let mut manager = DataManager::new(Box::new(storage));
    let err = manager.open("carla", &clock_on(2025, 1, 1)).unwrap_err();
    assert!(matches!(err, FinanceError::Storage(_)));
}

#[test]
fn overwrites_are_backed_up_and_pruned() {
    let (mut manager, _, _) = setup_test_env();
    manager.open("dani", &clock_on(2025, 6, 1)).unwrap();
    for income in 1..=6 {
        manager.data_mut().expenses.income = f64::from(income) * 100.0;
        manager.save().unwrap();
    }
    let backups = manager.list_backups().unwrap();
    assert_eq!(backups.len(), 3);
    assert!(backups
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[test]
fn restore_brings_back_an_earlier_snapshot() {
    let (mut manager, _, _) = setup_test_env();
    let clock = clock_on(2025, 6, 1);
    manager.open("edu", &clock).unwrap();
    manager.data_mut().expenses.income = 1000.0;
    manager.save().unwrap();
    let backup = manager.backup(Some("before raise")).unwrap();
    assert!(backup.name.contains("before-raise"));

    manager.data_mut().expenses.income = 2500.0;
    manager.save().unwrap();

    let restored = manager.restore(&backup.name, &clock).unwrap();
    assert_eq!(restored.expenses.income, 1000.0);
    let err = manager.restore("missing.json", &clock).unwrap_err();
    assert!(matches!(err, FinanceError::NotFound(_)));
}

#[test]
fn backup_without_saved_data_is_not_found() {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base), None).unwrap();
    assert!(matches!(
        storage.backup("nobody", None),
        Err(FinanceError::NotFound(_))
    ));
    assert!(storage.list_backups("nobody").unwrap().is_empty());
    assert!(storage.load_user_data("nobody").unwrap().is_none());
}

#[test]
fn last_write_wins_between_managers() {
    let (_, _, base) = setup_test_env();
    let clock = clock_on(2025, 6, 1);
    let open = |income: f64| {
        let storage = JsonStorage::new(Some(base.clone()), None).unwrap();
        let mut manager = DataManager::new(Box::new(storage));
        manager.open("fabi", &clock).unwrap();
        manager.data_mut().expenses.income = income;
        manager
    };
    let first = open(10.0);
    let second = open(20.0);
    second.save().unwrap();
    first.save().unwrap();

    let storage = JsonStorage::new(Some(base.clone()), None).unwrap();
    let stored = storage.load_user_data("fabi").unwrap().unwrap();
    assert_eq!(stored.expenses.income, 10.0);
}

#[test]
fn config_roundtrip_and_backups() {
    let (_, config_manager, base) = setup_test_env();
    assert_eq!(config_manager.load().unwrap(), Config::default());

    let config = Config {
        locale: "en-US".into(),
        currency: "USD".into(),
        last_user: Some("ana".into()),
    };
    config_manager.save(&config).unwrap();
    let name = config_manager.backup(&config, Some("us")).unwrap();

    config_manager.save(&Config::default()).unwrap();
    let restored = config_manager.restore(&name).unwrap();
    assert_eq!(restored, config);

    let reloaded = ConfigManager::with_base_dir(base).unwrap().load().unwrap();
    assert_eq!(reloaded, config);
    assert_eq!(config_manager.list_backups().unwrap(), vec![name]);
}

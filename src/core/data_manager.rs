use tracing::info;

use crate::core::user_data::{UserData, CURRENT_SCHEMA_VERSION};
use crate::errors::{FinanceError, Result};
use crate::storage::{BackupInfo, UserDataStore};
use crate::time::Clock;

/// Facade that owns the open user's snapshot and its storage backend.
pub struct DataManager {
    storage: Box<dyn UserDataStore>,
    user: Option<String>,
    data: UserData,
}

impl DataManager {
    pub fn new(storage: Box<dyn UserDataStore>) -> Self {
        Self {
            storage,
            user: None,
            data: UserData::default(),
        }
    }

    pub fn storage(&self) -> &dyn UserDataStore {
        self.storage.as_ref()
    }

    /// Loads `user`'s snapshot, or a seeded one if nothing is stored. The
    /// snapshot always ends up with at least one scenario and a valid active id.
    pub fn open(&mut self, user: &str, clock: &dyn Clock) -> Result<&UserData> {
        let user = user.trim();
        if user.is_empty() {
            return Err(FinanceError::InvalidInput("user id cannot be empty".into()));
        }
        let mut data = match self.storage.load_user_data(user)? {
            Some(data) => {
                Self::ensure_schema_support(data.schema_version)?;
                data
            }
            None => {
                info!(user, "no stored data, starting fresh");
                UserData::default()
            }
        };
        data.ensure_default_scenario(clock.now());
        info!(
            user,
            scenarios = data.scenarios.len(),
            expenses = data.expenses.expenses.len(),
            "user data loaded"
        );
        self.user = Some(user.to_string());
        self.data = data;
        Ok(&self.data)
    }

    pub fn save(&self) -> Result<()> {
        let user = self.require_user()?;
        self.storage.save_user_data(user, &self.data)?;
        info!(user, "user data saved");
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo> {
        self.storage.backup(self.require_user()?, note)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        self.storage.list_backups(self.require_user()?)
    }

    /// Replaces both the stored and the in-memory snapshot.
    pub fn restore(&mut self, backup: &str, clock: &dyn Clock) -> Result<&UserData> {
        let user = self.require_user()?.to_string();
        let mut data = self.storage.restore(&user, backup)?;
        data.ensure_default_scenario(clock.now());
        info!(user = %user, backup, "user data restored");
        self.data = data;
        Ok(&self.data)
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut UserData {
        &mut self.data
    }

    fn require_user(&self) -> Result<&str> {
        self.user
            .as_deref()
            .ok_or_else(|| FinanceError::InvalidInput("no user selected".into()))
    }

    fn ensure_schema_support(schema_version: u8) -> Result<()> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(FinanceError::Storage(format!(
                "document schema v{schema_version} is newer than supported v{CURRENT_SCHEMA_VERSION}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonStorage, MemoryStore};
    use crate::time::FixedClock;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2025, 4, 10).unwrap())
    }

    #[test]
    fn opening_unknown_user_seeds_a_scenario() {
        let mut manager = DataManager::new(Box::new(MemoryStore::new()));
        let data = manager.open("ana@example.com", &clock()).unwrap();
        assert_eq!(data.scenarios.len(), 1);
        assert!(data.active_scenario().is_some());
        assert_eq!(manager.user(), Some("ana@example.com"));
    }

    #[test]
    fn save_requires_an_open_user() {
        let manager = DataManager::new(Box::new(MemoryStore::new()));
        assert!(matches!(
            manager.save(),
            Err(FinanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn save_and_reopen_roundtrip() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let mut manager = DataManager::new(Box::new(store));
        manager.open("ana", &clock()).unwrap();
        manager.data_mut().expenses.income = 3200.0;
        manager.save().unwrap();

        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let mut reopened = DataManager::new(Box::new(store));
        let data = reopened.open("ana", &clock()).unwrap();
        assert_eq!(data.expenses.income, 3200.0);
        assert_eq!(data.scenarios, manager.data().scenarios);
    }

    #[test]
    fn restore_swaps_in_memory_snapshot() {
        let mut manager = DataManager::new(Box::new(MemoryStore::new()));
        manager.open("ana", &clock()).unwrap();
        manager.data_mut().expenses.income = 100.0;
        manager.save().unwrap();
        let backup = manager.backup(Some("baseline")).unwrap();

        manager.data_mut().expenses.income = 900.0;
        manager.save().unwrap();
        let data = manager.restore(&backup.name, &clock()).unwrap();
        assert_eq!(data.expenses.income, 100.0);
        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn rejects_future_schema_versions() {
        let store = MemoryStore::new();
        let future = UserData {
            schema_version: CURRENT_SCHEMA_VERSION + 1,
            ..UserData::default()
        };
        store.save_user_data("ana", &future).unwrap();
        let mut manager = DataManager::new(Box::new(store));
        let err = manager.open("ana", &clock()).unwrap_err();
        assert!(err.to_string().contains("newer"));
    }
}

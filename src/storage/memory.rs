use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;

use crate::{
    core::user_data::UserData,
    errors::{FinanceError, Result},
};

use super::{BackupInfo, UserDataStore};

#[derive(Debug, Default)]
struct Entry {
    current: Option<UserData>,
    backups: Vec<(BackupInfo, UserData)>,
}

/// Process-local store for embedding and tests; nothing touches disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>> {
        self.users
            .lock()
            .map_err(|_| FinanceError::Storage("memory store lock poisoned".into()))
    }
}

impl UserDataStore for MemoryStore {
    fn load_user_data(&self, user: &str) -> Result<Option<UserData>> {
        Ok(self.lock()?.get(user).and_then(|entry| entry.current.clone()))
    }

    fn save_user_data(&self, user: &str, data: &UserData) -> Result<()> {
        self.lock()?.entry(user.to_string()).or_default().current = Some(data.clone());
        Ok(())
    }

    fn backup(&self, user: &str, note: Option<&str>) -> Result<BackupInfo> {
        let mut users = self.lock()?;
        let entry = users
            .get_mut(user)
            .filter(|entry| entry.current.is_some())
            .ok_or_else(|| FinanceError::NotFound(format!("no saved data for `{user}`")))?;
        let data = entry.current.clone().unwrap_or_default();
        let mut name = format!("backup-{}", entry.backups.len() + 1);
        if let Some(note) = note.map(str::trim).filter(|note| !note.is_empty()) {
            name.push('-');
            name.push_str(note);
        }
        let info = BackupInfo {
            name,
            created_at: Some(Utc::now()),
        };
        entry.backups.push((info.clone(), data));
        Ok(info)
    }

    fn list_backups(&self, user: &str) -> Result<Vec<BackupInfo>> {
        Ok(self
            .lock()?
            .get(user)
            .map(|entry| {
                entry
                    .backups
                    .iter()
                    .rev()
                    .map(|(info, _)| info.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn restore(&self, user: &str, backup: &str) -> Result<UserData> {
        let mut users = self.lock()?;
        let entry = users
            .get_mut(user)
            .ok_or_else(|| FinanceError::NotFound(format!("backup `{backup}`")))?;
        let data = entry
            .backups
            .iter()
            .find(|(info, _)| info.name == backup)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| FinanceError::NotFound(format!("backup `{backup}`")))?;
        entry.current = Some(data.clone());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backups_restore_older_snapshot() {
        let store = MemoryStore::new();
        let mut data = UserData::default();
        data.expenses.income = 100.0;
        store.save_user_data("ana", &data).unwrap();
        let info = store.backup("ana", Some("first")).unwrap();
        assert_eq!(info.name, "backup-1-first");

        data.expenses.income = 200.0;
        store.save_user_data("ana", &data).unwrap();
        let restored = store.restore("ana", &info.name).unwrap();
        assert_eq!(restored.expenses.income, 100.0);
        assert_eq!(store.list_backups("ana").unwrap().len(), 1);
        assert!(store.backup("bob", None).is_err());
    }
}

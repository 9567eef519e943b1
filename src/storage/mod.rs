pub mod json_backend;
pub mod memory;

use chrono::{DateTime, Utc};

use crate::{core::user_data::UserData, errors::Result};

/// A stored backup of one user's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    /// Identifier accepted by [`UserDataStore::restore`].
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Persistence for per-user snapshots. Saves replace the whole document and
/// the last write wins.
pub trait UserDataStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved for `user` yet.
    fn load_user_data(&self, user: &str) -> Result<Option<UserData>>;
    fn save_user_data(&self, user: &str, data: &UserData) -> Result<()>;
    /// Copies the currently saved document aside.
    fn backup(&self, user: &str, note: Option<&str>) -> Result<BackupInfo>;
    /// Newest first.
    fn list_backups(&self, user: &str) -> Result<Vec<BackupInfo>>;
    /// Replaces the saved document with `backup` and returns it.
    fn restore(&self, user: &str, backup: &str) -> Result<UserData>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStore;

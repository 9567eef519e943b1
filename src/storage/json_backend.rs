use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    core::user_data::UserData,
    errors::{FinanceError, Result},
    utils::{ensure_dir, paths::PathResolver},
};

use super::{BackupInfo, UserDataStore};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const BACKUP_TIMESTAMP_LEN: usize = 18;
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// One pretty-printed JSON document per user under `<base>/users/`, with
/// timestamped copies under `<base>/backups/<user>/`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    users_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        let users_dir = PathResolver::users_dir_in(&base);
        let backups_dir = PathResolver::backup_dir_in(&base);
        ensure_dir(&users_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            users_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn user_path(&self, user: &str) -> PathBuf {
        self.users_dir
            .join(format!("{}.{}", canonical_name(user), FILE_EXTENSION))
    }

    fn backup_dir(&self, user: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(user))
    }

    pub fn backup_path(&self, user: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(user).join(backup_name)
    }

    fn copy_to_backup(&self, user: &str, source: &Path, note: Option<&str>) -> Result<BackupInfo> {
        let dir = self.backup_dir(user);
        ensure_dir(&dir)?;
        let now = Utc::now();
        let mut stem = format!(
            "{}_{}",
            canonical_name(user),
            now.format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = unique_path(&dir, &stem);
        fs::copy(source, &path)?;
        let name = file_name(&path).unwrap_or_default();
        debug!(user, backup = %name, "backup written");
        self.prune_backups(user)?;
        Ok(BackupInfo {
            name,
            created_at: Some(now),
        })
    }

    fn prune_backups(&self, user: &str) -> Result<()> {
        let backups = self.list_backups(user)?;
        for entry in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(self.backup_path(user, &entry.name)) {
                warn!(user, backup = %entry.name, %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl UserDataStore for JsonStorage {
    fn load_user_data(&self, user: &str) -> Result<Option<UserData>> {
        let path = self.user_path(user);
        if !path.exists() {
            return Ok(None);
        }
        load_from_path(&path).map(Some)
    }

    /// The previous document, if any, is backed up before it is replaced.
    fn save_user_data(&self, user: &str, data: &UserData) -> Result<()> {
        let path = self.user_path(user);
        if path.exists() {
            self.copy_to_backup(user, &path, None)?;
        }
        save_to_path(data, &path)
    }

    fn backup(&self, user: &str, note: Option<&str>) -> Result<BackupInfo> {
        let path = self.user_path(user);
        if !path.exists() {
            return Err(FinanceError::NotFound(format!(
                "no saved data for `{user}`"
            )));
        }
        self.copy_to_backup(user, &path, note)
    }

    fn list_backups(&self, user: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(user);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", canonical_name(user));
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(name) = file_name(&path) else {
                continue;
            };
            let created_at = parse_backup_timestamp(&prefix, &name);
            entries.push(BackupInfo { name, created_at });
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    fn restore(&self, user: &str, backup: &str) -> Result<UserData> {
        let backup_path = self.backup_path(user, backup);
        if !backup_path.is_file() {
            return Err(FinanceError::NotFound(format!("backup `{backup}`")));
        }
        let data = load_from_path(&backup_path)?;
        save_to_path(&data, &self.user_path(user))?;
        Ok(data)
    }
}

pub fn save_to_path(data: &UserData, path: &Path) -> Result<()> {
    write_json_atomic(path, data)
}

/// Pretty JSON written to a sibling temp file, then renamed over `path`.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    write_file(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<UserData> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| {
        FinanceError::Storage(format!("{} is not a valid document: {err}", path.display()))
    })
}

/// Lowercase ASCII alphanumerics, everything else `_`, so e-mail addresses
/// and display names map to stable file names.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "user".into()
    } else {
        sanitized
    }
}

pub(crate) fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_backup_timestamp(prefix: &str, name: &str) -> Option<DateTime<Utc>> {
    let stamp = name.strip_prefix(prefix)?.get(..BACKUP_TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.{FILE_EXTENSION}"));
    let mut counter = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{counter}.{FILE_EXTENSION}"));
        counter += 1;
    }
    path
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

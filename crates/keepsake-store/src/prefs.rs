//! Small string key/value store for UI preference flags.
//!
//! Preferences live outside the object store: clearing the partitions does
//! not touch them, and the controller removes them explicitly on reset.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Key of the theme identifier flag.
pub const THEME_KEY: &str = "app_theme";

/// Key of the edit-mode flag (`"true"` / `"false"`).
pub const EDIT_MODE_KEY: &str = "app_edit_mode";

/// Persistent string key/value flags.
pub trait PreferenceStore: Send + Sync {
    /// Read a flag. Returns `Ok(None)` if it is not set.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Set a flag, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a flag. Returns `true` if it was set.
    fn remove(&self, key: &str) -> StoreResult<bool>;
}

/// Preferences held in memory only.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: RwLock<BTreeMap<String, String>>,
}

impl InMemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut values = self.values.write().map_err(poisoned)?;
        Ok(values.remove(key).is_some())
    }
}

/// Preferences persisted as one JSON object file.
///
/// The whole map is rewritten atomically on every change.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FilePreferences {
    /// Load preferences from `path`, starting empty if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let values = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                key: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> StoreResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %self.path.display(), entries = values.len(), "wrote preferences");
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *values = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut values = self.values.write().map_err(poisoned)?;
        if !values.contains_key(key) {
            return Ok(false);
        }
        let mut next = values.clone();
        next.remove(key);
        self.flush(&next)?;
        *values = next;
        Ok(true)
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(format!("lock poisoned: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_set_get_remove() {
        let prefs = InMemoryPreferences::new();
        assert_eq!(prefs.get(THEME_KEY).unwrap(), None);
        prefs.set(THEME_KEY, "ocean").unwrap();
        assert_eq!(prefs.get(THEME_KEY).unwrap().as_deref(), Some("ocean"));
        assert!(prefs.remove(THEME_KEY).unwrap());
        assert!(!prefs.remove(THEME_KEY).unwrap());
    }

    #[test]
    fn file_preferences_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        {
            let prefs = FilePreferences::open(&path).unwrap();
            prefs.set(EDIT_MODE_KEY, "true").unwrap();
            prefs.set(THEME_KEY, "rose").unwrap();
        }
        let prefs = FilePreferences::open(&path).unwrap();
        assert_eq!(prefs.get(EDIT_MODE_KEY).unwrap().as_deref(), Some("true"));
        prefs.remove(EDIT_MODE_KEY).unwrap();

        let reopened = FilePreferences::open(&path).unwrap();
        assert_eq!(reopened.get(EDIT_MODE_KEY).unwrap(), None);
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("rose"));
    }

    #[test]
    fn failed_write_leaves_values_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        let prefs = FilePreferences::open(sub.join("prefs.json")).unwrap();
        prefs.set(THEME_KEY, "rose").unwrap();

        // A regular file where the directory was makes every rewrite fail.
        std::fs::remove_dir_all(&sub).unwrap();
        std::fs::write(&sub, b"").unwrap();

        assert!(prefs.set(EDIT_MODE_KEY, "true").is_err());
        assert!(prefs.set(THEME_KEY, "ocean").is_err());
        assert!(prefs.remove(THEME_KEY).is_err());
        assert_eq!(prefs.get(EDIT_MODE_KEY).unwrap(), None);
        assert_eq!(prefs.get(THEME_KEY).unwrap().as_deref(), Some("rose"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FilePreferences::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }
}

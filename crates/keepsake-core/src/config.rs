use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_SPOUSE_NAME: &str = "My Love";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_DATA_DIR: &str = "./keepsake-data";

/// Site-wide settings, read from a TOML file and then overridden by the
/// environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Display name injected into the document at load time.
    pub spouse_name: String,
    /// Theme used when no theme preference has been stored.
    pub theme: String,
    /// Hash of the access password; empty disables the gate.
    pub app_password_hash: String,
    /// Root directory of the on-disk store and preference file.
    pub data_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            spouse_name: DEFAULT_SPOUSE_NAME.into(),
            theme: DEFAULT_THEME.into(),
            app_password_hash: String::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl SiteConfig {
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Read `path` if given (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Override fields from `SPOUSE_NAME`, `THEME`, `APP_PASSWORD_HASH` and
    /// `KEEPSAKE_DATA_DIR`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(name) = var("SPOUSE_NAME") {
            self.spouse_name = name;
        }
        if let Some(theme) = var("THEME") {
            self.theme = theme;
        }
        if let Some(hash) = var("APP_PASSWORD_HASH") {
            self.app_password_hash = hash;
        }
        if let Some(dir) = var("KEEPSAKE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        debug!(data_dir = %self.data_dir.display(), theme = %self.theme, "resolved site config");
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("db")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let c = SiteConfig::default();
        assert_eq!(c.spouse_name, "My Love");
        assert_eq!(c.theme, "default");
        assert!(c.app_password_hash.is_empty());
        assert_eq!(c.store_dir(), PathBuf::from("./keepsake-data/db"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = SiteConfig::from_toml_str("spouse_name = \"Priya\"\n").unwrap();
        assert_eq!(c.spouse_name, "Priya");
        assert_eq!(c.theme, DEFAULT_THEME);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            SiteConfig::from_toml_str("spouse_name = "),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("SPOUSE_NAME", "Sam"),
            ("THEME", "ocean"),
            ("APP_PASSWORD_HASH", "  "),
            ("KEEPSAKE_DATA_DIR", "/tmp/ks"),
        ]
        .into_iter()
        .collect();
        let mut c = SiteConfig::from_toml_str("theme = \"rose\"").unwrap();
        c.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(c.spouse_name, "Sam");
        assert_eq!(c.theme, "ocean");
        assert!(c.app_password_hash.is_empty());
        assert_eq!(c.data_dir, PathBuf::from("/tmp/ks"));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keepsake.toml");
        std::fs::write(&path, "app_password_hash = \"abc\"\n").unwrap();
        let c = SiteConfig::from_toml_file(&path).unwrap();
        assert_eq!(c.app_password_hash, "abc");
        assert!(SiteConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}

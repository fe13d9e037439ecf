//! Configuration loading for kdbx-env

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolve::{FieldSelection, DEFAULT_TITLE_FIELD, DEFAULT_VALUE_FIELD};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "KDBX_ENV_CONFIG";

/// Default name of the variable carrying the database password
pub const DEFAULT_PASSWORD_ENV: &str = "KDBX_PASSWORD";

/// kdbx-env configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Variable to read the password from before prompting
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Key file used when --keyfile is not given
    #[serde(default)]
    pub keyfile: Option<PathBuf>,

    /// Entry field supplying the secret value
    #[serde(default = "default_field")]
    pub field: String,

    /// Entry field matched against requested names
    #[serde(default = "default_title_field")]
    pub title_field: String,
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

fn default_field() -> String {
    DEFAULT_VALUE_FIELD.to_string()
}

fn default_title_field() -> String {
    DEFAULT_TITLE_FIELD.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password_env: default_password_env(),
            keyfile: None,
            field: default_field(),
            title_field: default_title_field(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from a specific path; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kdbx-env")
            .join("config.toml")
    }

    /// Field selection, with an optional override of the value field
    pub fn fields(&self, value_field: Option<&str>) -> FieldSelection {
        FieldSelection {
            title_field: self.title_field.clone(),
            value_field: value_field.unwrap_or(&self.field).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.password_env, "KDBX_PASSWORD");
        assert_eq!(config.field, "Password");
        assert_eq!(config.title_field, "Title");
        assert!(config.keyfile.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "keyfile = \"/home/dev/vault.key\"\n");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.keyfile, Some(PathBuf::from("/home/dev/vault.key")));
        assert_eq!(config.password_env, "KDBX_PASSWORD");
    }

    #[test]
    fn test_full_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
password_env = "VAULT_PASS"
field = "UserName"
title_field = "EnvName"
"#,
        );

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.password_env, "VAULT_PASS");

        let fields = config.fields(None);
        assert_eq!(fields.value_field, "UserName");
        assert_eq!(fields.title_field, "EnvName");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "password_env = [");
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "pasword_env = \"X\"");
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_cli_field_overrides_config() {
        let config = Config::default();
        assert_eq!(config.fields(Some("URL")).value_field, "URL");
        assert_eq!(config.fields(None).value_field, "Password");
    }
}

//! Configuration with file persistence

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BridgeError, Result};
use crate::export::ExportFormat;

pub const CONFIG_DIR_ENV: &str = "NOCODE_BRIDGE_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub export: ExportConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub default_format: ExportFormat,
    pub uap_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// When false, URLs are matched by domain only and never requested.
    pub enabled: bool,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Key/value store file; defaults to `store.json` in the config directory.
    pub path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            default_format: ExportFormat::Markdown,
            uap_version: crate::export::uap::UAP_VERSION.to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 20,
            max_retries: 2,
            user_agent: concat!("NoCodeBridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(BridgeError::Config("fetch.timeout_secs must be at least 1".to_string()));
        }
        if self.max_retries > 10 {
            return Err(BridgeError::Config("fetch.max_retries must be 10 or less".to_string()));
        }
        Ok(())
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "export.output_dir",
        "export.default_format",
        "export.uap_version",
        "fetch.enabled",
        "fetch.timeout_secs",
        "fetch.max_retries",
        "fetch.user_agent",
        "storage.path",
    ];

    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join("nocode-bridge"))
            .ok_or_else(|| BridgeError::Config("Could not determine config directory".to_string()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if the file
    /// does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            BridgeError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| BridgeError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;
        if self.export.uap_version.trim().is_empty() {
            return Err(BridgeError::Config("export.uap_version must not be empty".to_string()));
        }
        Ok(())
    }

    /// Resolved location of the key/value store.
    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("store.json")),
        }
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "export.output_dir" => Ok(self.export.output_dir.display().to_string()),
            "export.default_format" => Ok(self.export.default_format.to_string()),
            "export.uap_version" => Ok(self.export.uap_version.clone()),
            "fetch.enabled" => Ok(self.fetch.enabled.to_string()),
            "fetch.timeout_secs" => Ok(self.fetch.timeout_secs.to_string()),
            "fetch.max_retries" => Ok(self.fetch.max_retries.to_string()),
            "fetch.user_agent" => Ok(self.fetch.user_agent.clone()),
            "storage.path" => Ok(self
                .storage
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),
            _ => Err(unknown_key(key)),
        }
    }

    /// Sets a value by key. The configuration is left untouched when the
    /// new value does not validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| BridgeError::Config(format!("Invalid {} value: {}", what, value));
        let mut updated = self.clone();

        match key {
            "export.output_dir" => updated.export.output_dir = PathBuf::from(value),
            "export.default_format" => {
                updated.export.default_format = value.parse().map_err(BridgeError::Config)?;
            }
            "export.uap_version" => updated.export.uap_version = value.trim().to_string(),
            "fetch.enabled" => {
                updated.fetch.enabled = value.parse().map_err(|_| invalid("fetch.enabled"))?;
            }
            "fetch.timeout_secs" => {
                updated.fetch.timeout_secs =
                    value.parse().map_err(|_| invalid("fetch.timeout_secs"))?;
            }
            "fetch.max_retries" => {
                updated.fetch.max_retries =
                    value.parse().map_err(|_| invalid("fetch.max_retries"))?;
            }
            "fetch.user_agent" => updated.fetch.user_agent = value.to_string(),
            "storage.path" => {
                updated.storage.path = (!value.trim().is_empty()).then(|| PathBuf::from(value));
            }
            _ => return Err(unknown_key(key)),
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn unknown_key(key: &str) -> BridgeError {
    BridgeError::Config(format!(
        "Unknown configuration key: {}. Valid keys: {}",
        key,
        Config::KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.default_format, ExportFormat::Markdown);
        assert!(config.fetch.user_agent.starts_with("NoCodeBridge/"));
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut config = Config::default();
        for (key, value) in [
            ("export.default_format", "zip"),
            ("export.uap_version", "2.0"),
            ("fetch.enabled", "false"),
            ("fetch.timeout_secs", "5"),
            ("fetch.max_retries", "0"),
        ] {
            config.set(key, value).unwrap();
            assert_eq!(config.get(key).unwrap(), value);
        }
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("fetch.timeout_secs", "soon").is_err());
        assert!(config.set("fetch.timeout_secs", "0").is_err());
        assert_eq!(config.fetch.timeout_secs, 20);
        assert!(config.set("export.default_format", "pdf").is_err());
        assert!(config.set("nope", "1").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("export.output_dir", "/tmp/exports").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[fetch]\nenabled = false\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.fetch.enabled);
        assert_eq!(loaded.fetch.timeout_secs, 20);
        assert_eq!(loaded.export, ExportConfig::default());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }
}

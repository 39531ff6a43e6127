//! String key/value store persisted as a single JSON file.
//!
//! Keys are the ones the web UI used to keep in `localStorage`; values are
//! opaque strings (usually serialized JSON).

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BridgeError, Result};

pub const UAP_IMPORT_KEY: &str = "uap_import";
pub const CURRENT_SCHEMA_KEY: &str = "currentSchema";
pub const ANALYZED_PROJECT_KEY: &str = "analyzed-project";

pub struct KeyValueStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl KeyValueStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents) {
                Ok(Value::Object(entries)) => entries,
                Ok(_) => {
                    return Err(BridgeError::Storage(format!(
                        "{} does not hold a JSON object",
                        path.display()
                    )))
                }
                Err(e) => {
                    return Err(BridgeError::Storage(format!(
                        "{} is corrupt: {}",
                        path.display(),
                        e
                    )))
                }
            }
        } else {
            Map::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "store opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Stores `value` under `key` and writes the file.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.entries
            .insert(key.to_string(), Value::String(value.into()));
        self.flush()
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let previous = self.entries.remove(key);
        self.flush()?;
        Ok(previous.and_then(|v| v.as_str().map(str::to_string)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

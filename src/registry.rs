//! Process-wide bridge state.
//!
//! The application entry point calls [`init`] exactly once; afterwards
//! [`import`], [`import_url`], [`rebuild`], [`rename`] and [`current`] operate on the
//! shared registry. Every call before `init` returns `NotInitialized`.

use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::analysis::pipeline::{Analysis, BridgeAnalyzer};
use crate::config::Config;
use crate::error::{BridgeError, Result};
use crate::export::{export, ExportArtifact, ExportFormat};
use crate::storage::{KeyValueStore, ANALYZED_PROJECT_KEY, CURRENT_SCHEMA_KEY, UAP_IMPORT_KEY};
use crate::types::{Platform, ProjectStructure};

static REGISTRY: OnceCell<Mutex<Registry>> = OnceCell::new();

/// Holds the most recent import plus the collaborators imports need.
pub struct Registry {
    config: Config,
    analyzer: BridgeAnalyzer,
    store: Option<KeyValueStore>,
    current: Option<ProjectStructure>,
}

impl Registry {
    pub fn new(config: Config, store: Option<KeyValueStore>) -> Result<Self> {
        let analyzer = BridgeAnalyzer::new(&config.fetch)?;
        Ok(Self {
            config,
            analyzer,
            store,
            current: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shares the analyzer; its HTTP client is reference counted.
    pub fn analyzer(&self) -> BridgeAnalyzer {
        self.analyzer.clone()
    }

    pub fn current(&self) -> Option<&ProjectStructure> {
        self.current.as_ref()
    }

    /// Imports raw text and makes the result the current project.
    pub fn import(&mut self, input: &str, filename: Option<&str>) -> Result<Analysis> {
        let analysis = self.analyzer.analyze_text(input, filename);
        self.remember(&analysis)?;
        Ok(analysis)
    }

    /// Records an analysis produced elsewhere (for example by an async URL import).
    pub fn remember(&mut self, analysis: &Analysis) -> Result<()> {
        let project = &analysis.project;
        if let Some(store) = self.store.as_mut() {
            let serialized = serde_json::to_string(project)?;
            if project.platform == Platform::Uap {
                store.set(UAP_IMPORT_KEY, serialized.clone())?;
            }
            store.set(ANALYZED_PROJECT_KEY, serialized)?;
        }
        info!(id = %project.id, name = %project.name, "project imported");
        self.current = Some(project.clone());
        Ok(())
    }

    /// Serializes the current project into `format`.
    pub fn rebuild(&mut self, format: ExportFormat) -> Result<ExportArtifact> {
        let project = self.current.as_ref().ok_or(BridgeError::NoProject)?;
        let artifact = export(project, format, &self.config.export.uap_version)?;

        if format == ExportFormat::Uap {
            if let (Some(store), Some(text)) = (self.store.as_mut(), artifact.as_text()) {
                store.set(CURRENT_SCHEMA_KEY, text)?;
            }
        }
        info!(format = %format, filename = %artifact.filename, "project rebuilt");
        Ok(artifact)
    }

    /// Replaces the current project with a renamed copy.
    pub fn rename(&mut self, name: &str) -> Result<ProjectStructure> {
        let renamed = self
            .current
            .as_ref()
            .ok_or(BridgeError::NoProject)?
            .with_name(name);
        self.current = Some(renamed.clone());
        Ok(renamed)
    }

    /// Reloads the last analyzed project from the store, if any. A corrupt
    /// stored copy is an error and leaves the current project in place.
    pub fn restore(&mut self) -> Result<Option<&ProjectStructure>> {
        let Some(saved) = self
            .store
            .as_ref()
            .and_then(|store| store.get(ANALYZED_PROJECT_KEY))
        else {
            return Ok(None);
        };

        let project: ProjectStructure = serde_json::from_str(saved).map_err(|e| {
            BridgeError::Storage(format!("stored {} is corrupt: {}", ANALYZED_PROJECT_KEY, e))
        })?;
        self.current = Some(project);
        Ok(self.current.as_ref())
    }
}

/// Creates the process-wide registry. Later calls are rejected.
pub fn init(config: Config, store: Option<KeyValueStore>) -> Result<()> {
    let registry = Registry::new(config, store)?;
    REGISTRY
        .set(Mutex::new(registry))
        .map_err(|_| BridgeError::Config("registry already initialized".to_string()))
}

pub fn is_initialized() -> bool {
    REGISTRY.get().is_some()
}

fn lock() -> Result<MutexGuard<'static, Registry>> {
    let registry = REGISTRY.get().ok_or(BridgeError::NotInitialized)?;
    // Methods assign `current` last, so a poisoned registry is still consistent.
    Ok(registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
}

pub fn import(input: &str, filename: Option<&str>) -> Result<Analysis> {
    lock()?.import(input, filename)
}

/// Imports a URL. The lock is not held across the network request.
pub async fn import_url(url: &str) -> Result<Analysis> {
    let analyzer = lock()?.analyzer();
    let analysis = analyzer.analyze_url(url).await;
    lock()?.remember(&analysis)?;
    Ok(analysis)
}

pub fn rebuild(format: ExportFormat) -> Result<ExportArtifact> {
    lock()?.rebuild(format)
}

pub fn rename(name: &str) -> Result<ProjectStructure> {
    lock()?.rename(name)
}

pub fn current() -> Result<Option<ProjectStructure>> {
    Ok(lock()?.current().cloned())
}

pub fn restore() -> Result<Option<ProjectStructure>> {
    Ok(lock()?.restore()?.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.fetch.enabled = false;
        config
    }

    #[test]
    fn test_rebuild_without_import_fails() {
        let mut registry = Registry::new(offline_config(), None).unwrap();
        assert_eq!(registry.rebuild(ExportFormat::Json).unwrap_err().code(), "E501");
    }

    #[test]
    fn test_import_then_rebuild_updates_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path().join("store.json")).unwrap();
        let mut registry = Registry::new(offline_config(), Some(store)).unwrap();

        let input = r#"{"meta": {"type": "Universal App Profile"}, "project": {"name": "Foo", "pages": [{"name": "Home", "path": "/"}]}}"#;
        let analysis = registry.import(input, Some("foo.uap")).unwrap();
        assert_eq!(analysis.project.name, "Foo");

        let artifact = registry.rebuild(ExportFormat::Uap).unwrap();
        assert_eq!(artifact.filename, "foo.uap");

        let reopened = KeyValueStore::open(dir.path().join("store.json")).unwrap();
        assert!(reopened.get(UAP_IMPORT_KEY).is_some());
        assert!(reopened.get(ANALYZED_PROJECT_KEY).is_some());
        assert!(reopened.get(CURRENT_SCHEMA_KEY).unwrap().contains("\"format\": \"UAP\""));
    }

    #[test]
    fn test_rename_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path().join("store.json")).unwrap();
        let mut registry = Registry::new(offline_config(), Some(store)).unwrap();
        let imported = registry.import(r#"{"name": "Shop"}"#, None).unwrap().project;

        let renamed = registry.rename("Storefront").unwrap();
        assert_eq!(renamed.name, "Storefront");
        assert_eq!(renamed.id, imported.id);

        let store = KeyValueStore::open(dir.path().join("store.json")).unwrap();
        let mut fresh = Registry::new(offline_config(), Some(store)).unwrap();
        assert_eq!(fresh.restore().unwrap().unwrap(), &imported);
    }

    #[test]
    fn test_corrupt_saved_project_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::open(dir.path().join("store.json")).unwrap();
        let mut registry = Registry::new(offline_config(), Some(store)).unwrap();
        registry.import(r#"{"name": "Shop"}"#, None).unwrap();

        registry
            .store
            .as_mut()
            .unwrap()
            .set(ANALYZED_PROJECT_KEY, "{garbage")
            .unwrap();

        assert_eq!(registry.restore().unwrap_err().code(), "E400");
        assert_eq!(registry.current().unwrap().name, "Shop");
    }

    #[test]
    fn test_restore_without_store_is_none() {
        let mut registry = Registry::new(offline_config(), None).unwrap();
        registry.import(r#"{"name": "Shop"}"#, None).unwrap();
        assert!(registry.restore().unwrap().is_none());
        assert_eq!(registry.current().unwrap().name, "Shop");
    }
}

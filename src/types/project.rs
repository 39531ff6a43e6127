use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ComponentKind, Platform, SourceType};

/// Canonical project record every detection path converges on.
///
/// The four collections are always present; an input that lacks one yields
/// an empty vector. Unrecognized input keys survive in `data`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStructure {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub source_type: SourceType,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub pages: Vec<Page>,
    pub components: Vec<Component>,
    pub data_models: Vec<DataModel>,
    pub workflows: Vec<Workflow>,
    pub created_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    pub path: String,
    pub components: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub props: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DataModel {
    pub name: String,
    pub fields: Vec<Field>,
    pub relationships: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    pub trigger: String,
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectStructure {
    /// Returns a copy carrying a new display name; the original is left untouched.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// True when none of the four collections holds anything.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
            && self.components.is_empty()
            && self.data_models.is_empty()
            && self.workflows.is_empty()
    }

    /// Filesystem-friendly version of the project name.
    pub fn slug(&self) -> String {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            "project".to_string()
        } else {
            slug
        }
    }

    /// A string value from the passthrough bag, if present.
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Lower-cases and hyphenates a display name: "My Shop!" becomes "my-shop".
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

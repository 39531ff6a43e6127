//! Maps arbitrarily shaped JSON onto [`ProjectStructure`].
//!
//! Every canonical field has an ordered list of candidate locations; the
//! first one present (and not null) wins, otherwise the field falls back to
//! an empty collection or a derived default. Items inside the collections are
//! coerced one by one and anything unusable is skipped, so normalization is
//! total.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::platform::filename_stem;
use crate::types::{
    Component, ComponentKind, DataModel, Detection, Field, Page, ProjectStructure, SourceType,
    Workflow,
};

pub const UNTITLED_PROJECT: &str = "Untitled Project";

type Candidates = &'static [&'static [&'static str]];

pub const NAME_CANDIDATES: Candidates = &[
    &["project", "name"],
    &["name"],
    &["meta", "projectName"],
    &["projectName"],
];
pub const PAGE_CANDIDATES: Candidates = &[&["project", "pages"], &["pages"]];
pub const COMPONENT_CANDIDATES: Candidates = &[&["project", "components"], &["components"]];
pub const DATA_MODEL_CANDIDATES: Candidates = &[
    &["project", "data_models"],
    &["data_models"],
    &["dataModels"],
    &["data_types"],
];
pub const WORKFLOW_CANDIDATES: Candidates = &[&["project", "logic"], &["workflows"]];

/// Top-level keys that feed a canonical field and are therefore not copied
/// into the passthrough bag.
const CONSUMED_KEYS: [&str; 13] = [
    "id",
    "name",
    "projectName",
    "platform",
    "sourceType",
    "confidence",
    "pages",
    "components",
    "data_models",
    "dataModels",
    "data_types",
    "workflows",
    "createdAt",
];

/// Keys of `project` that feed canonical fields.
const CONSUMED_PROJECT_KEYS: [&str; 5] = ["name", "pages", "components", "data_models", "logic"];

/// Walks `path` through nested objects; `None` when a step is missing or null.
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let found = path
        .iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))?;
    (!found.is_null()).then_some(found)
}

/// First candidate location holding a value.
pub fn first_defined<'a>(value: &'a Value, candidates: Candidates) -> Option<&'a Value> {
    candidates.iter().find_map(|path| lookup(value, path))
}

/// Builds the canonical record for an already classified input.
pub fn normalize(value: &Value, filename: Option<&str>, detection: &Detection) -> ProjectStructure {
    normalize_as(value, filename, detection, SourceType::Json)
}

/// Like [`normalize`], recording which kind of input the value came from.
pub fn normalize_as(
    value: &Value,
    filename: Option<&str>,
    detection: &Detection,
    source_type: SourceType,
) -> ProjectStructure {
    let name = resolve_name(value, filename, detection);

    let pages = first_defined(value, PAGE_CANDIDATES)
        .map(|raw| collect_items(raw, page_from))
        .unwrap_or_default();
    let components = first_defined(value, COMPONENT_CANDIDATES)
        .map(|raw| collect_items(raw, component_from))
        .unwrap_or_default();
    let data_models = first_defined(value, DATA_MODEL_CANDIDATES)
        .map(|raw| collect_items(raw, data_model_from))
        .unwrap_or_default();
    let workflows = first_defined(value, WORKFLOW_CANDIDATES)
        .map(|raw| collect_items(raw, workflow_from))
        .unwrap_or_default();

    let id = lookup(value, &["id"])
        .and_then(non_empty_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let created_at = lookup(value, &["createdAt"])
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    debug!(
        name = %name,
        pages = pages.len(),
        components = components.len(),
        data_models = data_models.len(),
        workflows = workflows.len(),
        "normalized project"
    );

    ProjectStructure {
        id,
        name,
        platform: detection.platform,
        source_type,
        confidence: detection.confidence,
        pages,
        components,
        data_models,
        workflows,
        created_at,
        data: passthrough(value),
    }
}

fn resolve_name(value: &Value, filename: Option<&str>, detection: &Detection) -> String {
    NAME_CANDIDATES
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(non_empty_str)
        .map(str::to_string)
        .or_else(|| {
            detection
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .or_else(|| filename.and_then(filename_stem))
        .unwrap_or_else(|| UNTITLED_PROJECT.to_string())
}

/// Everything the canonical fields did not consume, kept verbatim.
fn passthrough(value: &Value) -> Map<String, Value> {
    let mut bag = Map::new();
    let Some(obj) = value.as_object() else {
        if !value.is_null() {
            bag.insert("raw".to_string(), value.clone());
        }
        return bag;
    };

    // A canonical record carries its bag under `data`; merging it back keeps
    // normalization idempotent.
    match obj.get("data") {
        Some(Value::Object(inner)) => bag.extend(inner.clone()),
        Some(other) if !other.is_null() => {
            bag.insert("data".to_string(), other.clone());
        }
        _ => {}
    }

    for (key, item) in obj {
        if key == "data" || CONSUMED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if key == "project" {
            if let Some(rest) = project_leftovers(item) {
                bag.insert(key.clone(), rest);
            }
            continue;
        }
        bag.insert(key.clone(), item.clone());
    }

    bag
}

fn project_leftovers(project: &Value) -> Option<Value> {
    match project {
        Value::Object(fields) => {
            let rest: Map<String, Value> = fields
                .iter()
                .filter(|(key, _)| !CONSUMED_PROJECT_KEYS.contains(&key.as_str()))
                .map(|(key, item)| (key.clone(), item.clone()))
                .collect();
            (!rest.is_empty()).then_some(Value::Object(rest))
        }
        Value::Null => None,
        other => Some(other.clone()),
    }
}

/// Applies `convert` to every entry of an array, or to every `(key, value)`
/// pair of an object keyed by item name. Other shapes yield nothing.
fn collect_items<T>(raw: &Value, convert: fn(Option<&str>, &Value, usize) -> Option<T>) -> Vec<T> {
    match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| convert(None, item, index))
            .collect(),
        Value::Object(map) => map
            .iter()
            .enumerate()
            .filter_map(|(index, (key, item))| convert(Some(key.as_str()), item, index))
            .collect(),
        _ => Vec::new(),
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// First non-empty string among `keys` of an object.
fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(non_empty_str)
}

fn item_name(
    obj: &Map<String, Value>,
    key: Option<&str>,
    fallback: impl FnOnce() -> String,
) -> String {
    str_field(obj, &["name", "title", "label", "id"])
        .or_else(|| key.map(str::trim).filter(|k| !k.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(fallback)
}

/// Strings from an array of strings or named objects, or from the keys of a map.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
                Value::Object(obj) => {
                    str_field(obj, &["name", "title", "type", "action", "id"]).map(str::to_string)
                }
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => map
            .keys()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn first_list<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn default_path(name: &str) -> String {
    let slug = crate::types::project::slugify(name);
    if slug.is_empty() || slug == "home" || slug == "index" {
        "/".to_string()
    } else {
        format!("/{}", slug)
    }
}

fn page_from(key: Option<&str>, raw: &Value, index: usize) -> Option<Page> {
    match raw {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| Page {
                name: name.to_string(),
                path: default_path(name),
                components: Vec::new(),
            })
        }
        Value::Object(obj) => {
            let name = item_name(obj, key, || format!("Page {}", index + 1));
            let path = str_field(obj, &["path", "route", "url", "slug"])
                .map(str::to_string)
                .unwrap_or_else(|| default_path(&name));
            Some(Page {
                components: string_list(first_list(obj, &["components", "elements"])),
                name,
                path,
            })
        }
        _ => None,
    }
}

fn component_from(key: Option<&str>, raw: &Value, index: usize) -> Option<Component> {
    match raw {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| Component {
                name: name.to_string(),
                kind: ComponentKind::default(),
                props: Vec::new(),
                dependencies: Vec::new(),
            })
        }
        Value::Object(obj) => Some(Component {
            name: item_name(obj, key, || format!("Component {}", index + 1)),
            kind: str_field(obj, &["type", "kind", "category"])
                .map(ComponentKind::from_label)
                .unwrap_or_default(),
            props: string_list(first_list(obj, &["props", "properties", "inputs"])),
            dependencies: string_list(first_list(obj, &["dependencies", "deps", "imports"])),
        }),
        _ => None,
    }
}

fn data_model_from(key: Option<&str>, raw: &Value, index: usize) -> Option<DataModel> {
    match raw {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| DataModel {
                name: name.to_string(),
                fields: Vec::new(),
                relationships: Vec::new(),
            })
        }
        Value::Object(obj) => Some(DataModel {
            name: item_name(obj, key, || format!("Model {}", index + 1)),
            fields: first_list(obj, &["fields", "columns", "attributes", "properties"])
                .map(|raw| collect_items(raw, field_from))
                .unwrap_or_default(),
            relationships: string_list(first_list(obj, &["relationships", "relations"])),
        }),
        _ => None,
    }
}

fn field_from(key: Option<&str>, raw: &Value, index: usize) -> Option<Field> {
    match raw {
        // `{"email": "text"}` style maps
        Value::String(label) => {
            let label = label.trim();
            let (name, field_type) = match key.map(str::trim).filter(|k| !k.is_empty()) {
                Some(name) => (name, label),
                None => (label, ""),
            };
            (!name.is_empty()).then(|| Field {
                name: name.to_string(),
                field_type: if field_type.is_empty() { "string" } else { field_type }.to_string(),
                required: false,
                description: None,
            })
        }
        Value::Object(obj) => Some(Field {
            name: item_name(obj, key, || format!("field_{}", index + 1)),
            field_type: str_field(obj, &["type", "dataType", "kind"])
                .unwrap_or("string")
                .to_string(),
            required: obj
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            description: str_field(obj, &["description"]).map(str::to_string),
        }),
        _ => None,
    }
}

fn workflow_from(key: Option<&str>, raw: &Value, index: usize) -> Option<Workflow> {
    match raw {
        Value::String(name) => {
            let name = name.trim();
            (!name.is_empty()).then(|| Workflow {
                name: name.to_string(),
                trigger: "manual".to_string(),
                actions: Vec::new(),
                description: None,
            })
        }
        Value::Object(obj) => Some(Workflow {
            name: item_name(obj, key, || format!("Workflow {}", index + 1)),
            trigger: str_field(obj, &["trigger", "event", "on"])
                .unwrap_or("manual")
                .to_string(),
            actions: string_list(first_list(obj, &["actions", "steps"])),
            description: str_field(obj, &["description"]).map(str::to_string),
        }),
        _ => None,
    }
}

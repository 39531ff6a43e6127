//! Platform signatures for URLs and JSON exports.
//!
//! Both tables are evaluated top to bottom and the first matching entry wins,
//! so more specific signatures must come first.

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::{Detection, Platform};

/// Extensions stripped when a filename is used as a project name.
const NAME_EXTENSIONS: [&str; 6] = [".uapimp", ".uap", ".json", ".markdown", ".md", ".txt"];

pub const GENERIC_JSON_NAME: &str = "Imported Project";

pub struct UrlSignature {
    pub needles: &'static [&'static str],
    pub platform: Platform,
    pub confidence: f64,
    pub reason: &'static str,
}

pub const URL_SIGNATURES: &[UrlSignature] = &[
    UrlSignature {
        needles: &["lovable.app", "lovable.dev", "lovableproject.com"],
        platform: Platform::Lovable,
        confidence: 0.95,
        reason: "Lovable domain in URL",
    },
    UrlSignature {
        needles: &["bubble.io"],
        platform: Platform::Bubble,
        confidence: 0.90,
        reason: "Bubble domain in URL",
    },
    UrlSignature {
        needles: &["base44", "base-44"],
        platform: Platform::Base44,
        confidence: 0.85,
        reason: "Base44 domain in URL",
    },
    UrlSignature {
        needles: &["bolt.new", "stackblitz"],
        platform: Platform::Bolt,
        confidence: 0.85,
        reason: "Bolt/StackBlitz domain in URL",
    },
];

pub const GENERIC_URL_CONFIDENCE: f64 = 0.50;

pub struct JsonSignature {
    pub predicate: fn(&Map<String, Value>) -> bool,
    pub platform: Platform,
    pub confidence: f64,
    pub reason: &'static str,
}

pub const JSON_SIGNATURES: &[JsonSignature] = &[
    JsonSignature {
        predicate: is_uap,
        platform: Platform::Uap,
        confidence: 1.0,
        reason: "Universal App Profile envelope",
    },
    JsonSignature {
        predicate: is_lovable_shaped,
        platform: Platform::Lovable,
        confidence: 0.95,
        reason: "Has name, components and pages",
    },
    JsonSignature {
        predicate: is_bubble_shaped,
        platform: Platform::Bubble,
        confidence: 0.80,
        reason: "Has workflows or database definitions",
    },
];

pub const GENERIC_JSON_CONFIDENCE: f64 = 0.60;

fn is_uap(obj: &Map<String, Value>) -> bool {
    let meta = obj.get("meta").and_then(Value::as_object);
    let typed = meta
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str)
        .is_some_and(|t| t == "Universal App Profile");
    let envelope = meta
        .and_then(|m| m.get("format"))
        .and_then(Value::as_str)
        .is_some_and(|f| f == "UAP");
    let triple = ["project", "metadata", "uap_version"]
        .iter()
        .all(|key| has_value(obj, key));

    typed || envelope || triple
}

fn is_lovable_shaped(obj: &Map<String, Value>) -> bool {
    ["name", "components", "pages"]
        .iter()
        .all(|key| has_value(obj, key))
}

fn is_bubble_shaped(obj: &Map<String, Value>) -> bool {
    ["workflows", "database", "data_types"]
        .iter()
        .any(|key| has_value(obj, key))
}

/// Key is present and holds something other than `null`, `false`, `0` or `""`.
/// Empty arrays and objects count as present.
fn has_value(obj: &Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Guesses the builder behind a URL from its domain.
pub fn match_url(url: &str) -> Detection {
    let lowered = url.to_lowercase();
    let slug = url_slug(url);

    for signature in URL_SIGNATURES {
        if signature.needles.iter().any(|needle| lowered.contains(needle)) {
            debug!(url, platform = %signature.platform, "URL signature matched");
            return Detection::new(signature.platform, signature.confidence, signature.reason)
                .with_name(slug);
        }
    }

    debug!(url, "no URL signature matched");
    Detection::new(
        Platform::Unknown,
        GENERIC_URL_CONFIDENCE,
        "Generic URL, no known builder domain",
    )
    .with_name(slug)
}

/// Guesses the builder behind a parsed JSON export from its shape.
pub fn match_json(value: &Value, filename: Option<&str>) -> Detection {
    if let Some(obj) = value.as_object() {
        for signature in JSON_SIGNATURES {
            if (signature.predicate)(obj) {
                debug!(platform = %signature.platform, "JSON signature matched");
                return Detection::new(signature.platform, signature.confidence, signature.reason);
            }
        }
    }

    let name = filename
        .and_then(filename_stem)
        .unwrap_or_else(|| GENERIC_JSON_NAME.to_string());

    debug!(name = %name, "no JSON signature matched");
    Detection::new(
        Platform::Other,
        GENERIC_JSON_CONFIDENCE,
        "Generic JSON structure",
    )
    .with_name(Some(name))
}

/// Filename without directories and without a recognized export extension.
/// Returns `None` when nothing usable remains.
pub fn filename_stem(filename: &str) -> Option<String> {
    let base = std::path::Path::new(filename.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    let stem = NAME_EXTENSIONS
        .iter()
        .find_map(|ext| {
            let cut = base.len().checked_sub(ext.len())?;
            let tail = base.get(cut..)?;
            tail.eq_ignore_ascii_case(ext).then(|| &base[..cut])
        })
        .unwrap_or(base)
        .trim();

    (!stem.is_empty()).then(|| stem.to_string())
}

/// Best-effort project name from a URL: the app subdomain when there is one
/// (`myapp.lovable.dev`), else the last path segment, else the host.
pub fn url_slug(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let labels: Vec<&str> = host
        .split('.')
        .filter(|label| !label.is_empty() && *label != "www")
        .collect();

    if labels.len() > 2 {
        return Some(labels[0].to_string());
    }

    let last_segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string);

    last_segment.or_else(|| labels.first().map(|label| label.to_string()))
}

/// User-facing "what to do next" hint for a detection.
pub fn recommendation(detection: &Detection) -> String {
    let advice = match detection.platform {
        Platform::Uap => {
            "Universal App Profile recognized. Rebuild it for any supported builder or export it as Markdown for an AI assistant."
        }
        Platform::Lovable => {
            "Lovable project detected. Export as Markdown to continue in an AI chat, or as UAP to move it to another builder."
        }
        Platform::Bubble => {
            "Bubble app detected. Review the workflows and data types, then export as UAP to carry them across builders."
        }
        Platform::Base44 => {
            "Base44 app detected. Export the project JSON from Base44 for a richer import, or continue with the URL details."
        }
        Platform::Bolt => {
            "Bolt project detected. Download the StackBlitz project files for a full import, or export what was detected as Markdown."
        }
        Platform::Other => {
            "Generic JSON imported. Check that pages and components were picked up before exporting."
        }
        Platform::Unknown => {
            "Source not recognized. Upload a JSON or Markdown export from your builder for better results."
        }
    };

    if detection.confidence < 0.5 {
        format!(
            "{} Confidence is low ({}%), so review the detected structure first.",
            advice,
            detection.percent()
        )
    } else {
        advice.to_string()
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::analysis::platform::{match_json, match_url};
use crate::export::markdown::parse_markdown;
use crate::types::{Classification, Detection, Platform, SourceType};

pub const MARKDOWN_JSON_CONFIDENCE: f64 = 0.70;
pub const MARKDOWN_CONFIDENCE: f64 = 0.60;
pub const MARKDOWN_INVALID_JSON_CONFIDENCE: f64 = 0.30;
pub const LOOSE_URL_CONFIDENCE: f64 = 0.30;
pub const PLAIN_TEXT_CONFIDENCE: f64 = 0.20;
pub const INVALID_JSON_CONFIDENCE: f64 = 0.10;

const JSON_EXTENSIONS: [&str; 3] = [".json", ".uap", ".uapimp"];
const MARKDOWN_EXTENSIONS: [&str; 2] = [".md", ".markdown"];

static URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("URL prefix pattern"));
static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```json[^\n]*\n?([\s\S]*?)```").expect("JSON fence pattern"));

type TextRule = fn(&str, Option<&str>) -> Option<Classification>;

/// Text heuristics applied once strict JSON parsing has failed, in order.
const TEXT_RULES: &[TextRule] = &[
    invalid_json_file,
    fenced_json,
    markdown_text,
    loose_url,
    plain_text,
];

/// Decides what a raw input is and which platform it likely came from.
///
/// Total: never panics and never fails. Text that cannot be parsed keeps its
/// raw content in the payload.
pub fn classify(input: &str, filename: Option<&str>) -> Classification {
    // U+FEFF is not whitespace, so `trim` keeps a byte-order mark.
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let trimmed = input.trim();

    if URL_PREFIX.is_match(trimmed) {
        debug!("input classified as URL");
        return Classification {
            kind: SourceType::Url,
            detection: match_url(trimmed),
            payload: json!({ "url": trimmed }),
        };
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            debug!("input classified as JSON");
            Classification {
                kind: SourceType::Json,
                detection: match_json(&value, filename),
                payload: value,
            }
        }
        Err(err) => {
            debug!(error = %err, "input is not JSON, trying text heuristics");
            classify_text(input, filename)
        }
    }
}

fn classify_text(text: &str, filename: Option<&str>) -> Classification {
    for rule in TEXT_RULES {
        if let Some(classification) = rule(text, filename) {
            debug!(kind = %classification.kind, "text rule matched");
            return classification;
        }
    }

    // plain_text accepts everything, so this is never reached today.
    Classification {
        kind: SourceType::Unknown,
        detection: Detection::unknown(),
        payload: json!({ "content": text }),
    }
}

fn has_extension(filename: Option<&str>, extensions: &[&str]) -> bool {
    filename
        .map(|name| name.trim().to_lowercase())
        .is_some_and(|name| extensions.iter().any(|ext| name.ends_with(ext)))
}

fn invalid_json_file(text: &str, filename: Option<&str>) -> Option<Classification> {
    if !has_extension(filename, &JSON_EXTENSIONS) {
        return None;
    }

    Some(Classification {
        kind: SourceType::InvalidJson,
        detection: Detection::new(
            Platform::Unknown,
            INVALID_JSON_CONFIDENCE,
            "JSON file could not be parsed",
        ),
        payload: json!({ "raw": text }),
    })
}

fn fenced_json(text: &str, filename: Option<&str>) -> Option<Classification> {
    let block = JSON_FENCE.captures(text)?.get(1)?.as_str();

    let classification = match serde_json::from_str::<Value>(block.trim()) {
        Ok(value) => {
            let embedded = match_json(&value, filename);
            Classification {
                kind: SourceType::MarkdownJson,
                detection: Detection::new(
                    embedded.platform,
                    MARKDOWN_JSON_CONFIDENCE,
                    "Markdown with embedded JSON",
                )
                .with_name(embedded.name),
                payload: value,
            }
        }
        Err(_) => Classification {
            kind: SourceType::MarkdownInvalidJson,
            detection: Detection::new(
                Platform::Unknown,
                MARKDOWN_INVALID_JSON_CONFIDENCE,
                "Markdown with invalid embedded JSON",
            ),
            payload: json!({ "raw_blocks": [block] }),
        },
    };

    Some(classification)
}

fn markdown_text(text: &str, filename: Option<&str>) -> Option<Classification> {
    if !has_extension(filename, &MARKDOWN_EXTENSIONS) && !text.contains('#') {
        return None;
    }

    let mut payload = parse_markdown(text);
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("content".to_string(), Value::String(text.to_string()));
    }

    Some(Classification {
        kind: SourceType::Markdown,
        detection: Detection::new(Platform::Unknown, MARKDOWN_CONFIDENCE, "Markdown document"),
        payload,
    })
}

fn loose_url(text: &str, _filename: Option<&str>) -> Option<Classification> {
    if !(text.starts_with("http://") || text.starts_with("https://")) {
        return None;
    }

    let matched = match_url(text);
    Some(Classification {
        kind: SourceType::Url,
        detection: Detection::new(matched.platform, LOOSE_URL_CONFIDENCE, "URL-like text")
            .with_name(matched.name),
        payload: json!({ "url": text.trim() }),
    })
}

fn plain_text(text: &str, _filename: Option<&str>) -> Option<Classification> {
    Some(Classification {
        kind: SourceType::PlainText,
        detection: Detection::new(Platform::Unknown, PLAIN_TEXT_CONFIDENCE, "Plain text"),
        payload: json!({ "content": text }),
    })
}

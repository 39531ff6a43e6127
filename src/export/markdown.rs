use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::grammar::*;
use crate::types::ProjectStructure;

/// Renders the project as a sectioned Markdown document.
///
/// Every section is always emitted; an empty collection gets a placeholder
/// line instead of disappearing.
pub fn to_markdown(project: &ProjectStructure) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}{}\n\n", TITLE_PREFIX, project.name));

    out.push_str(&format!("{}\n\n", SECTION_METADATA));
    out.push_str(&format!("{}\n", bullet(LABEL_PROJECT_ID, &code(&project.id))));
    out.push_str(&format!("{}\n", bullet(LABEL_PLATFORM, project.platform.as_str())));
    out.push_str(&format!("{}\n", bullet(LABEL_SOURCE_TYPE, project.source_type.as_str())));
    out.push_str(&format!(
        "{}\n",
        bullet(
            LABEL_CONFIDENCE,
            &format!("{}%", (project.confidence.clamp(0.0, 1.0) * 100.0).round())
        )
    ));
    out.push_str(&format!(
        "{}\n",
        bullet(LABEL_CREATED, &project.created_at.to_rfc3339())
    ));
    out.push_str(&format!("\n{}\n\n", SEPARATOR));

    let pages: Vec<String> = project
        .pages
        .iter()
        .map(|page| {
            let mut lines = vec![
                format!("{}{}", ITEM_HEADING, page.name),
                bullet(LABEL_PATH, &code(&page.path)),
            ];
            if !page.components.is_empty() {
                lines.push(bullet(LABEL_COMPONENTS, &page.components.join(", ")));
            }
            lines.join("\n")
        })
        .collect();
    push_section(&mut out, SECTION_PAGES, &pages, EMPTY_PAGES);

    let components: Vec<String> = project
        .components
        .iter()
        .map(|component| {
            let mut lines = vec![
                format!("{}{}", ITEM_HEADING, component.name),
                bullet(LABEL_TYPE, component.kind.as_str()),
            ];
            if !component.props.is_empty() {
                lines.push(bullet(LABEL_PROPS, &component.props.join(", ")));
            }
            if !component.dependencies.is_empty() {
                lines.push(bullet(LABEL_DEPENDENCIES, &component.dependencies.join(", ")));
            }
            lines.join("\n")
        })
        .collect();
    push_section(&mut out, SECTION_COMPONENTS, &components, EMPTY_COMPONENTS);

    let models: Vec<String> = project
        .data_models
        .iter()
        .map(|model| {
            let mut lines = vec![format!("{}{}", ITEM_HEADING, model.name)];
            if !model.fields.is_empty() {
                lines.push(bullet_prefix(LABEL_FIELDS).trim_end().to_string());
                for field in &model.fields {
                    let required = if field.required { ", required" } else { "" };
                    let mut line = format!("  - {} ({}{})", code(&field.name), field.field_type, required);
                    if let Some(description) = &field.description {
                        line.push_str(&format!(": {}", description));
                    }
                    lines.push(line);
                }
            }
            if !model.relationships.is_empty() {
                lines.push(bullet(LABEL_RELATIONSHIPS, &model.relationships.join(", ")));
            }
            lines.join("\n")
        })
        .collect();
    push_section(&mut out, SECTION_DATA_MODELS, &models, EMPTY_DATA_MODELS);

    let workflows: Vec<String> = project
        .workflows
        .iter()
        .map(|workflow| {
            let mut lines = vec![
                format!("{}{}", ITEM_HEADING, workflow.name),
                bullet(LABEL_TRIGGER, &workflow.trigger),
            ];
            if !workflow.actions.is_empty() {
                lines.push(bullet(LABEL_ACTIONS, &workflow.actions.join(" → ")));
            }
            if let Some(description) = &workflow.description {
                lines.push(bullet(LABEL_DESCRIPTION, description));
            }
            lines.join("\n")
        })
        .collect();
    push_section(&mut out, SECTION_WORKFLOWS, &workflows, EMPTY_WORKFLOWS);

    out
}

fn push_section(out: &mut String, heading: &str, items: &[String], placeholder: &str) {
    out.push_str(&format!("{}\n\n", heading));
    if items.is_empty() {
        out.push_str(placeholder);
        out.push('\n');
    } else {
        out.push_str(&items.join("\n\n"));
        out.push('\n');
    }
    out.push_str(&format!("\n{}\n\n", SEPARATOR));
}

struct MarkdownPatterns {
    title: Regex,
    next_section: Regex,
    pages_section: Regex,
    components_section: Regex,
    page_item: Regex,
    component_item: Regex,
}

impl MarkdownPatterns {
    fn new() -> Self {
        let heading = |text: &str| {
            Regex::new(&format!(r"(?m)^{}[ \t]*$", regex::escape(text))).expect("section heading pattern")
        };
        let item = |label: &str, value: &str| {
            Regex::new(&format!(
                r"(?m)^{}(.+?)[ \t]*\n{}{}",
                regex::escape(ITEM_HEADING),
                regex::escape(&bullet_prefix(label)),
                value
            ))
            .expect("section item pattern")
        };

        Self {
            title: Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").expect("title pattern"),
            next_section: Regex::new(r"(?m)^##[ \t]").expect("next section pattern"),
            pages_section: heading(SECTION_PAGES),
            components_section: heading(SECTION_COMPONENTS),
            page_item: item(LABEL_PATH, r"`([^`\n]*)`"),
            component_item: item(LABEL_TYPE, r"([^\n]+?)[ \t]*$"),
        }
    }

    /// Body of the section under `heading`, up to the next `## ` heading.
    fn section<'a>(&self, text: &'a str, heading: &Regex) -> Option<&'a str> {
        let start = heading.find(text)?.end();
        let body = &text[start..];
        let end = self
            .next_section
            .find(body)
            .map(|m| m.start())
            .unwrap_or(body.len());
        Some(&body[..end])
    }
}

static PATTERNS: Lazy<MarkdownPatterns> = Lazy::new(MarkdownPatterns::new);

/// Recovers a partial project object from Markdown.
///
/// Lossy on purpose: only the title, page names and paths, and component
/// names and types come back. Missing sections yield empty arrays; this
/// function never fails.
pub fn parse_markdown(text: &str) -> Value {
    let text = text.replace("\r\n", "\n");
    let patterns = &*PATTERNS;
    let mut result = Map::new();

    let title_label = TITLE_PREFIX.trim_start_matches('#').trim();
    if let Some(caps) = patterns.title.captures(&text) {
        let heading = caps[1].trim();
        let name = heading.strip_prefix(title_label).unwrap_or(heading).trim();
        if !name.is_empty() {
            result.insert("name".to_string(), Value::String(name.to_string()));
        }
    }

    let pages: Vec<Value> = patterns
        .section(&text, &patterns.pages_section)
        .map(|body| {
            patterns
                .page_item
                .captures_iter(body)
                .map(|caps| json!({ "name": caps[1].trim(), "path": &caps[2] }))
                .collect()
        })
        .unwrap_or_default();
    result.insert("pages".to_string(), Value::Array(pages));

    let components: Vec<Value> = patterns
        .section(&text, &patterns.components_section)
        .map(|body| {
            patterns
                .component_item
                .captures_iter(body)
                .map(|caps| json!({ "name": caps[1].trim(), "type": caps[2].trim() }))
                .collect()
        })
        .unwrap_or_default();
    result.insert("components".to_string(), Value::Array(components));

    Value::Object(result)
}

//! Headings and bullet labels of the Markdown export.
//!
//! `to_markdown` writes these strings and `parse_markdown` builds its
//! patterns from them, so the two directions cannot drift apart.

pub const TITLE_PREFIX: &str = "# AI Collaboration Document: ";
pub const ITEM_HEADING: &str = "### ";
pub const SEPARATOR: &str = "---";

pub const SECTION_METADATA: &str = "## Project Metadata";
pub const SECTION_PAGES: &str = "## Pages & Routes";
pub const SECTION_COMPONENTS: &str = "## Components";
pub const SECTION_DATA_MODELS: &str = "## Data Models";
pub const SECTION_WORKFLOWS: &str = "## Workflows";

pub const EMPTY_PAGES: &str = "*No pages detected*";
pub const EMPTY_COMPONENTS: &str = "*No components detected*";
pub const EMPTY_DATA_MODELS: &str = "*No data models detected*";
pub const EMPTY_WORKFLOWS: &str = "*No workflows detected*";

pub const LABEL_PROJECT_ID: &str = "Project ID";
pub const LABEL_PLATFORM: &str = "Platform";
pub const LABEL_SOURCE_TYPE: &str = "Source Type";
pub const LABEL_CONFIDENCE: &str = "Confidence";
pub const LABEL_CREATED: &str = "Created";

pub const LABEL_PATH: &str = "Path";
pub const LABEL_TYPE: &str = "Type";
pub const LABEL_COMPONENTS: &str = "Components";
pub const LABEL_PROPS: &str = "Props";
pub const LABEL_DEPENDENCIES: &str = "Dependencies";
pub const LABEL_FIELDS: &str = "Fields";
pub const LABEL_RELATIONSHIPS: &str = "Relationships";
pub const LABEL_TRIGGER: &str = "Trigger";
pub const LABEL_ACTIONS: &str = "Actions";
pub const LABEL_DESCRIPTION: &str = "Description";

/// `- **Label:** value`
pub fn bullet(label: &str, value: &str) -> String {
    format!("{}{}", bullet_prefix(label), value)
}

/// `- **Label:** `, the part of a bullet that precedes its value.
pub fn bullet_prefix(label: &str) -> String {
    format!("- **{}:** ", label)
}

/// Wraps a value in backticks, as paths and ids are rendered.
pub fn code(value: &str) -> String {
    format!("`{}`", value)
}

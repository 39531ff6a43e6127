use serde::{Deserialize, Serialize};
use std::fmt;

pub mod detection;
pub mod project;

pub use detection::{Classification, Detection};
pub use project::{Component, DataModel, Field, Page, ProjectStructure, Workflow};

/// No-code builder a project is believed to come from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    Lovable,
    Bubble,
    Base44,
    Bolt,
    #[serde(rename = "UAP")]
    Uap,
    #[default]
    Unknown,
    /// Structured JSON that no builder signature recognized.
    #[serde(rename = "other")]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Lovable => "Lovable",
            Platform::Bubble => "Bubble",
            Platform::Base44 => "Base44",
            Platform::Bolt => "Bolt",
            Platform::Uap => "UAP",
            Platform::Unknown => "Unknown",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the raw input turned out to be.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Url,
    Json,
    /// Markdown carrying a parseable ```json fence.
    MarkdownJson,
    /// Markdown whose ```json fence failed to parse.
    MarkdownInvalidJson,
    Markdown,
    PlainText,
    /// A `.json`-like file whose content is not JSON.
    InvalidJson,
    #[default]
    Unknown,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Url => "url",
            SourceType::Json => "json",
            SourceType::MarkdownJson => "markdown_json",
            SourceType::MarkdownInvalidJson => "markdown_invalid_json",
            SourceType::Markdown => "markdown",
            SourceType::PlainText => "plain_text",
            SourceType::InvalidJson => "invalid_json",
            SourceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Ui,
    Layout,
    #[default]
    Custom,
    Page,
}

impl ComponentKind {
    /// Maps a free-form type label onto the closed set; unknown labels are custom.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "ui" | "component" | "element" | "widget" => ComponentKind::Ui,
            "layout" | "container" | "group" => ComponentKind::Layout,
            "page" | "screen" | "view" => ComponentKind::Page,
            _ => ComponentKind::Custom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Ui => "ui",
            ComponentKind::Layout => "layout",
            ComponentKind::Custom => "custom",
            ComponentKind::Page => "page",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serializes_to_display_name() {
        assert_eq!(serde_json::to_string(&Platform::Uap).unwrap(), "\"UAP\"");
        assert_eq!(serde_json::to_string(&Platform::Other).unwrap(), "\"other\"");
        assert_eq!(Platform::Lovable.to_string(), "Lovable");
    }

    #[test]
    fn test_source_type_snake_case() {
        assert_eq!(
            serde_json::to_string(&SourceType::InvalidJson).unwrap(),
            "\"invalid_json\""
        );
        assert_eq!(SourceType::MarkdownJson.as_str(), "markdown_json");
    }

    #[test]
    fn test_component_kind_from_label() {
        assert_eq!(ComponentKind::from_label("UI"), ComponentKind::Ui);
        assert_eq!(ComponentKind::from_label(" layout "), ComponentKind::Layout);
        assert_eq!(ComponentKind::from_label("screen"), ComponentKind::Page);
        assert_eq!(ComponentKind::from_label("chart"), ComponentKind::Custom);
    }
}

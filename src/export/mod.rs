pub mod bundle;
pub mod grammar;
pub mod json;
pub mod markdown;
pub mod rebuild;
pub mod uap;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::types::{Platform, ProjectStructure};

pub use bundle::{to_zip, ProjectExporter};
pub use json::to_json;
pub use markdown::{parse_markdown, to_markdown};
pub use rebuild::rebuild_for;
pub use uap::{to_uap_envelope, UapEnvelope};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    #[default]
    Markdown,
    Uap,
    Zip,
    Lovable,
    Bubble,
    Base44,
    Bolt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 8] = [
        ExportFormat::Json,
        ExportFormat::Markdown,
        ExportFormat::Uap,
        ExportFormat::Zip,
        ExportFormat::Lovable,
        ExportFormat::Bubble,
        ExportFormat::Base44,
        ExportFormat::Bolt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Uap => "uap",
            ExportFormat::Zip => "zip",
            ExportFormat::Lovable => "lovable",
            ExportFormat::Bubble => "bubble",
            ExportFormat::Base44 => "base44",
            ExportFormat::Bolt => "bolt",
        }
    }

    /// Target builder for platform rebuilds.
    fn platform(&self) -> Option<Platform> {
        match self {
            ExportFormat::Lovable => Some(Platform::Lovable),
            ExportFormat::Bubble => Some(Platform::Bubble),
            ExportFormat::Base44 => Some(Platform::Base44),
            ExportFormat::Bolt => Some(Platform::Bolt),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let alias = match lowered.as_str() {
            "md" => "markdown",
            other => other,
        };
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == alias)
            .ok_or_else(|| {
                let valid: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.as_str()).collect();
                format!("Unknown export format '{}'. Valid formats: {}", s, valid.join(", "))
            })
    }
}

/// A serialized export ready to be saved or handed to a download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Content as text; `None` for binary archives.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

pub const MIME_JSON: &str = "application/json";
pub const MIME_MARKDOWN: &str = "text/markdown";
pub const MIME_ZIP: &str = "application/zip";

/// Serializes a project into the requested format.
pub fn export(
    project: &ProjectStructure,
    format: ExportFormat,
    uap_version: &str,
) -> Result<ExportArtifact> {
    let slug = project.slug();

    let artifact = match format {
        ExportFormat::Json => ExportArtifact {
            filename: format!("{}.json", slug),
            mime_type: MIME_JSON,
            bytes: to_json(project)?.into_bytes(),
        },
        ExportFormat::Markdown => ExportArtifact {
            filename: format!("{}.md", slug),
            mime_type: MIME_MARKDOWN,
            bytes: to_markdown(project).into_bytes(),
        },
        ExportFormat::Uap => {
            let envelope = uap::to_uap_envelope_at(project, uap_version, chrono::Utc::now());
            ExportArtifact {
                filename: format!("{}.uap", slug),
                mime_type: MIME_JSON,
                bytes: serde_json::to_string_pretty(&envelope)?.into_bytes(),
            }
        }
        ExportFormat::Zip => ExportArtifact {
            filename: format!("{}-bundle.zip", slug),
            mime_type: MIME_ZIP,
            bytes: to_zip(project, uap_version)?,
        },
        ExportFormat::Lovable | ExportFormat::Bubble | ExportFormat::Base44 | ExportFormat::Bolt => {
            // platform() is Some for exactly these variants
            let platform = format.platform().unwrap_or_default();
            let rebuilt = rebuild_for(project, platform, uap_version);
            ExportArtifact {
                filename: format!("{}-{}.json", slug, format),
                mime_type: MIME_JSON,
                bytes: serde_json::to_string_pretty(&rebuilt)?.into_bytes(),
            }
        }
    };

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;
    use crate::types::Detection;
    use serde_json::json;

    fn project() -> ProjectStructure {
        normalize(
            &json!({"name": "Shop", "pages": ["Home"], "components": []}),
            None,
            &Detection::new(Platform::Lovable, 0.95, "shape"),
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("base44".parse::<ExportFormat>().unwrap(), ExportFormat::Base44);
        let err = "pdf".parse::<ExportFormat>().unwrap_err();
        assert!(err.contains("json, markdown, uap, zip"));
    }

    #[test]
    fn test_artifact_names_and_mime_types() {
        let project = project();
        let cases = [
            (ExportFormat::Json, "shop.json", MIME_JSON),
            (ExportFormat::Markdown, "shop.md", MIME_MARKDOWN),
            (ExportFormat::Uap, "shop.uap", MIME_JSON),
            (ExportFormat::Zip, "shop-bundle.zip", MIME_ZIP),
            (ExportFormat::Bubble, "shop-bubble.json", MIME_JSON),
        ];
        for (format, filename, mime) in cases {
            let artifact = export(&project, format, "1.0").unwrap();
            assert_eq!(artifact.filename, filename);
            assert_eq!(artifact.mime_type, mime);
            assert!(!artifact.bytes.is_empty());
        }
    }

    #[test]
    fn test_markdown_artifact_is_text() {
        let artifact = export(&project(), ExportFormat::Markdown, "1.0").unwrap();
        assert!(artifact.as_text().unwrap().contains("## Pages & Routes"));
    }
}

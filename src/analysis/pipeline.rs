use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::classifier::classify;
use crate::analysis::normalizer::normalize_as;
use crate::analysis::platform::{match_json, match_url, recommendation};
use crate::api::client::{FetchClient, FetchedDocument};
use crate::config::FetchConfig;
use crate::error::Result;
use crate::types::{Detection, Platform, ProjectStructure, SourceType};

/// Outcome of one import: the detection that drove it and the record it produced.
#[derive(Debug, Serialize, Clone)]
pub struct Analysis {
    pub detection: Detection,
    pub project: ProjectStructure,
    pub recommendation: String,
}

impl Analysis {
    fn new(detection: Detection, project: ProjectStructure) -> Self {
        let recommendation = recommendation(&detection);
        Self {
            detection,
            project,
            recommendation,
        }
    }
}

/// Chains classification, platform matching and normalization.
#[derive(Clone)]
pub struct BridgeAnalyzer {
    fetcher: Option<FetchClient>,
}

impl Default for BridgeAnalyzer {
    fn default() -> Self {
        Self::offline()
    }
}

impl BridgeAnalyzer {
    /// Analyzer that fetches URLs when `config.enabled` is set.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let fetcher = if config.enabled {
            Some(FetchClient::new(config)?)
        } else {
            None
        };
        Ok(Self { fetcher })
    }

    /// Analyzer that never touches the network.
    pub fn offline() -> Self {
        Self { fetcher: None }
    }

    /// Imports raw text (file contents, pasted text). Never fails.
    pub fn analyze_text(&self, input: &str, filename: Option<&str>) -> Analysis {
        let classification = classify(input, filename);
        let project = normalize_as(
            &classification.payload,
            filename,
            &classification.detection,
            classification.kind,
        );

        info!(
            kind = %classification.kind,
            platform = %classification.detection.platform,
            confidence = classification.detection.confidence,
            name = %project.name,
            "input analyzed"
        );
        Analysis::new(classification.detection, project)
    }

    /// Imports JSON that the caller already parsed.
    pub fn analyze_value(&self, value: &Value, filename: Option<&str>) -> Analysis {
        let detection = match_json(value, filename);
        let project = normalize_as(value, filename, &detection, SourceType::Json);
        Analysis::new(detection, project)
    }

    /// Imports a URL. When fetching is enabled and the server answers with
    /// JSON or Markdown, the document itself is analyzed; otherwise only the
    /// domain is matched. Fetch failures degrade to the domain match.
    pub async fn analyze_url(&self, url: &str) -> Analysis {
        let url = url.trim();
        let url_detection = match_url(url);

        if let Some(fetcher) = &self.fetcher {
            match fetcher.fetch(url).await {
                Ok(document) => {
                    if let Some(analysis) = self.analyze_document(&document, &url_detection) {
                        return analysis;
                    }
                }
                Err(e) => warn!(url, error = %e, "fetch failed, using URL match only"),
            }
        }

        let payload = serde_json::json!({ "url": url });
        let project = normalize_as(&payload, None, &url_detection, SourceType::Url);
        info!(url, platform = %url_detection.platform, name = %project.name, "URL analyzed");
        Analysis::new(url_detection, project)
    }

    fn analyze_document(&self, document: &FetchedDocument, url_detection: &Detection) -> Option<Analysis> {
        if let Some(value) = &document.json {
            let json_detection = match_json(value, None);
            // The domain says more than a shapeless JSON body does.
            let detection = if json_detection.platform == Platform::Other
                && url_detection.platform != Platform::Unknown
            {
                Detection::new(
                    url_detection.platform,
                    url_detection.confidence,
                    format!("{}; JSON body had no builder signature", url_detection.reason),
                )
                .with_name(url_detection.name.clone())
            } else {
                json_detection.with_name(url_detection.name.clone())
            };

            let mut payload = value.clone();
            if let Some(obj) = payload.as_object_mut() {
                obj.entry("sourceUrl")
                    .or_insert_with(|| Value::String(document.url.clone()));
            }
            let project = normalize_as(&payload, None, &detection, SourceType::Url);
            info!(url = %document.url, platform = %detection.platform, "fetched JSON analyzed");
            return Some(Analysis::new(detection, project));
        }

        let textual = document
            .content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase())
            .is_some_and(|ct| ct.starts_with("text/markdown") || ct.starts_with("text/plain"));
        if textual {
            let filename = document.url.rsplit('/').next().filter(|s| !s.is_empty());
            return Some(self.analyze_text(&document.body, filename));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_analysis_records_kind() {
        let analysis = BridgeAnalyzer::offline().analyze_text("hello world", Some("notes.txt"));
        assert_eq!(analysis.project.source_type, SourceType::PlainText);
        assert_eq!(analysis.project.name, "notes");
        assert!(analysis.project.is_empty());
        assert_eq!(analysis.project.data["content"], "hello world");
    }

    #[tokio::test]
    async fn test_offline_url_uses_domain_only() {
        let analysis = BridgeAnalyzer::offline()
            .analyze_url("https://myapp.lovable.dev/projects/abc123")
            .await;
        assert_eq!(analysis.detection.platform, Platform::Lovable);
        assert_eq!(analysis.project.source_type, SourceType::Url);
        assert_eq!(analysis.project.name, "myapp");
        assert_eq!(analysis.project.data["url"], "https://myapp.lovable.dev/projects/abc123");
    }

    #[test]
    fn test_fetched_shapeless_json_keeps_domain_platform() {
        let document = FetchedDocument {
            url: "https://crm.bubble.io/api/export".into(),
            content_type: Some("application/json".into()),
            body: String::new(),
            json: Some(json!({"title": "CRM"})),
        };
        let analysis = BridgeAnalyzer::offline()
            .analyze_document(&document, &match_url(&document.url))
            .unwrap();
        assert_eq!(analysis.detection.platform, Platform::Bubble);
        assert_eq!(analysis.project.name, "crm");
        assert_eq!(analysis.project.data["sourceUrl"], "https://crm.bubble.io/api/export");
    }

    #[test]
    fn test_fetched_html_is_not_analyzed() {
        let document = FetchedDocument {
            url: "https://example.com".into(),
            content_type: Some("text/html".into()),
            body: "<h1>#</h1>".into(),
            json: None,
        };
        let analyzer = BridgeAnalyzer::offline();
        assert!(analyzer.analyze_document(&document, &match_url(&document.url)).is_none());
    }

    #[test]
    fn test_fetched_markdown_is_classified() {
        let document = FetchedDocument {
            url: "https://example.com/export/shop.md".into(),
            content_type: Some("text/markdown; charset=utf-8".into()),
            body: "# Shop\n\n## Pages & Routes\n\n### Home\n- **Path:** `/`\n".into(),
            json: None,
        };
        let analysis = BridgeAnalyzer::offline()
            .analyze_document(&document, &match_url(&document.url))
            .unwrap();
        assert_eq!(analysis.project.source_type, SourceType::Markdown);
        assert_eq!(analysis.project.name, "Shop");
        assert_eq!(analysis.project.pages.len(), 1);
    }

    #[test]
    fn test_analyze_value() {
        let value = json!({"meta": {"type": "Universal App Profile"}, "project": {"name": "Foo"}});
        let analysis = BridgeAnalyzer::offline().analyze_value(&value, None);
        assert_eq!(analysis.detection.platform, Platform::Uap);
        assert_eq!(analysis.project.name, "Foo");
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::types::{Component, Page, ProjectStructure};

pub const UAP_FORMAT: &str = "UAP";
pub const UAP_VERSION: &str = "1.0";

/// Universal App Profile envelope around a project.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UapEnvelope {
    pub meta: UapMeta,
    pub name: String,
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub pages: Vec<Page>,
    pub components: Vec<Component>,
    pub description: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UapMeta {
    pub format: String,
    pub version: String,
    pub generated_at: String,
    pub source: String,
    #[serde(rename = "projectName")]
    pub project_name: String,
}

/// Wraps the project in a UAP envelope stamped with the current time.
pub fn to_uap_envelope(project: &ProjectStructure) -> UapEnvelope {
    to_uap_envelope_at(project, UAP_VERSION, Utc::now())
}

pub fn to_uap_envelope_at(
    project: &ProjectStructure,
    version: &str,
    generated_at: DateTime<Utc>,
) -> UapEnvelope {
    let description = project
        .extra_str("description")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} project exported from {}", project.name, project.platform));

    UapEnvelope {
        meta: UapMeta {
            format: UAP_FORMAT.to_string(),
            version: version.to_string(),
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: project.platform.to_string(),
            project_name: project.name.clone(),
        },
        name: project.name.clone(),
        project_name: project.name.clone(),
        pages: project.pages.clone(),
        components: project.components.clone(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::platform::match_json;
    use crate::types::{Detection, Platform};
    use chrono::TimeZone;
    use serde_json::json;

    fn project() -> ProjectStructure {
        let detection = Detection::new(Platform::Bubble, 0.8, "shape");
        normalize(
            &json!({"name": "Crm", "pages": [{"name": "Home", "path": "/"}], "workflows": [], "description": "Sales CRM"}),
            None,
            &detection,
        )
    }

    #[test]
    fn test_envelope_shape() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let envelope = to_uap_envelope_at(&project(), "1.0", at);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value["meta"],
            json!({
                "format": "UAP",
                "version": "1.0",
                "generated_at": "2025-01-02T03:04:05.000Z",
                "source": "Bubble",
                "projectName": "Crm"
            })
        );
        assert_eq!(value["projectName"], "Crm");
        assert_eq!(value["description"], "Sales CRM");
        assert_eq!(value["pages"][0]["path"], "/");
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["meta", "name", "projectName", "pages", "components", "description"]);
    }

    #[test]
    fn test_envelope_is_detected_as_uap() {
        let value = serde_json::to_value(to_uap_envelope(&project())).unwrap();
        assert_eq!(match_json(&value, None).platform, Platform::Uap);
    }

    #[test]
    fn test_default_description() {
        let mut project = project();
        project.data.clear();
        let envelope = to_uap_envelope(&project);
        assert_eq!(envelope.description, "Crm project exported from Bubble");
    }
}

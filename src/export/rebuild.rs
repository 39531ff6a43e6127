//! Platform-shaped JSON for re-importing a project into a builder.

use serde_json::{json, Map, Value};

use super::uap::to_uap_envelope_at;
use crate::types::{Platform, ProjectStructure};

/// Reshapes the canonical record into what the given builder's importer
/// expects. Lovable and Bubble rebuilds are recognized as their platform
/// again by the JSON matcher.
pub fn rebuild_for(project: &ProjectStructure, platform: Platform, uap_version: &str) -> Value {
    match platform {
        Platform::Lovable => json!({
            "name": project.name,
            "pages": project.pages,
            "components": project.components,
            "dataModels": project.data_models,
        }),
        Platform::Bubble => {
            let data_types: Map<String, Value> = project
                .data_models
                .iter()
                .map(|model| {
                    let fields: Map<String, Value> = model
                        .fields
                        .iter()
                        .map(|field| (field.name.clone(), Value::String(field.field_type.clone())))
                        .collect();
                    (model.name.clone(), json!({ "fields": fields }))
                })
                .collect();
            let pages: Vec<Value> = project
                .pages
                .iter()
                .map(|page| json!({ "name": page.name, "path": page.path }))
                .collect();

            json!({
                "name": project.name,
                "pages": pages,
                "workflows": project.workflows,
                "data_types": data_types,
            })
        }
        // Both builders take React-style projects; the shape only differs by
        // what they call their data models.
        Platform::Base44 | Platform::Bolt => json!({
            "name": project.name,
            "pages": project.pages,
            "components": project.components,
            "entities": project.data_models,
            "workflows": project.workflows,
        }),
        Platform::Uap => serde_json::to_value(to_uap_envelope_at(
            project,
            uap_version,
            chrono::Utc::now(),
        ))
        .unwrap_or(Value::Null),
        Platform::Unknown | Platform::Other => {
            serde_json::to_value(project).unwrap_or(Value::Null)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::platform::match_json;
    use crate::types::Detection;

    fn project() -> ProjectStructure {
        let input = json!({
            "name": "Crm",
            "pages": [{"name": "Home", "path": "/"}, {"name": "Deals", "path": "/deals"}],
            "components": [{"name": "DealCard", "type": "ui"}],
            "data_models": [{"name": "Deal", "fields": [{"name": "amount", "type": "number"}]}],
            "workflows": [{"name": "Close deal", "trigger": "button_click", "actions": ["update_deal"]}]
        });
        normalize(&input, None, &Detection::new(Platform::Lovable, 0.95, "shape"))
    }

    #[test]
    fn test_lovable_rebuild_redetects() {
        let rebuilt = rebuild_for(&project(), Platform::Lovable, "1.0");
        assert_eq!(match_json(&rebuilt, None).platform, Platform::Lovable);
        assert_eq!(rebuilt["dataModels"][0]["name"], "Deal");
    }

    #[test]
    fn test_bubble_rebuild_redetects_and_keeps_data_types() {
        let original = project();
        let rebuilt = rebuild_for(&original, Platform::Bubble, "1.0");
        let detection = match_json(&rebuilt, None);
        assert_eq!(detection.platform, Platform::Bubble);
        assert_eq!(rebuilt["data_types"]["Deal"]["fields"]["amount"], "number");

        let again = normalize(&rebuilt, None, &detection);
        assert_eq!(again.name, original.name);
        assert_eq!(again.pages, original.pages);
        assert_eq!(again.workflows, original.workflows);
        assert_eq!(again.data_models[0].fields[0].field_type, "number");
    }

    #[test]
    fn test_uap_and_unknown_rebuilds() {
        let uap = rebuild_for(&project(), Platform::Uap, "2.0");
        assert_eq!(uap["meta"]["version"], "2.0");
        assert_eq!(match_json(&uap, None).platform, Platform::Uap);

        let canonical = rebuild_for(&project(), Platform::Unknown, "1.0");
        assert!(canonical.get("createdAt").is_some());
    }
}

//! Generative checks for the normalization laws.

use chrono::Utc;
use nocode_bridge::analysis::normalizer::normalize_as;
use nocode_bridge::types::{
    Component, ComponentKind, DataModel, Field, Page, ProjectStructure, Workflow,
};
use nocode_bridge::{classify, normalize, parse_markdown, to_json, to_markdown};
use nocode_bridge::{Detection, Platform, SourceType};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const INTERESTING_KEYS: [&str; 22] = [
    "id", "name", "title", "project", "meta", "projectName", "pages", "components",
    "data_models", "dataModels", "data_types", "workflows", "logic", "fields", "path",
    "type", "trigger", "actions", "required", "description", "createdAt", "data",
];

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(INTERESTING_KEYS.to_vec()).prop_map(str::to_string),
        1 => "[a-z]{1,6}",
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[ a-zA-Z0-9/_:-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,10}[A-Za-z0-9]"
}

fn labels() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(label(), 0..3)
}

fn kind() -> impl Strategy<Value = ComponentKind> {
    prop::sample::select(vec![
        ComponentKind::Ui,
        ComponentKind::Layout,
        ComponentKind::Custom,
        ComponentKind::Page,
    ])
}

fn page() -> impl Strategy<Value = Page> {
    (label(), "/[a-z0-9/-]{0,12}", labels()).prop_map(|(name, path, components)| Page {
        name,
        path,
        components,
    })
}

fn component() -> impl Strategy<Value = Component> {
    (label(), kind(), labels(), labels()).prop_map(|(name, kind, props, dependencies)| Component {
        name,
        kind,
        props,
        dependencies,
    })
}

fn field() -> impl Strategy<Value = Field> {
    (label(), label(), any::<bool>(), prop::option::of(label())).prop_map(
        |(name, field_type, required, description)| Field {
            name,
            field_type,
            required,
            description,
        },
    )
}

fn data_model() -> impl Strategy<Value = DataModel> {
    (label(), prop::collection::vec(field(), 0..4), labels()).prop_map(
        |(name, fields, relationships)| DataModel {
            name,
            fields,
            relationships,
        },
    )
}

fn workflow() -> impl Strategy<Value = Workflow> {
    (label(), label(), labels(), prop::option::of(label())).prop_map(
        |(name, trigger, actions, description)| Workflow {
            name,
            trigger,
            actions,
            description,
        },
    )
}

fn project() -> impl Strategy<Value = ProjectStructure> {
    (
        label(),
        prop::collection::vec(page(), 0..4),
        prop::collection::vec(component(), 0..4),
        prop::collection::vec(data_model(), 0..3),
        prop::collection::vec(workflow(), 0..3),
    )
        .prop_map(|(name, pages, components, data_models, workflows)| ProjectStructure {
            id: "fixed-id".to_string(),
            name,
            platform: Platform::Lovable,
            source_type: SourceType::Json,
            confidence: 0.95,
            pages,
            components,
            data_models,
            workflows,
            created_at: Utc::now(),
            data: Map::new(),
        })
}

fn detection() -> Detection {
    Detection::new(Platform::Other, 0.6, "generated")
}

proptest! {
    #[test]
    fn json_export_reimports_without_loss(original in project()) {
        let text = to_json(&original).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let again = normalize(&value, None, &detection());

        prop_assert_eq!(&again.name, &original.name);
        prop_assert_eq!(&again.pages, &original.pages);
        prop_assert_eq!(&again.components, &original.components);
        prop_assert_eq!(&again.data_models, &original.data_models);
        prop_assert_eq!(&again.workflows, &original.workflows);
        prop_assert_eq!(&again.id, &original.id);
    }

    #[test]
    fn normalization_is_idempotent(input in json_value()) {
        let first = normalize(&input, None, &detection());
        let second = normalize(&serde_json::to_value(&first).unwrap(), None, &detection());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn markdown_keeps_names_paths_and_types(original in project()) {
        let parsed = parse_markdown(&to_markdown(&original));

        prop_assert_eq!(parsed["name"].as_str(), Some(original.name.as_str()));

        let pages: Vec<(String, String)> = original
            .pages
            .iter()
            .map(|p| (p.name.clone(), p.path.clone()))
            .collect();
        let parsed_pages: Vec<(String, String)> = parsed["pages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| (p["name"].as_str().unwrap().to_string(), p["path"].as_str().unwrap().to_string()))
            .collect();
        prop_assert_eq!(parsed_pages, pages);

        let components: Vec<(String, String)> = original
            .components
            .iter()
            .map(|c| (c.name.clone(), c.kind.as_str().to_string()))
            .collect();
        let parsed_components: Vec<(String, String)> = parsed["components"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| (c["name"].as_str().unwrap().to_string(), c["type"].as_str().unwrap().to_string()))
            .collect();
        prop_assert_eq!(parsed_components, components);
    }

    #[test]
    fn any_text_classifies_and_normalizes(
        input in "(?s).{0,200}",
        filename in prop::option::of("[a-zA-Z0-9 ._-]{0,16}"),
    ) {
        let classification = classify(&input, filename.as_deref());
        prop_assert!((0.0..=1.0).contains(&classification.detection.confidence));

        let project = normalize_as(
            &classification.payload,
            filename.as_deref(),
            &classification.detection,
            classification.kind,
        );
        prop_assert!(!project.name.trim().is_empty());
        prop_assert_eq!(project.source_type, classification.kind);
        prop_assert!(!to_markdown(&project).is_empty());
    }

    #[test]
    fn any_json_value_normalizes(input in json_value()) {
        let project = normalize(&input, Some("upload.json"), &detection());
        prop_assert!(!project.name.is_empty());
        prop_assert!(!project.id.is_empty());
        prop_assert!(to_json(&project).is_ok());
    }
}

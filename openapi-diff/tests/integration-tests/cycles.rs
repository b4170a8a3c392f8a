// Copyright 2025 Oxide Computer Company

//! Comparison of recursive schemas

use crate::common::api;
use crate::common::create_log_context;
use crate::common::engine;
use crate::common::returning;
use openapi_diff::DiffConfig;
use openapi_diff::HttpMethod;
use openapi_diff::SchemaRefs;
use openapi_diff::SchemasDiff;
use openapi_diff::SpecDocument;
use serde_json::json;
use serde_json::Value;

fn tree(source: &str, value_type: &str) -> SpecDocument {
    api(
        source,
        json!({
            "/tree": {
                "get": returning(json!({ "$ref": "#/components/schemas/Node" }))
            }
        }),
        json!({
            "schemas": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "value": { "type": value_type },
                        "children": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Node" }
                        }
                    }
                }
            }
        }),
    )
}

fn modified_properties(schemas: &SchemasDiff<'_>, name: &str) -> Vec<String> {
    schemas.modified[name]
        .properties_diff
        .as_ref()
        .map(|p| p.modified.keys().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_self_recursive_schema() {
    let logctx = create_log_context("test_self_recursive_schema");
    let engine = engine(&logctx, DiffConfig::default());

    let base = tree("base.json", "string");
    let same = tree("same.json", "string");
    let revision = tree("revision.json", "integer");

    assert!(engine.diff(&base, &same).is_none());

    let diff = engine.diff(&base, &revision).unwrap();
    let schemas = diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap();
    // The change is reported where it is, not again below "children".
    assert_eq!(modified_properties(schemas, "Node"), vec!["value"]);

    let response = &diff.paths_diff.as_ref().unwrap().modified["/tree"]
        .operations_diff
        .as_ref()
        .unwrap()
        .modified[&HttpMethod::Get]
        .responses_diff
        .as_ref()
        .unwrap()
        .modified["200"];
    let node = response
        .content_diff
        .as_ref()
        .unwrap()
        .modified["application/json"]
        .schema_diff
        .as_ref()
        .unwrap();
    let properties = node.properties_diff.as_ref().unwrap();
    assert_eq!(properties.modified.keys().collect::<Vec<_>>(), vec!["value"]);

    logctx.cleanup_successful();
}

#[test]
fn test_mutually_recursive_schemas() {
    let logctx = create_log_context("test_mutually_recursive_schemas");
    let engine = engine(&logctx, DiffConfig::default());

    let pair = |name_type: &str| -> Value {
        json!({
            "schemas": {
                "A": {
                    "type": "object",
                    "properties": {
                        "b": { "$ref": "#/components/schemas/B" }
                    }
                },
                "B": {
                    "type": "object",
                    "properties": {
                        "a": { "$ref": "#/components/schemas/A" },
                        "name": { "type": name_type }
                    }
                }
            }
        })
    };
    let base = api("base.json", json!({}), pair("string"));
    let revision = api("revision.json", json!({}), pair("integer"));

    let diff = engine.diff(&base, &revision).unwrap();
    let schemas = diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap();
    assert_eq!(modified_properties(schemas, "A"), vec!["b"]);
    assert_eq!(modified_properties(schemas, "B"), vec!["a", "name"]);

    // Within A, B is reached for the first time and described in full; the
    // reference back to A is where the cycle closes.
    let a = schemas.modified["A"].properties_diff.as_ref().unwrap();
    let b = &a.modified["b"];
    let b_properties = b.properties_diff.as_ref().unwrap();
    assert_eq!(b_properties.modified.keys().collect::<Vec<_>>(), vec!["name"]);
    assert!(b_properties.modified["name"].type_diff.is_some());

    // Under B itself, A has already been compared and is only pointed to.
    let b = schemas.modified["B"].properties_diff.as_ref().unwrap();
    assert_eq!(
        b.modified["a"].repeated_ref,
        Some(SchemaRefs { base: "A".to_string(), revision: "A".to_string() })
    );
    assert!(b.modified["a"].properties_diff.is_none());

    logctx.cleanup_successful();
}

/// A schema that contains itself only through `allOf`
#[test]
fn test_recursion_through_composition() {
    let logctx = create_log_context("test_recursion_through_composition");
    let engine = engine(&logctx, DiffConfig::default());

    let chain = |description: &str| -> Value {
        json!({
            "schemas": {
                "Link": {
                    "description": description,
                    "allOf": [
                        { "$ref": "#/components/schemas/Link" },
                        { "type": "object" }
                    ]
                }
            }
        })
    };
    let base = api("base.json", json!({}), chain("one"));
    let revision = api("revision.json", json!({}), chain("two"));

    let diff = engine.diff(&base, &revision).unwrap();
    let link = &diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap()
        .modified["Link"];
    assert!(link.description_diff.is_some());
    assert!(link.all_of_diff.is_none());

    logctx.cleanup_successful();
}

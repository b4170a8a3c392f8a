// Copyright 2025 Oxide Computer Company

//! Schema comparison as seen through whole documents

use crate::common::api;
use crate::common::create_log_context;
use crate::common::engine;
use crate::common::returning;
use openapi_diff::Diff;
use openapi_diff::DiffConfig;
use openapi_diff::HttpMethod;
use openapi_diff::ParamLocation;
use openapi_diff::SchemaDiff;
use openapi_diff::SchemaRefs;
use openapi_diff::SpecDocument;
use openapi_diff::Subschema;
use openapi_diff::ValueDiff;
use serde_json::json;
use serde_json::Value;

/// A document whose only component schema is `schema`, named `Thing`
fn with_schema(source: &str, schema: Value) -> SpecDocument {
    api(source, json!({}), json!({ "schemas": { "Thing": schema } }))
}

fn thing_diff<'d, 'a>(diff: &'d Diff<'a>) -> &'d SchemaDiff<'a> {
    &diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap()
        .modified["Thing"]
}

#[test]
fn test_pattern_added_to_query_parameter() {
    let logctx = create_log_context("test_pattern_added_to_query_parameter");
    let engine = engine(&logctx, DiffConfig::default());

    let operation = |schema: Value| {
        json!({
            "/test": {
                "post": {
                    "parameters": [{
                        "in": "query",
                        "name": "category",
                        "schema": schema
                    }],
                    "responses": {}
                }
            }
        })
    };
    let base = api(
        "base.json",
        operation(json!({ "type": "string" })),
        json!({}),
    );
    let revision = api(
        "revision.json",
        operation(json!({ "type": "string", "pattern": "^\\w+$" })),
        json!({}),
    );

    let diff = engine.diff(&base, &revision).unwrap();
    let parameters = diff.paths_diff.as_ref().unwrap().modified["/test"]
        .operations_diff
        .as_ref()
        .unwrap()
        .modified[&HttpMethod::Post]
        .parameters_diff
        .as_ref()
        .unwrap();
    assert!(parameters.added.is_empty());
    assert!(parameters.deleted.is_empty());
    let category = &parameters.modified[&ParamLocation::Query]["category"];
    let schema_diff = category.schema_diff.as_ref().unwrap();
    assert_eq!(
        schema_diff.pattern_diff,
        Some(ValueDiff { from: None, to: Some("^\\w+$".to_string()) })
    );
    assert!(schema_diff.type_diff.is_none());
    assert_eq!(parameters.counts(), (0, 0, 1));

    logctx.cleanup_successful();
}

#[test]
fn test_required_properties() {
    let logctx = create_log_context("test_required_properties");
    let engine = engine(&logctx, DiffConfig::default());

    let object = |required: Value| {
        json!({
            "type": "object",
            "required": required,
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "string" }
            }
        })
    };
    let one = with_schema("one.json", object(json!(["a"])));
    let two = with_schema("two.json", object(json!(["b", "a"])));

    let diff = engine.diff(&one, &two).unwrap();
    let required = thing_diff(&diff).required_diff.as_ref().unwrap();
    assert_eq!(required.added, vec!["b".to_string()]);
    assert!(required.deleted.is_empty());

    let diff = engine.diff(&two, &one).unwrap();
    let required = thing_diff(&diff).required_diff.as_ref().unwrap();
    assert!(required.added.is_empty());
    assert_eq!(required.deleted, vec!["b".to_string()]);

    logctx.cleanup_successful();
}

#[test]
fn test_enum_added() {
    let logctx = create_log_context("test_enum_added");
    let engine = engine(&logctx, DiffConfig::default());

    let open = with_schema("open.json", json!({ "type": "string" }));
    let closed = with_schema(
        "closed.json",
        json!({ "type": "string", "enum": ["red", "green"] }),
    );

    let diff = engine.diff(&open, &closed).unwrap();
    let enum_diff = thing_diff(&diff).enum_diff.as_ref().unwrap();
    assert!(enum_diff.enum_added);
    assert!(!enum_diff.enum_deleted);
    assert_eq!(enum_diff.added, vec![json!("red"), json!("green")]);

    let diff = engine.diff(&closed, &open).unwrap();
    let enum_diff = thing_diff(&diff).enum_diff.as_ref().unwrap();
    assert!(enum_diff.enum_deleted);
    assert_eq!(enum_diff.deleted, vec![json!("red"), json!("green")]);

    logctx.cleanup_successful();
}

#[test]
fn test_all_of_member_modified() {
    let logctx = create_log_context("test_all_of_member_modified");
    let engine = engine(&logctx, DiffConfig::default());

    let composed = |extra: &str| {
        json!({
            "schemas": {
                "Base": {
                    "type": "object",
                    "properties": { "id": { "type": "string" } }
                },
                "Thing": {
                    "allOf": [
                        { "$ref": "#/components/schemas/Base" },
                        {
                            "type": "object",
                            "properties": { "extra": { "type": extra } }
                        }
                    ]
                }
            }
        })
    };
    let base = api("base.json", json!({}), composed("string"));
    let revision = api("revision.json", json!({}), composed("integer"));

    let diff = engine.diff(&base, &revision).unwrap();
    let all_of = thing_diff(&diff).all_of_diff.as_ref().unwrap();
    assert!(all_of.added.is_empty());
    assert!(all_of.deleted.is_empty());
    assert_eq!(
        all_of.modified.keys().copied().collect::<Vec<usize>>(),
        vec![1]
    );
    let member = &all_of.modified[&1usize];
    let extra = &member.properties_diff.as_ref().unwrap().modified["extra"];
    assert_eq!(
        extra.type_diff,
        Some(ValueDiff {
            from: Some("string".to_string()),
            to: Some("integer".to_string()),
        })
    );

    let schemas = diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap();
    assert_eq!(schemas.modified.keys().collect::<Vec<_>>(), vec!["Thing"]);

    logctx.cleanup_successful();
}

#[test]
fn test_schema_change_behind_reference() {
    let logctx = create_log_context("test_schema_change_behind_reference");
    let engine = engine(&logctx, DiffConfig::default());

    let document = |source: &str, id_type: &str| {
        api(
            source,
            json!({
                "/things": {
                    "get": returning(
                        json!({ "$ref": "#/components/schemas/Thing" })
                    )
                }
            }),
            json!({
                "schemas": {
                    "Thing": {
                        "type": "object",
                        "properties": { "id": { "type": id_type } }
                    }
                }
            }),
        )
    };
    let base = document("base.json", "string");
    let revision = document("revision.json", "integer");

    let diff = engine.diff(&base, &revision).unwrap();
    let responses = diff.paths_diff.as_ref().unwrap().modified["/things"]
        .operations_diff
        .as_ref()
        .unwrap()
        .modified[&HttpMethod::Get]
        .responses_diff
        .as_ref()
        .unwrap();
    let media_type = &responses.modified["200"]
        .content_diff
        .as_ref()
        .unwrap()
        .modified["application/json"];
    let schema = media_type.schema_diff.as_ref().unwrap();
    let id = &schema.properties_diff.as_ref().unwrap().modified["id"];
    assert!(id.type_diff.is_some());

    // The same change is also reported under the component.
    let properties = thing_diff(&diff).properties_diff.as_ref().unwrap();
    let id = &properties.modified["id"];
    assert!(id.type_diff.is_some());

    logctx.cleanup_successful();
}

#[test]
fn test_schema_added_and_deleted() {
    let logctx = create_log_context("test_schema_added_and_deleted");
    let engine = engine(&logctx, DiffConfig::default());

    let base = with_schema(
        "base.json",
        json!({
            "type": "object",
            "properties": { "old": { "type": "string" } }
        }),
    );
    let revision = with_schema(
        "revision.json",
        json!({
            "type": "object",
            "properties": { "new": { "type": "string" } }
        }),
    );

    let diff = engine.diff(&base, &revision).unwrap();
    let properties = thing_diff(&diff).properties_diff.as_ref().unwrap();
    assert_eq!(properties.added, vec!["new".to_string()]);
    assert_eq!(properties.deleted, vec!["old".to_string()]);
    assert!(properties.modified.is_empty());

    logctx.cleanup_successful();
}

/// Components `S0` to `S<depth>`, where each `Si` refers to `Si+1` twice
fn shared_chain(source: &str, depth: usize, leaf_type: &str) -> SpecDocument {
    let mut schemas = serde_json::Map::new();
    for i in 0..depth {
        let next =
            json!({ "$ref": format!("#/components/schemas/S{}", i + 1) });
        schemas.insert(
            format!("S{}", i),
            json!({
                "type": "object",
                "properties": { "a": next.clone(), "b": next }
            }),
        );
    }
    schemas.insert(format!("S{}", depth), json!({ "type": leaf_type }));
    api(source, json!({}), json!({ "schemas": schemas }))
}

#[test]
fn test_shared_components_compared_once() {
    let logctx = create_log_context("test_shared_components_compared_once");
    let engine = engine(&logctx, DiffConfig::default());

    let depth = 24;
    let base = shared_chain("base.json", depth, "string");
    let revision = shared_chain("revision.json", depth, "integer");

    let diff = engine.diff(&base, &revision).unwrap();
    let schemas = diff
        .components_diff
        .as_ref()
        .unwrap()
        .schemas_diff
        .as_ref()
        .unwrap();
    assert_eq!(schemas.modified.len(), depth + 1);

    // The first reference to S1 is followed; the second one only points at
    // the changes found through the first.
    let s0 = schemas.modified["S0"].properties_diff.as_ref().unwrap();
    assert!(s0.modified["a"].properties_diff.is_some());
    assert_eq!(
        s0.modified["b"].repeated_ref,
        Some(SchemaRefs { base: "S1".to_string(), revision: "S1".to_string() })
    );

    // Following "a" all the way down reaches the change itself.
    let mut node = &schemas.modified["S0"];
    for _ in 0..depth {
        node = &node.properties_diff.as_ref().unwrap().modified["a"];
    }
    assert_eq!(
        node.type_diff,
        Some(ValueDiff {
            from: Some("string".to_string()),
            to: Some("integer".to_string()),
        })
    );

    // Each pair of components is described a bounded number of times, so
    // the output grows with the square of the depth rather than
    // exponentially.
    let text = serde_json::to_string(&diff).unwrap();
    assert!(text.len() < 200_000, "diff is {} bytes", text.len());

    logctx.cleanup_successful();
}

#[test]
fn test_composition_references() {
    let logctx = create_log_context("test_composition_references");
    let engine = engine(&logctx, DiffConfig::default());

    let base = api(
        "base.json",
        json!({}),
        json!({
            "schemas": {
                "Cat": { "type": "object", "description": "cat" },
                "Dog": { "type": "object" },
                "Thing": {
                    "oneOf": [
                        { "$ref": "#/components/schemas/Cat" },
                        { "$ref": "#/components/schemas/Dog" }
                    ]
                }
            }
        }),
    );
    let revision = api(
        "revision.json",
        json!({}),
        json!({
            "schemas": {
                "Bird": { "type": "object" },
                "Cat": { "type": "object", "description": "a cat" },
                "Dog": { "type": "object" },
                "Thing": {
                    "oneOf": [
                        { "$ref": "#/components/schemas/Dog" },
                        { "$ref": "#/components/schemas/Bird" },
                        { "$ref": "#/components/schemas/Cat" }
                    ]
                }
            }
        }),
    );
    let bird = |index| Subschema { index, component: Some("Bird".to_string()) };
    let cat = Some(SchemaRefs {
        base: "Cat".to_string(),
        revision: "Cat".to_string(),
    });

    let diff = engine.diff(&base, &revision).unwrap();
    let thing = thing_diff(&diff);
    // Members that are references are matched by name, not position.
    let one_of = thing.one_of_diff.as_ref().unwrap();
    assert_eq!(one_of.added, vec![bird(1)]);
    assert!(one_of.deleted.is_empty());
    assert_eq!(one_of.modified.keys().copied().collect::<Vec<_>>(), vec![0]);
    // Cat was compared on its own first, so here it is only pointed to.
    assert_eq!(one_of.modified[&0usize].repeated_ref, cat);

    let diff = engine.diff(&revision, &base).unwrap();
    let one_of = thing_diff(&diff).one_of_diff.as_ref().unwrap();
    assert!(one_of.added.is_empty());
    assert_eq!(one_of.deleted, vec![bird(1)]);
    // keyed by the position in the base list
    assert_eq!(one_of.modified.keys().copied().collect::<Vec<_>>(), vec![2]);

    logctx.cleanup_successful();
}

#[test]
fn test_inline_composition_members() {
    let logctx = create_log_context("test_inline_composition_members");
    let engine = engine(&logctx, DiffConfig::default());

    let any_of = |source: &str, members: Value| {
        with_schema(source, json!({ "anyOf": members }))
    };
    let base = any_of(
        "base.json",
        json!([{ "type": "string" }, { "type": "integer", "maximum": 5 }]),
    );
    let reordered = any_of(
        "reordered.json",
        json!([{ "type": "integer", "maximum": 5 }, { "type": "string" }]),
    );
    let raised = any_of(
        "raised.json",
        json!([{ "type": "string" }, { "type": "integer", "maximum": 10 }]),
    );
    let replaced = any_of(
        "replaced.json",
        json!([{ "type": "boolean" }, { "type": "number" }]),
    );

    // Inline members equal to one on the other side are matched with it
    // wherever it is.
    assert!(engine.diff(&base, &reordered).is_none());

    // A single changed inline member is compared with its counterpart.
    let diff = engine.diff(&base, &raised).unwrap();
    let members = thing_diff(&diff).any_of_diff.as_ref().unwrap();
    assert!(members.added.is_empty() && members.deleted.is_empty());
    assert_eq!(members.modified.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(
        members.modified[&1usize].max_diff,
        Some(ValueDiff { from: Some(5.into()), to: Some(10.into()) })
    );

    // With more than one inline member changed there is no telling which
    // became which.
    let diff = engine.diff(&base, &replaced).unwrap();
    let members = thing_diff(&diff).any_of_diff.as_ref().unwrap();
    let inline = |index| Subschema { index, component: None };
    assert_eq!(members.added, vec![inline(0), inline(1)]);
    assert_eq!(members.deleted, vec![inline(0), inline(1)]);
    assert!(members.modified.is_empty());

    logctx.cleanup_successful();
}

#[test]
fn test_schema_extensions() {
    let logctx = create_log_context("test_schema_extensions");
    let engine = engine(&logctx, DiffConfig::default());

    let base = with_schema(
        "base.json",
        json!({ "type": "object", "x-internal": true, "x-old": 1 }),
    );
    let revision = with_schema(
        "revision.json",
        json!({ "type": "object", "x-internal": false, "x-new": 2 }),
    );

    let diff = engine.diff(&base, &revision).unwrap();
    let extensions = thing_diff(&diff).extensions_diff.as_ref().unwrap();
    assert_eq!(extensions.added, vec!["x-new".to_string()]);
    assert_eq!(extensions.deleted, vec!["x-old".to_string()]);
    assert_eq!(
        extensions.modified["x-internal"],
        ValueDiff { from: Some(json!(true)), to: Some(json!(false)) }
    );

    logctx.cleanup_successful();
}

#[test]
fn test_whole_schema_added() {
    let logctx = create_log_context("test_whole_schema_added");
    let engine = engine(&logctx, DiffConfig::default());

    let content = |media_type: Value| {
        json!({
            "/things": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": media_type }
                        }
                    }
                }
            }
        })
    };
    let untyped = api("untyped.json", content(json!({})), json!({}));
    let typed = api(
        "typed.json",
        content(json!({
            "schema": { "type": "object", "properties": { "id": {} } }
        })),
        json!({}),
    );

    let diff = engine.diff(&untyped, &typed).unwrap();
    let media_type = &diff.paths_diff.as_ref().unwrap().modified["/things"]
        .operations_diff
        .as_ref()
        .unwrap()
        .modified[&HttpMethod::Get]
        .responses_diff
        .as_ref()
        .unwrap()
        .modified["200"]
        .content_diff
        .as_ref()
        .unwrap()
        .modified["application/json"];
    let schema = media_type.schema_diff.as_ref().unwrap();
    assert!(schema.schema_added);
    assert!(!schema.schema_deleted);
    assert!(schema.base.is_none() && schema.revision.is_some());
    // A new schema is a leaf; its contents are not compared with anything.
    assert!(schema.properties_diff.is_none());
    assert!(schema.type_diff.is_none());

    let diff = engine.diff(&typed, &untyped).unwrap();
    let schema = diff.paths_diff.as_ref().unwrap().modified["/things"]
        .operations_diff
        .as_ref()
        .unwrap()
        .modified[&HttpMethod::Get]
        .responses_diff
        .as_ref()
        .unwrap()
        .modified["200"]
        .content_diff
        .as_ref()
        .unwrap()
        .modified["application/json"]
        .schema_diff
        .as_ref()
        .unwrap();
    assert!(schema.schema_deleted);

    // additionalProperties going from `true` to a schema adds that schema
    // without changing whether extra properties are allowed.
    let open = with_schema(
        "open.json",
        json!({ "type": "object", "additionalProperties": true }),
    );
    let typed_values = with_schema(
        "typed_values.json",
        json!({
            "type": "object",
            "additionalProperties": { "type": "string" }
        }),
    );
    let diff = engine.diff(&open, &typed_values).unwrap();
    let additional =
        thing_diff(&diff).additional_properties_diff.as_ref().unwrap();
    assert!(additional.allowed_diff.is_none());
    assert!(additional.schema_diff.as_ref().unwrap().schema_added);

    logctx.cleanup_successful();
}

#[test]
fn test_items_compared_only_when_present() {
    let logctx = create_log_context("test_items_compared_only_when_present");
    let engine = engine(&logctx, DiffConfig::default());

    let strings = with_schema(
        "strings.json",
        json!({ "type": "array", "items": { "type": "string" } }),
    );
    let integers = with_schema(
        "integers.json",
        json!({ "type": "array", "items": { "type": "integer" } }),
    );
    let anything = with_schema("anything.json", json!({ "type": "array" }));

    let diff = engine.diff(&strings, &integers).unwrap();
    let items = thing_diff(&diff).items_diff.as_ref().unwrap();
    assert!(items.type_diff.is_some());

    assert!(engine.diff(&strings, &anything).is_none());
    assert!(engine.diff(&anything, &integers).is_none());

    logctx.cleanup_successful();
}

// Copyright 2025 Oxide Computer Company

//! Comparing APIs described by several documents

use crate::common::api;
use crate::common::create_log_context;
use crate::common::engine;
use openapi_diff::ComposeError;
use openapi_diff::DiffConfig;
use openapi_diff::Endpoint;
use openapi_diff::HttpMethod;
use openapi_diff::SpecDocument;
use serde_json::json;

fn users(source: &str, description: &str) -> SpecDocument {
    api(
        source,
        json!({
            "/users": {
                "get": { "description": description, "responses": {} }
            }
        }),
        json!({ "schemas": { "Id": { "type": "string" } } }),
    )
}

fn groups(source: &str) -> SpecDocument {
    api(
        source,
        json!({
            "/groups": { "get": { "responses": {} } },
            "/users": { "delete": { "responses": {} } }
        }),
        json!({ "schemas": { "Id": { "type": "string" } } }),
    )
}

#[test]
fn test_compose_and_compare() {
    let logctx = create_log_context("test_compose_and_compare");
    let engine = engine(&logctx, DiffConfig::default());

    let base = engine
        .compose(&[users("v1/users.json", "list"), groups("v1/groups.json")])
        .unwrap();
    let revision = engine
        .compose(&[
            users("v2/users.json", "list users"),
            groups("v2/groups.json"),
        ])
        .unwrap();

    let delete_users = Endpoint::new(HttpMethod::Delete, "/users");
    assert_eq!(
        base.source_of(&delete_users).map(|p| p.as_str()),
        Some("v1/groups.json")
    );
    assert_eq!(base.sources().len(), 3);

    let diff = engine.diff_composed(&base, &revision).unwrap();
    let endpoints = diff.endpoints_diff.as_ref().unwrap();
    assert_eq!(
        endpoints.modified,
        vec![Endpoint::new(HttpMethod::Get, "/users")]
    );
    assert!(endpoints.added.is_empty());
    assert!(endpoints.deleted.is_empty());
    assert!(diff.components_diff.is_none());

    // Composing the same documents twice produces equal documents.
    let again = engine
        .compose(&[users("v1/users.json", "list"), groups("v1/groups.json")])
        .unwrap();
    assert!(engine.diff_composed(&base, &again).is_none());

    logctx.cleanup_successful();
}

#[test]
fn test_compose_duplicate_endpoint() {
    let logctx = create_log_context("test_compose_duplicate_endpoint");
    let engine = engine(&logctx, DiffConfig::default());

    let foo = |source: &str| {
        api(
            source,
            json!({ "/foo": { "get": { "responses": {} } } }),
            json!({}),
        )
    };
    let error = engine.compose(&[foo("a.json"), foo("b.json")]).unwrap_err();
    match error {
        ComposeError::DuplicateEndpoint { method, path, first, second } => {
            assert_eq!(method, HttpMethod::Get);
            assert_eq!(path, "/foo");
            assert_eq!(first.as_str(), "a.json");
            assert_eq!(second.as_str(), "b.json");
        }
        other => panic!("unexpected error: {}", other),
    }

    logctx.cleanup_successful();
}

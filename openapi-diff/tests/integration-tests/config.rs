// Copyright 2025 Oxide Computer Company

//! Configuration that changes what a comparison reports

use crate::common::api;
use crate::common::create_log_context;
use crate::common::engine;
use crate::common::petstore;
use openapi_diff::test_util::read_config;
use openapi_diff::DiffConfig;
use openapi_diff::ExcludeElement;
use openapi_diff::SpecDocument;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct CheckerConfig {
    diff: DiffConfig,
}

#[test]
fn test_config_from_toml() {
    let config: CheckerConfig = read_config(
        "test_config_from_toml",
        r##"
            [diff]
            exclude = [ "description", "extensions" ]
            path-strip-prefix-base = "/api"
        "##,
    )
    .unwrap();
    assert!(config.diff.is_excluded(ExcludeElement::Description));
    assert!(config.diff.is_excluded(ExcludeElement::Extensions));
    assert!(!config.diff.is_excluded(ExcludeElement::Examples));
    assert_eq!(config.diff.path_strip_prefix_base.as_deref(), Some("/api"));

    let error = read_config::<CheckerConfig>(
        "test_config_from_toml_bad",
        r##"
            [diff]
            exclude = [ "everything" ]
        "##,
    )
    .unwrap_err();
    assert!(error.to_string().contains("unknown variant"));
}

#[test]
fn test_exclude_descriptions() {
    let logctx = create_log_context("test_exclude_descriptions");

    let base = petstore("base.json");
    let mut openapi = base.openapi().clone();
    openapi.info.description = Some("pets, and more".to_string());
    openapi.extensions.insert("x-owner".to_string(), json!("pet team"));
    let revision = SpecDocument::new("revision.json", openapi).unwrap();

    let everything = engine(&logctx, DiffConfig::default());
    let diff = everything.diff(&base, &revision).unwrap();
    assert!(diff.info_diff.is_some());
    assert!(diff.extensions_diff.is_some());

    let config = DiffConfig::default()
        .with_exclude(ExcludeElement::Description)
        .with_exclude(ExcludeElement::Extensions);
    let quiet = engine(&logctx, config);
    assert!(quiet.diff(&base, &revision).is_none());

    logctx.cleanup_successful();
}

#[test]
fn test_exclude_endpoints() {
    let logctx = create_log_context("test_exclude_endpoints");
    let config = DiffConfig::default().with_exclude(ExcludeElement::Endpoints);
    let engine = engine(&logctx, config);

    let base = petstore("base.json");
    let revision = api("revision.json", json!({}), json!({}));
    let diff = engine.diff(&base, &revision).unwrap();
    assert!(diff.paths_diff.is_none());
    assert!(diff.endpoints_diff.is_none());
    // The schema that is no longer defined is still reported.
    assert!(diff.components_diff.is_some());

    logctx.cleanup_successful();
}

#[test]
fn test_path_prefixes() {
    let logctx = create_log_context("test_path_prefixes");

    let versioned = api(
        "versioned.json",
        json!({ "/api/v1/pets": { "get": { "responses": {} } } }),
        json!({}),
    );
    let plain = api(
        "plain.json",
        json!({ "/pets": { "get": { "responses": {} } } }),
        json!({}),
    );

    let unconfigured = engine(&logctx, DiffConfig::default());
    let diff = unconfigured.diff(&versioned, &plain).unwrap();
    let paths = diff.paths_diff.as_ref().unwrap();
    assert_eq!(paths.added, vec!["/pets".to_string()]);
    assert_eq!(paths.deleted, vec!["/api/v1/pets".to_string()]);

    let strip = DiffConfig {
        path_strip_prefix_base: Some("/api/v1".to_string()),
        ..Default::default()
    };
    assert!(engine(&logctx, strip).diff(&versioned, &plain).is_none());

    let prefix = DiffConfig {
        path_prefix_revision: Some("/api/v1".to_string()),
        ..Default::default()
    };
    assert!(engine(&logctx, prefix).diff(&versioned, &plain).is_none());

    logctx.cleanup_successful();
}

/// Stripping `/api` maps both `/api/pets` and `/pets` to `/pets`.
#[test]
fn test_colliding_path_keys() {
    let logctx = create_log_context("test_colliding_path_keys");

    let base = api(
        "base.json",
        json!({
            "/api/pets": { "get": { "responses": {} } },
            "/pets": {
                "get": { "responses": {} },
                "delete": { "responses": {} }
            }
        }),
        json!({}),
    );
    let revision = api(
        "revision.json",
        json!({ "/pets": { "get": { "responses": {} } } }),
        json!({}),
    );

    let strip = DiffConfig {
        path_strip_prefix_base: Some("/api".to_string()),
        ..Default::default()
    };
    let diff = engine(&logctx, strip).diff(&base, &revision).unwrap();
    // "/api/pets" is compared with the revision's "/pets", and the base's
    // own "/pets" is reported rather than silently dropped.
    assert!(diff.paths_diff.is_none());
    assert!(diff.endpoints_diff.is_none());
    let shadowed = diff.shadowed_paths.as_ref().unwrap();
    assert_eq!(shadowed.base, vec!["/pets".to_string()]);
    assert!(shadowed.revision.is_empty());
    assert!(diff.summary().diff);

    let json: serde_json::Value =
        serde_json::from_str(&diff.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["shadowedPaths"]["base"], json!(["/pets"]));

    logctx.cleanup_successful();
}

// Copyright 2025 Oxide Computer Company

//! The flat list of changed endpoints and the per-section summary

use crate::common::api;
use crate::common::create_log_context;
use crate::common::engine;
use crate::common::petstore;
use openapi_diff::DiffConfig;
use openapi_diff::Endpoint;
use openapi_diff::HttpMethod;
use openapi_diff::ParamLocation;
use openapi_diff::SpecDocument;
use openapi_diff::SummaryCounts;
use openapi_diff::SummarySection;
use serde_json::json;
use serde_json::Value;

#[test]
fn test_path_parameter_change_modifies_every_operation() {
    let logctx = create_log_context(
        "test_path_parameter_change_modifies_every_operation",
    );
    let engine = engine(&logctx, DiffConfig::default());

    let base = petstore("base.json");
    let mut openapi = base.openapi().clone();
    let mut item = serde_json::to_value(&openapi.paths.paths["/pets/{id}"])
        .unwrap();
    item["parameters"][0]["schema"] = json!({ "type": "integer" });
    let item = serde_json::from_value(item).unwrap();
    openapi.paths.paths.insert("/pets/{id}".to_string(), item);
    let revision = SpecDocument::new("revision.json", openapi).unwrap();

    let diff = engine.diff(&base, &revision).unwrap();
    let path = &diff.paths_diff.as_ref().unwrap().modified["/pets/{id}"];
    assert!(path.operations_diff.is_none());
    let parameters = path.parameters_diff.as_ref().unwrap();
    assert!(parameters.modified[&ParamLocation::Path].contains_key("id"));

    let endpoints = diff.endpoints_diff.as_ref().unwrap();
    assert_eq!(
        endpoints.modified,
        vec![
            Endpoint::new(HttpMethod::Get, "/pets/{id}"),
            Endpoint::new(HttpMethod::Delete, "/pets/{id}"),
        ]
    );

    logctx.cleanup_successful();
}

#[test]
fn test_summary_counts() {
    let logctx = create_log_context("test_summary_counts");
    let engine = engine(&logctx, DiffConfig::default());

    let get = |description: &str| -> Value {
        json!({ "get": { "description": description, "responses": {} } })
    };
    let base = api(
        "base.json",
        json!({ "/a": get("a"), "/b": get("b"), "/c": get("c") }),
        json!({
            "schemas": {
                "Kept": { "type": "string" },
                "Dropped": { "type": "string" }
            }
        }),
    );
    let revision = api(
        "revision.json",
        json!({ "/a": get("a"), "/b": get("changed"), "/d": get("d") }),
        json!({
            "schemas": {
                "Kept": { "type": "string" },
                "New": { "type": "integer" },
                "Newer": { "type": "integer" }
            }
        }),
    );

    let summary = engine.diff(&base, &revision).unwrap().summary();
    assert!(summary.diff);
    let counts = |added, deleted, modified| SummaryCounts {
        added,
        deleted,
        modified,
    };
    assert_eq!(summary.counts(SummarySection::Paths), counts(1, 1, 1));
    assert_eq!(summary.counts(SummarySection::Endpoints), counts(1, 1, 1));
    assert_eq!(summary.counts(SummarySection::Schemas), counts(2, 1, 0));
    assert_eq!(summary.counts(SummarySection::Responses), counts(0, 0, 0));
    assert_eq!(summary.details.len(), 3);

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(
        value["details"]["schemas"],
        json!({ "added": 2, "deleted": 1, "modified": 0 })
    );

    logctx.cleanup_successful();
}

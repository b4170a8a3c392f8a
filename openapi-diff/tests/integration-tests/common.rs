// Copyright 2025 Oxide Computer Company

//! Common facilities for automated testing.

use openapi_diff::test_util::document;
use openapi_diff::test_util::LogContext;
use openapi_diff::ConfigLogging;
use openapi_diff::ConfigLoggingIfExists;
use openapi_diff::ConfigLoggingLevel;
use openapi_diff::DiffConfig;
use openapi_diff::DiffEngine;
use openapi_diff::SpecDocument;
use serde_json::json;
use serde_json::Value;

pub fn create_log_context(test_name: &'static str) -> LogContext {
    let log_config = ConfigLogging::File {
        level: ConfigLoggingLevel::Debug,
        path: "UNUSED".into(),
        if_exists: ConfigLoggingIfExists::Fail,
    };
    LogContext::new(test_name, &log_config)
}

pub fn engine(logctx: &LogContext, config: DiffConfig) -> DiffEngine {
    DiffEngine::new(config, &logctx.log.new(o!()))
}

/// Builds a document with the given `paths` and `components`
pub fn api(source: &str, paths: Value, components: Value) -> SpecDocument {
    document(
        source,
        json!({
            "openapi": "3.0.3",
            "info": { "title": "test api", "version": "1.0.0" },
            "paths": paths,
            "components": components,
        }),
    )
}

/// An operation whose only response returns `schema` as JSON
pub fn returning(schema: Value) -> Value {
    json!({
        "responses": {
            "200": {
                "description": "ok",
                "content": { "application/json": { "schema": schema } }
            }
        }
    })
}

/// A small pet store, used where the content hardly matters
pub fn petstore(source: &str) -> SpecDocument {
    api(
        source,
        json!({
            "/pets": {
                "get": {
                    "operationId": "list_pets",
                    "tags": ["pets"],
                    "parameters": [{
                        "in": "query",
                        "name": "limit",
                        "schema": { "type": "integer", "format": "int32" }
                    }],
                    "responses": {
                        "200": {
                            "description": "all the pets",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": {
                                            "$ref": "#/components/schemas/Pet"
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "operationId": "create_pet",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "$ref": "#/components/schemas/Pet"
                                }
                            }
                        }
                    },
                    "responses": { "201": { "description": "created" } }
                }
            },
            "/pets/{id}": {
                "parameters": [{
                    "in": "path",
                    "name": "id",
                    "required": true,
                    "schema": { "type": "string" }
                }],
                "get": returning(json!({ "$ref": "#/components/schemas/Pet" })),
                "delete": { "responses": { "204": { "description": "gone" } } }
            }
        }),
        json!({
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "tag": { "type": "string" }
                    }
                }
            }
        }),
    )
}

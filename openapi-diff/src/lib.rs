// Copyright 2025 Oxide Computer Company

//! openapi-diff computes the structural differences between two versions of
//! an OpenAPI 3.0 document.
//!
//! The result is a tree that mirrors the documents: paths, operations,
//! parameters, request bodies, responses, and the schemas they use are each
//! correlated by a natural key and reported as added, deleted, or modified.
//! A node exists in the tree only if something below it changed, so an
//! unchanged document compares to `None` and a changed one to a tree that
//! contains nothing but the changes.  Checkers for backwards compatibility
//! and changelog generators can then walk that tree.
//!
//! Some properties worth knowing about:
//!
//! * Schemas are compared structurally, following `$ref`s.  Recursive
//!   schemas (a tree node whose children are tree nodes, or two schemas that
//!   refer to each other) are handled: comparing them always terminates, and
//!   a change to a recursive schema is reported once, where it happens.
//!
//! * An API may be described by several documents.  These can be composed
//!   into one before comparison (see [`compose()`]); the composed result
//!   remembers which document each operation came from.
//!
//! * Comparing two documents cannot fail.  Anything that could prevent a
//!   meaningful comparison (a document that does not parse, a `$ref` that
//!   does not resolve, two documents claiming the same endpoint) is reported
//!   by [`SpecDocument::new`] or [`compose()`] before any comparison starts.
//!
//! ## Usage
//!
//! ```
//! use openapi_diff::DiffConfig;
//! use openapi_diff::DiffEngine;
//! use openapi_diff::HttpMethod;
//! use openapi_diff::SpecDocument;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let load = |source: &str, description: &str| {
//!     let openapi = serde_json::from_value(json!({
//!         "openapi": "3.0.3",
//!         "info": { "title": "pets", "version": "1.0.0" },
//!         "paths": {
//!             "/pets": {
//!                 "get": {
//!                     "description": description,
//!                     "responses": {}
//!                 }
//!             }
//!         }
//!     }))?;
//!     Ok::<_, Box<dyn std::error::Error>>(SpecDocument::new(source, openapi)?)
//! };
//! let base = load("v1.json", "list pets")?;
//! let revision = load("v2.json", "list all pets")?;
//!
//! let log = slog::Logger::root(slog::Discard, slog::o!());
//! let engine = DiffEngine::new(DiffConfig::default(), &log);
//! let diff = engine.diff(&base, &revision).expect("documents differ");
//!
//! let paths = diff.paths_diff.as_ref().unwrap();
//! let methods = paths.modified["/pets"].operations_diff.as_ref().unwrap();
//! let get = &methods.modified[&HttpMethod::Get];
//! assert_eq!(
//!     get.description_diff.as_ref().unwrap().to.as_deref(),
//!     Some("list all pets")
//! );
//! # Ok(())
//! # }
//! ```

mod compose;
mod config;
mod diff;
mod document;
mod endpoint;
mod engine;
mod error;
mod logging;
mod refs;
mod schema;

pub mod test_util;

#[macro_use]
extern crate slog;

pub use compose::compose;
pub use compose::ComposedSpec;
pub use compose::OperationsSourcesMap;
pub use config::DiffConfig;
pub use config::ExcludeElement;
pub use diff::common::ExtensionsDiff;
pub use diff::common::MapDiff;
pub use diff::common::StringsDiff;
pub use diff::common::ValueDiff;
pub use diff::common::ValuesDiff;
pub use diff::components::ComponentsDiff;
pub use diff::content::ContentDiff;
pub use diff::content::EncodingDiff;
pub use diff::content::MediaTypeDiff;
pub use diff::content::RequestBodyDiff;
pub use diff::endpoints::EndpointsDiff;
pub use diff::info::ContactDiff;
pub use diff::info::ExternalDocsDiff;
pub use diff::info::InfoDiff;
pub use diff::info::LicenseDiff;
pub use diff::info::TagDiff;
pub use diff::info::TagsDiff;
pub use diff::operations::MethodDiff;
pub use diff::operations::OperationsDiff;
pub use diff::parameters::ParamLocation;
pub use diff::parameters::ParameterDiff;
pub use diff::parameters::ParametersDiff;
pub use diff::paths::PathDiff;
pub use diff::paths::PathsDiff;
pub use diff::paths::ShadowedPaths;
pub use diff::responses::status_key;
pub use diff::responses::HeaderDiff;
pub use diff::responses::HeadersDiff;
pub use diff::responses::ResponseDiff;
pub use diff::responses::ResponsesDiff;
pub use diff::security::SecurityRequirementsDiff;
pub use diff::security::SecuritySchemeDiff;
pub use diff::security::SecurityScopesDiff;
pub use diff::servers::ServerDiff;
pub use diff::servers::ServersDiff;
pub use diff::servers::VariableDiff;
pub use diff::summary::Summary;
pub use diff::summary::SummaryCounts;
pub use diff::summary::SummarySection;
pub use diff::Diff;
pub use document::SpecDocument;
pub use endpoint::operations;
pub use endpoint::Endpoint;
pub use endpoint::HttpMethod;
pub use engine::DiffEngine;
pub use error::ComposeError;
pub use error::LoadError;
pub use logging::ConfigLogging;
pub use logging::ConfigLoggingIfExists;
pub use logging::ConfigLoggingLevel;
pub use refs::Component;
pub use refs::Resolver;
pub use schema::AdditionalPropertiesDiff;
pub use schema::DiscriminatorDiff;
pub use schema::EnumDiff;
pub use schema::SchemaDiff;
pub use schema::SchemaListDiff;
pub use schema::SchemaRefs;
pub use schema::SchemasDiff;
pub use schema::Subschema;

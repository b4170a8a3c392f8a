// Copyright 2025 Oxide Computer Company

//! Errors produced while loading and composing OpenAPI documents
//!
//! Comparing two documents never fails.  Everything that can go wrong is
//! caught before the comparison starts: either while a document is loaded
//! (malformed input, dangling references) or while several documents are
//! composed into one (ambiguous ownership of an endpoint or component).

use crate::endpoint::HttpMethod;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Error returned when a document cannot be accepted for comparison
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path:?}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("parsing {path:?} as an OpenAPI JSON document")]
    Json {
        path: Utf8PathBuf,
        #[source]
        error: serde_json::Error,
    },

    #[error("parsing {path:?} as an OpenAPI YAML document")]
    Yaml {
        path: Utf8PathBuf,
        #[source]
        error: serde_yaml::Error,
    },

    #[error(
        "{path:?}: reference {reference:?} does not name a component \
         defined in this document"
    )]
    UnresolvedReference { path: Utf8PathBuf, reference: String },

    #[error(
        "{path:?}: unsupported reference {reference:?} (only references of \
         the form \"#/components/<section>/<name>\" are supported)"
    )]
    UnsupportedReference { path: Utf8PathBuf, reference: String },

    #[error(
        "{path:?}: reference {reference:?} is part of a chain of references \
         that never reaches a definition"
    )]
    ReferenceCycle { path: Utf8PathBuf, reference: String },
}

/// Error returned when several documents cannot be composed into one
///
/// Composition is all-or-nothing: when any of these is returned, no merged
/// document exists and no comparison takes place.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(
        "duplicate endpoint ({method} {path}) found in {first:?} and \
         {second:?}"
    )]
    DuplicateEndpoint {
        method: HttpMethod,
        path: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error(
        "component \"#/components/{section}/{name}\" is defined differently \
         in {first:?} and {second:?}"
    )]
    ConflictingComponent {
        section: &'static str,
        name: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error(
        "path {path:?} has conflicting path-level fields in {first:?} and \
         {second:?}"
    )]
    ConflictingPathItem {
        path: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },
}

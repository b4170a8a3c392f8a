// Copyright 2025 Oxide Computer Company

//! One side of a comparison: a parsed OpenAPI document and where it came from

use crate::error::LoadError;
use crate::refs::validate_references;
use crate::refs::Resolver;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use openapiv3::OpenAPI;

/// A parsed OpenAPI document whose references are known to resolve
///
/// Constructing a `SpecDocument` checks that every `$ref` in the document
/// is a local reference to a component that exists (following aliases),
/// which is the precondition for comparing documents without failure.
#[derive(Clone, Debug, PartialEq)]
pub struct SpecDocument {
    source: Utf8PathBuf,
    openapi: OpenAPI,
}

impl SpecDocument {
    /// Accepts an already-parsed document that was read from `source`
    pub fn new(
        source: impl Into<Utf8PathBuf>,
        openapi: OpenAPI,
    ) -> Result<SpecDocument, LoadError> {
        let source = source.into();
        let value = serde_json::to_value(&openapi).map_err(|error| {
            LoadError::Json { path: source.clone(), error }
        })?;
        validate_references(&source, &value)?;
        Ok(SpecDocument { source, openapi })
    }

    /// Parses `contents` as JSON, or as YAML if `source` has a `.yaml` or
    /// `.yml` extension
    pub fn from_slice(
        source: impl Into<Utf8PathBuf>,
        contents: &[u8],
    ) -> Result<SpecDocument, LoadError> {
        let source = source.into();
        let openapi = if is_yaml(&source) {
            serde_yaml::from_slice(contents).map_err(|error| {
                LoadError::Yaml { path: source.clone(), error }
            })?
        } else {
            serde_json::from_slice(contents).map_err(|error| {
                LoadError::Json { path: source.clone(), error }
            })?
        };
        SpecDocument::new(source, openapi)
    }

    /// Reads and parses the document at `path`
    pub fn from_path(
        path: impl AsRef<Utf8Path>,
    ) -> Result<SpecDocument, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|error| LoadError::Io {
            path: path.to_owned(),
            error,
        })?;
        SpecDocument::from_slice(path, &contents)
    }

    /// Wraps a document assembled from other, already-validated documents
    pub(crate) fn from_validated_parts(
        source: Utf8PathBuf,
        openapi: OpenAPI,
    ) -> SpecDocument {
        SpecDocument { source, openapi }
    }

    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    pub fn openapi(&self) -> &OpenAPI {
        &self.openapi
    }

    pub fn into_openapi(self) -> OpenAPI {
        self.openapi
    }

    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.openapi)
    }
}

fn is_yaml(source: &Utf8Path) -> bool {
    matches!(source.extension(), Some("yaml") | Some("yml"))
}

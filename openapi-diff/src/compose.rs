// Copyright 2025 Oxide Computer Company

//! Assembling one API surface from several documents
//!
//! An API may be described by several independently written documents, each
//! covering some of its endpoints.  Composition merges them into a single
//! document for comparison.  Every endpoint must come from exactly one
//! document, so it is always possible to say which document an operation in
//! the merged result was taken from.

use crate::document::SpecDocument;
use crate::endpoint::operations;
use crate::endpoint::Endpoint;
use crate::endpoint::HttpMethod;
use crate::error::ComposeError;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use openapiv3::Components;
use openapiv3::OpenAPI;
use openapiv3::PathItem;
use openapiv3::ReferenceOr;
use slog::Logger;
use std::collections::BTreeMap;

/// Maps each operation of a composed document to the document it came from
pub type OperationsSourcesMap = BTreeMap<Endpoint, Utf8PathBuf>;

/// A document assembled from one or more source documents, along with the
/// source of each of its operations
#[derive(Clone, Debug)]
pub struct ComposedSpec {
    document: SpecDocument,
    sources: OperationsSourcesMap,
}

impl ComposedSpec {
    pub fn document(&self) -> &SpecDocument {
        &self.document
    }

    pub fn sources(&self) -> &OperationsSourcesMap {
        &self.sources
    }

    /// Returns the source document of the operation for `endpoint`
    pub fn source_of(&self, endpoint: &Endpoint) -> Option<&Utf8Path> {
        self.sources.get(endpoint).map(Utf8PathBuf::as_path)
    }

    pub fn into_parts(self) -> (SpecDocument, OperationsSourcesMap) {
        (self.document, self.sources)
    }
}

impl From<SpecDocument> for ComposedSpec {
    fn from(document: SpecDocument) -> ComposedSpec {
        let mut sources = OperationsSourcesMap::new();
        for (path, item) in &document.openapi().paths.paths {
            if let ReferenceOr::Item(item) = item {
                for (method, _) in operations(item) {
                    sources.insert(
                        Endpoint::new(method, path.clone()),
                        document.source().to_owned(),
                    );
                }
            }
        }
        ComposedSpec { document, sources }
    }
}

/// Merges `documents` into one
///
/// Document-level metadata (`openapi`, `info`, `servers`, `security`,
/// `externalDocs`, and extensions) is taken from the first document.  Paths
/// and components are unioned; tags are unioned by name.  It is an error for
/// two documents to define the same endpoint, to define a component of the
/// same name differently, or to disagree about the path-level fields of a
/// path they share.  An empty list of documents produces an empty document.
pub fn compose(
    log: &Logger,
    documents: &[SpecDocument],
) -> Result<ComposedSpec, ComposeError> {
    let result = compose_documents(log, documents);
    match &result {
        Ok(composed) => info!(log, "composed documents";
            "documents" => documents.len(),
            "paths" => composed.document.openapi().paths.paths.len(),
            "operations" => composed.sources.len(),
        ),
        Err(error) => warn!(log, "failed to compose documents";
            "error" => %error,
        ),
    }
    result
}

fn compose_documents(
    log: &Logger,
    documents: &[SpecDocument],
) -> Result<ComposedSpec, ComposeError> {
    let Some(first) = documents.first() else {
        return Ok(ComposedSpec {
            document: SpecDocument::from_validated_parts(
                Utf8PathBuf::from("<empty>"),
                OpenAPI::default(),
            ),
            sources: OperationsSourcesMap::new(),
        });
    };

    let mut composer = Composer::new(first.openapi());
    for document in documents {
        debug!(log, "composing document";
            "source" => %document.source(),
            "paths" => document.openapi().paths.paths.len(),
        );
        composer.add(document)?;
    }

    let source = documents
        .iter()
        .map(|document| document.source().as_str())
        .collect::<Vec<_>>()
        .join("+");
    Ok(ComposedSpec {
        document: SpecDocument::from_validated_parts(
            Utf8PathBuf::from(source),
            composer.merged,
        ),
        sources: composer.operation_sources,
    })
}

struct Composer {
    merged: OpenAPI,
    path_sources: BTreeMap<String, Utf8PathBuf>,
    operation_sources: OperationsSourcesMap,
    component_sources: BTreeMap<(&'static str, String), Utf8PathBuf>,
}

impl Composer {
    fn new(first: &OpenAPI) -> Composer {
        let mut merged = first.clone();
        merged.paths.paths.clear();
        merged.components = None;
        merged.tags.clear();
        Composer {
            merged,
            path_sources: BTreeMap::new(),
            operation_sources: BTreeMap::new(),
            component_sources: BTreeMap::new(),
        }
    }

    fn add(&mut self, document: &SpecDocument) -> Result<(), ComposeError> {
        let source = document.source();
        let openapi = document.openapi();

        for (path, item) in &openapi.paths.paths {
            // Documents cannot contain references to path items.
            let ReferenceOr::Item(item) = item else {
                continue;
            };
            self.add_path(source, path, item)?;
        }

        if let Some(components) = &openapi.components {
            self.add_components(source, components)?;
        }

        for tag in &openapi.tags {
            if !self.merged.tags.iter().any(|t| t.name == tag.name) {
                self.merged.tags.push(tag.clone());
            }
        }
        Ok(())
    }

    fn add_path(
        &mut self,
        source: &Utf8Path,
        path: &str,
        item: &PathItem,
    ) -> Result<(), ComposeError> {
        if !self.merged.paths.paths.contains_key(path) {
            self.merged
                .paths
                .paths
                .insert(path.to_owned(), ReferenceOr::Item(item.clone()));
            self.path_sources.insert(path.to_owned(), source.to_owned());
            for (method, _) in operations(item) {
                self.operation_sources
                    .insert(Endpoint::new(method, path), source.to_owned());
            }
            return Ok(());
        }
        let Some(ReferenceOr::Item(existing)) =
            self.merged.paths.paths.get_mut(path)
        else {
            return Ok(());
        };

        let merged = merge_field(
            &mut existing.summary,
            &item.summary,
            Option::is_none,
        ) && merge_field(
            &mut existing.description,
            &item.description,
            Option::is_none,
        ) && merge_field(&mut existing.servers, &item.servers, Vec::is_empty)
            && merge_field(
                &mut existing.parameters,
                &item.parameters,
                Vec::is_empty,
            )
            && merge_field(
                &mut existing.extensions,
                &item.extensions,
                IndexMap::is_empty,
            );
        if !merged {
            return Err(ComposeError::ConflictingPathItem {
                path: path.to_owned(),
                first: self.path_sources.get(path).cloned().unwrap_or_default(),
                second: source.to_owned(),
            });
        }

        for (method, operation) in operations(item) {
            let endpoint = Endpoint::new(method, path);
            let slot = method.operation_slot(existing);
            if slot.is_some() {
                return Err(duplicate(
                    method,
                    path,
                    self.operation_sources.get(&endpoint),
                    source,
                ));
            }
            *slot = Some(operation.clone());
            self.operation_sources.insert(endpoint, source.to_owned());
        }
        Ok(())
    }

    fn add_components(
        &mut self,
        source: &Utf8Path,
        components: &Components,
    ) -> Result<(), ComposeError> {
        let merged =
            self.merged.components.get_or_insert_with(Default::default);
        let mut section =
            Section { owners: &mut self.component_sources, source };
        section.merge("schemas", &mut merged.schemas, &components.schemas)?;
        section.merge(
            "parameters",
            &mut merged.parameters,
            &components.parameters,
        )?;
        section.merge("headers", &mut merged.headers, &components.headers)?;
        section.merge(
            "requestBodies",
            &mut merged.request_bodies,
            &components.request_bodies,
        )?;
        section.merge(
            "responses",
            &mut merged.responses,
            &components.responses,
        )?;
        section.merge(
            "securitySchemes",
            &mut merged.security_schemes,
            &components.security_schemes,
        )?;
        section.merge("examples", &mut merged.examples, &components.examples)?;
        section.merge("links", &mut merged.links, &components.links)?;
        section.merge(
            "callbacks",
            &mut merged.callbacks,
            &components.callbacks,
        )?;
        for (key, value) in &components.extensions {
            merged
                .extensions
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(())
    }
}

/// Merges components of one section from one source document
struct Section<'s> {
    owners: &'s mut BTreeMap<(&'static str, String), Utf8PathBuf>,
    source: &'s Utf8Path,
}

impl Section<'_> {
    fn merge<T: Clone + PartialEq>(
        &mut self,
        section: &'static str,
        merged: &mut IndexMap<String, T>,
        incoming: &IndexMap<String, T>,
    ) -> Result<(), ComposeError> {
        for (name, definition) in incoming {
            match merged.get(name) {
                None => {
                    merged.insert(name.clone(), definition.clone());
                    self.owners.insert(
                        (section, name.clone()),
                        self.source.to_owned(),
                    );
                }
                Some(existing) if existing == definition => (),
                Some(_) => {
                    let first = self
                        .owners
                        .get(&(section, name.clone()))
                        .cloned()
                        .unwrap_or_default();
                    return Err(ComposeError::ConflictingComponent {
                        section,
                        name: name.clone(),
                        first,
                        second: self.source.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Takes `incoming` if `existing` is unset; returns false if both are set
/// and differ
fn merge_field<T: Clone + PartialEq>(
    existing: &mut T,
    incoming: &T,
    is_unset: impl Fn(&T) -> bool,
) -> bool {
    if is_unset(incoming) || existing == incoming {
        true
    } else if is_unset(existing) {
        *existing = incoming.clone();
        true
    } else {
        false
    }
}

fn duplicate(
    method: HttpMethod,
    path: &str,
    first: Option<&Utf8PathBuf>,
    second: &Utf8Path,
) -> ComposeError {
    ComposeError::DuplicateEndpoint {
        method,
        path: path.to_owned(),
        first: first.cloned().unwrap_or_default(),
        second: second.to_owned(),
    }
}

// Copyright 2025 Oxide Computer Company

//! Structural comparison of two OpenAPI documents
//!
//! The result is a tree mirroring the shape of the documents.  At every level
//! items are correlated by a key (path, method, parameter location and name,
//! status code, media type, property name, ...), and each collection reports
//! which keys were added, which were deleted, and which were modified.  A
//! node with no differences is never built: every `Option` in the tree is
//! `None` exactly when nothing below it changed, all the way up to the root.

use crate::config::DiffConfig;
use crate::config::ExcludeElement;
use crate::document::SpecDocument;
use crate::refs::Resolver;
use crate::schema::state::SchemaState;
use common::diff_serialized;
use common::diff_values;
use common::ExtensionsDiff;
use common::Fields;
use common::ValueDiff;
use common::ValuesDiff;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use slog::Logger;

pub mod common;
pub(crate) mod components;
pub(crate) mod content;
pub(crate) mod endpoints;
pub(crate) mod info;
pub(crate) mod operations;
pub(crate) mod parameters;
pub(crate) mod paths;
pub(crate) mod responses;
pub(crate) mod security;
pub(crate) mod servers;
pub(crate) mod summary;

use components::ComponentsDiff;
use endpoints::EndpointsDiff;
use info::ExternalDocsDiff;
use info::InfoDiff;
use info::TagsDiff;
use paths::PathsDiff;
use paths::ShadowedPaths;
use security::SecurityRequirementsDiff;
use servers::ServersDiff;
use summary::Summary;

/// Differences between a base document and its revision
///
/// `base` and `revision` borrow the documents that were compared; they are
/// not part of the serialized form.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff<'a> {
    #[serde(skip)]
    pub base: &'a SpecDocument,
    #[serde(skip)]
    pub revision: &'a SpecDocument,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_api_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_diff: Option<InfoDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths_diff: Option<PathsDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints_diff: Option<EndpointsDiff>,
    /// paths left out because another path has the same key; see
    /// [`ShadowedPaths`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadowed_paths: Option<ShadowedPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_diff: Option<ComponentsDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_diff: Option<SecurityRequirementsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_diff: Option<ServersDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_diff: Option<TagsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs_diff: Option<ExternalDocsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl Diff<'_> {
    fn is_empty(&self) -> bool {
        self.open_api_diff.is_none()
            && self.info_diff.is_none()
            && self.paths_diff.is_none()
            && self.endpoints_diff.is_none()
            && self.shadowed_paths.is_none()
            && self.components_diff.is_none()
            && self.security_diff.is_none()
            && self.servers_diff.is_none()
            && self.tags_diff.is_none()
            && self.external_docs_diff.is_none()
            && self.extensions_diff.is_none()
    }

    /// Counts of what changed in each section of the documents
    pub fn summary(&self) -> Summary {
        Summary::of(Some(self))
    }

    /// Renders the diff as JSON
    ///
    /// Map keys and key lists are sorted, so comparing the same documents
    /// always produces the same text.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Walks two documents, producing their differences
///
/// One `Differ` is created per comparison and owns everything the
/// comparison needs to remember, so separate comparisons share nothing.
pub(crate) struct Differ<'c, 'a> {
    config: &'c DiffConfig,
    pub(crate) base: Resolver<'a>,
    pub(crate) revision: Resolver<'a>,
    pub(crate) schemas: SchemaState<'a>,
    pub(crate) max_schema_depth: usize,
}

/// Compares `base` with `revision`, returning `None` if there is no
/// observable difference
pub(crate) fn diff_documents<'a>(
    config: &DiffConfig,
    log: &Logger,
    base: &'a SpecDocument,
    revision: &'a SpecDocument,
) -> Option<Diff<'a>> {
    let same_paths = config.path_prefix_base == config.path_prefix_revision
        && config.path_strip_prefix_base == config.path_strip_prefix_revision;
    if same_paths && base.openapi() == revision.openapi() {
        debug!(log, "identical documents";
            "base" => %base.source(),
            "revision" => %revision.source(),
        );
        return None;
    }

    let mut differ = Differ {
        config,
        base: base.resolver(),
        revision: revision.resolver(),
        schemas: SchemaState::default(),
        max_schema_depth: 0,
    };
    let diff = differ.diff_root(base, revision);
    trace!(log, "schema comparison finished";
        "max_depth" => differ.max_schema_depth,
    );
    diff
}

impl<'a> Differ<'_, 'a> {
    fn diff_root(
        &mut self,
        base: &'a SpecDocument,
        revision: &'a SpecDocument,
    ) -> Option<Diff<'a>> {
        let b = base.openapi();
        let r = revision.openapi();

        let (paths_diff, endpoints_diff, shadowed_paths) =
            if self.excluded(ExcludeElement::Endpoints) {
                (None, None, None)
            } else {
                let paths_diff = self.diff_paths(&b.paths, &r.paths);
                let endpoints_diff = self.diff_endpoints(
                    &b.paths,
                    &r.paths,
                    paths_diff.as_ref(),
                );
                let shadowed = self.shadowed_paths(&b.paths, &r.paths);
                (paths_diff, endpoints_diff, shadowed)
            };

        let diff = Diff {
            base,
            revision,
            open_api_diff: ValueDiff::of(b.openapi.clone(), r.openapi.clone()),
            info_diff: self.diff_info(&b.info, &r.info),
            paths_diff,
            endpoints_diff,
            shadowed_paths,
            components_diff: self
                .diff_components(b.components.as_ref(), r.components.as_ref()),
            security_diff: self.diff_security_requirements(
                b.security.as_deref(),
                r.security.as_deref(),
            ),
            servers_diff: self.diff_servers(&b.servers, &r.servers),
            tags_diff: self.diff_tags(&b.tags, &r.tags),
            external_docs_diff: self.diff_external_docs(
                b.external_docs.as_ref(),
                r.external_docs.as_ref(),
            ),
            extensions_diff: self.diff_extensions(&b.extensions, &r.extensions),
        };
        (!diff.is_empty()).then_some(diff)
    }

    pub(crate) fn excluded(&self, element: ExcludeElement) -> bool {
        self.config.is_excluded(element)
    }

    fn diff_text(
        &self,
        element: ExcludeElement,
        base: Option<&String>,
        revision: Option<&String>,
    ) -> Option<ValueDiff<String>> {
        if self.excluded(element) {
            None
        } else {
            ValueDiff::compare(base, revision)
        }
    }

    pub(crate) fn diff_description(
        &self,
        base: Option<&String>,
        revision: Option<&String>,
    ) -> Option<ValueDiff<String>> {
        self.diff_text(ExcludeElement::Description, base, revision)
    }

    pub(crate) fn diff_title(
        &self,
        base: Option<&String>,
        revision: Option<&String>,
    ) -> Option<ValueDiff<String>> {
        self.diff_text(ExcludeElement::Title, base, revision)
    }

    pub(crate) fn diff_summary(
        &self,
        base: Option<&String>,
        revision: Option<&String>,
    ) -> Option<ValueDiff<String>> {
        self.diff_text(ExcludeElement::Summary, base, revision)
    }

    pub(crate) fn diff_example(
        &self,
        base: Option<&Value>,
        revision: Option<&Value>,
    ) -> Option<ValueDiff<Value>> {
        if self.excluded(ExcludeElement::Examples) {
            None
        } else {
            ValueDiff::compare(base, revision)
        }
    }

    /// Compares two `examples` maps, each example as a whole
    pub(crate) fn diff_examples<T: Serialize>(
        &self,
        base: &T,
        revision: &T,
    ) -> Option<ValuesDiff> {
        if self.excluded(ExcludeElement::Examples) {
            None
        } else {
            diff_serialized(base, revision)
        }
    }

    pub(crate) fn diff_extensions(
        &self,
        base: &IndexMap<String, Value>,
        revision: &IndexMap<String, Value>,
    ) -> Option<ExtensionsDiff> {
        if self.excluded(ExcludeElement::Extensions) {
            None
        } else {
            diff_values(base, revision)
        }
    }

    /// Compares the `x-*` fields of two objects of any type
    pub(crate) fn diff_object_extensions<T: Serialize>(
        &self,
        base: &T,
        revision: &T,
    ) -> Option<ExtensionsDiff> {
        self.diff_field_extensions(&Fields::of(base), &Fields::of(revision))
    }

    pub(crate) fn diff_field_extensions(
        &self,
        base: &Fields,
        revision: &Fields,
    ) -> Option<ExtensionsDiff> {
        if self.excluded(ExcludeElement::Extensions) {
            None
        } else {
            diff_values(base.extensions(), revision.extensions())
        }
    }
}

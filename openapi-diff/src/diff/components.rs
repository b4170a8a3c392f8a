// Copyright 2025 Oxide Computer Company

//! Reusable definitions under `components`, correlated by name
//!
//! Definitions are compared whether or not anything refers to them.
//! Examples, links, and callbacks are only compared as plain values.

use super::common::diff_serialized;
use super::common::ExtensionsDiff;
use super::common::MapDiff;
use super::common::ValuesDiff;
use super::content::RequestBodyDiff;
use super::parameters::ParameterDiff;
use super::responses::HeadersDiff;
use super::responses::ResponseDiff;
use super::security::SecuritySchemeDiff;
use super::Differ;
use crate::config::ExcludeElement;
use crate::refs::Component;
use crate::schema::SchemasDiff;
use indexmap::IndexMap;
use openapiv3::Components;
use openapiv3::ReferenceOr;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas_diff: Option<SchemasDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_diff: Option<MapDiff<String, ParameterDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers_diff: Option<HeadersDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_bodies_diff: Option<MapDiff<String, RequestBodyDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_diff: Option<MapDiff<String, ResponseDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes_diff: Option<MapDiff<String, SecuritySchemeDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl ComponentsDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.schemas_diff.is_none()
            && self.parameters_diff.is_none()
            && self.headers_diff.is_none()
            && self.request_bodies_diff.is_none()
            && self.responses_diff.is_none()
            && self.security_schemes_diff.is_none()
            && self.examples_diff.is_none()
            && self.links_diff.is_none()
            && self.callbacks_diff.is_none()
            && self.extensions_diff.is_none()
    }
}

type Table<T> = IndexMap<String, ReferenceOr<T>>;

fn entries<'t, T>(
    table: Option<&'t Table<T>>,
) -> impl Iterator<Item = (String, &'t ReferenceOr<T>)> + 't {
    table.into_iter().flatten().map(|(name, item)| (name.clone(), item))
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_components(
        &mut self,
        base: Option<&'a Components>,
        revision: Option<&'a Components>,
    ) -> Option<ComponentsDiff<'a>> {
        let examples_diff = if self.excluded(ExcludeElement::Examples) {
            None
        } else {
            diff_serialized(
                &base.map(|c| &c.examples),
                &revision.map(|c| &c.examples),
            )
        };
        let diff = ComponentsDiff {
            schemas_diff: self.diff_section(
                base.map(|c| &c.schemas),
                revision.map(|c| &c.schemas),
                |d, b, r| d.diff_schema(Some(b), Some(r)),
            ),
            parameters_diff: self.diff_section(
                base.map(|c| &c.parameters),
                revision.map(|c| &c.parameters),
                |d, b, r| d.diff_parameter(b, r),
            ),
            headers_diff: self.diff_section(
                base.map(|c| &c.headers),
                revision.map(|c| &c.headers),
                |d, b, r| d.diff_header(b, r),
            ),
            request_bodies_diff: self.diff_section(
                base.map(|c| &c.request_bodies),
                revision.map(|c| &c.request_bodies),
                |d, b, r| d.diff_request_body(b, r),
            ),
            responses_diff: self.diff_section(
                base.map(|c| &c.responses),
                revision.map(|c| &c.responses),
                |d, b, r| d.diff_response(b, r),
            ),
            security_schemes_diff: self.diff_section(
                base.map(|c| &c.security_schemes),
                revision.map(|c| &c.security_schemes),
                |d, b, r| d.diff_security_scheme(b, r),
            ),
            examples_diff,
            links_diff: diff_serialized(
                &base.map(|c| &c.links),
                &revision.map(|c| &c.links),
            ),
            callbacks_diff: diff_serialized(
                &base.map(|c| &c.callbacks),
                &revision.map(|c| &c.callbacks),
            ),
            extensions_diff: self.diff_object_extensions(
                &base.map(|c| &c.extensions),
                &revision.map(|c| &c.extensions),
            ),
        };
        (!diff.is_empty()).then_some(diff)
    }

    /// Compares one section of `components`, resolving each definition
    /// before calling `diff` on it
    fn diff_section<T: Component, D>(
        &mut self,
        base: Option<&'a Table<T>>,
        revision: Option<&'a Table<T>>,
        mut diff: impl FnMut(&mut Self, &'a T, &'a T) -> Option<D>,
    ) -> Option<MapDiff<String, D>> {
        MapDiff::compare(entries(base), entries(revision), |b, r| {
            let b = self.base.resolve(b)?;
            let r = self.revision.resolve(r)?;
            diff(&mut *self, b, r)
        })
    }
}

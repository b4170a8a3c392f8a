// Copyright 2025 Oxide Computer Company

//! Parameters, correlated by location and name
//!
//! Parameters are never correlated by position.  Two parameters are the same
//! parameter if they share both their location (`in`) and their name, so
//! the diff is a two-level map: location, then name.

use super::common::ExtensionsDiff;
use super::common::Fields;
use super::common::MapDiff;
use super::common::ValueDiff;
use super::common::ValuesDiff;
use super::content::field_diff;
use super::content::ContentDiff;
use super::Differ;
use crate::schema::SchemaDiff;
use openapiv3::Content;
use openapiv3::Parameter;
use openapiv3::ParameterData;
use openapiv3::ParameterSchemaOrContent;
use openapiv3::ReferenceOr;
use openapiv3::Schema;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a parameter is carried in a request
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Cookie,
    Header,
    Path,
    Query,
}

impl ParamLocation {
    pub fn of(parameter: &Parameter) -> ParamLocation {
        match parameter {
            Parameter::Cookie { .. } => ParamLocation::Cookie,
            Parameter::Header { .. } => ParamLocation::Header,
            Parameter::Path { .. } => ParamLocation::Path,
            Parameter::Query { .. } => ParamLocation::Query,
        }
    }
}

fn parameter_data(parameter: &Parameter) -> &ParameterData {
    match parameter {
        Parameter::Cookie { parameter_data, .. }
        | Parameter::Header { parameter_data, .. }
        | Parameter::Path { parameter_data, .. }
        | Parameter::Query { parameter_data, .. } => parameter_data,
    }
}

/// Changes to a list of parameters
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ParametersDiff<'a> {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub added: BTreeMap<ParamLocation, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub deleted: BTreeMap<ParamLocation, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified:
        BTreeMap<ParamLocation, BTreeMap<String, ParameterDiff<'a>>>,
}

impl ParametersDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }

    /// Number of (location, name) keys in each of added, deleted, and
    /// modified
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.added.values().map(Vec::len).sum(),
            self.deleted.values().map(Vec::len).sum(),
            self.modified.values().map(BTreeMap::len).sum(),
        )
    }
}

/// Differences between two parameters with the same location and name
///
/// The serialization attributes that OpenAPI defaults differently per
/// location (`style`, `explode`, `allowReserved`, `allowEmptyValue`) are
/// compared as written in the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_empty_value_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<SchemaDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl ParameterDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.description_diff.is_none()
            && self.style_diff.is_none()
            && self.explode_diff.is_none()
            && self.allow_empty_value_diff.is_none()
            && self.allow_reserved_diff.is_none()
            && self.deprecated_diff.is_none()
            && self.required_diff.is_none()
            && self.example_diff.is_none()
            && self.examples_diff.is_none()
            && self.schema_diff.is_none()
            && self.content_diff.is_none()
            && self.extensions_diff.is_none()
    }
}

type ParamKey = (ParamLocation, String);

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_parameters(
        &mut self,
        base: &'a [ReferenceOr<Parameter>],
        revision: &'a [ReferenceOr<Parameter>],
    ) -> Option<ParametersDiff<'a>> {
        let base = keyed(self.base.resolve_all(base));
        let revision = keyed(self.revision.resolve_all(revision));
        let keys = MapDiff::compare(base, revision, |b, r| {
            self.diff_parameter(b, r)
        })?;

        let mut diff = ParametersDiff::default();
        for (location, name) in keys.added {
            diff.added.entry(location).or_default().push(name);
        }
        for (location, name) in keys.deleted {
            diff.deleted.entry(location).or_default().push(name);
        }
        for ((location, name), d) in keys.modified {
            diff.modified.entry(location).or_default().insert(name, d);
        }
        Some(diff)
    }

    pub(crate) fn diff_parameter(
        &mut self,
        base: &'a Parameter,
        revision: &'a Parameter,
    ) -> Option<ParameterDiff<'a>> {
        let bd = parameter_data(base);
        let rd = parameter_data(revision);
        let b = Fields::of(base);
        let r = Fields::of(revision);

        let mut diff = ParameterDiff {
            description_diff: self.diff_description(
                bd.description.as_ref(),
                rd.description.as_ref(),
            ),
            style_diff: field_diff(&b, &r, "style"),
            explode_diff: field_diff(&b, &r, "explode"),
            allow_empty_value_diff: field_diff(&b, &r, "allowEmptyValue"),
            allow_reserved_diff: field_diff(&b, &r, "allowReserved"),
            deprecated_diff: ValueDiff::compare(
                bd.deprecated.as_ref(),
                rd.deprecated.as_ref(),
            ),
            required_diff: ValueDiff::of(bd.required, rd.required),
            example_diff: self
                .diff_example(bd.example.as_ref(), rd.example.as_ref()),
            examples_diff: self.diff_examples(&bd.examples, &rd.examples),
            extensions_diff: self
                .diff_extensions(&bd.extensions, &rd.extensions),
            ..Default::default()
        };
        (diff.schema_diff, diff.content_diff) =
            self.diff_schema_or_content(&bd.format, &rd.format);
        (!diff.is_empty()).then_some(diff)
    }

    /// Compares the `schema` or `content` of two parameters or headers
    ///
    /// When one side uses `schema` and the other `content`, the schema is
    /// reported as deleted or added and the content map as changed.
    pub(crate) fn diff_schema_or_content(
        &mut self,
        base: &'a ParameterSchemaOrContent,
        revision: &'a ParameterSchemaOrContent,
    ) -> (Option<SchemaDiff<'a>>, Option<ContentDiff<'a>>) {
        let (base_schema, base_content) = split_format(base);
        let (revision_schema, revision_content) = split_format(revision);
        let schema_diff = self.diff_schema_refs(base_schema, revision_schema);
        let content_diff = match (base_content, revision_content) {
            (None, None) => None,
            (Some(b), Some(r)) => self.diff_content(b, r),
            (b, r) => {
                let diff = ContentDiff {
                    added: media_types(r),
                    deleted: media_types(b),
                    modified: BTreeMap::new(),
                };
                (!diff.is_empty()).then_some(diff)
            }
        };
        (schema_diff, content_diff)
    }
}

fn split_format(
    format: &ParameterSchemaOrContent,
) -> (Option<&ReferenceOr<Schema>>, Option<&Content>) {
    match format {
        ParameterSchemaOrContent::Schema(schema) => (Some(schema), None),
        ParameterSchemaOrContent::Content(content) => (None, Some(content)),
    }
}

fn media_types(content: Option<&Content>) -> Vec<String> {
    let mut keys: Vec<String> =
        content.into_iter().flat_map(|c| c.keys().cloned()).collect();
    keys.sort();
    keys
}

fn keyed<'a>(
    parameters: impl Iterator<Item = &'a Parameter>,
) -> impl Iterator<Item = (ParamKey, &'a Parameter)> {
    parameters.map(|parameter| {
        let name = parameter_data(parameter).name.clone();
        ((ParamLocation::of(parameter), name), parameter)
    })
}

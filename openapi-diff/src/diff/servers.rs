// Copyright 2025 Oxide Computer Company

//! `servers` lists, at document, path and operation level

use super::common::ExtensionsDiff;
use super::common::Fields;
use super::common::MapDiff;
use super::common::StringsDiff;
use super::common::ValueDiff;
use super::info::string_diff;
use super::Differ;
use crate::config::ExcludeElement;
use openapiv3::Server;
use serde::Serialize;

/// Changes to a `servers` list, correlated by URL
pub type ServersDiff = MapDiff<String, ServerDiff>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables_diff: Option<MapDiff<String, VariableDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to one server variable
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_diff: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl Differ<'_, '_> {
    pub(crate) fn diff_servers(
        &self,
        base: &[Server],
        revision: &[Server],
    ) -> Option<ServersDiff> {
        let base: Vec<Fields> = base.iter().map(Fields::of).collect();
        let revision: Vec<Fields> = revision.iter().map(Fields::of).collect();
        let url = |f: &Fields| f.string("url").unwrap_or_default();
        MapDiff::compare(
            base.iter().map(|f| (url(f), f)),
            revision.iter().map(|f| (url(f), f)),
            |b, r| self.diff_server(b, r),
        )
    }

    fn diff_server(&self, b: &Fields, r: &Fields) -> Option<ServerDiff> {
        let b_vars = named_objects(&b.object("variables"));
        let r_vars = named_objects(&r.object("variables"));
        let diff = ServerDiff {
            description_diff: self.diff_field_description(b, r),
            variables_diff: MapDiff::compare(
                b_vars.iter().map(|(k, v)| (k.clone(), v)),
                r_vars.iter().map(|(k, v)| (k.clone(), v)),
                |bv, rv| self.diff_variable(bv, rv),
            ),
            extensions_diff: self.diff_field_extensions(b, r),
        };
        let empty = diff.description_diff.is_none()
            && diff.variables_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    fn diff_variable(&self, b: &Fields, r: &Fields) -> Option<VariableDiff> {
        let diff = VariableDiff {
            enum_diff: StringsDiff::compare(
                &b.strings("enum"),
                &r.strings("enum"),
            ),
            default_diff: string_diff(b, r, "default"),
            description_diff: self.diff_field_description(b, r),
            extensions_diff: self.diff_field_extensions(b, r),
        };
        let empty = diff.enum_diff.is_none()
            && diff.default_diff.is_none()
            && diff.description_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    /// Compares the `description` fields of two objects read as [`Fields`]
    pub(crate) fn diff_field_description(
        &self,
        b: &Fields,
        r: &Fields,
    ) -> Option<ValueDiff<String>> {
        if self.excluded(ExcludeElement::Description) {
            None
        } else {
            string_diff(b, r, "description")
        }
    }
}

/// Splits a map of named objects into its entries
pub(crate) fn named_objects(map: &Fields) -> Vec<(String, Fields)> {
    map.iter().map(|(name, _)| (name.clone(), map.object(name))).collect()
}

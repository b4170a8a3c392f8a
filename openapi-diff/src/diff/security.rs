// Copyright 2025 Oxide Computer Company

//! Security requirements and security scheme definitions

use super::common::diff_values;
use super::common::ExtensionsDiff;
use super::common::Fields;
use super::common::MapDiff;
use super::common::StringsDiff;
use super::common::ValueDiff;
use super::common::ValuesDiff;
use super::info::string_diff;
use super::Differ;
use openapiv3::SecurityRequirement;
use openapiv3::SecurityScheme;
use serde::Serialize;
use std::collections::BTreeMap;

/// Changes to a list of alternative security requirements
///
/// A requirement is identified by the names of the schemes it combines,
/// sorted and joined with `" AND "` (the empty requirement, which allows
/// anonymous access, has the empty key).  A modified requirement lists the
/// scope changes of each scheme whose scopes changed.
pub type SecurityRequirementsDiff = MapDiff<String, SecurityScopesDiff>;

/// Scope changes, by scheme name
pub type SecurityScopesDiff = BTreeMap<String, StringsDiff>;

/// Changes to one `securitySchemes` definition
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySchemeDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url_diff: Option<ValueDiff<String>>,
    /// OAuth2 flows, each flow compared as a whole
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

fn requirement_key(requirement: &SecurityRequirement) -> String {
    let mut names: Vec<&str> =
        requirement.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(" AND ")
}

impl Differ<'_, '_> {
    /// Compares two `security` lists; a missing list is the same as an
    /// empty one
    pub(crate) fn diff_security_requirements(
        &self,
        base: Option<&[SecurityRequirement]>,
        revision: Option<&[SecurityRequirement]>,
    ) -> Option<SecurityRequirementsDiff> {
        let base = base.unwrap_or_default();
        let revision = revision.unwrap_or_default();
        MapDiff::compare(
            base.iter().map(|req| (requirement_key(req), req)),
            revision.iter().map(|req| (requirement_key(req), req)),
            |b, r| {
                // Both requirements name the same schemes.
                let scopes: SecurityScopesDiff = b
                    .iter()
                    .filter_map(|(name, base_scopes)| {
                        let revision_scopes = r.get(name)?;
                        let diff =
                            StringsDiff::compare(base_scopes, revision_scopes)?;
                        Some((name.clone(), diff))
                    })
                    .collect();
                (!scopes.is_empty()).then_some(scopes)
            },
        )
    }

    pub(crate) fn diff_security_scheme(
        &self,
        base: &SecurityScheme,
        revision: &SecurityScheme,
    ) -> Option<SecuritySchemeDiff> {
        let b = Fields::of(base);
        let r = Fields::of(revision);
        let diff = SecuritySchemeDiff {
            type_diff: string_diff(&b, &r, "type"),
            description_diff: self.diff_field_description(&b, &r),
            name_diff: string_diff(&b, &r, "name"),
            in_diff: string_diff(&b, &r, "in"),
            scheme_diff: string_diff(&b, &r, "scheme"),
            bearer_format_diff: string_diff(&b, &r, "bearerFormat"),
            open_id_connect_url_diff: string_diff(&b, &r, "openIdConnectUrl"),
            flows_diff: {
                let b_flows = b.object("flows");
                let r_flows = r.object("flows");
                diff_values(b_flows.iter(), r_flows.iter())
            },
            extensions_diff: self.diff_field_extensions(&b, &r),
        };
        let SecuritySchemeDiff {
            type_diff,
            description_diff,
            name_diff,
            in_diff,
            scheme_diff,
            bearer_format_diff,
            open_id_connect_url_diff,
            flows_diff,
            extensions_diff,
        } = &diff;
        let empty = type_diff.is_none()
            && description_diff.is_none()
            && name_diff.is_none()
            && in_diff.is_none()
            && scheme_diff.is_none()
            && bearer_format_diff.is_none()
            && open_id_connect_url_diff.is_none()
            && flows_diff.is_none()
            && extensions_diff.is_none();
        (!empty).then_some(diff)
    }
}

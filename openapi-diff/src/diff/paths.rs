// Copyright 2025 Oxide Computer Company

//! Path items, correlated by path

use super::common::ExtensionsDiff;
use super::common::MapDiff;
use super::common::ValueDiff;
use super::operations::OperationsDiff;
use super::parameters::ParametersDiff;
use super::servers::ServersDiff;
use super::Differ;
use crate::config::DiffConfig;
use crate::config::Side;
use openapiv3::PathItem;
use openapiv3::Paths;
use openapiv3::ReferenceOr;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Changes to the `paths` object
///
/// Paths are correlated by their string after the configured prefixes have
/// been applied, and reported under that string.
pub type PathsDiff<'a> = MapDiff<String, PathDiff<'a>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_diff: Option<ServersDiff>,
    /// parameters shared by every operation of the path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_diff: Option<ParametersDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_diff: Option<OperationsDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Paths of a document that were left out of the comparison
///
/// Stripping a prefix can map two paths of one document to the same key
/// (`/api/pets` and `/pets` when stripping `/api`).  The path that had the
/// prefix stripped is compared under that key; the other one is listed here.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ShadowedPaths {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub base: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub revision: Vec<String>,
}

/// The path items of one document, keyed as configured for its side
pub(crate) struct KeyedPaths<'p> {
    pub(crate) items: Vec<(String, &'p PathItem)>,
    /// original text of the paths that lost their key to another path
    pub(crate) shadowed: Vec<String>,
}

/// Keys the path items of `paths` as configured for `side`
///
/// References to path items are not supported and never reach this point.
pub(crate) fn path_items<'p>(
    config: &DiffConfig,
    side: Side,
    paths: &'p Paths,
) -> KeyedPaths<'p> {
    struct Keyed<'p> {
        path: &'p str,
        stripped: bool,
        item: &'p PathItem,
    }

    let mut keyed: BTreeMap<String, Keyed<'p>> = BTreeMap::new();
    let mut shadowed = Vec::new();
    for (path, item) in &paths.paths {
        let ReferenceOr::Item(item) = item else {
            continue;
        };
        let stripped = config.strip_prefix(side, path).is_some();
        let entry = Keyed { path, stripped, item };
        match keyed.entry(config.path_key(side, path)) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            // Only one of two colliding paths can have had the prefix
            // stripped.
            Entry::Occupied(mut slot) => {
                let loser = if entry.stripped && !slot.get().stripped {
                    slot.insert(entry)
                } else {
                    entry
                };
                shadowed.push(loser.path.to_owned());
            }
        }
    }
    shadowed.sort();

    KeyedPaths {
        items: keyed
            .into_iter()
            .map(|(key, Keyed { item, .. })| (key, item))
            .collect(),
        shadowed,
    }
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_paths(
        &mut self,
        base: &'a Paths,
        revision: &'a Paths,
    ) -> Option<PathsDiff<'a>> {
        let base = path_items(self.config, Side::Base, base);
        let revision = path_items(self.config, Side::Revision, revision);
        MapDiff::compare(base.items, revision.items, |b, r| {
            self.diff_path(b, r)
        })
    }

    pub(crate) fn shadowed_paths(
        &self,
        base: &Paths,
        revision: &Paths,
    ) -> Option<ShadowedPaths> {
        let shadowed = ShadowedPaths {
            base: path_items(self.config, Side::Base, base).shadowed,
            revision: path_items(self.config, Side::Revision, revision)
                .shadowed,
        };
        (!shadowed.base.is_empty() || !shadowed.revision.is_empty())
            .then_some(shadowed)
    }

    fn diff_path(
        &mut self,
        base: &'a PathItem,
        revision: &'a PathItem,
    ) -> Option<PathDiff<'a>> {
        let diff = PathDiff {
            summary_diff: self
                .diff_summary(base.summary.as_ref(), revision.summary.as_ref()),
            description_diff: self.diff_description(
                base.description.as_ref(),
                revision.description.as_ref(),
            ),
            servers_diff: self.diff_servers(&base.servers, &revision.servers),
            parameters_diff: self
                .diff_parameters(&base.parameters, &revision.parameters),
            operations_diff: self.diff_operations(base, revision),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
        };
        let empty = diff.summary_diff.is_none()
            && diff.description_diff.is_none()
            && diff.servers_diff.is_none()
            && diff.parameters_diff.is_none()
            && diff.operations_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }
}

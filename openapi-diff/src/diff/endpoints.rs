// Copyright 2025 Oxide Computer Company

//! A flat view of changed endpoints

use super::paths::path_items;
use super::paths::PathsDiff;
use super::Differ;
use crate::config::Side;
use crate::endpoint::operations;
use crate::endpoint::Endpoint;
use openapiv3::Paths;
use serde::Serialize;
use std::collections::BTreeSet;

/// Endpoints added, deleted, and modified, each list sorted by path and then
/// method
///
/// An endpoint counts as modified when its operation changed, or when the
/// parameters shared by all operations of its path changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EndpointsDiff {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub modified: Vec<Endpoint>,
}

impl EndpointsDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }
}

impl Differ<'_, '_> {
    pub(crate) fn diff_endpoints(
        &self,
        base: &Paths,
        revision: &Paths,
        paths_diff: Option<&PathsDiff>,
    ) -> Option<EndpointsDiff> {
        let base = self.endpoints(Side::Base, base);
        let revision = self.endpoints(Side::Revision, revision);

        let mut modified = BTreeSet::new();
        let modified_paths = paths_diff.into_iter().flat_map(|d| &d.modified);
        for (path, path_diff) in modified_paths {
            if let Some(operations_diff) = &path_diff.operations_diff {
                modified.extend(
                    operations_diff
                        .modified
                        .keys()
                        .map(|method| Endpoint::new(*method, path.clone())),
                );
            }
            if path_diff.parameters_diff.is_some() {
                modified.extend(
                    base.iter()
                        .filter(|e| &e.path == path && revision.contains(e))
                        .cloned(),
                );
            }
        }

        let diff = EndpointsDiff {
            added: revision.difference(&base).cloned().collect(),
            deleted: base.difference(&revision).cloned().collect(),
            modified: modified.into_iter().collect(),
        };
        (!diff.is_empty()).then_some(diff)
    }

    fn endpoints(&self, side: Side, paths: &Paths) -> BTreeSet<Endpoint> {
        path_items(self.config, side, paths)
            .items
            .into_iter()
            .flat_map(|(path, item)| {
                operations(item)
                    .map(move |(method, _)| Endpoint::new(method, path.clone()))
            })
            .collect()
    }
}

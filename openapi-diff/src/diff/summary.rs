// Copyright 2025 Oxide Computer Company

//! Per-section counts of what changed

use super::common::MapDiff;
use super::Diff;
use serde::Serialize;
use std::collections::BTreeMap;

/// A section of a document for which changes are counted
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummarySection {
    Paths,
    Endpoints,
    Schemas,
    Parameters,
    Headers,
    RequestBodies,
    Responses,
    SecuritySchemes,
    Security,
    Servers,
    Tags,
    Examples,
    Links,
    Callbacks,
    Extensions,
}

/// Number of keys added, deleted, and modified in one section
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SummaryCounts {
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
}

impl SummaryCounts {
    fn of<K, D>(diff: Option<&MapDiff<K, D>>) -> SummaryCounts {
        diff.map_or_else(SummaryCounts::default, |diff| SummaryCounts {
            added: diff.added.len(),
            deleted: diff.deleted.len(),
            modified: diff.modified.len(),
        })
    }

    fn is_zero(&self) -> bool {
        self.added == 0 && self.deleted == 0 && self.modified == 0
    }
}

/// Counts of changes per section
///
/// `diff` is false exactly when the documents had no observable difference,
/// in which case `details` is empty.  Sections without changes are left out
/// of `details`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub diff: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<SummarySection, SummaryCounts>,
}

impl Summary {
    pub fn of(diff: Option<&Diff<'_>>) -> Summary {
        let Some(diff) = diff else {
            return Summary::default();
        };

        let components = diff.components_diff.as_ref();
        macro_rules! component {
            ($field:ident) => {
                SummaryCounts::of(components.and_then(|c| c.$field.as_ref()))
            };
        }
        let endpoints = diff.endpoints_diff.as_ref().map_or_else(
            SummaryCounts::default,
            |e| SummaryCounts {
                added: e.added.len(),
                deleted: e.deleted.len(),
                modified: e.modified.len(),
            },
        );
        let sections = [
            (
                SummarySection::Paths,
                SummaryCounts::of(diff.paths_diff.as_ref()),
            ),
            (SummarySection::Endpoints, endpoints),
            (SummarySection::Schemas, component!(schemas_diff)),
            (SummarySection::Parameters, component!(parameters_diff)),
            (SummarySection::Headers, component!(headers_diff)),
            (SummarySection::RequestBodies, component!(request_bodies_diff)),
            (SummarySection::Responses, component!(responses_diff)),
            (
                SummarySection::SecuritySchemes,
                component!(security_schemes_diff),
            ),
            (
                SummarySection::Security,
                SummaryCounts::of(diff.security_diff.as_ref()),
            ),
            (
                SummarySection::Servers,
                SummaryCounts::of(diff.servers_diff.as_ref()),
            ),
            (SummarySection::Tags, SummaryCounts::of(diff.tags_diff.as_ref())),
            (SummarySection::Examples, component!(examples_diff)),
            (SummarySection::Links, component!(links_diff)),
            (SummarySection::Callbacks, component!(callbacks_diff)),
            (
                SummarySection::Extensions,
                SummaryCounts::of(diff.extensions_diff.as_ref()),
            ),
        ];

        Summary {
            diff: true,
            details: sections
                .into_iter()
                .filter(|(_, counts)| !counts.is_zero())
                .collect(),
        }
    }

    /// Counts for one section (all zero if it did not change)
    pub fn counts(&self, section: SummarySection) -> SummaryCounts {
        self.details.get(&section).copied().unwrap_or_default()
    }
}

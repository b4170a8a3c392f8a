// Copyright 2025 Oxide Computer Company

//! Entry point for comparing documents

use crate::compose::compose;
use crate::compose::ComposedSpec;
use crate::config::DiffConfig;
use crate::diff::diff_documents;
use crate::diff::summary::Summary;
use crate::diff::Diff;
use crate::document::SpecDocument;
use crate::error::ComposeError;
use slog::Logger;

/// Compares OpenAPI documents under one configuration
///
/// An engine holds no state between comparisons.  It may be shared between
/// threads and used for any number of comparisons at once; each comparison
/// keeps its own bookkeeping.
#[derive(Clone, Debug)]
pub struct DiffEngine {
    config: DiffConfig,
    log: Logger,
}

impl DiffEngine {
    pub fn new(config: DiffConfig, log: &Logger) -> DiffEngine {
        DiffEngine { config, log: log.new(o!("component" => "openapi-diff")) }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Merges several documents into one; see [`crate::compose()`]
    pub fn compose(
        &self,
        documents: &[SpecDocument],
    ) -> Result<ComposedSpec, ComposeError> {
        compose(&self.log, documents)
    }

    /// Compares `base` with `revision`
    ///
    /// Returns `None` if there is no observable difference between them.
    /// The result borrows both documents.
    pub fn diff<'a>(
        &self,
        base: &'a SpecDocument,
        revision: &'a SpecDocument,
    ) -> Option<Diff<'a>> {
        let log = self.log.new(o!(
            "base" => base.source().to_string(),
            "revision" => revision.source().to_string(),
        ));
        let diff = diff_documents(&self.config, &log, base, revision);
        if let Some(shadowed) =
            diff.as_ref().and_then(|d| d.shadowed_paths.as_ref())
        {
            warn!(log, "paths with colliding keys were not compared";
                "base_paths" => ?shadowed.base,
                "revision_paths" => ?shadowed.revision,
            );
        }
        let summary = Summary::of(diff.as_ref());
        for (section, counts) in &summary.details {
            debug!(log, "section changed";
                "section" => ?section,
                "added" => counts.added,
                "deleted" => counts.deleted,
                "modified" => counts.modified,
            );
        }
        debug!(log, "compared documents"; "changed" => summary.diff);
        diff
    }

    /// Compares two composed documents
    pub fn diff_composed<'a>(
        &self,
        base: &'a ComposedSpec,
        revision: &'a ComposedSpec,
    ) -> Option<Diff<'a>> {
        self.diff(base.document(), revision.document())
    }
}

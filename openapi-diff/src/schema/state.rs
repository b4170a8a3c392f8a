// Copyright 2025 Oxide Computer Company

//! Per-comparison bookkeeping that makes schema comparison terminate
//!
//! Schemas are compared as pairs of nodes, where a node is identified by the
//! address of the resolved `Schema` it stands for.  Every pair on the current
//! recursion path is recorded along with its depth.  Meeting a pair that is
//! already on the path means the comparison has gone around a cycle, and the
//! pair is assumed equal at that point.  Since there are finitely many pairs,
//! no path can grow without bound.
//!
//! The result for a pair is remembered for the rest of the comparison, but
//! only if no cycle assumption made below it refers to a pair that was still
//! unfinished (above it on the path) when the result was produced.
//! Otherwise the result may depend on an assumption that later turns out to
//! be false.  Remembering results of both kinds means each pair is compared
//! at most once outside of cycles.

use super::SchemaDiff;
use openapiv3::Schema;
use std::collections::HashMap;
use std::collections::HashSet;

type NodePair = (*const Schema, *const Schema);

#[derive(Debug, Default)]
pub(crate) struct SchemaState<'a> {
    /// pairs on the current recursion path, with their depth
    on_path: HashMap<NodePair, usize>,
    /// pairs known to be equal regardless of any open assumption
    equal: HashSet<NodePair>,
    /// pairs known to differ, with what was found the first time
    unequal: HashMap<NodePair, SchemaDiff<'a>>,
    /// shallowest depth referred to by a cycle cut since the innermost open
    /// pair was entered
    lowest_cut: Option<usize>,
}

/// What to do with a pair of schemas about to be compared
pub(crate) enum Visit {
    /// compare it, then report back with [`SchemaState::leave`]
    Enter(Frame),
    /// the pair is already being compared further up; assume equal
    Cycle,
    /// the pair was already found equal
    KnownEqual,
    /// the pair was already found to differ; see [`SchemaState::known_diff`]
    KnownUnequal,
}

/// State saved while one pair is being compared
pub(crate) struct Frame {
    key: NodePair,
    depth: usize,
    outer_cut: Option<usize>,
}

fn key(base: &Schema, revision: &Schema) -> NodePair {
    (base as *const Schema, revision as *const Schema)
}

impl<'a> SchemaState<'a> {
    pub(crate) fn visit(&mut self, base: &Schema, revision: &Schema) -> Visit {
        let key = key(base, revision);
        if self.equal.contains(&key) {
            return Visit::KnownEqual;
        }
        if self.unequal.contains_key(&key) {
            return Visit::KnownUnequal;
        }
        if let Some(&depth) = self.on_path.get(&key) {
            self.lowest_cut =
                Some(self.lowest_cut.map_or(depth, |cut| cut.min(depth)));
            return Visit::Cycle;
        }

        let depth = self.on_path.len();
        self.on_path.insert(key, depth);
        let outer_cut = self.lowest_cut.take();
        Visit::Enter(Frame { key, depth, outer_cut })
    }

    /// Finishes the comparison of a pair; `diff` is what was found
    pub(crate) fn leave(
        &mut self,
        frame: Frame,
        diff: Option<&SchemaDiff<'a>>,
    ) {
        let Frame { key, depth, outer_cut } = frame;
        self.on_path.remove(&key);

        let inner_cut = self.lowest_cut;
        if inner_cut.map_or(true, |cut| cut >= depth) {
            match diff {
                None => {
                    self.equal.insert(key);
                }
                Some(diff) => {
                    self.unequal.insert(key, diff.clone());
                }
            }
        }
        self.lowest_cut = match (outer_cut, inner_cut) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    /// Returns the differences found when the pair was first compared
    pub(crate) fn known_diff(
        &self,
        base: &Schema,
        revision: &Schema,
    ) -> Option<&SchemaDiff<'a>> {
        self.unequal.get(&key(base, revision))
    }

    pub(crate) fn depth(&self) -> usize {
        self.on_path.len()
    }
}

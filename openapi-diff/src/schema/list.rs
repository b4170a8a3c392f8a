// Copyright 2025 Oxide Computer Company

//! Correlation of `allOf`, `anyOf` and `oneOf` members across documents
//!
//! Members that are references are matched by the name of the component they
//! refer to, wherever they sit in the list.  (If a name occurs several times,
//! the k-th occurrence on each side is matched.)
//!
//! Inline members have no name.  Each base member is first matched with an
//! unmatched revision member that is equal to it, again regardless of
//! position.  If exactly one inline member is then left over on each side,
//! the two are taken to be the same member and compared.  Otherwise the
//! leftovers are reported as deleted and added: with several inline members
//! changing at once there is no reliable way to tell which became which.

use super::SchemaDiff;
use crate::diff::Differ;
use crate::refs::ref_name;
use openapiv3::ReferenceOr;
use openapiv3::Schema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identifies one member of a composition list
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Subschema {
    /// position in its own list
    pub index: usize,
    /// name of the referenced component, for a `$ref` member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// Changes to a composition list
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchemaListDiff<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Subschema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<Subschema>,
    /// keyed by the member's index in the base list
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<usize, SchemaDiff<'a>>,
}

impl SchemaListDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }
}

/// A list split into named (`$ref`) and inline members
struct Members<'a> {
    by_name: BTreeMap<String, Vec<usize>>,
    inline: Vec<(usize, &'a ReferenceOr<Schema>)>,
}

impl<'a> Members<'a> {
    fn new(list: &'a [ReferenceOr<Schema>]) -> Members<'a> {
        let mut by_name: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut inline = Vec::new();
        for (index, member) in list.iter().enumerate() {
            match member {
                ReferenceOr::Reference { reference } => {
                    by_name.entry(ref_name(reference)).or_default().push(index)
                }
                ReferenceOr::Item(_) => inline.push((index, member)),
            }
        }
        Members { by_name, inline }
    }
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_schema_list(
        &mut self,
        base: &'a [ReferenceOr<Schema>],
        revision: &'a [ReferenceOr<Schema>],
    ) -> Option<SchemaListDiff<'a>> {
        if base.is_empty() && revision.is_empty() {
            return None;
        }

        let base_members = Members::new(base);
        let mut revision_members = Members::new(revision);
        let mut diff = SchemaListDiff::default();

        for (name, base_indexes) in base_members.by_name {
            let revision_indexes = revision_members
                .by_name
                .remove(&name)
                .unwrap_or_default();
            for (position, &bi) in base_indexes.iter().enumerate() {
                match revision_indexes.get(position) {
                    Some(&ri) => {
                        let (b, r) = (&base[bi], &revision[ri]);
                        if let Some(d) = self.diff_schema_refs(Some(b), Some(r))
                        {
                            diff.modified.insert(bi, d);
                        }
                    }
                    None => diff.deleted.push(Subschema {
                        index: bi,
                        component: Some(name.clone()),
                    }),
                }
            }
            for &ri in revision_indexes.iter().skip(base_indexes.len()) {
                diff.added.push(Subschema {
                    index: ri,
                    component: Some(name.clone()),
                });
            }
        }
        for (name, revision_indexes) in revision_members.by_name {
            diff.added.extend(revision_indexes.into_iter().map(|index| {
                Subschema { index, component: Some(name.clone()) }
            }));
        }

        let mut unmatched_base = Vec::new();
        for (bi, base_member) in base_members.inline {
            let equal =
                revision_members.inline.iter().position(|&(_, r)| {
                    self.diff_schema_refs(Some(base_member), Some(r)).is_none()
                });
            match equal {
                Some(position) => {
                    revision_members.inline.remove(position);
                }
                None => unmatched_base.push((bi, base_member)),
            }
        }
        match (unmatched_base.as_slice(), revision_members.inline.as_slice()) {
            (&[(bi, b)], &[(_, r)]) => {
                if let Some(d) = self.diff_schema_refs(Some(b), Some(r)) {
                    diff.modified.insert(bi, d);
                }
            }
            (unmatched_base, unmatched_revision) => {
                diff.deleted.extend(unmatched_base.iter().map(|(index, _)| {
                    Subschema { index: *index, component: None }
                }));
                diff.added.extend(unmatched_revision.iter().map(
                    |(index, _)| Subschema { index: *index, component: None },
                ));
            }
        }

        diff.added.sort();
        diff.deleted.sort();
        (!diff.is_empty()).then_some(diff)
    }
}

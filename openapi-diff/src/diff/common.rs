// Copyright 2025 Oxide Computer Company

//! Building blocks shared by every level of the diff tree

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A change to a single value
///
/// A value that is missing on one side is recorded as `None` on that side,
/// which distinguishes "set where there was nothing" from "changed".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueDiff<T> {
    pub from: Option<T>,
    pub to: Option<T>,
}

impl<T: Clone + PartialEq> ValueDiff<T> {
    /// Compares two possibly-missing values
    pub fn compare(from: Option<&T>, to: Option<&T>) -> Option<ValueDiff<T>> {
        if from == to {
            None
        } else {
            Some(ValueDiff { from: from.cloned(), to: to.cloned() })
        }
    }
}

impl<T: PartialEq> ValueDiff<T> {
    /// Compares two values that are always present
    pub fn of(from: T, to: T) -> Option<ValueDiff<T>> {
        if from == to {
            None
        } else {
            Some(ValueDiff { from: Some(from), to: Some(to) })
        }
    }
}

/// The difference between two sets of strings, each list sorted
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StringsDiff {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl StringsDiff {
    /// Compares two lists of strings as sets, ignoring order and repetition
    pub fn compare<'s>(
        base: impl IntoIterator<Item = &'s String>,
        revision: impl IntoIterator<Item = &'s String>,
    ) -> Option<StringsDiff> {
        let base: BTreeSet<&String> = base.into_iter().collect();
        let revision: BTreeSet<&String> = revision.into_iter().collect();
        let diff = StringsDiff {
            added: revision.difference(&base).map(|s| (*s).clone()).collect(),
            deleted: base.difference(&revision).map(|s| (*s).clone()).collect(),
        };
        (!diff.is_empty()).then_some(diff)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Changes to a collection of items correlated by key
///
/// Every key appears in at most one of `added` (present only in the
/// revision), `deleted` (present only in the base) and `modified` (present
/// in both with observable differences).  Keys that appear in none of them
/// are unchanged.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapDiff<K, D> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<K>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<K>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<K, D>,
}

impl<K, D> Default for MapDiff<K, D> {
    fn default() -> Self {
        MapDiff {
            added: Vec::new(),
            deleted: Vec::new(),
            modified: BTreeMap::new(),
        }
    }
}

impl<K: Clone + Ord, D> MapDiff<K, D> {
    /// Correlates `base` and `revision` entries by key, calling `diff` for
    /// each key present on both sides
    ///
    /// If a key occurs more than once on one side, the last occurrence wins.
    pub fn compare<'v, V: 'v>(
        base: impl IntoIterator<Item = (K, &'v V)>,
        revision: impl IntoIterator<Item = (K, &'v V)>,
        mut diff: impl FnMut(&'v V, &'v V) -> Option<D>,
    ) -> Option<MapDiff<K, D>> {
        let base: BTreeMap<K, &'v V> = base.into_iter().collect();
        let mut revision: BTreeMap<K, &'v V> = revision.into_iter().collect();

        let mut result = MapDiff::default();
        for (key, base_value) in base {
            match revision.remove(&key) {
                None => result.deleted.push(key),
                Some(revision_value) => {
                    if let Some(d) = diff(base_value, revision_value) {
                        result.modified.insert(key, d);
                    }
                }
            }
        }
        result.added.extend(revision.into_keys());
        (!result.is_empty()).then_some(result)
    }
}

impl<K, D> MapDiff<K, D> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.modified.is_empty()
    }
}

/// Changes to a map whose values are compared as plain JSON
pub type ValuesDiff = MapDiff<String, ValueDiff<Value>>;

/// Changes to vendor extensions (`x-*` fields)
pub type ExtensionsDiff = ValuesDiff;

/// Compares two collections of JSON values by key
pub(crate) fn diff_values<'v>(
    base: impl IntoIterator<Item = (&'v String, &'v Value)>,
    revision: impl IntoIterator<Item = (&'v String, &'v Value)>,
) -> Option<ValuesDiff> {
    MapDiff::compare(
        base.into_iter().map(|(k, v)| (k.clone(), v)),
        revision.into_iter().map(|(k, v)| (k.clone(), v)),
        |b, r| ValueDiff::compare(Some(b), Some(r)),
    )
}

/// Compares two objects field by field as JSON, with each top-level field
/// treated as an opaque value
///
/// This is used for sections (examples, links, callbacks) whose contents are
/// reported only as "changed" rather than explored further.
pub(crate) fn diff_serialized<T: Serialize>(
    base: &T,
    revision: &T,
) -> Option<ValuesDiff> {
    let base = Fields::of(base);
    let revision = Fields::of(revision);
    diff_values(base.iter(), revision.iter())
}

/// An OpenAPI object rendered as a JSON object, for reading fields whose
/// values are compared as plain data
pub(crate) struct Fields(Map<String, Value>);

impl Fields {
    pub(crate) fn of<T: Serialize>(value: &T) -> Fields {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Fields(map),
            _ => Fields(Map::new()),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub(crate) fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_owned)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// the `x-*` fields of the object
    pub(crate) fn extensions(
        &self,
    ) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(key, _)| key.starts_with("x-"))
    }

    /// the named field, as an object of its own
    pub(crate) fn object(&self, key: &str) -> Fields {
        match self.get(key) {
            Some(Value::Object(map)) => Fields(map.clone()),
            _ => Fields(Map::new()),
        }
    }

    /// the named field as a list of strings, skipping anything else
    pub(crate) fn strings(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

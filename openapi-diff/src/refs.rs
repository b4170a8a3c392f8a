// Copyright 2025 Oxide Computer Company

//! Resolution of local `$ref`s against a document's components
//!
//! References are never copied or expanded.  Resolving a reference yields a
//! borrow of the one definition in `components`, so every use of a shared
//! component resolves to the same address.  The schema comparator relies on
//! that address as the identity of a node.

use crate::error::LoadError;
use camino::Utf8Path;
use indexmap::IndexMap;
use openapiv3::Components;
use openapiv3::Example;
use openapiv3::Header;
use openapiv3::OpenAPI;
use openapiv3::Parameter;
use openapiv3::ReferenceOr;
use openapiv3::RequestBody;
use openapiv3::Response;
use openapiv3::Schema;
use openapiv3::SecurityScheme;
use serde_json::Value;
use std::collections::BTreeSet;

const COMPONENTS_PREFIX: &str = "#/components/";

/// A kind of object that can be defined under `components` and referenced
pub trait Component: Sized {
    /// name of the `components` section holding definitions of this kind
    const SECTION: &'static str;

    fn table(components: &Components) -> &IndexMap<String, ReferenceOr<Self>>;
}

macro_rules! impl_component {
    ($ty:ty, $section:literal, $field:ident) => {
        impl Component for $ty {
            const SECTION: &'static str = $section;

            fn table(
                components: &Components,
            ) -> &IndexMap<String, ReferenceOr<Self>> {
                &components.$field
            }
        }
    };
}

impl_component!(Schema, "schemas", schemas);
impl_component!(Parameter, "parameters", parameters);
impl_component!(RequestBody, "requestBodies", request_bodies);
impl_component!(Response, "responses", responses);
impl_component!(Header, "headers", headers);
impl_component!(Example, "examples", examples);
impl_component!(SecurityScheme, "securitySchemes", security_schemes);

/// Splits a local reference into its `components` section and the
/// (unescaped) component name
pub(crate) fn parse_local_ref(reference: &str) -> Option<(&str, String)> {
    let rest = reference.strip_prefix(COMPONENTS_PREFIX)?;
    let (section, name) = rest.split_once('/')?;
    if section.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((section, unescape_pointer_token(name)))
}

/// Returns the component name a reference points at, or the reference
/// itself if it is not a local component reference
pub(crate) fn ref_name(reference: &str) -> String {
    match parse_local_ref(reference) {
        Some((_, name)) => name,
        None => reference.to_owned(),
    }
}

// RFC 6901: "~1" must be decoded before "~0".
fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Resolves references within one document
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> Resolver<'a> {
    pub fn new(openapi: &'a OpenAPI) -> Resolver<'a> {
        Resolver { components: openapi.components.as_ref() }
    }

    /// Looks up the definition a reference names, without following it any
    /// further
    pub fn lookup<T: Component>(
        &self,
        reference: &str,
    ) -> Option<&'a ReferenceOr<T>> {
        let (section, name) = parse_local_ref(reference)?;
        if section != T::SECTION {
            return None;
        }
        T::table(self.components?).get(&name)
    }

    /// Follows `item` through any chain of references to the object it
    /// ultimately describes
    ///
    /// Returns `None` for references that do not resolve.  Documents that
    /// went through [`crate::SpecDocument::new`] have none.
    pub fn resolve<T: Component>(
        &self,
        item: &'a ReferenceOr<T>,
    ) -> Option<&'a T> {
        // An alias chain can visit each definition of this kind at most once.
        let limit = self.components.map_or(0, |c| T::table(c).len()) + 1;
        let mut current = item;
        for _ in 0..=limit {
            match current {
                ReferenceOr::Item(item) => return Some(item),
                ReferenceOr::Reference { reference } => {
                    current = self.lookup::<T>(reference)?;
                }
            }
        }
        None
    }

    /// Resolves every item of a list, skipping any that do not resolve
    pub fn resolve_all<T: Component>(
        self,
        items: &'a [ReferenceOr<T>],
    ) -> impl Iterator<Item = &'a T> {
        items.iter().filter_map(move |item| self.resolve(item))
    }

    /// Like [`Resolver::resolve`], for the boxed schemas used by object
    /// properties and array items
    pub fn resolve_boxed(
        &self,
        item: &'a ReferenceOr<Box<Schema>>,
    ) -> Option<&'a Schema> {
        match item {
            ReferenceOr::Item(schema) => Some(schema.as_ref()),
            ReferenceOr::Reference { reference } => {
                self.resolve(self.lookup::<Schema>(reference)?)
            }
        }
    }
}

/// Keys whose object values are maps from user-chosen names to definitions.
/// Below these, every key is a name and must be walked.
const NAMED_MAPS: &[&str] = &[
    "callbacks",
    "content",
    "encoding",
    "examples",
    "headers",
    "links",
    "parameters",
    "paths",
    "properties",
    "requestBodies",
    "responses",
    "schemas",
    "securitySchemes",
    "variables",
];

/// Keys whose values are free-form data rather than OpenAPI structure
const OPAQUE_KEYS: &[&str] = &["default", "enum", "example", "value"];

/// Checks that every `$ref` in `document` is local and resolves to a
/// definition (possibly through other references)
pub(crate) fn validate_references(
    path: &Utf8Path,
    document: &Value,
) -> Result<(), LoadError> {
    let mut references = BTreeSet::new();
    collect_references(document, None, &mut references);
    for reference in &references {
        validate_one(path, document, reference)?;
    }
    Ok(())
}

fn collect_references<'v>(
    value: &'v Value,
    parent_key: Option<&str>,
    references: &mut BTreeSet<&'v str>,
) {
    match value {
        Value::Object(map) => {
            let keys_are_names =
                parent_key.is_some_and(|key| NAMED_MAPS.contains(&key));
            for (key, child) in map {
                if key == "$ref" {
                    if let Value::String(reference) = child {
                        references.insert(reference.as_str());
                    }
                    continue;
                }
                if !keys_are_names
                    && (key.starts_with("x-")
                        || OPAQUE_KEYS.contains(&key.as_str()))
                {
                    continue;
                }
                collect_references(child, Some(key.as_str()), references);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, None, references);
            }
        }
        _ => (),
    }
}

fn validate_one(
    path: &Utf8Path,
    document: &Value,
    reference: &str,
) -> Result<(), LoadError> {
    let mut seen = BTreeSet::new();
    let mut current = reference.to_owned();
    loop {
        let Some((section, name)) = parse_local_ref(&current) else {
            return Err(LoadError::UnsupportedReference {
                path: path.to_owned(),
                reference: current.clone(),
            });
        };
        let target = document
            .get("components")
            .and_then(|components| components.get(section))
            .and_then(|section| section.get(&name));
        let Some(target) = target else {
            return Err(LoadError::UnresolvedReference {
                path: path.to_owned(),
                reference: current.clone(),
            });
        };
        seen.insert(current.clone());
        match target.get("$ref") {
            Some(Value::String(next)) => {
                if seen.contains(next.as_str()) {
                    return Err(LoadError::ReferenceCycle {
                        path: path.to_owned(),
                        reference: reference.to_owned(),
                    });
                }
                current = next.clone();
            }
            _ => return Ok(()),
        }
    }
}

// Copyright 2025 Oxide Computer Company

//! Recursive comparison of schemas
//!
//! This is invoked wherever a schema appears: parameters, media types, headers,
//! component definitions, and (recursively) properties, array items,
//! `additionalProperties`, `not`, and the members of `allOf`/`anyOf`/`oneOf`.
//! Schema graphs may be cyclic; see [`state`] for how comparison is kept
//! finite.

use crate::diff::common::ExtensionsDiff;
use crate::diff::common::MapDiff;
use crate::diff::common::StringsDiff;
use crate::diff::common::ValueDiff;
use crate::diff::info::ExternalDocsDiff;
use crate::diff::Differ;
use crate::refs::ref_name;
use openapiv3::AdditionalProperties;
use openapiv3::Discriminator;
use openapiv3::ReferenceOr;
use openapiv3::Schema;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

mod list;
pub(crate) mod state;
mod view;

pub use list::SchemaListDiff;
pub use list::Subschema;
use state::Visit;
use view::SchemaView;

/// Changes to schemas correlated by name (properties, component schemas)
pub type SchemasDiff<'a> = MapDiff<String, SchemaDiff<'a>>;

/// Differences between two schemas
///
/// When a schema exists on only one side, the diff is a leaf with
/// `schema_added` or `schema_deleted` set and the schema itself in
/// `revision` or `base`; its contents are not compared with anything.
///
/// A pair of component schemas that differ is described in full the first
/// time it is reached and under `components`.  Every other `$ref` to the
/// same pair is a leaf with only `repeated_ref` set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff<'a> {
    #[serde(skip)]
    pub base: Option<&'a Schema>,
    #[serde(skip)]
    pub revision: Option<&'a Schema>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub schema_added: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub schema_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeated_ref: Option<SchemaRefs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_only_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of_diff: Option<ValueDiff<Number>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_diff: Option<ValueDiff<Number>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_diff: Option<ValueDiff<Number>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_min_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_max_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties_diff: Option<ValueDiff<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_diff: Option<EnumDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_diff: Option<SchemasDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_diff: Option<Box<SchemaDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties_diff: Option<AdditionalPropertiesDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of_diff: Option<SchemaListDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of_diff: Option<SchemaListDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of_diff: Option<SchemaListDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_diff: Option<Box<SchemaDiff<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator_diff: Option<DiscriminatorDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs_diff: Option<ExternalDocsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl<'a> SchemaDiff<'a> {
    fn added(revision: &'a Schema) -> SchemaDiff<'a> {
        SchemaDiff {
            revision: Some(revision),
            schema_added: true,
            ..Default::default()
        }
    }

    fn deleted(base: &'a Schema) -> SchemaDiff<'a> {
        SchemaDiff {
            base: Some(base),
            schema_deleted: true,
            ..Default::default()
        }
    }

    /// Returns true if no difference was recorded
    pub fn is_empty(&self) -> bool {
        let SchemaDiff {
            base: _,
            revision: _,
            schema_added,
            schema_deleted,
            repeated_ref,
            type_diff,
            format_diff,
            title_diff,
            description_diff,
            pattern_diff,
            nullable_diff,
            read_only_diff,
            write_only_diff,
            deprecated_diff,
            default_diff,
            example_diff,
            multiple_of_diff,
            min_diff,
            max_diff,
            exclusive_min_diff,
            exclusive_max_diff,
            min_length_diff,
            max_length_diff,
            min_items_diff,
            max_items_diff,
            unique_items_diff,
            min_properties_diff,
            max_properties_diff,
            enum_diff,
            required_diff,
            properties_diff,
            items_diff,
            additional_properties_diff,
            all_of_diff,
            any_of_diff,
            one_of_diff,
            not_diff,
            discriminator_diff,
            external_docs_diff,
            extensions_diff,
        } = self;

        !schema_added
            && !schema_deleted
            && repeated_ref.is_none()
            && type_diff.is_none()
            && format_diff.is_none()
            && title_diff.is_none()
            && description_diff.is_none()
            && pattern_diff.is_none()
            && nullable_diff.is_none()
            && read_only_diff.is_none()
            && write_only_diff.is_none()
            && deprecated_diff.is_none()
            && default_diff.is_none()
            && example_diff.is_none()
            && multiple_of_diff.is_none()
            && min_diff.is_none()
            && max_diff.is_none()
            && exclusive_min_diff.is_none()
            && exclusive_max_diff.is_none()
            && min_length_diff.is_none()
            && max_length_diff.is_none()
            && min_items_diff.is_none()
            && max_items_diff.is_none()
            && unique_items_diff.is_none()
            && min_properties_diff.is_none()
            && max_properties_diff.is_none()
            && enum_diff.is_none()
            && required_diff.is_none()
            && properties_diff.is_none()
            && items_diff.is_none()
            && additional_properties_diff.is_none()
            && all_of_diff.is_none()
            && any_of_diff.is_none()
            && one_of_diff.is_none()
            && not_diff.is_none()
            && discriminator_diff.is_none()
            && external_docs_diff.is_none()
            && extensions_diff.is_none()
    }
}

/// Names of the component schemas that a pair of `$ref`s points to
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaRefs {
    pub base: String,
    pub revision: String,
}

/// Changes to the set of values a schema allows through `enum`
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDiff {
    /// the revision has an `enum` and the base did not
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enum_added: bool,
    /// the base had an `enum` and the revision does not
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enum_deleted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<Value>,
}

impl EnumDiff {
    /// Compares two `enum` lists as sets; values keep the order in which
    /// they appear in their own list
    pub(crate) fn compare(
        base: &[Value],
        revision: &[Value],
    ) -> Option<EnumDiff> {
        let mut diff = EnumDiff {
            enum_added: base.is_empty() && !revision.is_empty(),
            enum_deleted: !base.is_empty() && revision.is_empty(),
            ..Default::default()
        };
        for value in revision {
            if !base.contains(value) && !diff.added.contains(value) {
                diff.added.push(value.clone());
            }
        }
        for value in base {
            if !revision.contains(value) && !diff.deleted.contains(value) {
                diff.deleted.push(value.clone());
            }
        }
        let empty = !diff.enum_added
            && !diff.enum_deleted
            && diff.added.is_empty()
            && diff.deleted.is_empty();
        (!empty).then_some(diff)
    }
}

/// Changes to `additionalProperties`
///
/// `allowed` is whether additional properties are permitted at all, which
/// is the case for `true`, for a schema, and (as far as `allowed_diff` is
/// concerned) when the keyword is missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalPropertiesDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<Box<SchemaDiff<'a>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatorDiff {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_name_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_diff: Option<MapDiff<String, ValueDiff<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl<'a> Differ<'_, 'a> {
    /// Compares two optional, possibly-referenced schemas
    pub(crate) fn diff_schema_refs(
        &mut self,
        base: Option<&'a ReferenceOr<Schema>>,
        revision: Option<&'a ReferenceOr<Schema>>,
    ) -> Option<SchemaDiff<'a>> {
        let refs = (base.and_then(reference), revision.and_then(reference));
        let base = base.and_then(|schema| self.base.resolve(schema));
        let revision =
            revision.and_then(|schema| self.revision.resolve(schema));
        self.diff_referenced(refs, base, revision)
    }

    fn diff_boxed_schema_refs(
        &mut self,
        base: Option<&'a ReferenceOr<Box<Schema>>>,
        revision: Option<&'a ReferenceOr<Box<Schema>>>,
    ) -> Option<SchemaDiff<'a>> {
        let refs = (base.and_then(reference), revision.and_then(reference));
        let base = base.and_then(|schema| self.base.resolve_boxed(schema));
        let revision =
            revision.and_then(|schema| self.revision.resolve_boxed(schema));
        self.diff_referenced(refs, base, revision)
    }

    fn diff_referenced(
        &mut self,
        refs: (Option<&str>, Option<&str>),
        base: Option<&'a Schema>,
        revision: Option<&'a Schema>,
    ) -> Option<SchemaDiff<'a>> {
        if let ((Some(base_ref), Some(revision_ref)), Some(b), Some(r)) =
            (refs, base, revision)
        {
            if self.schemas.known_diff(b, r).is_some() {
                return Some(SchemaDiff {
                    base,
                    revision,
                    repeated_ref: Some(SchemaRefs {
                        base: ref_name(base_ref),
                        revision: ref_name(revision_ref),
                    }),
                    ..Default::default()
                });
            }
        }
        self.diff_schema(base, revision)
    }

    /// Compares two schemas, either of which may be missing
    pub(crate) fn diff_schema(
        &mut self,
        base: Option<&'a Schema>,
        revision: Option<&'a Schema>,
    ) -> Option<SchemaDiff<'a>> {
        match (base, revision) {
            (None, None) => None,
            (None, Some(revision)) => Some(SchemaDiff::added(revision)),
            (Some(base), None) => Some(SchemaDiff::deleted(base)),
            (Some(base), Some(revision)) => {
                // Only happens when a document is compared with itself.
                if std::ptr::eq(base, revision) {
                    return None;
                }
                let frame = match self.schemas.visit(base, revision) {
                    Visit::Enter(frame) => frame,
                    Visit::Cycle | Visit::KnownEqual => return None,
                    Visit::KnownUnequal => {
                        return self.schemas.known_diff(base, revision).cloned()
                    }
                };
                self.max_schema_depth =
                    self.max_schema_depth.max(self.schemas.depth());
                let diff = self.diff_schema_contents(base, revision);
                self.schemas.leave(frame, diff.as_ref());
                diff
            }
        }
    }

    fn diff_schema_contents(
        &mut self,
        base: &'a Schema,
        revision: &'a Schema,
    ) -> Option<SchemaDiff<'a>> {
        let b = SchemaView::new(base);
        let r = SchemaView::new(revision);
        let bd = &base.schema_data;
        let rd = &revision.schema_data;

        let mut diff = SchemaDiff {
            base: Some(base),
            revision: Some(revision),
            type_diff: ValueDiff::compare(b.typ.as_ref(), r.typ.as_ref()),
            format_diff: ValueDiff::compare(
                b.format.as_ref(),
                r.format.as_ref(),
            ),
            title_diff: self.diff_title(bd.title.as_ref(), rd.title.as_ref()),
            description_diff: self.diff_description(
                bd.description.as_ref(),
                rd.description.as_ref(),
            ),
            pattern_diff: ValueDiff::compare(b.pattern, r.pattern),
            nullable_diff: ValueDiff::of(bd.nullable, rd.nullable),
            read_only_diff: ValueDiff::of(bd.read_only, rd.read_only),
            write_only_diff: ValueDiff::of(bd.write_only, rd.write_only),
            deprecated_diff: ValueDiff::of(bd.deprecated, rd.deprecated),
            default_diff: ValueDiff::compare(
                bd.default.as_ref(),
                rd.default.as_ref(),
            ),
            example_diff: self
                .diff_example(bd.example.as_ref(), rd.example.as_ref()),
            multiple_of_diff: ValueDiff::compare(
                b.multiple_of.as_ref(),
                r.multiple_of.as_ref(),
            ),
            min_diff: ValueDiff::compare(
                b.minimum.as_ref(),
                r.minimum.as_ref(),
            ),
            max_diff: ValueDiff::compare(
                b.maximum.as_ref(),
                r.maximum.as_ref(),
            ),
            exclusive_min_diff: ValueDiff::of(
                b.exclusive_minimum,
                r.exclusive_minimum,
            ),
            exclusive_max_diff: ValueDiff::of(
                b.exclusive_maximum,
                r.exclusive_maximum,
            ),
            min_length_diff: ValueDiff::compare(
                b.min_length.as_ref(),
                r.min_length.as_ref(),
            ),
            max_length_diff: ValueDiff::compare(
                b.max_length.as_ref(),
                r.max_length.as_ref(),
            ),
            min_items_diff: ValueDiff::compare(
                b.min_items.as_ref(),
                r.min_items.as_ref(),
            ),
            max_items_diff: ValueDiff::compare(
                b.max_items.as_ref(),
                r.max_items.as_ref(),
            ),
            unique_items_diff: ValueDiff::of(b.unique_items, r.unique_items),
            min_properties_diff: ValueDiff::compare(
                b.min_properties.as_ref(),
                r.min_properties.as_ref(),
            ),
            max_properties_diff: ValueDiff::compare(
                b.max_properties.as_ref(),
                r.max_properties.as_ref(),
            ),
            enum_diff: EnumDiff::compare(&b.enumeration, &r.enumeration),
            required_diff: StringsDiff::compare(b.required, r.required),
            external_docs_diff: self.diff_external_docs(
                bd.external_docs.as_ref(),
                rd.external_docs.as_ref(),
            ),
            extensions_diff: self
                .diff_extensions(&bd.extensions, &rd.extensions),
            discriminator_diff: self.diff_discriminator(
                bd.discriminator.as_ref(),
                rd.discriminator.as_ref(),
            ),
            ..Default::default()
        };

        diff.properties_diff =
            MapDiff::compare(b.properties(), r.properties(), |bp, rp| {
                self.diff_boxed_schema_refs(Some(bp), Some(rp))
            });

        // Item schemas are only compared when both sides have one.
        if let (Some(bi), Some(ri)) = (b.items, r.items) {
            diff.items_diff = self
                .diff_boxed_schema_refs(Some(bi), Some(ri))
                .map(Box::new);
        }

        diff.additional_properties_diff = self.diff_additional_properties(
            b.additional_properties,
            r.additional_properties,
        );
        diff.all_of_diff = self.diff_schema_list(b.all_of, r.all_of);
        diff.any_of_diff = self.diff_schema_list(b.any_of, r.any_of);
        diff.one_of_diff = self.diff_schema_list(b.one_of, r.one_of);
        diff.not_diff = self.diff_schema_refs(b.not, r.not).map(Box::new);

        (!diff.is_empty()).then_some(diff)
    }

    fn diff_additional_properties(
        &mut self,
        base: Option<&'a AdditionalProperties>,
        revision: Option<&'a AdditionalProperties>,
    ) -> Option<AdditionalPropertiesDiff<'a>> {
        let (base_allowed, base_schema) = additional(base);
        let (revision_allowed, revision_schema) = additional(revision);
        let diff = AdditionalPropertiesDiff {
            allowed_diff: ValueDiff::of(base_allowed, revision_allowed),
            schema_diff: self
                .diff_schema_refs(base_schema, revision_schema)
                .map(Box::new),
        };
        (diff.allowed_diff.is_some() || diff.schema_diff.is_some())
            .then_some(diff)
    }

    fn diff_discriminator(
        &self,
        base: Option<&Discriminator>,
        revision: Option<&Discriminator>,
    ) -> Option<DiscriminatorDiff> {
        let diff = match (base, revision) {
            (None, None) => return None,
            (None, Some(_)) => {
                DiscriminatorDiff { added: true, ..Default::default() }
            }
            (Some(_), None) => {
                DiscriminatorDiff { deleted: true, ..Default::default() }
            }
            (Some(b), Some(r)) => {
                let diff = DiscriminatorDiff {
                    property_name_diff: ValueDiff::of(
                        b.property_name.clone(),
                        r.property_name.clone(),
                    ),
                    mapping_diff: MapDiff::compare(
                        b.mapping.iter().map(|(k, v)| (k.clone(), v)),
                        r.mapping.iter().map(|(k, v)| (k.clone(), v)),
                        |bv, rv| ValueDiff::compare(Some(bv), Some(rv)),
                    ),
                    extensions_diff: self.diff_object_extensions(b, r),
                    ..Default::default()
                };
                if diff.property_name_diff.is_none()
                    && diff.mapping_diff.is_none()
                    && diff.extensions_diff.is_none()
                {
                    return None;
                }
                diff
            }
        };
        Some(diff)
    }
}

fn additional(
    value: Option<&AdditionalProperties>,
) -> (bool, Option<&ReferenceOr<Schema>>) {
    match value {
        None => (true, None),
        Some(AdditionalProperties::Any(allowed)) => (*allowed, None),
        Some(AdditionalProperties::Schema(schema)) => (true, Some(&**schema)),
    }
}

fn reference<T>(schema: &ReferenceOr<T>) -> Option<&str> {
    match schema {
        ReferenceOr::Reference { reference } => Some(reference),
        ReferenceOr::Item(_) => None,
    }
}

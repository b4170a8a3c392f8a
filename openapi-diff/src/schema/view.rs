// Copyright 2025 Oxide Computer Company

//! A uniform view of a schema's validation keywords
//!
//! `openapiv3` represents a schema with a single well-known `type` as one of
//! several typed structs, and everything else as a catch-all `AnySchema`.
//! The comparator wants to look at every keyword the same way regardless of
//! which representation the parser chose, so it reads schemas through
//! [`SchemaView`].

use indexmap::IndexMap;
use openapiv3::AdditionalProperties;
use openapiv3::ReferenceOr;
use openapiv3::Schema;
use openapiv3::SchemaKind;
use openapiv3::Type;
use openapiv3::VariantOrUnknownOrEmpty;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

type Properties = IndexMap<String, ReferenceOr<Box<Schema>>>;

#[derive(Default)]
pub(crate) struct SchemaView<'a> {
    pub typ: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<&'a String>,
    pub enumeration: Vec<Value>,
    pub multiple_of: Option<Number>,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub items: Option<&'a ReferenceOr<Box<Schema>>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    pub properties: Option<&'a Properties>,
    pub required: &'a [String],
    pub additional_properties: Option<&'a AdditionalProperties>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
    pub all_of: &'a [ReferenceOr<Schema>],
    pub any_of: &'a [ReferenceOr<Schema>],
    pub one_of: &'a [ReferenceOr<Schema>],
    pub not: Option<&'a ReferenceOr<Schema>>,
}

impl<'a> SchemaView<'a> {
    pub(crate) fn new(schema: &'a Schema) -> SchemaView<'a> {
        match &schema.schema_kind {
            SchemaKind::Type(Type::String(s)) => SchemaView {
                typ: Some("string".to_string()),
                format: format_name(&s.format),
                pattern: s.pattern.as_ref(),
                enumeration: s
                    .enumeration
                    .iter()
                    .map(|v| v.clone().map_or(Value::Null, Value::String))
                    .collect(),
                min_length: s.min_length,
                max_length: s.max_length,
                ..Default::default()
            },
            SchemaKind::Type(Type::Number(n)) => SchemaView {
                typ: Some("number".to_string()),
                format: format_name(&n.format),
                enumeration: n
                    .enumeration
                    .iter()
                    .map(|v| {
                        v.and_then(float_number)
                            .map_or(Value::Null, Value::Number)
                    })
                    .collect(),
                multiple_of: n.multiple_of.and_then(float_number),
                minimum: n.minimum.and_then(float_number),
                maximum: n.maximum.and_then(float_number),
                exclusive_minimum: n.exclusive_minimum,
                exclusive_maximum: n.exclusive_maximum,
                ..Default::default()
            },
            SchemaKind::Type(Type::Integer(i)) => SchemaView {
                typ: Some("integer".to_string()),
                format: format_name(&i.format),
                enumeration: i
                    .enumeration
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::from))
                    .collect(),
                multiple_of: i.multiple_of.map(Number::from),
                minimum: i.minimum.map(Number::from),
                maximum: i.maximum.map(Number::from),
                exclusive_minimum: i.exclusive_minimum,
                exclusive_maximum: i.exclusive_maximum,
                ..Default::default()
            },
            SchemaKind::Type(Type::Boolean(b)) => SchemaView {
                typ: Some("boolean".to_string()),
                enumeration: b
                    .enumeration
                    .iter()
                    .map(|v| v.map_or(Value::Null, Value::Bool))
                    .collect(),
                ..Default::default()
            },
            SchemaKind::Type(Type::Object(o)) => SchemaView {
                typ: Some("object".to_string()),
                properties: Some(&o.properties),
                required: &o.required,
                additional_properties: o.additional_properties.as_ref(),
                min_properties: o.min_properties,
                max_properties: o.max_properties,
                ..Default::default()
            },
            SchemaKind::Type(Type::Array(a)) => SchemaView {
                typ: Some("array".to_string()),
                items: a.items.as_ref(),
                min_items: a.min_items,
                max_items: a.max_items,
                unique_items: a.unique_items,
                ..Default::default()
            },
            SchemaKind::AllOf { all_of } => {
                SchemaView { all_of, ..Default::default() }
            }
            SchemaKind::AnyOf { any_of } => {
                SchemaView { any_of, ..Default::default() }
            }
            SchemaKind::OneOf { one_of } => {
                SchemaView { one_of, ..Default::default() }
            }
            SchemaKind::Not { not } => {
                SchemaView { not: Some(&**not), ..Default::default() }
            }
            SchemaKind::Any(any) => SchemaView {
                typ: any.typ.clone(),
                format: any.format.clone(),
                pattern: any.pattern.as_ref(),
                enumeration: any.enumeration.clone(),
                multiple_of: any.multiple_of.and_then(float_number),
                minimum: any.minimum.and_then(float_number),
                maximum: any.maximum.and_then(float_number),
                exclusive_minimum: any.exclusive_minimum.unwrap_or(false),
                exclusive_maximum: any.exclusive_maximum.unwrap_or(false),
                min_length: any.min_length,
                max_length: any.max_length,
                items: any.items.as_ref(),
                min_items: any.min_items,
                max_items: any.max_items,
                unique_items: any.unique_items.unwrap_or(false),
                properties: Some(&any.properties),
                required: &any.required,
                additional_properties: any.additional_properties.as_ref(),
                min_properties: any.min_properties,
                max_properties: any.max_properties,
                all_of: &any.all_of,
                any_of: &any.any_of,
                one_of: &any.one_of,
                not: any.not.as_deref(),
            },
        }
    }

    pub(crate) fn properties(
        &self,
    ) -> impl Iterator<Item = (String, &'a ReferenceOr<Box<Schema>>)> {
        self.properties
            .into_iter()
            .flatten()
            .map(|(name, schema)| (name.clone(), schema))
    }
}

fn float_number(value: f64) -> Option<Number> {
    Number::from_f64(value)
}

/// Returns the name of a `format`, whether or not `openapiv3` recognizes it
fn format_name<T: Serialize>(
    format: &VariantOrUnknownOrEmpty<T>,
) -> Option<String> {
    match format {
        VariantOrUnknownOrEmpty::Item(item) => match serde_json::to_value(item)
        {
            Ok(Value::String(name)) => Some(name),
            _ => None,
        },
        VariantOrUnknownOrEmpty::Unknown(name) => Some(name.clone()),
        VariantOrUnknownOrEmpty::Empty => None,
    }
}

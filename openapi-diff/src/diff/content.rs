// Copyright 2025 Oxide Computer Company

//! Media types, their encodings, and request bodies

use super::common::diff_values;
use super::common::ExtensionsDiff;
use super::common::Fields;
use super::common::MapDiff;
use super::common::ValueDiff;
use super::common::ValuesDiff;
use super::info::string_diff;
use super::servers::named_objects;
use super::Differ;
use crate::schema::SchemaDiff;
use openapiv3::Content;
use openapiv3::MediaType;
use openapiv3::ReferenceOr;
use openapiv3::RequestBody;
use serde::Serialize;
use serde_json::Value;

/// Changes to a `content` map, correlated by media type
pub type ContentDiff<'a> = MapDiff<String, MediaTypeDiff<'a>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<SchemaDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_diff: Option<MapDiff<String, EncodingDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to the encoding of one property of a multipart or form body
///
/// Encoding headers are compared as plain values, one per header name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_reserved_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to an optional request body
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyDiff<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Compares one scalar field of two objects read as [`Fields`]
pub(crate) fn field_diff(
    base: &Fields,
    revision: &Fields,
    key: &str,
) -> Option<ValueDiff<Value>> {
    ValueDiff::compare(base.get(key), revision.get(key))
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_content(
        &mut self,
        base: &'a Content,
        revision: &'a Content,
    ) -> Option<ContentDiff<'a>> {
        MapDiff::compare(
            base.iter().map(|(k, v)| (k.clone(), v)),
            revision.iter().map(|(k, v)| (k.clone(), v)),
            |b, r| self.diff_media_type(b, r),
        )
    }

    fn diff_media_type(
        &mut self,
        base: &'a MediaType,
        revision: &'a MediaType,
    ) -> Option<MediaTypeDiff<'a>> {
        let diff = MediaTypeDiff {
            schema_diff: self.diff_schema_refs(
                base.schema.as_ref(),
                revision.schema.as_ref(),
            ),
            example_diff: self
                .diff_example(base.example.as_ref(), revision.example.as_ref()),
            examples_diff: self
                .diff_examples(&base.examples, &revision.examples),
            encoding_diff: {
                let b = Fields::of(&base.encoding);
                let r = Fields::of(&revision.encoding);
                let b = named_objects(&b);
                let r = named_objects(&r);
                MapDiff::compare(
                    b.iter().map(|(k, v)| (k.clone(), v)),
                    r.iter().map(|(k, v)| (k.clone(), v)),
                    |bv, rv| self.diff_encoding(bv, rv),
                )
            },
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
        };
        let empty = diff.schema_diff.is_none()
            && diff.example_diff.is_none()
            && diff.examples_diff.is_none()
            && diff.encoding_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    fn diff_encoding(&self, b: &Fields, r: &Fields) -> Option<EncodingDiff> {
        let b_headers = b.object("headers");
        let r_headers = r.object("headers");
        let diff = EncodingDiff {
            content_type_diff: string_diff(b, r, "contentType"),
            headers_diff: diff_values(b_headers.iter(), r_headers.iter()),
            style_diff: field_diff(b, r, "style"),
            explode_diff: field_diff(b, r, "explode"),
            allow_reserved_diff: field_diff(b, r, "allowReserved"),
            extensions_diff: self.diff_field_extensions(b, r),
        };
        let empty = diff.content_type_diff.is_none()
            && diff.headers_diff.is_none()
            && diff.style_diff.is_none()
            && diff.explode_diff.is_none()
            && diff.allow_reserved_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    pub(crate) fn diff_request_body_refs(
        &mut self,
        base: Option<&'a ReferenceOr<RequestBody>>,
        revision: Option<&'a ReferenceOr<RequestBody>>,
    ) -> Option<RequestBodyDiff<'a>> {
        let base = base.and_then(|body| self.base.resolve(body));
        let revision = revision.and_then(|body| self.revision.resolve(body));
        match (base, revision) {
            (None, None) => None,
            (None, Some(_)) => {
                Some(RequestBodyDiff { added: true, ..Default::default() })
            }
            (Some(_), None) => {
                Some(RequestBodyDiff { deleted: true, ..Default::default() })
            }
            (Some(base), Some(revision)) => {
                self.diff_request_body(base, revision)
            }
        }
    }

    pub(crate) fn diff_request_body(
        &mut self,
        base: &'a RequestBody,
        revision: &'a RequestBody,
    ) -> Option<RequestBodyDiff<'a>> {
        let diff = RequestBodyDiff {
            description_diff: self.diff_description(
                base.description.as_ref(),
                revision.description.as_ref(),
            ),
            required_diff: ValueDiff::of(base.required, revision.required),
            content_diff: self.diff_content(&base.content, &revision.content),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
            ..Default::default()
        };
        let empty = diff.description_diff.is_none()
            && diff.required_diff.is_none()
            && diff.content_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }
}

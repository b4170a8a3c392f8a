// Copyright 2025 Oxide Computer Company

//! Responses (by status code) and their headers

use super::common::diff_serialized;
use super::common::ExtensionsDiff;
use super::common::MapDiff;
use super::common::ValueDiff;
use super::common::ValuesDiff;
use super::content::ContentDiff;
use super::Differ;
use crate::schema::SchemaDiff;
use indexmap::IndexMap;
use openapiv3::Header;
use openapiv3::ReferenceOr;
use openapiv3::Response;
use openapiv3::Responses;
use openapiv3::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// Changes to the responses of an operation, keyed by status code as it is
/// written in the document (`"200"`, `"4XX"`, `"default"`)
pub type ResponsesDiff<'a> = MapDiff<String, ResponseDiff<'a>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers_diff: Option<HeadersDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to headers, correlated by name
pub type HeadersDiff<'a> = MapDiff<String, HeaderDiff<'a>>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_diff: Option<ValueDiff<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_diff: Option<SchemaDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_diff: Option<ContentDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl HeaderDiff<'_> {
    fn is_empty(&self) -> bool {
        self.description_diff.is_none()
            && self.deprecated_diff.is_none()
            && self.required_diff.is_none()
            && self.example_diff.is_none()
            && self.examples_diff.is_none()
            && self.schema_diff.is_none()
            && self.content_diff.is_none()
            && self.extensions_diff.is_none()
    }
}

/// Renders a status code the way it is written as a `responses` key
pub fn status_key(code: &StatusCode) -> String {
    match code {
        StatusCode::Code(code) => code.to_string(),
        StatusCode::Range(range) => format!("{}XX", range),
    }
}

fn responses_by_key(
    responses: &Responses,
) -> impl Iterator<Item = (String, &ReferenceOr<Response>)> + '_ {
    let default = responses
        .default
        .as_ref()
        .map(|response| ("default".to_string(), response));
    default.into_iter().chain(
        responses
            .responses
            .iter()
            .map(|(code, response)| (status_key(code), response)),
    )
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_responses(
        &mut self,
        base: &'a Responses,
        revision: &'a Responses,
    ) -> Option<ResponsesDiff<'a>> {
        MapDiff::compare(
            responses_by_key(base),
            responses_by_key(revision),
            |b, r| {
                let b = self.base.resolve(b)?;
                let r = self.revision.resolve(r)?;
                self.diff_response(b, r)
            },
        )
    }

    pub(crate) fn diff_response(
        &mut self,
        base: &'a Response,
        revision: &'a Response,
    ) -> Option<ResponseDiff<'a>> {
        let diff = ResponseDiff {
            description_diff: self.diff_description(
                Some(&base.description),
                Some(&revision.description),
            ),
            headers_diff: self.diff_headers(&base.headers, &revision.headers),
            content_diff: self.diff_content(&base.content, &revision.content),
            links_diff: diff_serialized(&base.links, &revision.links),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
        };
        let empty = diff.description_diff.is_none()
            && diff.headers_diff.is_none()
            && diff.content_diff.is_none()
            && diff.links_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    fn diff_headers(
        &mut self,
        base: &'a IndexMap<String, ReferenceOr<Header>>,
        revision: &'a IndexMap<String, ReferenceOr<Header>>,
    ) -> Option<HeadersDiff<'a>> {
        // Header names are case-insensitive.
        MapDiff::compare(
            base.iter().map(|(name, h)| (name.to_ascii_lowercase(), h)),
            revision.iter().map(|(name, h)| (name.to_ascii_lowercase(), h)),
            |b, r| {
                let b = self.base.resolve(b)?;
                let r = self.revision.resolve(r)?;
                self.diff_header(b, r)
            },
        )
    }

    pub(crate) fn diff_header(
        &mut self,
        base: &'a Header,
        revision: &'a Header,
    ) -> Option<HeaderDiff<'a>> {
        let mut diff = HeaderDiff {
            description_diff: self.diff_description(
                base.description.as_ref(),
                revision.description.as_ref(),
            ),
            deprecated_diff: ValueDiff::compare(
                base.deprecated.as_ref(),
                revision.deprecated.as_ref(),
            ),
            required_diff: ValueDiff::of(base.required, revision.required),
            example_diff: self
                .diff_example(base.example.as_ref(), revision.example.as_ref()),
            examples_diff: self
                .diff_examples(&base.examples, &revision.examples),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
            ..Default::default()
        };
        (diff.schema_diff, diff.content_diff) =
            self.diff_schema_or_content(&base.format, &revision.format);
        (!diff.is_empty()).then_some(diff)
    }
}

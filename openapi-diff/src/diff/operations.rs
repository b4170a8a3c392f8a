// Copyright 2025 Oxide Computer Company

//! Operations, correlated by HTTP method

use super::common::diff_serialized;
use super::common::ExtensionsDiff;
use super::common::MapDiff;
use super::common::StringsDiff;
use super::common::ValueDiff;
use super::common::ValuesDiff;
use super::content::RequestBodyDiff;
use super::info::ExternalDocsDiff;
use super::parameters::ParametersDiff;
use super::responses::ResponsesDiff;
use super::security::SecurityRequirementsDiff;
use super::servers::ServersDiff;
use super::Differ;
use crate::endpoint::operations;
use crate::endpoint::HttpMethod;
use openapiv3::Operation;
use openapiv3::PathItem;
use serde::Serialize;

/// Changes to the operations of one path
pub type OperationsDiff<'a> = MapDiff<HttpMethod, MethodDiff<'a>>;

/// Differences between two operations on the same path and method
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDiff<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_diff: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs_diff: Option<ExternalDocsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_diff: Option<ParametersDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_diff: Option<RequestBodyDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_diff: Option<ResponsesDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callbacks_diff: Option<ValuesDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_diff: Option<SecurityRequirementsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_diff: Option<ServersDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl MethodDiff<'_> {
    pub fn is_empty(&self) -> bool {
        let MethodDiff {
            tags_diff,
            summary_diff,
            description_diff,
            operation_id_diff,
            deprecated_diff,
            external_docs_diff,
            parameters_diff,
            request_body_diff,
            responses_diff,
            callbacks_diff,
            security_diff,
            servers_diff,
            extensions_diff,
        } = self;
        tags_diff.is_none()
            && summary_diff.is_none()
            && description_diff.is_none()
            && operation_id_diff.is_none()
            && deprecated_diff.is_none()
            && external_docs_diff.is_none()
            && parameters_diff.is_none()
            && request_body_diff.is_none()
            && responses_diff.is_none()
            && callbacks_diff.is_none()
            && security_diff.is_none()
            && servers_diff.is_none()
            && extensions_diff.is_none()
    }
}

impl<'a> Differ<'_, 'a> {
    pub(crate) fn diff_operations(
        &mut self,
        base: &'a PathItem,
        revision: &'a PathItem,
    ) -> Option<OperationsDiff<'a>> {
        MapDiff::compare(operations(base), operations(revision), |b, r| {
            self.diff_operation(b, r)
        })
    }

    pub(crate) fn diff_operation(
        &mut self,
        base: &'a Operation,
        revision: &'a Operation,
    ) -> Option<MethodDiff<'a>> {
        let diff = MethodDiff {
            tags_diff: StringsDiff::compare(&base.tags, &revision.tags),
            summary_diff: self
                .diff_summary(base.summary.as_ref(), revision.summary.as_ref()),
            description_diff: self.diff_description(
                base.description.as_ref(),
                revision.description.as_ref(),
            ),
            operation_id_diff: ValueDiff::compare(
                base.operation_id.as_ref(),
                revision.operation_id.as_ref(),
            ),
            deprecated_diff: ValueDiff::of(
                base.deprecated,
                revision.deprecated,
            ),
            external_docs_diff: self.diff_external_docs(
                base.external_docs.as_ref(),
                revision.external_docs.as_ref(),
            ),
            parameters_diff: self
                .diff_parameters(&base.parameters, &revision.parameters),
            request_body_diff: self.diff_request_body_refs(
                base.request_body.as_ref(),
                revision.request_body.as_ref(),
            ),
            responses_diff: self
                .diff_responses(&base.responses, &revision.responses),
            callbacks_diff: diff_serialized(
                &base.callbacks,
                &revision.callbacks,
            ),
            security_diff: self.diff_security_requirements(
                base.security.as_deref(),
                revision.security.as_deref(),
            ),
            servers_diff: self.diff_servers(&base.servers, &revision.servers),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
        };
        (!diff.is_empty()).then_some(diff)
    }
}

// Copyright 2025 Oxide Computer Company

//! Document metadata: `info`, `tags` and `externalDocs`

use super::common::ExtensionsDiff;
use super::common::Fields;
use super::common::MapDiff;
use super::common::ValueDiff;
use super::Differ;
use crate::config::ExcludeElement;
use openapiv3::ExternalDocumentation;
use openapiv3::Info;
use openapiv3::Tag;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_diff: Option<ContactDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_diff: Option<LicenseDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to an `externalDocs` object
///
/// If the object exists on only one side, only `added` or `deleted` is set.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDocsDiff {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub added: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

/// Changes to tags, correlated by name
pub type TagsDiff = MapDiff<String, TagDiff>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<ValueDiff<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs_diff: Option<ExternalDocsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_diff: Option<ExtensionsDiff>,
}

impl Differ<'_, '_> {
    pub(crate) fn diff_info(
        &self,
        base: &Info,
        revision: &Info,
    ) -> Option<InfoDiff> {
        let b = Fields::of(base);
        let r = Fields::of(revision);
        let diff = InfoDiff {
            title_diff: self
                .diff_title(Some(&base.title), Some(&revision.title)),
            description_diff: self.diff_description(
                base.description.as_ref(),
                revision.description.as_ref(),
            ),
            terms_of_service_diff: ValueDiff::compare(
                b.string("termsOfService").as_ref(),
                r.string("termsOfService").as_ref(),
            ),
            version_diff: ValueDiff::of(
                base.version.clone(),
                revision.version.clone(),
            ),
            contact_diff: self
                .diff_contact(&b.object("contact"), &r.object("contact")),
            license_diff: self
                .diff_license(&b.object("license"), &r.object("license")),
            extensions_diff: self
                .diff_extensions(&base.extensions, &revision.extensions),
        };
        let InfoDiff {
            title_diff,
            description_diff,
            terms_of_service_diff,
            version_diff,
            contact_diff,
            license_diff,
            extensions_diff,
        } = &diff;
        let empty = title_diff.is_none()
            && description_diff.is_none()
            && terms_of_service_diff.is_none()
            && version_diff.is_none()
            && contact_diff.is_none()
            && license_diff.is_none()
            && extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    fn diff_contact(&self, b: &Fields, r: &Fields) -> Option<ContactDiff> {
        let diff = ContactDiff {
            name_diff: string_diff(b, r, "name"),
            url_diff: string_diff(b, r, "url"),
            email_diff: string_diff(b, r, "email"),
            extensions_diff: self.diff_field_extensions(b, r),
        };
        let empty = diff.name_diff.is_none()
            && diff.url_diff.is_none()
            && diff.email_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    fn diff_license(&self, b: &Fields, r: &Fields) -> Option<LicenseDiff> {
        let diff = LicenseDiff {
            name_diff: string_diff(b, r, "name"),
            url_diff: string_diff(b, r, "url"),
            extensions_diff: self.diff_field_extensions(b, r),
        };
        let empty = diff.name_diff.is_none()
            && diff.url_diff.is_none()
            && diff.extensions_diff.is_none();
        (!empty).then_some(diff)
    }

    pub(crate) fn diff_external_docs(
        &self,
        base: Option<&ExternalDocumentation>,
        revision: Option<&ExternalDocumentation>,
    ) -> Option<ExternalDocsDiff> {
        match (base, revision) {
            (None, None) => None,
            (None, Some(_)) => {
                Some(ExternalDocsDiff { added: true, ..Default::default() })
            }
            (Some(_), None) => {
                Some(ExternalDocsDiff { deleted: true, ..Default::default() })
            }
            (Some(base), Some(revision)) => {
                let b = Fields::of(base);
                let r = Fields::of(revision);
                let description_diff = if self
                    .excluded(ExcludeElement::Description)
                {
                    None
                } else {
                    string_diff(&b, &r, "description")
                };
                let diff = ExternalDocsDiff {
                    url_diff: string_diff(&b, &r, "url"),
                    description_diff,
                    extensions_diff: self.diff_field_extensions(&b, &r),
                    ..Default::default()
                };
                let empty = diff.url_diff.is_none()
                    && diff.description_diff.is_none()
                    && diff.extensions_diff.is_none();
                (!empty).then_some(diff)
            }
        }
    }

    pub(crate) fn diff_tags(
        &self,
        base: &[Tag],
        revision: &[Tag],
    ) -> Option<TagsDiff> {
        MapDiff::compare(
            base.iter().map(|tag| (tag.name.clone(), tag)),
            revision.iter().map(|tag| (tag.name.clone(), tag)),
            |b, r| {
                let diff = TagDiff {
                    description_diff: self.diff_description(
                        b.description.as_ref(),
                        r.description.as_ref(),
                    ),
                    external_docs_diff: self.diff_external_docs(
                        b.external_docs.as_ref(),
                        r.external_docs.as_ref(),
                    ),
                    extensions_diff: self
                        .diff_extensions(&b.extensions, &r.extensions),
                };
                let empty = diff.description_diff.is_none()
                    && diff.external_docs_diff.is_none()
                    && diff.extensions_diff.is_none();
                (!empty).then_some(diff)
            },
        )
    }
}

/// Compares a string-valued field of two objects
pub(crate) fn string_diff(
    base: &Fields,
    revision: &Fields,
    key: &str,
) -> Option<ValueDiff<String>> {
    ValueDiff::compare(base.string(key).as_ref(), revision.string(key).as_ref())
}

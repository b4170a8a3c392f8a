// Copyright 2025 Oxide Computer Company

//! Configuration for a comparison

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Controls what a comparison looks at and how paths are correlated
///
/// This type implements [`serde::Deserialize`] and [`serde::Serialize`] so
/// that it can be embedded in the consumer's own configuration.  For
/// example:
///
/// ```
/// use openapi_diff::DiffConfig;
/// use openapi_diff::ExcludeElement;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct MyCheckerConfig {
///     diff: DiffConfig,
///     /* ... (other app-specific config) */
/// }
///
/// fn main() -> Result<(), String> {
///     let my_config: MyCheckerConfig = toml::from_str(
///         r##"
///             [diff]
///             exclude = [ "description", "examples" ]
///             path-prefix-revision = "/v2"
///         "##
///     ).map_err(|error| format!("parsing config: {}", error))?;
///
///     let diff_config = &my_config.diff;
///     assert!(diff_config.is_excluded(ExcludeElement::Examples));
///     assert!(!diff_config.is_excluded(ExcludeElement::Title));
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiffConfig {
    /// elements that are never compared anywhere in the document
    pub exclude: BTreeSet<ExcludeElement>,
    /// prepended to every path of the base document before correlation
    pub path_prefix_base: Option<String>,
    /// prepended to every path of the revision before correlation
    pub path_prefix_revision: Option<String>,
    /// stripped from every path of the base document before correlation
    pub path_strip_prefix_base: Option<String>,
    /// stripped from every path of the revision before correlation
    pub path_strip_prefix_revision: Option<String>,
}

/// A kind of element that can be left out of a comparison
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExcludeElement {
    /// `description` fields
    Description,
    /// `example` and `examples` fields, including `components/examples`
    Examples,
    /// `x-*` extension fields
    Extensions,
    /// paths and operations; only document-wide sections are compared
    Endpoints,
    /// `summary` fields
    Summary,
    /// `title` fields
    Title,
}

/// Which document of the comparison a path belongs to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Base,
    Revision,
}

impl DiffConfig {
    pub fn is_excluded(&self, element: ExcludeElement) -> bool {
        self.exclude.contains(&element)
    }

    /// Returns a copy of this configuration that also excludes `element`
    pub fn with_exclude(mut self, element: ExcludeElement) -> DiffConfig {
        self.exclude.insert(element);
        self
    }

    /// Returns the key under which a path of the given document is
    /// correlated: first the configured prefix is stripped (if the path has
    /// it), then the configured prefix is prepended.
    pub(crate) fn path_key(&self, side: Side, path: &str) -> String {
        let stripped = self.strip_prefix(side, path).unwrap_or(path);
        match self.prefixes(side).1 {
            Some(prefix) => format!("{}{}", prefix, stripped),
            None => stripped.to_owned(),
        }
    }

    /// Returns `path` without the prefix configured to be stripped from the
    /// paths of `side`, or `None` if `path` does not have that prefix
    pub(crate) fn strip_prefix<'p>(
        &self,
        side: Side,
        path: &'p str,
    ) -> Option<&'p str> {
        let strip = self.prefixes(side).0?;
        path.strip_prefix(strip)
    }

    fn prefixes(&self, side: Side) -> (Option<&str>, Option<&str>) {
        match side {
            Side::Base => (
                self.path_strip_prefix_base.as_deref(),
                self.path_prefix_base.as_deref(),
            ),
            Side::Revision => (
                self.path_strip_prefix_revision.as_deref(),
                self.path_prefix_revision.as_deref(),
            ),
        }
    }
}

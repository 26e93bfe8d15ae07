//! Non-fatal problems collected during a conversion.
//!
//! Diagnostics are threaded through every codec call and returned with the
//! converted tree. Nothing here aborts a conversion.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// A single recoverable problem found while converting a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An attribute value matched no coercion rule, or its key is not in
    /// the element's spec. The value was kept as a string.
    AttributeSpecViolation {
        tag: String,
        key: String,
        value: String,
    },
    /// Several variant rules matched; the last registered one was used.
    AmbiguousVariant {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    /// Elements with this tag were converted by the default codec.
    UnregisteredCodec { tag: String },
    /// Embedded markup did not have the expected single-element shape.
    MalformedEmbeddedContent {
        tag: String,
        children: usize,
        detail: String,
    },
    /// A generic node was found where a domain node was expected.
    ApiMisuse { tag: String, message: String },
}

impl Diagnostic {
    /// Short machine-friendly name of the diagnostic kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AttributeSpecViolation { .. } => "attribute_spec_violation",
            Self::AmbiguousVariant { .. } => "ambiguous_variant",
            Self::UnregisteredCodec { .. } => "unregistered_codec",
            Self::MalformedEmbeddedContent { .. } => "malformed_embedded_content",
            Self::ApiMisuse { .. } => "api_misuse",
        }
    }

    /// Tag of the element the diagnostic is about.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::AttributeSpecViolation { tag, .. }
            | Self::AmbiguousVariant { tag, .. }
            | Self::UnregisteredCodec { tag }
            | Self::MalformedEmbeddedContent { tag, .. }
            | Self::ApiMisuse { tag, .. } => tag,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeSpecViolation { tag, key, value } => {
                write!(f, "attribute {key}=\"{value}\" is not valid for <{tag}>")
            }
            Self::AmbiguousVariant { tag, attributes } => {
                write!(f, "<{tag}> matches several variants with attributes {attributes:?}")
            }
            Self::UnregisteredCodec { tag } => {
                write!(f, "<{tag}> has no codec, converted with the default codec")
            }
            Self::MalformedEmbeddedContent {
                tag,
                children,
                detail,
            } => write!(f, "<{tag}> embeds {children} element(s): {detail}"),
            Self::ApiMisuse { tag, message } => write!(f, "<{tag}>: {message}"),
        }
    }
}

/// Ordered list of diagnostics produced by one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            kind = diagnostic.kind(),
            tag = %diagnostic.tag(),
            "{diagnostic}"
        );
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Number of diagnostics of the given kind (see [`Diagnostic::kind`]).
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.0.iter().filter(|d| d.kind() == kind).count()
    }

    /// Tags reported as converted by the default codec.
    #[must_use]
    pub fn unregistered_tags(&self) -> BTreeSet<&str> {
        self.0
            .iter()
            .filter_map(|d| match d {
                Diagnostic::UnregisteredCodec { tag } => Some(tag.as_str()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Accumulator for tags converted without a specific codec.
///
/// Collecting the tags and reporting them once per conversion keeps a
/// document with thousands of unknown elements down to one entry per tag.
#[derive(Debug, Clone, Default)]
pub struct UnregisteredTags {
    tags: BTreeSet<String>,
}

impl UnregisteredTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `tag`. Returns `true` the first time a tag is seen.
    pub fn record(&mut self, tag: &str) -> bool {
        if self.tags.contains(tag) {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    /// Take every recorded tag, leaving the accumulator empty.
    pub fn drain(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.tags)
    }
}

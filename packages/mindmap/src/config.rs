//! Configuration constants and conversion options.

/// Comment placed at the top of every encoded map.
pub const ADVISORY_COMMENT: &str = "To view this file, download free mind mapping software \
Freeplane from http://freeplane.sourceforge.net";

/// Whitespace written between elements when encoding.
pub const LAYOUT_NEWLINE: &str = "\n";

/// Literals decoded as `false` by a boolean coercion rule.
///
/// Any other non-empty string is truthy, so these have to be caught first.
pub const FALSE_LITERALS: &[&str] = &["false", "False", "FALSE"];

/// Child order applied by codecs that do not declare their own.
///
/// Children with these tags are moved to the end in list order, so the
/// first tags end up earliest. Unlisted tags stay in front.
pub const BASE_CHILD_ORDER: &[&str] = &[
    "arrowlink",
    "cloud",
    "edge",
    "properties",
    "map_styles",
    "icon",
    "attribute_layout",
    "attribute",
    "hook",
    "font",
    "stylenode",
    "richcontent",
    "node",
];

/// Child order for `<node>` elements: decorations first, child nodes and
/// attributes last.
pub const NODE_CHILD_ORDER: &[&str] = &[
    "arrowlink",
    "cloud",
    "edge",
    "font",
    "hook",
    "properties",
    "richcontent",
    "icon",
    "node",
    "attribute_layout",
    "attribute",
];

/// Options controlling how a [`TreeConverter`](crate::registry::TreeConverter) reacts to misuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Abort on API misuse instead of recording a diagnostic and continuing.
    pub strict: bool,
}

impl ConverterOptions {
    /// Lenient options: every problem becomes a diagnostic.
    #[must_use]
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Strict options: API misuse is a fatal error.
    #[must_use]
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_lenient() {
        assert_eq!(ConverterOptions::default(), ConverterOptions::lenient());
        assert!(ConverterOptions::strict().strict);
    }

    #[test]
    fn test_node_order_ends_with_attributes() {
        assert_eq!(NODE_CHILD_ORDER.last(), Some(&"attribute"));
        assert!(BASE_CHILD_ORDER.contains(&"richcontent"));
    }
}

//! Disambiguation between element types that share a tag.

use indexmap::IndexMap;
use regex::Regex;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::element::ElementType;
use crate::error::Result;

/// A candidate type and the attribute patterns that select it.
///
/// Every pattern must match: the attribute has to be present and the
/// pattern has to match its whole value.
#[derive(Debug, Clone)]
pub struct VariantRule {
    candidate: ElementType,
    matcher: Vec<(String, Regex)>,
}

impl VariantRule {
    /// Build a rule from `(attribute name, pattern)` pairs.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a pattern is not a valid regex.
    pub fn new<'a>(
        candidate: ElementType,
        matcher: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let matcher = matcher
            .into_iter()
            .map(|(name, pattern)| -> Result<(String, Regex)> {
                let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
                Ok((name.to_string(), anchored))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { candidate, matcher })
    }

    #[must_use]
    pub fn candidate(&self) -> &ElementType {
        &self.candidate
    }

    /// Check whether every pattern matches `attributes`.
    #[must_use]
    pub fn matches(&self, attributes: &IndexMap<String, String>) -> bool {
        self.matcher.iter().all(|(name, pattern)| {
            attributes
                .get(name)
                .is_some_and(|value| pattern.is_match(value))
        })
    }
}

/// Chooses the concrete type for an element of one tag.
#[derive(Debug, Clone)]
pub struct VariantResolver {
    base: ElementType,
    rules: Vec<VariantRule>,
}

impl VariantResolver {
    #[must_use]
    pub fn new(base: ElementType) -> Self {
        Self {
            base,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: VariantRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn add_rule(&mut self, rule: VariantRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn base(&self) -> &ElementType {
        &self.base
    }

    #[must_use]
    pub fn rules(&self) -> &[VariantRule] {
        &self.rules
    }

    /// Resolve the type for an element with `tag` and `attributes`.
    ///
    /// When several rules qualify, an `AmbiguousVariant` diagnostic is
    /// recorded and the last registered one wins. Without a match the base
    /// type is returned.
    pub fn resolve(
        &self,
        tag: &str,
        attributes: &IndexMap<String, String>,
        diagnostics: &mut Diagnostics,
    ) -> ElementType {
        let qualifying: Vec<&VariantRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(attributes))
            .collect();

        if qualifying.len() > 1 {
            diagnostics.push(Diagnostic::AmbiguousVariant {
                tag: tag.to_string(),
                attributes: attributes.clone(),
            });
        }

        qualifying
            .last()
            .map_or_else(|| self.base.clone(), |rule| rule.candidate.clone())
    }
}

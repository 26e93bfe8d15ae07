//! Element types: the identity, tag and attribute spec of a domain node.

use std::fmt;
use std::sync::Arc;

use crate::coercion::AttributeSpec;

#[derive(Debug)]
struct TypeDef {
    name: &'static str,
    tag: &'static str,
    spec: AttributeSpec,
}

/// A domain element type.
///
/// Cheap to clone; two handles are equal when they share name and tag.
/// Several types may share a tag (variants), and the fallback type used
/// for unknown elements has an empty tag.
#[derive(Clone)]
pub struct ElementType(Arc<TypeDef>);

impl ElementType {
    pub fn new(name: &'static str, tag: &'static str, spec: AttributeSpec) -> Self {
        Self(Arc::new(TypeDef { name, tag, spec }))
    }

    /// Type name, e.g. `"NodeText"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// Tag written for elements of this type.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.0.tag
    }

    #[must_use]
    pub fn spec(&self) -> &AttributeSpec {
        &self.0.spec
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || (self.0.name == other.0.name && self.0.tag == other.0.tag)
    }
}

impl Eq for ElementType {}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementType")
            .field("name", &self.0.name)
            .field("tag", &self.0.tag)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

//! Codec registry for mapping tag names to codecs.

use std::collections::{HashMap, HashSet};

use super::codec::{Codec, ElementCodec};
use crate::catalog;

/// Registry mapping element tags to codecs.
///
/// Each tag has at most one codec; variants sharing a tag are resolved by
/// that codec. Tags without a codec fall back to a shared default codec.
/// The registry holds no per-conversion state and can be shared between
/// threads.
pub struct Registry {
    codecs: HashMap<String, Box<dyn Codec>>,
    default: ElementCodec,
}

impl Registry {
    /// Create an empty registry with the default codec only.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
            default: ElementCodec::new(catalog::base_element()),
        }
    }

    /// Register a codec under the tag of its base type.
    ///
    /// A codec registered earlier for the same tag is replaced.
    pub fn register(&mut self, codec: impl Codec + 'static) {
        let tag = codec.element_type().tag().to_string();
        if self.codecs.insert(tag.clone(), Box::new(codec)).is_some() {
            tracing::debug!(tag = %tag, "replaced registered codec");
        }
    }

    /// Get the codec for `tag`, or the default codec.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> &dyn Codec {
        match self.codecs.get(tag) {
            Some(codec) => codec.as_ref(),
            None => &self.default,
        }
    }

    /// Check if a codec is registered for a tag.
    #[must_use]
    pub fn has_codec(&self, tag: &str) -> bool {
        self.codecs.contains_key(tag)
    }

    /// Return set of all registered tag names.
    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&str> {
        self.codecs.keys().map(String::as_str).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

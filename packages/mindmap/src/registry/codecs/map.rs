//! Codec for the `<map>` root element.

use crate::catalog;
use crate::config::{ADVISORY_COMMENT, LAYOUT_NEWLINE};
use crate::element::ElementType;
use crate::node::{GenericNode, GenericTree};
use crate::registry::codec::{apply_layout, Codec, ElementCodec, Finish};
use crate::registry::context::ConversionContext;
use crate::tree::NodeId;

/// Writes the advisory comment as the first child of every encoded map.
#[derive(Debug, Clone)]
pub struct MapCodec {
    inner: ElementCodec,
}

impl MapCodec {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ElementCodec::new(catalog::map()),
        }
    }
}

impl Default for MapCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for MapCodec {
    fn element_type(&self) -> &ElementType {
        self.inner.element_type()
    }

    /// Whitespace-only text is reset, since the comment tail read back from
    /// a previous write ends up in it.
    fn finish_encode(&self, _cx: &mut ConversionContext, tree: &mut GenericTree, id: NodeId) -> Finish {
        if let Some(node) = tree.get_mut(id) {
            if node.text.as_deref().is_some_and(|text| text.trim().is_empty()) {
                node.text = None;
            }
        }
        apply_layout(tree, id);
        tree.insert(id, 0, GenericNode::comment(ADVISORY_COMMENT).with_tail(LAYOUT_NEWLINE));
        Finish::Keep
    }
}

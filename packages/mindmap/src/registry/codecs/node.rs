//! Codec for `<node>` elements.

use indexmap::IndexMap;

use crate::catalog;
use crate::coercion::AttrValue;
use crate::config::NODE_CHILD_ORDER;
use crate::element::ElementType;
use crate::node::{DomainNode, DomainTree, GenericNode};
use crate::registry::codec::{encode_element, Codec, ElementCodec, Finish};
use crate::registry::context::ConversionContext;
use crate::tree::NodeId;
use crate::xml::is_markup;

const TEXT: &str = "TEXT";
const LOCALIZED_TEXT: &str = "LOCALIZED_TEXT";

/// Node codec.
///
/// A node's text lives in its `TEXT` attribute. Markup text is stored by
/// Freeplane in a `<richcontent TYPE="NODE">` child instead; decoding hoists
/// that child back into `TEXT` and encoding moves markup out again.
#[derive(Debug, Clone)]
pub struct NodeCodec {
    inner: ElementCodec,
    node_text: ElementType,
}

impl NodeCodec {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: ElementCodec::new(catalog::node()).with_child_order(NODE_CHILD_ORDER),
            node_text: catalog::node_text(),
        }
    }
}

impl Default for NodeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for NodeCodec {
    fn element_type(&self) -> &ElementType {
        self.inner.element_type()
    }

    fn child_order(&self) -> &[&'static str] {
        self.inner.child_order()
    }

    /// `LOCALIZED_TEXT` is the older name of `TEXT`.
    fn prepare_attributes(&self, attributes: &mut IndexMap<String, String>) {
        if attributes.contains_key(TEXT) {
            return;
        }
        if let Some((index, _, value)) = attributes.shift_remove_full(LOCALIZED_TEXT) {
            attributes.shift_insert(index, TEXT.to_string(), value);
        }
    }

    fn finish_decode(&self, _cx: &mut ConversionContext, tree: &mut DomainTree, id: NodeId) -> Finish {
        // Without markup the child is kept as it is
        let node_text = &self.node_text;
        for child in tree.find_children(id, |child| child.is(node_text) && child.html.is_some()) {
            let Some(html) = tree.remove(child).and_then(|removed| removed.html) else {
                continue;
            };
            if let Some(node) = tree.get_mut(id) {
                node.attrib.insert(TEXT.to_string(), AttrValue::Str(html));
            }
        }
        Finish::Keep
    }

    fn encode_node(
        &self,
        cx: &mut ConversionContext,
        tree: &mut DomainTree,
        id: NodeId,
    ) -> Option<GenericNode> {
        let markup = tree
            .get(id)?
            .attr(TEXT)
            .and_then(AttrValue::as_str)
            .filter(|text| is_markup(text))
            .map(str::to_string);

        if let Some(html) = markup {
            tree.get_mut(id)?.attrib.shift_remove(TEXT);
            let rich = DomainNode::new(self.node_text.clone())
                .with_attr("TYPE", "NODE")
                .with_html(html);
            tree.append(id, rich);
        }
        encode_element(self, cx, tree, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterOptions;
    use crate::tree::Tree;

    fn cx() -> ConversionContext {
        ConversionContext::new(ConverterOptions::default())
    }

    #[test]
    fn test_localized_text_renamed_in_place() {
        let mut attributes: IndexMap<String, String> = [("ID", "a"), ("LOCALIZED_TEXT", "x"), ("FOLDED", "true")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeCodec::new().prepare_attributes(&mut attributes);
        let keys: Vec<_> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ID", "TEXT", "FOLDED"]);
    }

    #[test]
    fn test_existing_text_wins_over_localized() {
        let mut attributes: IndexMap<String, String> = [("TEXT", "a"), ("LOCALIZED_TEXT", "b")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeCodec::new().prepare_attributes(&mut attributes);
        assert_eq!(attributes["TEXT"], "a");
        assert!(attributes.contains_key("LOCALIZED_TEXT"));
    }

    #[test]
    fn test_finish_decode_hoists_node_text() {
        let codec = NodeCodec::new();
        let mut tree = Tree::new(DomainNode::new(catalog::node()));
        let root = tree.root();
        tree.append(root, DomainNode::new(catalog::node_text()).with_html("<b>bold</b>"));
        tree.append(root, DomainNode::new(catalog::node_note()).with_html("<p>note</p>"));

        assert_eq!(codec.finish_decode(&mut cx(), &mut tree, root), Finish::Keep);
        assert_eq!(tree[root].attr("TEXT"), Some(&AttrValue::Str("<b>bold</b>".to_string())));
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn test_node_text_without_markup_not_hoisted() {
        let codec = NodeCodec::new();
        let mut tree = Tree::new(DomainNode::new(catalog::node()).with_attr("TEXT", "keep"));
        let root = tree.root();
        let mut plain = DomainNode::new(catalog::node_text());
        plain.text = Some("plain".to_string());
        tree.append(root, plain);

        codec.finish_decode(&mut cx(), &mut tree, root);
        assert_eq!(tree[root].attr("TEXT"), Some(&AttrValue::Str("keep".to_string())));
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        assert_eq!(tree[children[0]].text.as_deref(), Some("plain"));
    }

    #[test]
    fn test_encode_moves_markup_text_to_child() {
        let codec = NodeCodec::new();
        let mut tree = Tree::new(DomainNode::new(catalog::node()).with_attr("TEXT", "<b>bold</b>"));
        let root = tree.root();

        let encoded = codec.encode_node(&mut cx(), &mut tree, root).unwrap();
        assert!(!encoded.attributes.contains_key("TEXT"));
        let children = tree.children(root);
        assert_eq!(children.len(), 1);
        assert!(tree[children[0]].is(&catalog::node_text()));
        assert_eq!(tree[children[0]].html.as_deref(), Some("<b>bold</b>"));
    }

    #[test]
    fn test_encode_plain_text_stays_attribute() {
        let codec = NodeCodec::new();
        let mut tree = Tree::new(DomainNode::new(catalog::node()).with_attr("TEXT", "a < b"));
        let root = tree.root();

        let encoded = codec.encode_node(&mut cx(), &mut tree, root).unwrap();
        assert_eq!(encoded.attributes["TEXT"], "a < b");
        assert!(tree.children(root).is_empty());
    }
}

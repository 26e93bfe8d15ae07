//! Codec trait definition and the base element behaviour.

use indexmap::IndexMap;

use super::context::ConversionContext;
use crate::coercion::{decode_attributes, encode_attributes};
use crate::config::{BASE_CHILD_ORDER, LAYOUT_NEWLINE};
use crate::element::ElementType;
use crate::node::{DomainTree, GenericNode, GenericTree, NodeKind, NodeOrigin, DomainNode};
use crate::tree::NodeId;
use crate::variant::{VariantResolver, VariantRule};

/// Outcome of a finishing hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// Keep the node and finish its children next.
    Keep,
    /// Keep the node but leave its children as they are.
    Seal,
    /// Remove the node and its whole subtree.
    Prune,
}

/// Decode/encode behaviour of one element type.
///
/// Every method has a default implementing the plain element behaviour, so
/// a codec only overrides the steps that are special for its type. The
/// converter calls `decode_node`/`encode_node` for every node in a first
/// pass and `finish_decode`/`finish_encode` in a second pass, once the
/// whole tree has its new shape.
pub trait Codec: Send + Sync {
    /// Base type produced when no variant matches. Its tag is the registry key.
    fn element_type(&self) -> &ElementType;

    /// Variant rules for elements sharing the tag.
    fn resolver(&self) -> Option<&VariantResolver> {
        None
    }

    /// Tags moved to the end, in order, when encoding children.
    fn child_order(&self) -> &[&'static str] {
        BASE_CHILD_ORDER
    }

    /// Tags written last; the first entry ends up as the very last child.
    fn reverse_child_order(&self) -> &[&'static str] {
        &[]
    }

    /// When true the converter does not descend into the source children;
    /// the codec consumed them itself.
    fn absorbs_children(&self) -> bool {
        false
    }

    /// Adjust raw attributes before they are coerced.
    fn prepare_attributes(&self, _attributes: &mut IndexMap<String, String>) {}

    /// Pick the concrete type for an element.
    fn resolve_type(
        &self,
        tag: &str,
        attributes: &IndexMap<String, String>,
        cx: &mut ConversionContext,
    ) -> ElementType {
        match self.resolver() {
            Some(resolver) => resolver.resolve(tag, attributes, cx.diagnostics_mut()),
            None => self.element_type().clone(),
        }
    }

    /// Convert one generic node. `None` drops it together with its subtree.
    fn decode_node(
        &self,
        cx: &mut ConversionContext,
        source: &GenericTree,
        id: NodeId,
    ) -> Option<DomainNode> {
        decode_element(self, cx, source.get(id)?)
    }

    fn finish_decode(&self, _cx: &mut ConversionContext, _tree: &mut DomainTree, _id: NodeId) -> Finish {
        Finish::Keep
    }

    /// Convert one domain node. The tree is the converter's private copy and
    /// may be reshaped below `id`.
    fn encode_node(
        &self,
        cx: &mut ConversionContext,
        tree: &mut DomainTree,
        id: NodeId,
    ) -> Option<GenericNode> {
        encode_element(self, cx, tree, id)
    }

    fn finish_encode(&self, _cx: &mut ConversionContext, tree: &mut GenericTree, id: NodeId) -> Finish {
        apply_layout(tree, id);
        Finish::Keep
    }

    /// Reorder the children of `id` for writing.
    fn order_children(&self, tree: &mut DomainTree, id: NodeId) {
        order_children(tree, id, self.child_order(), self.reverse_child_order());
    }
}

/// Plain element decode: resolve the type, coerce attributes and carry
/// `text`/`tail`. Comments are dropped.
pub fn decode_element<C: Codec + ?Sized>(
    codec: &C,
    cx: &mut ConversionContext,
    source: &GenericNode,
) -> Option<DomainNode> {
    if source.kind == NodeKind::Comment {
        return None;
    }

    let mut attributes = source.attributes.clone();
    codec.prepare_attributes(&mut attributes);
    let element_type = codec.resolve_type(&source.tag, &attributes, cx);
    let attrib = decode_attributes(&source.tag, element_type.spec(), &attributes, cx.diagnostics_mut());

    let mut node = DomainNode::new(element_type);
    node.attrib = attrib;
    node.text.clone_from(&source.text);
    node.tail.clone_from(&source.tail);

    if node.tag != source.tag {
        cx.record_unregistered(&source.tag);
        node.tag.clone_from(&source.tag);
    }
    Some(node)
}

/// Plain element encode: order children, render attributes and carry
/// `text`/`tail`.
pub fn encode_element<C: Codec + ?Sized>(
    codec: &C,
    cx: &mut ConversionContext,
    tree: &mut DomainTree,
    id: NodeId,
) -> Option<GenericNode> {
    codec.order_children(tree, id);
    let node = tree.get(id)?;

    if node.origin == NodeOrigin::Generic {
        cx.misuse(
            &node.tag,
            "a generic node was placed in the domain tree; it is encoded as-is and its \
             text/tail formatting may be lost. Attach generic content in a finishing hook instead",
        );
    }
    if node.tag != codec.element_type().tag() {
        cx.record_unregistered(&node.tag);
    }

    let attributes = encode_attributes(&node.tag, node.element_type.spec(), &node.attrib, cx.diagnostics_mut());
    Some(GenericNode {
        kind: NodeKind::Element,
        tag: node.tag.clone(),
        attributes,
        text: node.text.clone(),
        tail: node.tail.clone(),
    })
}

/// Put newlines around elements so the written file is readable.
///
/// Only fills `text` for nodes with children, and never overwrites content.
pub fn apply_layout(tree: &mut GenericTree, id: NodeId) {
    let has_children = !tree.children(id).is_empty();
    let Some(node) = tree.get_mut(id) else {
        return;
    };
    if has_children && node.text.as_deref().is_none_or(str::is_empty) {
        node.text = Some(LAYOUT_NEWLINE.to_string());
    }
    if node.tail.as_deref().is_none_or(str::is_empty) {
        node.tail = Some(LAYOUT_NEWLINE.to_string());
    }
}

/// Stable move-to-end of children by tag.
///
/// Tags of `order` are moved in list order, then tags of `reverse_order`
/// in reverse list order. Children with unlisted tags keep their place at
/// the front.
pub fn order_children(tree: &mut DomainTree, id: NodeId, order: &[&str], reverse_order: &[&str]) {
    let mut children: Vec<(NodeId, String)> = tree
        .children(id)
        .iter()
        .filter_map(|&child| tree.get(child).map(|node| (child, node.tag.clone())))
        .collect();

    for tag in order.iter().chain(reverse_order.iter().rev()) {
        let (moved, mut kept): (Vec<_>, Vec<_>) =
            children.into_iter().partition(|(_, child_tag)| child_tag == tag);
        kept.extend(moved);
        children = kept;
    }

    tree.set_children(id, children.into_iter().map(|(child, _)| child).collect());
}

/// Codec for element types without special behaviour.
#[derive(Debug, Clone)]
pub struct ElementCodec {
    resolver: VariantResolver,
    child_order: &'static [&'static str],
    reverse_child_order: &'static [&'static str],
}

impl ElementCodec {
    #[must_use]
    pub fn new(element_type: ElementType) -> Self {
        Self {
            resolver: VariantResolver::new(element_type),
            child_order: BASE_CHILD_ORDER,
            reverse_child_order: &[],
        }
    }

    /// Add a variant; later variants win ties.
    #[must_use]
    pub fn with_variant(mut self, rule: VariantRule) -> Self {
        self.resolver.add_rule(rule);
        self
    }

    #[must_use]
    pub fn with_child_order(mut self, order: &'static [&'static str]) -> Self {
        self.child_order = order;
        self
    }

    #[must_use]
    pub fn with_reverse_child_order(mut self, order: &'static [&'static str]) -> Self {
        self.reverse_child_order = order;
        self
    }
}

impl Codec for ElementCodec {
    fn element_type(&self) -> &ElementType {
        self.resolver.base()
    }

    fn resolver(&self) -> Option<&VariantResolver> {
        Some(&self.resolver)
    }

    fn child_order(&self) -> &[&'static str] {
        self.child_order
    }

    fn reverse_child_order(&self) -> &[&'static str] {
        self.reverse_child_order
    }
}

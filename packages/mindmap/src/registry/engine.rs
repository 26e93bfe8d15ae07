//! Tree converter that drives whole-document decode and encode.

use std::collections::VecDeque;
use std::sync::Arc;

use super::codec::{Codec, Finish};
use super::context::ConversionContext;
use super::core::Registry;
use crate::config::ConverterOptions;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, TranscodeError};
use crate::node::{DomainTree, GenericTree, Tagged};
use crate::tree::{NodeId, Tree};

/// A converted tree and the diagnostics collected while converting it.
#[derive(Debug, Clone)]
pub struct Conversion<T> {
    pub tree: T,
    pub diagnostics: Diagnostics,
}

/// Converter between generic and domain trees.
///
/// Both directions run two breadth-first passes driven by work queues:
/// a structural pass that converts node by node, and a finishing pass in
/// which codecs may rewrite or prune the converted nodes. The caller's
/// tree is copied first and never mutated.
#[derive(Clone)]
pub struct TreeConverter {
    registry: Arc<Registry>,
    options: ConverterOptions,
}

impl TreeConverter {
    /// Create a new converter owning `registry`.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self::with_shared(Arc::new(registry))
    }

    /// Create a converter using a registry shared with other converters.
    #[must_use]
    pub fn with_shared(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            options: ConverterOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ConverterOptions) -> Self {
        self.options = options;
        self
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> ConverterOptions {
        self.options
    }

    /// Decode a generic tree into a domain tree.
    ///
    /// # Errors
    /// Returns `RootDropped` if the root element is dropped or pruned, and
    /// `ApiMisuse` in strict mode.
    pub fn decode(&self, source: &GenericTree) -> Result<Conversion<DomainTree>> {
        let mut cx = ConversionContext::new(self.options);
        let mut source = source.clone();
        tracing::debug!(nodes = source.len(), "decoding tree");

        let mut tree = self.structural_pass(&mut cx, &mut source, |codec, cx, tree, id| {
            codec.decode_node(cx, tree, id)
        })?;
        self.finishing_pass(&mut cx, &mut tree, |codec, cx, tree, id| {
            codec.finish_decode(cx, tree, id)
        })?;

        Ok(Conversion {
            tree,
            diagnostics: cx.into_diagnostics(),
        })
    }

    /// Encode a domain tree into a generic tree.
    ///
    /// # Errors
    /// Returns `RootDropped` if the root element is dropped or pruned, and
    /// `ApiMisuse` in strict mode.
    pub fn encode(&self, source: &DomainTree) -> Result<Conversion<GenericTree>> {
        let mut cx = ConversionContext::new(self.options);
        let mut source = source.clone();
        tracing::debug!(nodes = source.len(), "encoding tree");

        let mut tree = self.structural_pass(&mut cx, &mut source, |codec, cx, tree, id| {
            codec.encode_node(cx, tree, id)
        })?;
        self.finishing_pass(&mut cx, &mut tree, |codec, cx, tree, id| {
            codec.finish_encode(cx, tree, id)
        })?;

        Ok(Conversion {
            tree,
            diagnostics: cx.into_diagnostics(),
        })
    }

    /// Pass 1: convert every node, parents before children.
    ///
    /// The conversion of a node runs before its children are read, so a
    /// codec may reshape the children of the node it converts. A node
    /// converted to `None` is dropped and its children are never visited.
    fn structural_pass<S, T, F>(
        &self,
        cx: &mut ConversionContext,
        source: &mut Tree<S>,
        convert: F,
    ) -> Result<Tree<T>>
    where
        S: Tagged,
        F: Fn(&dyn Codec, &mut ConversionContext, &mut Tree<S>, NodeId) -> Option<T>,
    {
        let source_root = source.root();
        let root_tag = source[source_root].tag().to_string();
        let codec = self.registry.lookup(&root_tag);
        let converted = convert(codec, cx, source, source_root);
        cx.check_fatal()?;
        let Some(root) = converted else {
            return Err(TranscodeError::RootDropped { tag: root_tag });
        };

        let mut target = Tree::new(root);
        let mut queue = VecDeque::new();
        if !codec.absorbs_children() {
            queue.push_back((source_root, target.root()));
        }

        while let Some((from, to)) = queue.pop_front() {
            let children = source.children(from).to_vec();
            for child in children {
                let Some(tag) = source.get(child).map(|node| node.tag().to_string()) else {
                    continue;
                };
                let codec = self.registry.lookup(&tag);
                let converted = convert(codec, cx, source, child);
                cx.check_fatal()?;

                match converted {
                    Some(node) => {
                        let id = target.append(to, node);
                        if !codec.absorbs_children() {
                            queue.push_back((child, id));
                        }
                    }
                    None => tracing::trace!(tag = %tag, "dropped during conversion"),
                }
            }
        }
        Ok(target)
    }

    /// Pass 2: run finishing hooks, parents before children.
    ///
    /// Children are read after the hook ran, so nodes a hook inserted are
    /// finished as well. Pruned nodes are removed with their subtree and
    /// sealed nodes are kept without visiting their children.
    fn finishing_pass<T, F>(&self, cx: &mut ConversionContext, tree: &mut Tree<T>, finish: F) -> Result<()>
    where
        T: Tagged,
        F: Fn(&dyn Codec, &mut ConversionContext, &mut Tree<T>, NodeId) -> Finish,
    {
        let mut queue = VecDeque::from([tree.root()]);

        while let Some(id) = queue.pop_front() {
            let Some(tag) = tree.get(id).map(|node| node.tag().to_string()) else {
                continue;
            };
            let codec = self.registry.lookup(&tag);
            let outcome = finish(codec, cx, tree, id);
            cx.check_fatal()?;

            match outcome {
                Finish::Keep => queue.extend(tree.children(id).iter().copied()),
                Finish::Seal => {}
                Finish::Prune => {
                    if id == tree.root() {
                        return Err(TranscodeError::RootDropped { tag });
                    }
                    tracing::trace!(tag = %tag, "pruned during finishing");
                    tree.remove(id);
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TreeConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeConverter")
            .field("registered_tags", &self.registry.registered_tags().len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::AttributeSpec;
    use crate::element::ElementType;
    use crate::node::{DomainNode, GenericNode};
    use crate::registry::codec::ElementCodec;
    use pretty_assertions::assert_eq;

    fn plain(name: &'static str, tag: &'static str) -> ElementCodec {
        ElementCodec::new(ElementType::new(name, tag, AttributeSpec::new()))
    }

    /// Drops every `<secret>` element in pass 1.
    struct DropCodec;

    impl Codec for DropCodec {
        fn element_type(&self) -> &ElementType {
            static TYPE: std::sync::LazyLock<ElementType> =
                std::sync::LazyLock::new(|| ElementType::new("Secret", "secret", AttributeSpec::new()));
            &TYPE
        }

        fn decode_node(
            &self,
            _cx: &mut ConversionContext,
            _source: &GenericTree,
            _id: NodeId,
        ) -> Option<DomainNode> {
            None
        }
    }

    /// Prunes every `<draft>` element in pass 2.
    struct PruneCodec {
        inner: ElementCodec,
    }

    impl Codec for PruneCodec {
        fn element_type(&self) -> &ElementType {
            self.inner.element_type()
        }

        fn finish_decode(&self, _cx: &mut ConversionContext, _tree: &mut DomainTree, _id: NodeId) -> Finish {
            Finish::Prune
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(plain("Map", "map"));
        registry.register(plain("Node", "node"));
        registry.register(DropCodec);
        registry.register(PruneCodec {
            inner: plain("Draft", "draft"),
        });
        registry
    }

    fn tags<T: Tagged>(tree: &Tree<T>, id: NodeId) -> Vec<String> {
        tree.children(id).iter().map(|&c| tree[c].tag().to_string()).collect()
    }

    fn sample() -> GenericTree {
        let mut tree = GenericTree::new(GenericNode::new("map"));
        let root = tree.root();
        let a = tree.append(root, GenericNode::new("node").with_attribute("TEXT", "a"));
        tree.append(a, GenericNode::new("node").with_attribute("TEXT", "a1"));
        let secret = tree.append(root, GenericNode::new("secret"));
        tree.append(secret, GenericNode::new("node"));
        let draft = tree.append(root, GenericNode::new("draft"));
        tree.append(draft, GenericNode::new("node"));
        tree.append(root, GenericNode::new("node").with_attribute("TEXT", "b"));
        tree
    }

    #[test]
    fn test_decode_drops_and_prunes() {
        let converter = TreeConverter::new(registry());
        let source = sample();
        let decoded = converter.decode(&source).unwrap();
        let tree = &decoded.tree;
        let root = tree.root();

        assert_eq!(tags(tree, root), vec!["node", "node"]);
        assert_eq!(tree.len(), 4);
        let first = tree.children(root)[0];
        assert_eq!(tags(tree, first), vec!["node"]);
        assert!(decoded.diagnostics.is_empty());
    }

    /// Records the `TEXT` of every node it finishes.
    struct RecordingCodec {
        inner: ElementCodec,
        finished: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl Codec for RecordingCodec {
        fn element_type(&self) -> &ElementType {
            self.inner.element_type()
        }

        fn finish_decode(&self, _cx: &mut ConversionContext, tree: &mut DomainTree, id: NodeId) -> Finish {
            let text = tree[id].attr("TEXT").map(ToString::to_string).unwrap_or_default();
            self.finished.lock().unwrap().push(text);
            Finish::Keep
        }
    }

    #[test]
    fn test_pruned_subtree_never_finished() {
        let finished = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = registry();
        registry.register(RecordingCodec {
            inner: plain("Node", "node"),
            finished: Arc::clone(&finished),
        });
        let converter = TreeConverter::new(registry);

        let mut source = GenericTree::new(GenericNode::new("map"));
        let root = source.root();
        let a = source.append(root, GenericNode::new("node").with_attribute("TEXT", "a"));
        source.append(a, GenericNode::new("node").with_attribute("TEXT", "a1"));
        let draft = source.append(root, GenericNode::new("draft"));
        let d1 = source.append(draft, GenericNode::new("node").with_attribute("TEXT", "d1"));
        source.append(d1, GenericNode::new("node").with_attribute("TEXT", "d2"));
        let secret = source.append(root, GenericNode::new("secret"));
        source.append(secret, GenericNode::new("node").with_attribute("TEXT", "s1"));
        source.append(root, GenericNode::new("node").with_attribute("TEXT", "b"));

        let decoded = converter.decode(&source).unwrap();

        // Breadth-first, the draft's subtree and the secret's child skipped
        assert_eq!(*finished.lock().unwrap(), vec!["a", "b", "a1"]);
        let tree = &decoded.tree;
        assert_eq!(tags(tree, tree.root()), vec!["node", "node"]);
        let b = tree.children(tree.root())[1];
        assert_eq!(tree[b].attr("TEXT").map(ToString::to_string), Some("b".to_string()));
    }

    #[test]
    fn test_source_not_mutated() {
        let converter = TreeConverter::new(registry());
        let source = sample();
        let before = source.clone();
        converter.decode(&source).unwrap();
        assert_eq!(source.len(), before.len());
        assert_eq!(tags(&source, source.root()), tags(&before, before.root()));
    }

    #[test]
    fn test_root_dropped_is_error() {
        let converter = TreeConverter::new(registry());
        let source = GenericTree::new(GenericNode::new("secret"));
        assert!(matches!(
            converter.decode(&source),
            Err(TranscodeError::RootDropped { .. })
        ));

        let source = GenericTree::new(GenericNode::new("draft"));
        assert!(matches!(
            converter.decode(&source),
            Err(TranscodeError::RootDropped { .. })
        ));
    }

    #[test]
    fn test_unregistered_reported_once_per_tag() {
        let converter = TreeConverter::new(registry());
        let mut source = GenericTree::new(GenericNode::new("map"));
        let root = source.root();
        for _ in 0..3 {
            source.append(root, GenericNode::new("customplugin"));
        }

        let decoded = converter.decode(&source).unwrap();
        assert_eq!(decoded.diagnostics.count_kind("unregistered_codec"), 1);
        assert_eq!(tags(&decoded.tree, decoded.tree.root()), vec!["customplugin"; 3]);
    }

    #[test]
    fn test_encode_then_decode_keeps_order() {
        let converter = TreeConverter::new(registry());
        let source = sample();
        let decoded = converter.decode(&source).unwrap();
        let encoded = converter.encode(&decoded.tree).unwrap();
        let again = converter.decode(&encoded.tree).unwrap();

        let texts: Vec<_> = again
            .tree
            .iter()
            .filter_map(|(_, node)| node.attr("TEXT").map(ToString::to_string))
            .collect();
        assert_eq!(texts, vec!["a", "b", "a1"]);
    }

    #[test]
    fn test_deep_tree_round_trip() {
        let depth = 50_000;
        let mut source = GenericTree::new(GenericNode::new("map"));
        let mut current = source.root();
        for _ in 0..depth {
            current = source.append(current, GenericNode::new("node"));
        }

        let converter = TreeConverter::new(registry());
        let decoded = converter.decode(&source).unwrap();
        assert_eq!(decoded.tree.depth(), depth + 1);
        let encoded = converter.encode(&decoded.tree).unwrap();
        assert_eq!(encoded.tree.depth(), depth + 1);
    }

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreeConverter>();
    }
}

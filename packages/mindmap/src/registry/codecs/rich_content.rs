//! Codec for `<richcontent>` elements.
//!
//! The children of a rich-content element are an embedded markup document
//! (usually a single `<html>` element), not mind-map elements. Decoding
//! serializes them into the `html` field; encoding parses `html` back into
//! child content.

use crate::catalog;
use crate::config::LAYOUT_NEWLINE;
use crate::diagnostics::Diagnostic;
use crate::element::ElementType;
use crate::error::Result;
use crate::node::{DomainNode, DomainTree, GenericNode, GenericTree};
use crate::registry::codec::{apply_layout, decode_element, encode_element, Codec, ElementCodec, Finish};
use crate::registry::context::ConversionContext;
use crate::tree::NodeId;
use crate::variant::VariantResolver;
use crate::xml::{parse_fragment, write_subtree};

#[derive(Debug, Clone)]
pub struct RichContentCodec {
    inner: ElementCodec,
}

impl RichContentCodec {
    /// Rich-content codec with the `NODE`/`NOTE`/`DETAILS` variants.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a variant pattern does not compile.
    pub fn new() -> Result<Self> {
        let base = catalog::rich_content();
        let inner = catalog::variant_rules(&base)?
            .into_iter()
            .fold(ElementCodec::new(base), ElementCodec::with_variant);
        Ok(Self { inner })
    }
}

fn malformed(tag: &str, children: usize, detail: impl Into<String>) -> Diagnostic {
    Diagnostic::MalformedEmbeddedContent {
        tag: tag.to_string(),
        children,
        detail: detail.into(),
    }
}

impl Codec for RichContentCodec {
    fn element_type(&self) -> &ElementType {
        self.inner.element_type()
    }

    fn resolver(&self) -> Option<&VariantResolver> {
        self.inner.resolver()
    }

    fn absorbs_children(&self) -> bool {
        true
    }

    fn decode_node(
        &self,
        cx: &mut ConversionContext,
        source: &GenericTree,
        id: NodeId,
    ) -> Option<DomainNode> {
        let mut node = decode_element(self, cx, source.get(id)?)?;

        let children = source.children(id);
        let mut html = String::new();
        let mut elements = 0;
        for &child in children {
            if source.get(child).is_some_and(|c| !c.is_comment()) {
                elements += 1;
            }
            write_subtree(source, child, &mut html);
        }
        if elements != 1 {
            cx.report(malformed(
                &node.tag,
                elements,
                "expected exactly one embedded element, content was concatenated",
            ));
        }

        if !children.is_empty() {
            node.html = Some(html.trim().to_string());
        }
        Some(node)
    }

    fn encode_node(
        &self,
        cx: &mut ConversionContext,
        tree: &mut DomainTree,
        id: NodeId,
    ) -> Option<GenericNode> {
        let html = tree.get(id)?.html.clone();
        let mut encoded = encode_element(self, cx, tree, id)?;
        if html.is_some() {
            encoded.text = html;
        }
        Some(encoded)
    }

    fn finish_encode(&self, cx: &mut ConversionContext, tree: &mut GenericTree, id: NodeId) -> Finish {
        let Some(node) = tree.get_mut(id) else {
            return Finish::Seal;
        };
        let tag = node.tag.clone();
        let stash = node.text.replace(LAYOUT_NEWLINE.to_string());
        apply_layout(tree, id);

        let Some(markup) = stash.filter(|s| !s.trim().is_empty()) else {
            return Finish::Seal;
        };

        let fragment = match parse_fragment(&markup) {
            Ok(fragment) => fragment,
            Err(err) => {
                cx.report(malformed(&tag, 0, err.to_string()));
                if let Some(node) = tree.get_mut(id) {
                    node.text = Some(markup);
                }
                return Finish::Seal;
            }
        };

        // Bare text in front of the markup belongs to this element
        if let Some(text) = fragment[fragment.root()].text.as_ref() {
            if !text.trim().is_empty() {
                if let Some(node) = tree.get_mut(id) {
                    node.text = Some(text.clone());
                }
            }
        }

        let top = fragment.children(fragment.root());
        if top.len() != 1 {
            cx.report(malformed(&tag, top.len(), "embedded markup is not a single element"));
        }
        let mut last = None;
        for &child in top {
            last = tree.graft(id, &fragment, child).or(last);
        }
        if let Some(node) = last.and_then(|last| tree.get_mut(last)) {
            node.tail.get_or_insert_with(|| LAYOUT_NEWLINE.to_string());
        }
        Finish::Seal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterOptions;
    use crate::tree::Tree;
    use crate::xml::{parse_document, to_xml_string};

    fn cx() -> ConversionContext {
        ConversionContext::new(ConverterOptions::default())
    }

    #[test]
    fn test_decode_absorbs_markup() {
        let codec = RichContentCodec::new().unwrap();
        let source =
            parse_document("<richcontent TYPE=\"NOTE\">\n<html><body><p>hi</p></body></html>\n</richcontent>").unwrap();
        let mut cx = cx();

        let node = codec.decode_node(&mut cx, &source, source.root()).unwrap();
        assert!(node.is(&catalog::node_note()));
        assert_eq!(node.html.as_deref(), Some("<html><body><p>hi</p></body></html>"));
        assert!(cx.diagnostics().is_empty());
    }

    #[test]
    fn test_decode_multiple_children_reported() {
        let codec = RichContentCodec::new().unwrap();
        let source = parse_document("<richcontent TYPE=\"NODE\"><p>a</p><p>b</p></richcontent>").unwrap();
        let mut cx = cx();

        let node = codec.decode_node(&mut cx, &source, source.root()).unwrap();
        assert_eq!(node.html.as_deref(), Some("<p>a</p><p>b</p>"));
        assert_eq!(cx.diagnostics().count_kind("malformed_embedded_content"), 1);
    }

    #[test]
    fn test_encode_reexpands_markup() {
        let codec = RichContentCodec::new().unwrap();
        let mut cx = cx();
        let mut domain = Tree::new(
            DomainNode::new(catalog::node_text())
                .with_attr("TYPE", "NODE")
                .with_html("<html><b>x</b></html>"),
        );
        let root = domain.root();

        let encoded = codec.encode_node(&mut cx, &mut domain, root).unwrap();
        let mut tree = GenericTree::new(encoded);
        let root = tree.root();
        assert_eq!(codec.finish_encode(&mut cx, &mut tree, root), Finish::Seal);

        assert_eq!(
            to_xml_string(&tree),
            "<richcontent TYPE=\"NODE\">\n<html><b>x</b></html>\n</richcontent>\n"
        );
        assert!(cx.diagnostics().is_empty());
    }

    #[test]
    fn test_plain_text_content_survives_round_trip() {
        let codec = RichContentCodec::new().unwrap();
        let source = parse_document("<richcontent TYPE=\"NOTE\">plain note</richcontent>").unwrap();
        let mut cx = cx();

        let node = codec.decode_node(&mut cx, &source, source.root()).unwrap();
        assert_eq!(node.html, None);
        assert_eq!(node.text.as_deref(), Some("plain note"));
        assert_eq!(cx.diagnostics().count_kind("malformed_embedded_content"), 1);

        let mut domain = Tree::new(node);
        let root = domain.root();
        let encoded = codec.encode_node(&mut cx, &mut domain, root).unwrap();
        let mut tree = GenericTree::new(encoded);
        let root = tree.root();
        assert_eq!(codec.finish_encode(&mut cx, &mut tree, root), Finish::Seal);

        assert_eq!(
            to_xml_string(&tree),
            "<richcontent TYPE=\"NOTE\">plain note</richcontent>\n"
        );
    }

    #[test]
    fn test_text_before_markup_kept() {
        let codec = RichContentCodec::new().unwrap();
        let mut cx = cx();
        let mut tree = GenericTree::new(GenericNode::new("richcontent").with_text("intro <b>x</b>"));
        let root = tree.root();

        codec.finish_encode(&mut cx, &mut tree, root);
        assert_eq!(to_xml_string(&tree), "<richcontent>intro <b>x</b>\n</richcontent>\n");
    }

    #[test]
    fn test_unparsable_markup_kept_as_text() {
        let codec = RichContentCodec::new().unwrap();
        let mut cx = cx();
        let mut tree = GenericTree::new(GenericNode::new("richcontent").with_text("<p>&nbsp;</p>"));
        let root = tree.root();

        assert_eq!(codec.finish_encode(&mut cx, &mut tree, root), Finish::Seal);
        assert_eq!(tree[root].text.as_deref(), Some("<p>&nbsp;</p>"));
        assert_eq!(cx.diagnostics().count_kind("malformed_embedded_content"), 1);
    }
}

//! Serializing a generic tree back to XML.

use crate::node::{GenericTree, NodeKind};
use crate::tree::NodeId;

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Serialize the whole tree, root tail included.
///
/// No XML declaration is written.
#[must_use]
pub fn to_xml_string(tree: &GenericTree) -> String {
    let mut out = String::new();
    write_subtree(tree, tree.root(), &mut out);
    out
}

/// Serialize the subtree rooted at `id`, followed by its tail.
///
/// Works with an explicit stack, so arbitrarily deep trees are fine.
pub fn write_subtree(tree: &GenericTree, id: NodeId, out: &mut String) {
    let mut stack = vec![Step::Open(id)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                if node.kind == NodeKind::Comment {
                    out.push_str("<!--");
                    out.push_str(node.text.as_deref().unwrap_or_default());
                    out.push_str("-->");
                    push_escaped_text(out, node.tail.as_deref());
                    continue;
                }

                out.push('<');
                out.push_str(&node.tag);
                for (key, value) in &node.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }

                let children = tree.children(id);
                if children.is_empty() && node.text.as_deref().is_none_or(str::is_empty) {
                    out.push_str("/>");
                    push_escaped_text(out, node.tail.as_deref());
                    continue;
                }

                out.push('>');
                push_escaped_text(out, node.text.as_deref());
                stack.push(Step::Close(id));
                stack.extend(children.iter().rev().map(|&child| Step::Open(child)));
            }
            Step::Close(id) => {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                out.push_str("</");
                out.push_str(&node.tag);
                out.push('>');
                push_escaped_text(out, node.tail.as_deref());
            }
        }
    }
}

fn push_escaped_text(out: &mut String, text: Option<&str>) {
    if let Some(text) = text {
        out.push_str(&escape_text(text));
    }
}

/// Escape character data.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape an attribute value for a double-quoted attribute.
///
/// Whitespace control characters are written as character references so
/// they survive attribute-value normalization on the next read.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::GenericNode;
    use crate::xml::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_preserves_layout() {
        let xml = "<map version=\"1.0\">\n<node TEXT=\"a &amp; b\">x<icon BUILTIN=\"yes\"/>\n</node>\n</map>";
        let tree = parse_document(xml).unwrap();
        assert_eq!(to_xml_string(&tree), xml);
    }

    #[test]
    fn test_comment_and_escaping() {
        let mut tree = GenericTree::new(GenericNode::new("map"));
        let root = tree.root();
        tree.append(root, GenericNode::comment(" hi ").with_tail("\n"));
        tree.append(
            root,
            GenericNode::new("node")
                .with_attribute("TEXT", "say \"<hi>\"\nnow")
                .with_text("1 < 2"),
        );

        assert_eq!(
            to_xml_string(&tree),
            "<map><!-- hi -->\n<node TEXT=\"say &quot;&lt;hi&gt;&quot;&#10;now\">1 &lt; 2</node></map>"
        );
    }

    #[test]
    fn test_escaped_attribute_reads_back() {
        let mut tree = GenericTree::new(GenericNode::new("node"));
        let root = tree.root();
        tree[root].attributes.insert("TEXT".into(), "line\n\t\"q\" & <x>".into());
        let reread = parse_document(&to_xml_string(&tree)).unwrap();
        assert_eq!(reread[reread.root()].attributes["TEXT"], "line\n\t\"q\" & <x>");
    }

    #[test]
    fn test_deep_tree_written_iteratively() {
        let depth = 100_000;
        let mut tree = GenericTree::new(GenericNode::new("node"));
        let mut current = tree.root();
        for _ in 1..depth {
            current = tree.append(current, GenericNode::new("node"));
        }
        let xml = to_xml_string(&tree);
        assert_eq!(xml.matches("<node").count(), depth);
        assert!(xml.ends_with("</node></node>"));
    }
}

//! Parsing XML into a generic tree.
//!
//! The reader is event driven and keeps the open elements on an explicit
//! stack, so nesting depth is bounded by memory only.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TranscodeError};
use crate::node::{GenericNode, GenericTree};
use crate::tree::NodeId;

/// Tag of the synthetic element wrapping parsed fragments.
pub const FRAGMENT_TAG: &str = "fragment";

/// Parse a complete XML document into a generic tree rooted at its root element.
///
/// Text before the first child element goes into `text`, text after an
/// element into its `tail`. Comments, processing instructions and the
/// doctype are dropped; the text around them is joined. Namespaces are
/// reduced to local names.
///
/// # Errors
/// Returns `XmlParse` if the input is not well-formed XML and
/// `MalformedXml` if it does not hold exactly one closed root element.
///
/// # Examples
/// ```
/// use mindmap_transcoder::xml::parse_document;
///
/// let tree = parse_document(r#"<map version="1.0"><node TEXT="a"/> </map>"#).unwrap();
/// let root = tree.root();
/// assert_eq!(tree[root].tag, "map");
/// let node = tree.children(root)[0];
/// assert_eq!(tree[node].attributes["TEXT"], "a");
/// assert_eq!(tree[node].tail.as_deref(), Some(" "));
/// ```
pub fn parse_document(xml: &str) -> Result<GenericTree> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let id = builder.element(element_node(&start)?)?;
                builder.open.push(id);
            }
            Event::Empty(start) => {
                builder.element(element_node(&start)?)?;
            }
            Event::End(_) => {
                builder.open.pop();
            }
            Event::Text(text) => builder.text(&text.unescape()?)?,
            Event::CData(cdata) => builder.text(&String::from_utf8_lossy(&cdata))?,
            Event::Eof => break,
            _ => {}
        }
    }
    builder.finish()
}

/// Parse markup that may hold several top-level nodes or bare text.
///
/// The result is rooted at a synthetic [`FRAGMENT_TAG`] element whose
/// children (and `text`) are the fragment's content.
///
/// # Errors
/// Returns `XmlParse` if the markup is not well-formed.
pub fn parse_fragment(markup: &str) -> Result<GenericTree> {
    let wrapped = format!("<{FRAGMENT_TAG}>{markup}</{FRAGMENT_TAG}>");
    parse_document(&wrapped)
}

/// Check whether a string holds XML markup rather than plain text.
///
/// The trimmed string has to start with `<`, end with `>` and parse as
/// well-formed content with at least one element.
#[must_use]
pub fn is_markup(value: &str) -> bool {
    let trimmed = value.trim();
    if !(trimmed.starts_with('<') && trimmed.ends_with('>')) {
        return false;
    }
    parse_fragment(trimmed).is_ok_and(|tree| !tree.children(tree.root()).is_empty())
}

#[derive(Default)]
struct TreeBuilder {
    tree: Option<GenericTree>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn element(&mut self, node: GenericNode) -> Result<NodeId> {
        let Some(tree) = self.tree.as_mut() else {
            let tree = GenericTree::new(node);
            let root = tree.root();
            self.tree = Some(tree);
            return Ok(root);
        };
        match self.open.last() {
            Some(&parent) => Ok(tree.append(parent, node)),
            None => Err(TranscodeError::MalformedXml(format!(
                "<{}> after the root element",
                node.tag
            ))),
        }
    }

    fn text(&mut self, content: &str) -> Result<()> {
        let (Some(tree), Some(&parent)) = (self.tree.as_mut(), self.open.last()) else {
            if content.trim().is_empty() {
                return Ok(());
            }
            return Err(TranscodeError::MalformedXml(
                "text outside the root element".to_string(),
            ));
        };
        let slot = match tree.children(parent).last().copied() {
            Some(child) => &mut tree[child].tail,
            None => &mut tree[parent].text,
        };
        slot.get_or_insert_with(String::new).push_str(content);
        Ok(())
    }

    fn finish(self) -> Result<GenericTree> {
        let tree = self
            .tree
            .ok_or_else(|| TranscodeError::MalformedXml("no root element".to_string()))?;
        if let Some(&unclosed) = self.open.last() {
            return Err(TranscodeError::MalformedXml(format!(
                "<{}> is not closed",
                tree[unclosed].tag
            )));
        }
        Ok(tree)
    }
}

fn element_node(start: &BytesStart<'_>) -> Result<GenericNode> {
    let mut element = GenericNode::new(String::from_utf8_lossy(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

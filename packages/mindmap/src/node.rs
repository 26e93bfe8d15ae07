//! Node payloads of the generic (XML-shaped) and domain trees.

use indexmap::IndexMap;

use crate::coercion::AttrValue;
use crate::element::ElementType;
use crate::tree::Tree;

/// Kind of a generic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Element,
    /// A comment; its content is stored in `text`.
    Comment,
}

/// An XML-shaped node: tag, string attributes in file order, and the raw
/// text before the first child (`text`) and after the closing tag (`tail`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericNode {
    pub kind: NodeKind,
    pub tag: String,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    pub tail: Option<String>,
}

impl GenericNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Comment,
            text: Some(content.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == NodeKind::Comment
    }
}

/// Where a domain node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeOrigin {
    /// Built by decoding or by the caller through the typed API.
    #[default]
    Typed,
    /// Spliced in from a generic tree without going through a codec.
    Generic,
}

/// A typed mind-map element.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainNode {
    pub element_type: ElementType,
    pub tag: String,
    pub attrib: IndexMap<String, AttrValue>,
    pub text: Option<String>,
    pub tail: Option<String>,
    /// Embedded markup of rich-content elements.
    pub html: Option<String>,
    pub origin: NodeOrigin,
}

impl DomainNode {
    /// Create an element of `element_type` carrying its own tag.
    pub fn new(element_type: ElementType) -> Self {
        let tag = element_type.tag().to_string();
        Self {
            element_type,
            tag,
            attrib: IndexMap::new(),
            text: None,
            tail: None,
            html: None,
            origin: NodeOrigin::Typed,
        }
    }

    /// Wrap a generic node as-is. Encoding such a node is reported as misuse.
    pub fn from_generic(element_type: ElementType, node: GenericNode) -> Self {
        Self {
            element_type,
            tag: node.tag,
            attrib: node
                .attributes
                .into_iter()
                .map(|(k, v)| (k, AttrValue::Str(v)))
                .collect(),
            text: node.text,
            tail: node.tail,
            html: None,
            origin: NodeOrigin::Generic,
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrib.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrib.get(key)
    }

    /// True when the node's type is `element_type` (variants included by name).
    #[must_use]
    pub fn is(&self, element_type: &ElementType) -> bool {
        self.element_type == *element_type
    }
}

/// Payloads that carry the tag used for codec dispatch.
pub trait Tagged {
    fn tag(&self) -> &str;
}

impl Tagged for GenericNode {
    fn tag(&self) -> &str {
        &self.tag
    }
}

impl Tagged for DomainNode {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// Tree of XML-shaped nodes.
pub type GenericTree = Tree<GenericNode>;

/// Tree of typed mind-map elements.
pub type DomainTree = Tree<DomainNode>;

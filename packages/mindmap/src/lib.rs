//! Mind-map transcoder - Convert Freeplane mind maps between XML and typed
//! element trees.
//!
//! A document is parsed into a generic tree of XML-shaped nodes, then
//! decoded into a tree of typed [`DomainNode`]s whose attributes are
//! coerced against per-type specs. Encoding runs the same machinery in
//! reverse. Problems that do not stop a conversion are returned as
//! [`Diagnostic`]s next to the converted tree.
//!
//! # Example
//!
//! ```
//! use mindmap_transcoder::{document, AttrValue};
//!
//! let converter = document::default_converter().unwrap();
//! let decoded = document::read_str(
//!     &converter,
//!     r#"<map version="1.0"><node TEXT="hello" FOLDED="FALSE"/></map>"#,
//! )
//! .unwrap();
//!
//! let tree = &decoded.tree;
//! let node = tree.children(tree.root())[0];
//! assert_eq!(tree[node].attr("FOLDED"), Some(&AttrValue::Bool(false)));
//! assert!(decoded.diagnostics.is_empty());
//! ```
//!
//! # Architecture
//!
//! - [`tree`]: Arena-backed ordered tree
//! - [`node`]: Generic and domain node payloads
//! - [`coercion`]: Attribute value coercion
//! - [`element`]: Element types
//! - [`variant`]: Variant resolution for shared tags
//! - [`registry`]: Codecs, the codec registry and the tree converter
//! - [`catalog`]: Freeplane element types
//! - [`xml`]: XML reading and writing
//! - [`document`]: File-level read/write API
//! - [`validate`]: Sanity check of domain trees
//! - [`diagnostics`]: Non-fatal conversion problems
//! - [`config`]: Configuration constants and options
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod catalog;
pub mod cli;
pub mod coercion;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod element;
pub mod error;
pub mod node;
pub mod registry;
pub mod tree;
pub mod validate;
pub mod variant;
pub mod xml;

// Re-export commonly used items
pub use coercion::{AttrValue, AttributeSpec, CoercionRule, ValueKind};
pub use config::ConverterOptions;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use element::ElementType;
pub use error::{Result, TranscodeError};
pub use node::{DomainNode, DomainTree, GenericNode, GenericTree};
pub use registry::{create_mindmap_registry, Codec, Conversion, Registry, TreeConverter};
pub use tree::{NodeId, Tree};
pub use validate::sanity_check;
pub use variant::{VariantResolver, VariantRule};

//! XML wire format: reading into and writing out of generic trees.

mod reader;
mod writer;

pub use reader::{is_markup, parse_document, parse_fragment, FRAGMENT_TAG};
pub use writer::{escape_attribute, escape_text, to_xml_string, write_subtree};

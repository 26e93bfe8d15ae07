//! Codecs with behaviour beyond the plain element codec.

mod map;
mod node;
mod rich_content;

pub use map::*;
pub use node::*;
pub use rich_content::*;

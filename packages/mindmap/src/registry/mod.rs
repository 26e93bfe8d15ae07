//! Codec registry and the tree converter built on it.
//!
//! Codecs are registered per tag. The converter looks up the codec for
//! every node it visits, so adding a new element type only means
//! registering another codec.

mod codec;
pub mod codecs;
mod config;
mod context;
mod core;
mod engine;

pub use codec::{apply_layout, decode_element, encode_element, order_children, Codec, ElementCodec, Finish};
pub use config::create_mindmap_registry;
pub use context::ConversionContext;
pub use self::core::Registry;
pub use engine::{Conversion, TreeConverter};

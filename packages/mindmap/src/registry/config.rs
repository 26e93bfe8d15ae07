//! Registry configuration for Freeplane mind maps.

use super::codec::ElementCodec;
use super::codecs::{MapCodec, NodeCodec, RichContentCodec};
use super::core::Registry;
use crate::catalog;
use crate::element::ElementType;
use crate::error::Result;

fn element_codec(base: ElementType) -> Result<ElementCodec> {
    let variants = catalog::variant_rules(&base)?;
    Ok(variants
        .into_iter()
        .fold(ElementCodec::new(base), ElementCodec::with_variant))
}

/// Create a registry with codecs for every Freeplane element type.
///
/// # Errors
/// Returns `InvalidPattern` if a variant pattern does not compile.
pub fn create_mindmap_registry() -> Result<Registry> {
    let mut registry = Registry::new();

    // Codecs with structural behaviour
    registry.register(MapCodec::new());
    registry.register(NodeCodec::new());
    registry.register(RichContentCodec::new()?);

    // Hook variants are resolved on NAME
    registry.register(element_codec(catalog::hook())?);

    for base in [
        catalog::cloud(),
        catalog::edge(),
        catalog::font(),
        catalog::icon(),
        catalog::map_styles(),
        catalog::style_node(),
        catalog::properties(),
        catalog::attribute(),
        catalog::attribute_layout(),
        catalog::attribute_registry(),
        catalog::arrow_link(),
    ] {
        registry.register(element_codec(base)?);
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_base_tags_registered() {
        let registry = create_mindmap_registry().unwrap();
        for tag in [
            "map",
            "node",
            "richcontent",
            "hook",
            "cloud",
            "edge",
            "font",
            "icon",
            "map_styles",
            "stylenode",
            "properties",
            "attribute",
            "attribute_layout",
            "attribute_registry",
            "arrowlink",
        ] {
            assert!(registry.has_codec(tag), "missing codec for <{tag}>");
        }
        assert!(!registry.has_codec("customplugin"));
    }

    #[test]
    fn test_every_catalog_tag_has_codec() {
        let registry = create_mindmap_registry().unwrap();
        for ty in catalog::all_types() {
            assert!(registry.has_codec(ty.tag()), "missing codec for {ty}");
        }
    }
}

//! Reading and writing mind-map files.
//!
//! Thin wrappers that move between XML text and domain trees through a
//! [`TreeConverter`].

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::node::DomainTree;
use crate::registry::{create_mindmap_registry, Conversion, TreeConverter};
use crate::xml::{parse_document, to_xml_string};

/// Map written for new documents: a root node, the standard styles and
/// automatic edge colors.
pub const DEFAULT_MINDMAP: &str = r##"<map version="freeplane 1.3.0">
<!--To view this file, download free mind mapping software Freeplane from http://freeplane.sourceforge.net -->
<node TEXT="new_mindmap" ID="ID_1723255651" CREATED="1283093380553" MODIFIED="1283093380553"><hook NAME="MapStyle">
    <properties show_icon_for_attributes="true" show_note_icons="true"/>

<map_styles>
<stylenode LOCALIZED_TEXT="styles.root_node">
<stylenode LOCALIZED_TEXT="styles.predefined" POSITION="right">
<stylenode LOCALIZED_TEXT="default" MAX_WIDTH="600" COLOR="#000000" STYLE="as_parent">
<font NAME="SansSerif" SIZE="10" BOLD="false" ITALIC="false"/>
</stylenode>
<stylenode LOCALIZED_TEXT="defaultstyle.details"/>
<stylenode LOCALIZED_TEXT="defaultstyle.note"/>
<stylenode LOCALIZED_TEXT="defaultstyle.floating">
<edge STYLE="hide_edge"/>
<cloud COLOR="#f0f0f0" SHAPE="ROUND_RECT"/>
</stylenode>
</stylenode>
<stylenode LOCALIZED_TEXT="styles.user-defined" POSITION="right">
<stylenode LOCALIZED_TEXT="styles.topic" COLOR="#18898b" STYLE="fork">
<font NAME="Liberation Sans" SIZE="10" BOLD="true"/>
</stylenode>
<stylenode LOCALIZED_TEXT="styles.important">
<icon BUILTIN="yes"/>
</stylenode>
</stylenode>
<stylenode LOCALIZED_TEXT="styles.AutomaticLayout" POSITION="right">
<stylenode LOCALIZED_TEXT="AutomaticLayout.level.root" COLOR="#000000">
<font SIZE="18"/>
</stylenode>
<stylenode LOCALIZED_TEXT="AutomaticLayout.level,1" COLOR="#0033ff">
<font SIZE="16"/>
</stylenode>
</stylenode>
</stylenode>
</map_styles>
</hook>
<hook NAME="AutomaticEdgeColor" COUNTER="0"/>
</node>
</map>
"##;

/// Converter with codecs for every Freeplane element type.
///
/// # Errors
/// Returns `InvalidPattern` if a variant pattern does not compile.
pub fn default_converter() -> Result<TreeConverter> {
    Ok(TreeConverter::new(create_mindmap_registry()?))
}

/// Decode a mind map from XML text.
///
/// # Errors
/// Returns `XmlParse` for malformed XML and any conversion error.
pub fn read_str(converter: &TreeConverter, xml: &str) -> Result<Conversion<DomainTree>> {
    let generic = parse_document(xml)?;
    converter.decode(&generic)
}

/// Decode a mind map from a file.
///
/// # Errors
/// Returns `Io` if the file cannot be read, `XmlParse` for malformed XML and
/// any conversion error.
pub fn read_file(converter: &TreeConverter, path: impl AsRef<Path>) -> Result<Conversion<DomainTree>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading mind map");
    let xml = fs::read_to_string(path)?;
    read_str(converter, &xml)
}

/// Encode a mind map to XML text.
///
/// # Errors
/// Returns any conversion error.
pub fn write_string(converter: &TreeConverter, tree: &DomainTree) -> Result<Conversion<String>> {
    let encoded = converter.encode(tree)?;
    Ok(Conversion {
        tree: to_xml_string(&encoded.tree),
        diagnostics: encoded.diagnostics,
    })
}

/// Encode a mind map and write it to `path`.
///
/// The file is written to a temporary sibling first and renamed into
/// place, so a failed conversion never leaves a truncated file.
///
/// # Errors
/// Returns `Io` if the file cannot be written and any conversion error.
pub fn write_file(converter: &TreeConverter, tree: &DomainTree, path: impl AsRef<Path>) -> Result<Diagnostics> {
    let path = path.as_ref();
    let written = write_string(converter, tree)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));
    {
        let mut file = File::create(&temp_file)?;
        file.write_all(written.tree.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&temp_file, path)?;

    tracing::debug!(path = %path.display(), "wrote mind map");
    Ok(written.diagnostics)
}

/// Decode the default mind map.
///
/// # Errors
/// Returns any conversion error.
pub fn default_mindmap(converter: &TreeConverter) -> Result<Conversion<DomainTree>> {
    read_str(converter, DEFAULT_MINDMAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::coercion::AttrValue;
    use tempfile::TempDir;

    #[test]
    fn test_default_mindmap_decodes_cleanly() {
        let converter = default_converter().unwrap();
        let decoded = default_mindmap(&converter).unwrap();
        let tree = &decoded.tree;

        assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);
        assert!(tree[tree.root()].is(&catalog::map()));
        let root_node = tree.children(tree.root())[0];
        assert_eq!(
            tree[root_node].attr("TEXT"),
            Some(&AttrValue::Str("new_mindmap".to_string()))
        );

        let hooks: Vec<_> = tree
            .children(root_node)
            .iter()
            .map(|&id| tree[id].element_type.name())
            .collect();
        assert_eq!(hooks, vec!["MapConfig", "AutomaticEdgeColor"]);
    }

    #[test]
    fn test_write_and_read_file() {
        let converter = default_converter().unwrap();
        let decoded = default_mindmap(&converter).unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.mm");

        let diagnostics = write_file(&converter, &decoded.tree, &path).unwrap();
        assert!(diagnostics.is_empty());
        assert!(!dir.path().join(".new.mm.tmp").exists());

        let reread = read_file(&converter, &path).unwrap();
        assert_eq!(reread.tree.len(), decoded.tree.len());
    }

    #[test]
    fn test_read_missing_file() {
        let converter = default_converter().unwrap();
        assert!(read_file(&converter, "/nonexistent/map.mm").is_err());
    }
}

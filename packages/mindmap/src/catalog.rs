//! Freeplane element types and their attribute specs.
//!
//! Each type is built once and handed out as a cheap [`ElementType`]
//! handle. Variant types share the tag of their base type and are
//! selected by [`variant_rules`].

use std::sync::LazyLock;

use regex::Regex;

use crate::coercion::{AttrValue, AttributeSpec, CoercionRule, ValueKind};
use crate::element::ElementType;
use crate::error::Result;
use crate::variant::VariantRule;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid regex"));

/// `#rrggbb` colors, normalized to lowercase.
fn color() -> CoercionRule {
    CoercionRule::custom("color", |value| match value {
        AttrValue::Str(s) if COLOR_PATTERN.is_match(s) => Ok(AttrValue::Str(s.to_lowercase())),
        other => Err(format!("{other} is not a #rrggbb color")),
    })
}

fn boolean() -> CoercionRule {
    CoercionRule::kind(ValueKind::Boolean)
}

fn integer() -> CoercionRule {
    CoercionRule::kind(ValueKind::Integer)
}

fn float() -> CoercionRule {
    CoercionRule::kind(ValueKind::Float)
}

fn string() -> CoercionRule {
    CoercionRule::kind(ValueKind::String)
}

/// Tag-less fallback type used by the default codec.
static BASE_ELEMENT: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("BaseElement", "", AttributeSpec::new()));

static MAP: LazyLock<ElementType> = LazyLock::new(|| {
    ElementType::new("Map", "map", AttributeSpec::new().with("version", [string()]))
});

static NODE: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("ID", [string()])
        .with("TEXT", [string()])
        .with("LINK", [string()])
        .with("FOLDED", [boolean()])
        .with("COLOR", [color()])
        .with("BACKGROUND_COLOR", [color()])
        .with_choices("POSITION", ["left", "right"])
        .with_choices("STYLE", ["fork", "bubble", "as_parent", "combined"])
        .with("CREATED", [integer()])
        .with("MODIFIED", [integer()])
        .with("HGAP", [integer()])
        .with("VGAP", [integer()])
        .with("VSHIFT", [integer()])
        .with("ENCRYPTED_CONTENT", [string()])
        .with("OBJECT", [string()])
        .with("FORMAT", [string()])
        .with("MIN_WIDTH", [integer()])
        .with("MAX_WIDTH", [integer()])
        .with("STYLE_REF", [string()])
        .with("LOCALIZED_STYLE_REF", [string()])
        .with("TEXT_SHORTENED", [boolean()])
        .with("NUMBERED", [boolean()]);
    ElementType::new("Node", "node", spec)
});

static STYLE_NODE: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("TEXT", [string()])
        .with("LOCALIZED_TEXT", [string()])
        .with_choices("POSITION", ["left", "right"])
        .with("COLOR", [color()])
        .with("BACKGROUND_COLOR", [color()])
        .with_choices("STYLE", ["fork", "bubble", "as_parent", "combined"])
        .with("MIN_WIDTH", [integer()])
        .with("MAX_WIDTH", [integer()])
        .with("NUMBERED", [boolean()]);
    ElementType::new("StyleNode", "stylenode", spec)
});

static MAP_STYLES: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("MapStyles", "map_styles", AttributeSpec::new()));

static CLOUD: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("COLOR", [color()])
        .with_choices("SHAPE", ["ARC", "STAR", "RECT", "ROUND_RECT"])
        .with("WIDTH", [integer()]);
    ElementType::new("Cloud", "cloud", spec)
});

static EDGE: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("COLOR", [color()])
        .with_choices(
            "STYLE",
            ["linear", "bezier", "sharp_linear", "sharp_bezier", "horizontal", "hide_edge"],
        )
        .with("WIDTH", [CoercionRule::exact("thin"), integer()]);
    ElementType::new("Edge", "edge", spec)
});

static FONT: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("SIZE", [integer()])
        .with("BOLD", [boolean()])
        .with("ITALIC", [boolean()]);
    ElementType::new("Font", "font", spec)
});

static ICON: LazyLock<ElementType> = LazyLock::new(|| {
    ElementType::new("Icon", "icon", AttributeSpec::new().with("BUILTIN", [string()]))
});

static HOOK: LazyLock<ElementType> = LazyLock::new(|| {
    ElementType::new("Hook", "hook", AttributeSpec::new().with("NAME", [string()]))
});

static EMBEDDED_IMAGE: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("URI", [string()])
        .with("SIZE", [float()]);
    ElementType::new("EmbeddedImage", "hook", spec)
});

static MAP_CONFIG: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("zoom", [float()])
        .with("max_node_width", [integer()])
        .with_choices("layout", ["OUTLINE", "MAP"]);
    ElementType::new("MapConfig", "hook", spec)
});

static EQUATION: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("EQUATION", [string()]);
    ElementType::new("Equation", "hook", spec)
});

static AUTOMATIC_EDGE_COLOR: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("COUNTER", [integer()])
        .with_choices("RULE", ["ON_BRANCH_CREATION", "FOR_COLUMNS", "FOR_LEVELS"]);
    ElementType::new("AutomaticEdgeColor", "hook", spec)
});

static PROPERTIES: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("show_icon_for_attributes", [boolean()])
        .with("show_note_icons", [boolean()])
        .with("show_notes_in_map", [boolean()])
        .with("fit_to_viewport", [boolean()])
        .with("edgeColorConfiguration", [string()]);
    ElementType::new("Properties", "properties", spec)
});

static ATTRIBUTE: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME", [string()])
        .with("VALUE", [string()])
        .with("OBJECT", [string()]);
    ElementType::new("Attribute", "attribute", spec)
});

static ATTRIBUTE_LAYOUT: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("NAME_WIDTH", [integer()])
        .with("VALUE_WIDTH", [integer()]);
    ElementType::new("AttributeLayout", "attribute_layout", spec)
});

static ATTRIBUTE_REGISTRY: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new().with_choices("SHOW_ATTRIBUTES", ["selected", "all", "hide"]);
    ElementType::new("AttributeRegistry", "attribute_registry", spec)
});

static ARROW_LINK: LazyLock<ElementType> = LazyLock::new(|| {
    let spec = AttributeSpec::new()
        .with("ID", [string()])
        .with("DESTINATION", [string()])
        .with("COLOR", [color()])
        .with("WIDTH", [integer()])
        .with("TRANSPARENCY", [integer()])
        .with("FONT_SIZE", [integer()])
        .with("FONT_FAMILY", [string()])
        .with("SOURCE_LABEL", [string()])
        .with("MIDDLE_LABEL", [string()])
        .with("TARGET_LABEL", [string()])
        .with("STARTINCLINATION", [string()])
        .with("ENDINCLINATION", [string()])
        .with_choices("STARTARROW", ["None", "Default"])
        .with_choices("ENDARROW", ["None", "Default"])
        .with("SHAPE", [string()])
        .with("DASH", [string()]);
    ElementType::new("ArrowLink", "arrowlink", spec)
});

fn rich_content_spec() -> AttributeSpec {
    AttributeSpec::new()
        .with_choices("TYPE", ["NODE", "NOTE", "DETAILS"])
        .with("HIDDEN", [boolean()])
        .with_choices("CONTENT-TYPE", ["xml/", "plain/text", "plain/html"])
}

static RICH_CONTENT: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("RichContent", "richcontent", rich_content_spec()));

static NODE_TEXT: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("NodeText", "richcontent", rich_content_spec()));

static NODE_NOTE: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("NodeNote", "richcontent", rich_content_spec()));

static NODE_DETAILS: LazyLock<ElementType> =
    LazyLock::new(|| ElementType::new("NodeDetails", "richcontent", rich_content_spec()));

macro_rules! accessors {
    ($($(#[$meta:meta])* $name:ident => $static:ident;)*) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name() -> ElementType {
                $static.clone()
            }
        )*
    };
}

accessors! {
    /// Fallback type for elements without a codec of their own.
    base_element => BASE_ELEMENT;
    /// Root element of a mind map.
    map => MAP;
    node => NODE;
    style_node => STYLE_NODE;
    map_styles => MAP_STYLES;
    cloud => CLOUD;
    edge => EDGE;
    font => FONT;
    icon => ICON;
    hook => HOOK;
    embedded_image => EMBEDDED_IMAGE;
    map_config => MAP_CONFIG;
    /// LaTeX formula attached to a node.
    equation => EQUATION;
    automatic_edge_color => AUTOMATIC_EDGE_COLOR;
    properties => PROPERTIES;
    attribute => ATTRIBUTE;
    attribute_layout => ATTRIBUTE_LAYOUT;
    attribute_registry => ATTRIBUTE_REGISTRY;
    arrow_link => ARROW_LINK;
    rich_content => RICH_CONTENT;
    /// Rich-content child holding the markup text of a node.
    node_text => NODE_TEXT;
    node_note => NODE_NOTE;
    node_details => NODE_DETAILS;
}

/// Variant rules sharing the tag of `base`, in registration order.
///
/// # Errors
/// Returns `InvalidPattern` if a matcher pattern does not compile.
pub fn variant_rules(base: &ElementType) -> Result<Vec<VariantRule>> {
    let rules = match base.name() {
        "Hook" => vec![
            VariantRule::new(embedded_image(), [("NAME", "ExternalObject")])?,
            VariantRule::new(map_config(), [("NAME", "MapStyle")])?,
            VariantRule::new(equation(), [("NAME", r"plugins/latex/LatexNodeHook\.properties")])?,
            VariantRule::new(automatic_edge_color(), [("NAME", "AutomaticEdgeColor")])?,
        ],
        "RichContent" => vec![
            VariantRule::new(node_text(), [("TYPE", "NODE")])?,
            VariantRule::new(node_note(), [("TYPE", "NOTE")])?,
            VariantRule::new(node_details(), [("TYPE", "DETAILS")])?,
        ],
        _ => Vec::new(),
    };
    Ok(rules)
}

/// Every catalog type, variants included.
#[must_use]
pub fn all_types() -> Vec<ElementType> {
    vec![
        map(),
        node(),
        style_node(),
        map_styles(),
        cloud(),
        edge(),
        font(),
        icon(),
        hook(),
        embedded_image(),
        map_config(),
        equation(),
        automatic_edge_color(),
        properties(),
        attribute(),
        attribute_layout(),
        attribute_registry(),
        arrow_link(),
        rich_content(),
        node_text(),
        node_note(),
        node_details(),
    ]
}

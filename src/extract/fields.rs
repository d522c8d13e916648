//! Dual-schema field resolution
//!
//! Every semantic field can live in one of two places depending on the
//! serialization vintage: a legacy `<DTS:Property DTS:Name="...">value</...>`
//! child, or a namespaced attribute on the element itself. Accessors here are
//! small and composable so callers can express "legacy first, then attribute,
//! first non-empty wins" without duplicated conditionals.

use roxmltree::Node;

/// The fixed namespace of the outer package/executable/connection/variable
/// elements and their schema attributes.
pub const DTS_NS: &str = "www.microsoft.com/SqlServer/Dts";

/// Value of a legacy `Property` child with the given `Name`.
///
/// Returns `Some("")` for a present-but-empty property and `None` when the
/// property is absent, mirroring the legacy reader's distinction between the
/// two.
pub fn property(node: Node, name: &str) -> Option<String> {
    node.children()
        .filter(|n| n.has_tag_name((DTS_NS, "Property")))
        .find(|n| n.attribute((DTS_NS, "Name")) == Some(name))
        .map(|n| n.text().unwrap_or("").to_string())
}

/// Attribute in the fixed outer namespace.
pub fn dts_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((DTS_NS, name))
}

/// Attribute matched by local name only.
///
/// Task payload elements carry their attributes in per-task namespaces that
/// vary by tool version, so payload fields are matched on the local name.
pub fn local_attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// Legacy property first, then the namespaced attribute; first non-empty
/// wins, degrading to an empty string when both miss.
pub fn prop_or_attr(node: Node, name: &str) -> String {
    property(node, name)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            dts_attr(node, name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// Entity filter: connections and executables without a usable name (missing,
/// empty, or the literal text "None") are excluded from their result lists.
pub fn is_named(name: &str) -> bool {
    !name.is_empty() && name != "None"
}

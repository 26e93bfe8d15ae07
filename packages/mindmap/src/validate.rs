//! Sanity check of a domain tree against its attribute specs.

use crate::coercion::{AttrValue, CoercionRule};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::node::{DomainTree, NodeOrigin};

fn conforms(rules: &[CoercionRule], value: &AttrValue) -> bool {
    rules.iter().any(|rule| match rule {
        CoercionRule::ExactString(expected) => value.to_string() == *expected,
        CoercionRule::TypeTag(kind) => value.kind() == *kind,
        CoercionRule::CustomFn(_) => true,
    })
}

/// Check every node of a domain tree for out-of-spec attribute values.
///
/// Only attributes named in the node's spec are checked. A value conforms
/// when it equals an allowed literal, already has the kind of a type rule,
/// or the spec has a custom rule for it. Nodes spliced in from a generic
/// tree are reported as misuse.
#[must_use]
pub fn sanity_check(tree: &DomainTree) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    for (_, node) in tree.iter() {
        if node.origin == NodeOrigin::Generic {
            diagnostics.push(Diagnostic::ApiMisuse {
                tag: node.tag.clone(),
                message: "generic node in domain tree".to_string(),
            });
        }

        let spec = node.element_type.spec();
        for (key, value) in &node.attrib {
            let Some(rules) = spec.rules(key) else {
                continue;
            };
            if !conforms(rules, value) {
                diagnostics.push(Diagnostic::AttributeSpecViolation {
                    tag: node.tag.clone(),
                    key: key.clone(),
                    value: value.to_string(),
                });
            }
        }
    }
    diagnostics
}

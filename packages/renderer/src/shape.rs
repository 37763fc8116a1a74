//! Structural comparison of rendered output.
//!
//! The editable and read-only renderings of a document differ only in their
//! editing controls. A [`Shape`] drops those controls and the attributes that
//! only matter while editing, so two renderings can be compared directly.

use crate::vdom::VNode;
use std::collections::BTreeMap;

/// Attributes that exist for editing only.
const EDITING_ATTRS: &[&str] = &["contenteditable", "role", "aria-multiline", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<Shape>,
    },
    Text(String),
}

/// The shape of `node`, or `None` when the whole node is an editing control.
pub fn shape_of(node: &VNode) -> Option<Shape> {
    match node {
        VNode::Text { content } => Some(Shape::Text(content.clone())),
        VNode::Element { .. } if node.is_affordance() => None,
        VNode::Element {
            tag,
            attributes,
            children,
            ..
        } => Some(Shape::Element {
            tag: tag.clone(),
            attributes: attributes
                .iter()
                .filter(|(name, _)| !EDITING_ATTRS.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            children: children.iter().filter_map(shape_of).collect(),
        }),
    }
}

pub fn structurally_equivalent(a: &VNode, b: &VNode) -> bool {
    shape_of(a) == shape_of(b)
}

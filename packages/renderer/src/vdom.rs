use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute that marks an interactive control present only in the
/// editable surface.
pub const AFFORDANCE_ATTR: &str = "data-affordance";

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        /// Ordered so serialized output is stable
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// Dot-separated path of the document node this element renders
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    /// Text node
    Text { content: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let VNode::Element {
            key: ref mut node_key,
            ..
        } = self
        {
            *node_key = Some(key.into());
        }
        self
    }

    /// Tags this element as an editing control.
    pub fn affordance(self, name: &str) -> Self {
        self.with_attr(AFFORDANCE_ATTR, name)
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            VNode::Text { .. } => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            VNode::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            VNode::Text { .. } => &[],
        }
    }

    pub fn is_affordance(&self) -> bool {
        self.attr(AFFORDANCE_ATTR).is_some()
    }

    /// Concatenated text content, depth-first.
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content } => content.clone(),
            VNode::Element { children, .. } => children.iter().map(VNode::text_content).collect(),
        }
    }

    /// First element with `tag`, depth-first, including `self`.
    pub fn find(&self, tag: &str) -> Option<&VNode> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(tag))
    }

    pub fn find_all<'a>(&'a self, tag: &str, found: &mut Vec<&'a VNode>) {
        if self.tag() == Some(tag) {
            found.push(self);
        }
        for child in self.children() {
            child.find_all(tag, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let node = VNode::element("a")
            .with_attr("href", "https://x.dev")
            .with_key("0.1")
            .with_child(VNode::text("x"));
        assert_eq!(node.tag(), Some("a"));
        assert_eq!(node.attr("href"), Some("https://x.dev"));
        assert_eq!(node.text_content(), "x");
        assert!(!node.is_affordance());
        assert!(VNode::element("button").affordance("delete").is_affordance());
    }

    #[test]
    fn test_serialized_shape() {
        let node = VNode::element("p").with_child(VNode::text("hi"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Element");
        assert_eq!(json["children"][0]["content"], "hi");
        assert!(json.get("key").is_none());
    }
}

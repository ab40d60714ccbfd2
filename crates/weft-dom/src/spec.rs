use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{Element, NodeData, NodeId};
use crate::tree::Dom;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Declarative description of a subtree.
///
/// In JSON a bare string is a text node, `{"comment": "..."}` is a comment and
/// anything with a `tag` is an element:
///
/// ```
/// # use weft_dom::{Dom, NodeSpec};
/// let (dom, root) = Dom::from_json(r#"{"tag": "div", "children": ["hi", {"tag": "br"}]}"#).unwrap();
/// assert_eq!(dom.to_html(root), "<div>hi<br></div>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Comment {
        comment: String,
    },
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    pub fn text(text: &str) -> Self {
        NodeSpec::Text(text.to_string())
    }

    pub fn element(tag: &str) -> Self {
        NodeSpec::Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute. No effect on text or comment specs.
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if let NodeSpec::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Append a child. No effect on text or comment specs.
    pub fn child(mut self, child: NodeSpec) -> Self {
        if let NodeSpec::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// Describe an existing subtree
    pub fn from_dom(dom: &Dom, id: NodeId) -> Self {
        match dom.data(id) {
            NodeData::Text(text) => NodeSpec::Text(text.clone()),
            NodeData::Comment(text) => NodeSpec::Comment {
                comment: text.clone(),
            },
            NodeData::Element(element) => {
                let mut attrs = element.attributes.clone();
                if !element.style.is_empty() {
                    attrs.insert("style".to_string(), element.style_text());
                }
                NodeSpec::Element {
                    tag: element.tag.clone(),
                    attrs,
                    children: dom
                        .children(id)
                        .iter()
                        .map(|&child| NodeSpec::from_dom(dom, child))
                        .collect(),
                }
            }
            NodeData::Document | NodeData::Fragment => NodeSpec::Element {
                tag: "#fragment".to_string(),
                attrs: BTreeMap::new(),
                children: dom
                    .children(id)
                    .iter()
                    .map(|&child| NodeSpec::from_dom(dom, child))
                    .collect(),
            },
        }
    }
}

impl Dom {
    /// Create the subtree described by `spec` and append it to `parent`.
    pub fn build(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let id = match spec {
            NodeSpec::Text(text) => self.create_text(text.as_str()),
            NodeSpec::Comment { comment } => self.create_comment(comment.as_str()),
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let mut element = Element::new(tag);
                for (name, value) in attrs {
                    element.set_attribute(name, value);
                }
                let id = self.create_element_with(element);
                for child in children {
                    self.build(id, child);
                }
                id
            }
        };
        self.append_child(parent, id);
        id
    }

    /// Parse a JSON [`NodeSpec`] into a fresh tree. Returns the tree and the
    /// root of the described subtree, attached under the document node.
    pub fn from_json(json: &str) -> Result<(Dom, NodeId), DomError> {
        let spec: NodeSpec = serde_json::from_str(json)?;
        let mut dom = Dom::new();
        let document = dom.document();
        let root = dom.build(document, &spec);
        Ok((dom, root))
    }
}

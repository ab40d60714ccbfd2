use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node stored in a [`Dom`](crate::Dom) arena.
///
/// Ids are never reused, so a handle to a detached node stays valid and can be
/// re-inserted later. This is what lets the model cache elements between syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Fragment,
    Element,
    Text,
    Comment,
}

/// Payload of a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Document => NodeKind::Document,
            NodeData::Fragment => NodeKind::Fragment,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }
}

/// Elements that never have children and serialize without a closing tag
const VOID_TAGS: &[&str] = &[
    "area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr",
];

/// An element node: lowercase tag name, attributes and parsed inline style.
///
/// The `style` attribute is never stored in `attributes`; it lives in `style` as
/// individual declarations so format parsers can read single properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        if name == "style" {
            return None;
        }
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute. Setting `style` replaces the inline style declarations.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            self.set_style_text(value);
        } else {
            self.attributes.insert(name, value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        if name == "style" {
            self.style.clear();
        } else {
            self.attributes.remove(name);
        }
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        self.style
            .insert(property.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    /// Replace inline style with the declarations in `css` (`a: b; c: d`).
    pub fn set_style_text(&mut self, css: &str) {
        self.style.clear();
        for declaration in css.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    self.set_style(property, value);
                }
            }
        }
    }

    pub fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(property, value)| format!("{property}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// `data-*` attributes keyed by their camelCase dataset name.
    pub fn dataset(&self) -> BTreeMap<String, String> {
        self.attributes
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|rest| (attribute_to_dataset_key(rest), value.clone()))
            })
            .collect()
    }

    pub fn set_dataset(&mut self, key: &str, value: &str) {
        self.attributes
            .insert(dataset_key_to_attribute(key), value.to_string());
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }
}

/// `editingInfo` -> `data-editing-info`
pub fn dataset_key_to_attribute(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// `editing-info` (without the `data-` prefix) -> `editingInfo`
fn attribute_to_dataset_key(rest: &str) -> String {
    let mut key = String::new();
    let mut upper = false;
    for c in rest.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            key.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

use crate::node::{Element, NodeData, NodeId, NodeKind};

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
///
/// Every node lives in the arena for the lifetime of the `Dom`; removing a node
/// only detaches it from its parent. The first slot is the document node.
///
/// Structural operations keep the parent/child links consistent in both
/// directions, so `parent(c) == Some(p)` exactly when `c` is in `children(p)`.
#[derive(Debug, Clone)]
pub struct Dom {
    slots: Vec<Slot>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(Element::new(tag)))
    }

    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Comment(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    // Node payload access

    /// Whether `id` was allocated by this tree
    pub fn has_node(&self, id: NodeId) -> bool {
        id.0 < self.slots.len()
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slots[id.0].data
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.slots[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.slots[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.tag_name(id) == Some(tag)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.slots[id.0].data, NodeData::Text(_))
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.slots[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Replace the content of a text or comment node. Other nodes are unchanged.
    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        match &mut self.slots[id.0].data {
            NodeData::Text(text) | NodeData::Comment(text) => *text = value.into(),
            _ => {}
        }
    }

    /// Offset range of a node as a position container: characters for text and
    /// comments, child count for everything else.
    pub fn node_length(&self, id: NodeId) -> usize {
        match &self.slots[id.0].data {
            NodeData::Text(text) | NodeData::Comment(text) => text.chars().count(),
            _ => self.slots[id.0].children.len(),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.style(property))
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_style(property, value);
        }
    }

    // Navigation

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Inclusive ancestry check: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    // Mutation

    /// Detach a node from its parent. The node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&child| child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` into `parent` before `reference`, moving it from wherever
    /// it currently is. A missing reference, or one that is not a child of
    /// `parent`, appends instead.
    ///
    /// # Panics
    ///
    /// Panics if `child` is an ancestor of `parent` (or `parent` itself).
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        assert!(
            !self.contains(child, parent),
            "cannot insert {child} into its own subtree at {parent}"
        );
        if reference == Some(child) {
            return;
        }
        self.detach(child);
        let position = reference.and_then(|r| {
            let found = self.slots[parent.0].children.iter().position(|&c| c == r);
            if found.is_none() {
                log::warn!("insert_before: {r} is not a child of {parent}, appending instead");
            }
            found
        });
        let children = &mut self.slots[parent.0].children;
        match position {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        self.slots[child.0].parent = Some(parent);
    }

    /// Move all children of `from` to the end of `to`, keeping their order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.slots[from.0].children);
        for child in children {
            self.slots[child.0].parent = None;
            self.append_child(to, child);
        }
    }

    /// Replace `node` with its own children in its parent.
    pub fn unwrap_node(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        let children = std::mem::take(&mut self.slots[node.0].children);
        for child in children {
            self.slots[child.0].parent = None;
            self.insert_before(parent, child, Some(node));
        }
        self.detach(node);
    }

    /// Copy a node, optionally with its whole subtree. The copy is detached.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let copy = self.alloc(self.slots[id.0].data.clone());
        if deep {
            let children = self.slots[id.0].children.clone();
            for child in children {
                let child_copy = self.clone_node(child, true);
                self.append_child(copy, child_copy);
            }
        }
        copy
    }
}

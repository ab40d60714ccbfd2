//! Native node index kept alongside the model.
//!
//! Both sync engines report the native nodes they map to model nodes. A host
//! uses the index to tell whether a native text node still holds the text the
//! model last saw, which is what makes it safe to keep cache hints.

use std::collections::{BTreeMap, BTreeSet};

use weft_dom::{Dom, NodeId};

use crate::model::{Table, Text};

pub trait DomIndexer {
    /// A native element was mapped to a paragraph
    fn on_paragraph(&mut self, dom: &Dom, element: NodeId);

    /// A native text node was mapped to a text segment
    fn on_segment(&mut self, dom: &Dom, node: NodeId, segment: &Text);

    /// A native table element was mapped to a model table
    fn on_table(&mut self, dom: &Dom, element: NodeId, table: &Table);

    /// Forget everything under `container`, inclusive
    fn clear_index(&mut self, dom: &Dom, container: NodeId);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedSegment {
    pub text: String,
    pub is_selected: bool,
}

/// Records what each engine run reported
#[derive(Debug, Default)]
pub struct NodeIndex {
    paragraphs: BTreeSet<NodeId>,
    segments: BTreeMap<NodeId, IndexedSegment>,
    tables: BTreeMap<NodeId, (usize, usize)>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment(&self, node: NodeId) -> Option<&IndexedSegment> {
        self.segments.get(&node)
    }

    pub fn is_paragraph(&self, element: NodeId) -> bool {
        self.paragraphs.contains(&element)
    }

    /// `(rows, columns)` of an indexed table
    pub fn table_size(&self, element: NodeId) -> Option<(usize, usize)> {
        self.tables.get(&element).copied()
    }

    /// True when `node` is indexed and its native text is unchanged
    pub fn is_segment_current(&self, dom: &Dom, node: NodeId) -> bool {
        match (self.segments.get(&node), dom.text(node)) {
            (Some(indexed), Some(text)) => indexed.text == text,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len() + self.segments.len() + self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomIndexer for NodeIndex {
    fn on_paragraph(&mut self, _dom: &Dom, element: NodeId) {
        self.paragraphs.insert(element);
    }

    fn on_segment(&mut self, _dom: &Dom, node: NodeId, segment: &Text) {
        self.segments.insert(
            node,
            IndexedSegment {
                text: segment.text.clone(),
                is_selected: segment.is_selected,
            },
        );
    }

    fn on_table(&mut self, _dom: &Dom, element: NodeId, table: &Table) {
        self.tables
            .insert(element, (table.rows.len(), table.column_count()));
    }

    fn clear_index(&mut self, dom: &Dom, container: NodeId) {
        let inside = |node: &NodeId| dom.contains(container, *node);
        self.paragraphs.retain(|node| !inside(node));
        self.segments.retain(|node, _| !inside(node));
        self.tables.retain(|node, _| !inside(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SegmentFormat;

    #[test]
    fn detects_changed_text() {
        let mut dom = Dom::new();
        let div = dom.create_element("div");
        let text = dom.create_text("hello");
        dom.append_child(div, text);

        let mut index = NodeIndex::new();
        index.on_paragraph(&dom, div);
        index.on_segment(&dom, text, &Text::new("hello", SegmentFormat::default()));
        assert!(index.is_segment_current(&dom, text));

        dom.set_text(text, "hello world");
        assert!(!index.is_segment_current(&dom, text));
    }

    #[test]
    fn clear_index_forgets_subtree_only() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let first = dom.create_element("p");
        let second = dom.create_element("p");
        dom.append_child(root, first);
        dom.append_child(root, second);

        let mut index = NodeIndex::new();
        index.on_paragraph(&dom, first);
        index.on_paragraph(&dom, second);
        index.clear_index(&dom, first);

        assert!(!index.is_paragraph(first));
        assert!(index.is_paragraph(second));
        assert_eq!(index.len(), 1);
    }
}

use std::cmp::Ordering;

use crate::node::NodeId;
use crate::tree::Dom;

/// A boundary point: `(container, offset)`.
///
/// For text containers the offset counts characters; for any other container it
/// is a child index, pointing at the gap before that child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    /// The gap immediately before `node` in its parent
    pub fn before(dom: &Dom, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_of(node)?))
    }

    /// The gap immediately after `node` in its parent
    pub fn after(dom: &Dom, node: NodeId) -> Option<Self> {
        let parent = dom.parent(node)?;
        Some(Self::new(parent, dom.index_of(node)? + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomRange {
    pub start: DomPosition,
    pub end: DomPosition,
}

impl DomRange {
    pub fn new(start: DomPosition, end: DomPosition) -> Self {
        Self { start, end }
    }

    pub fn collapsed(position: DomPosition) -> Self {
        Self::new(position, position)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The three shapes a native selection can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomSelection {
    /// A text range. `is_reverted` means the focus sits before the anchor.
    Range { range: DomRange, is_reverted: bool },
    /// A rectangle of table cells, in grid coordinates (inclusive).
    Table {
        table: NodeId,
        first_row: usize,
        first_column: usize,
        last_row: usize,
        last_column: usize,
    },
    /// A single image selected as an object.
    Image { image: NodeId },
}

impl DomSelection {
    pub fn range(range: DomRange) -> Self {
        DomSelection::Range {
            range,
            is_reverted: false,
        }
    }

    pub fn collapsed(position: DomPosition) -> Self {
        Self::range(DomRange::collapsed(position))
    }

    /// Build a range selection from anchor and focus, ordering them so the range
    /// start comes first in the document.
    pub fn from_anchor_focus(dom: &Dom, anchor: DomPosition, focus: DomPosition) -> Self {
        if dom.compare_positions(anchor, focus) == Ordering::Greater {
            DomSelection::Range {
                range: DomRange::new(focus, anchor),
                is_reverted: true,
            }
        } else {
            DomSelection::Range {
                range: DomRange::new(anchor, focus),
                is_reverted: false,
            }
        }
    }
}

impl Dom {
    /// Child indices from the top-most ancestor down to `node`
    fn index_path(&self, node: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let (Some(parent), Some(index)) = (self.parent(current), self.index_of(current)) {
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Document order of two boundary points.
    ///
    /// A point in a container at offset `k` sorts before everything inside the
    /// container's `k`-th child, which gives the usual DOM boundary-point order.
    pub fn compare_positions(&self, a: DomPosition, b: DomPosition) -> Ordering {
        let mut key_a = self.index_path(a.node);
        key_a.push(a.offset);
        let mut key_b = self.index_path(b.node);
        key_b.push(b.offset);
        key_a.cmp(&key_b)
    }
}

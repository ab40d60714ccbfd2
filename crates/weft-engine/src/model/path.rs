//! Addressing model nodes.
//!
//! The tree owns its nodes by value, so there is no node identity to compare.
//! A [`ModelPath`] names a node by the steps taken from the document root.
//! Paths order the same way their nodes appear in the document.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::model::block::Block;
use crate::model::group::{Document, TableCell};
use crate::model::segment::{Segment, SelectionMarker};

/// One step down the tree.
///
/// Variant order matters: a list item's format holder sorts before its blocks,
/// and cells sort row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathStep {
    /// The format holder of a list item
    FormatHolder,
    /// A block of a block group (or of a general segment)
    Block(usize),
    /// A cell of a table
    Cell { row: usize, col: usize },
    /// A segment of a paragraph
    Segment(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelPath(Vec<PathStep>);

/// Borrowed node found at a path
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Document(&'a Document),
    Block(&'a Block),
    Cell(&'a TableCell),
    Segment(&'a Segment),
    FormatHolder(&'a SelectionMarker),
}

impl ModelPath {
    /// The document root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<PathStep> {
        self.0.last().copied()
    }

    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn block(self, index: usize) -> Self {
        self.child(PathStep::Block(index))
    }

    pub fn cell(self, row: usize, col: usize) -> Self {
        self.child(PathStep::Cell { row, col })
    }

    pub fn segment(self, index: usize) -> Self {
        self.child(PathStep::Segment(index))
    }

    pub fn format_holder(self) -> Self {
        self.child(PathStep::FormatHolder)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Strict ancestry: a path is not its own ancestor
    pub fn is_ancestor_of(&self, other: &ModelPath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn resolve<'a>(&self, doc: &'a Document) -> Option<NodeRef<'a>> {
        let mut node = NodeRef::Document(doc);
        for step in &self.0 {
            node = step_into(node, *step)?;
        }
        Some(node)
    }

    pub fn resolve_block<'a>(&self, doc: &'a Document) -> Result<&'a Block, ModelError> {
        match self.resolve(doc) {
            Some(NodeRef::Block(block)) => Ok(block),
            Some(_) => Err(ModelError::WrongNodeKind {
                path: self.clone(),
                expected: "block",
            }),
            None => Err(ModelError::PathNotFound(self.clone())),
        }
    }
}

fn blocks_of<'a>(node: NodeRef<'a>) -> Option<&'a [Block]> {
    match node {
        NodeRef::Document(doc) => Some(&doc.blocks),
        NodeRef::Cell(cell) => Some(&cell.blocks),
        NodeRef::Block(Block::FormatContainer(group)) => Some(&group.blocks),
        NodeRef::Block(Block::ListItem(group)) => Some(&group.blocks),
        NodeRef::Block(Block::General(group)) => Some(&group.blocks),
        NodeRef::Segment(Segment::General(group)) => Some(&group.blocks),
        _ => None,
    }
}

fn step_into<'a>(node: NodeRef<'a>, step: PathStep) -> Option<NodeRef<'a>> {
    match step {
        PathStep::Block(index) => blocks_of(node)?.get(index).map(NodeRef::Block),
        PathStep::Cell { row, col } => match node {
            NodeRef::Block(Block::Table(table)) => table.cell(row, col).map(NodeRef::Cell),
            _ => None,
        },
        PathStep::Segment(index) => match node {
            NodeRef::Block(Block::Paragraph(paragraph)) => {
                paragraph.segments.get(index).map(NodeRef::Segment)
            }
            _ => None,
        },
        PathStep::FormatHolder => match node {
            NodeRef::Block(Block::ListItem(item)) => Some(NodeRef::FormatHolder(&item.format_holder)),
            _ => None,
        },
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for step in &self.0 {
            match step {
                PathStep::FormatHolder => write!(f, "/fh")?,
                PathStep::Block(i) => write!(f, "/b{i}")?,
                PathStep::Cell { row, col } => write!(f, "/c{row}.{col}")?,
                PathStep::Segment(i) => write!(f, "/s{i}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for ModelPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidPath(s.to_string());
        let mut steps = Vec::new();
        for part in s.split('/').filter(|part| !part.is_empty()) {
            let step = if part == "fh" {
                PathStep::FormatHolder
            } else if let Some(index) = part.strip_prefix('b') {
                PathStep::Block(index.parse().map_err(|_| invalid())?)
            } else if let Some(index) = part.strip_prefix('s') {
                PathStep::Segment(index.parse().map_err(|_| invalid())?)
            } else if let Some(coords) = part.strip_prefix('c') {
                let (row, col) = coords.split_once('.').ok_or_else(invalid)?;
                PathStep::Cell {
                    row: row.parse().map_err(|_| invalid())?,
                    col: col.parse().map_err(|_| invalid())?,
                }
            } else {
                return Err(invalid());
            };
            steps.push(step);
        }
        Ok(Self(steps))
    }
}

//! Mutation discipline.
//!
//! A shared reference into the model is the read-only view: caches on it are
//! trusted as is. The only way to get a [`Mutable`] view is through
//! [`ensure_mutable`] or the path helpers below, all of which drop the cache
//! reference of the node being changed and of every ancestor on the way down,
//! so a stale rendering is never reused.

use std::ops::{Deref, DerefMut};

use weft_dom::NodeId;

use crate::error::ModelError;
use crate::model::{
    Block, BlockGroup, Divider, Document, FormatContainer, ListItem, ModelPath, Paragraph,
    PathStep, Segment, SelectionMarker, Table, TableCell, TableRow,
};

/// Something that may remember the native node it was rendered into
pub trait Cacheable {
    fn cached_element(&self) -> Option<NodeId>;

    /// Drop the cache reference. Returns true if one was present.
    fn clear_cache(&mut self) -> bool;
}

macro_rules! impl_cacheable {
    ($($ty:ty),*) => {
        $(
            impl Cacheable for $ty {
                fn cached_element(&self) -> Option<NodeId> {
                    self.cached.get()
                }

                fn clear_cache(&mut self) -> bool {
                    self.cached.clear()
                }
            }
        )*
    };
}

impl_cacheable!(Paragraph, TableRow, TableCell, Divider, FormatContainer, ListItem);

impl Cacheable for Table {
    fn cached_element(&self) -> Option<NodeId> {
        self.cached.get()
    }

    /// A table's rows render inside its element, so they go too
    fn clear_cache(&mut self) -> bool {
        let mut cleared = self.cached.clear();
        for row in &mut self.rows {
            cleared |= row.cached.clear();
        }
        cleared
    }
}

impl Cacheable for Block {
    fn cached_element(&self) -> Option<NodeId> {
        Block::cached_element(self)
    }

    fn clear_cache(&mut self) -> bool {
        match self {
            Block::Paragraph(b) => b.clear_cache(),
            Block::Table(b) => b.clear_cache(),
            Block::Divider(b) => b.clear_cache(),
            Block::FormatContainer(b) => b.clear_cache(),
            Block::ListItem(b) => b.clear_cache(),
            Block::Entity(_) | Block::General(_) => false,
        }
    }
}

/// The mutable view of a model node
#[derive(Debug)]
pub struct Mutable<'a, T: ?Sized>(&'a mut T);

impl<'a, T: ?Sized> Mutable<'a, T> {
    pub fn into_inner(self) -> &'a mut T {
        self.0
    }
}

impl<T: ?Sized> Deref for Mutable<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0
    }
}

impl<T: ?Sized> DerefMut for Mutable<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.0
    }
}

/// Turn a node into its mutable view, dropping its cache reference.
///
/// The caller is responsible for the ancestors; prefer the path-addressed
/// helpers, which handle the whole chain.
pub fn ensure_mutable<T: Cacheable + ?Sized>(node: &mut T) -> Mutable<'_, T> {
    if node.clear_cache() {
        log::debug!("dropped cached element on mutation");
    }
    Mutable(node)
}

enum NodeMut<'a> {
    Document(&'a mut Document),
    Block(&'a mut Block),
    Cell(&'a mut TableCell),
    Segment(&'a mut Segment),
    FormatHolder(&'a mut SelectionMarker),
}

fn group_blocks_mut<'a>(node: NodeMut<'a>) -> Option<&'a mut Vec<Block>> {
    match node {
        NodeMut::Document(doc) => Some(&mut doc.blocks),
        NodeMut::Cell(cell) => Some(&mut cell.blocks),
        NodeMut::Block(Block::FormatContainer(group)) => Some(&mut group.blocks),
        NodeMut::Block(Block::ListItem(group)) => Some(&mut group.blocks),
        NodeMut::Block(Block::General(group)) => Some(&mut group.blocks),
        NodeMut::Segment(Segment::General(group)) => Some(&mut group.blocks),
        _ => None,
    }
}

/// Step one level down, invalidating the node being left
fn step_into_mut(node: NodeMut<'_>, step: PathStep) -> Option<NodeMut<'_>> {
    match step {
        PathStep::Block(index) => group_blocks_mut(invalidate(node))?
            .get_mut(index)
            .map(NodeMut::Block),
        PathStep::Cell { row, col } => match node {
            NodeMut::Block(Block::Table(table)) => {
                table.cached.clear();
                let row = table.rows.get_mut(row)?;
                row.cached.clear();
                let cell = row.cells.get_mut(col)?;
                Some(NodeMut::Cell(cell))
            }
            _ => None,
        },
        PathStep::Segment(index) => match node {
            NodeMut::Block(Block::Paragraph(paragraph)) => {
                paragraph.cached.clear();
                paragraph.segments.get_mut(index).map(NodeMut::Segment)
            }
            _ => None,
        },
        PathStep::FormatHolder => match node {
            NodeMut::Block(Block::ListItem(item)) => {
                item.cached.clear();
                Some(NodeMut::FormatHolder(&mut item.format_holder))
            }
            _ => None,
        },
    }
}

/// Drop the cache of a group node we are about to descend through
fn invalidate(node: NodeMut<'_>) -> NodeMut<'_> {
    match node {
        NodeMut::Block(block) => {
            match block {
                Block::FormatContainer(group) => {
                    group.cached.clear();
                }
                Block::ListItem(group) => {
                    group.cached.clear();
                }
                _ => {}
            }
            NodeMut::Block(block)
        }
        NodeMut::Cell(cell) => {
            cell.cached.clear();
            NodeMut::Cell(cell)
        }
        other => other,
    }
}

fn resolve_mut<'a>(doc: &'a mut Document, path: &ModelPath) -> Result<NodeMut<'a>, ModelError> {
    let mut node = NodeMut::Document(doc);
    for step in path.steps() {
        node = step_into_mut(node, *step).ok_or_else(|| ModelError::PathNotFound(path.clone()))?;
    }
    Ok(node)
}

/// Mutable view of the block at `path`, invalidating it and its ancestors.
pub fn mutate_block<'a>(
    doc: &'a mut Document,
    path: &ModelPath,
) -> Result<Mutable<'a, Block>, ModelError> {
    match resolve_mut(doc, path)? {
        NodeMut::Block(block) => Ok(ensure_mutable(block)),
        _ => Err(ModelError::WrongNodeKind {
            path: path.clone(),
            expected: "block",
        }),
    }
}

/// Mutable view of the segment at `path`, invalidating its paragraph and
/// every ancestor above it.
pub fn mutate_segment<'a>(
    doc: &'a mut Document,
    path: &ModelPath,
) -> Result<Mutable<'a, Segment>, ModelError> {
    match resolve_mut(doc, path)? {
        NodeMut::Segment(segment) => Ok(Mutable(segment)),
        _ => Err(ModelError::WrongNodeKind {
            path: path.clone(),
            expected: "segment",
        }),
    }
}

/// Mutable view of the list item format holder at `path` (ending in `/fh`),
/// invalidating the list item and every ancestor above it.
pub fn mutate_format_holder<'a>(
    doc: &'a mut Document,
    path: &ModelPath,
) -> Result<Mutable<'a, SelectionMarker>, ModelError> {
    match resolve_mut(doc, path)? {
        NodeMut::FormatHolder(holder) => Ok(Mutable(holder)),
        _ => Err(ModelError::WrongNodeKind {
            path: path.clone(),
            expected: "format holder",
        }),
    }
}

/// Drop the cache of the node at `path` and of every ancestor
pub(crate) fn invalidate_path(doc: &mut Document, path: &ModelPath) -> Result<(), ModelError> {
    match resolve_mut(doc, path)? {
        NodeMut::Block(block) => {
            block.clear_cache();
        }
        NodeMut::Cell(cell) => {
            cell.cached.clear();
        }
        NodeMut::Document(_) | NodeMut::Segment(_) | NodeMut::FormatHolder(_) => {}
    }
    Ok(())
}

/// Mutable view of the block group at `path` (the document for the root path).
pub fn mutate_group<'a>(
    doc: &'a mut Document,
    path: &ModelPath,
) -> Result<Mutable<'a, dyn BlockGroup + 'a>, ModelError> {
    let wrong_kind = || ModelError::WrongNodeKind {
        path: path.clone(),
        expected: "block group",
    };
    let group: &'a mut (dyn BlockGroup + 'a) = match resolve_mut(doc, path)? {
        NodeMut::Document(doc) => doc,
        NodeMut::Cell(cell) => {
            cell.cached.clear();
            cell
        }
        NodeMut::Block(block) => match block {
            Block::FormatContainer(group) => {
                group.cached.clear();
                group
            }
            Block::ListItem(group) => {
                group.cached.clear();
                group
            }
            Block::General(group) => group,
            _ => return Err(wrong_kind()),
        },
        NodeMut::Segment(Segment::General(group)) => group,
        NodeMut::Segment(_) | NodeMut::FormatHolder(_) => return Err(wrong_kind()),
    };
    Ok(Mutable(group))
}

/// Drop every cache reference in a subtree
pub fn clear_cached_elements(group: &mut dyn BlockGroup) {
    for block in group.blocks_mut() {
        clear_block_caches(block);
    }
}

fn clear_block_caches(block: &mut Block) {
    block.clear_cache();
    match block {
        Block::Paragraph(paragraph) => {
            for segment in &mut paragraph.segments {
                if let Segment::General(general) = segment {
                    clear_cached_elements(general);
                }
            }
        }
        Block::Table(table) => {
            for row in &mut table.rows {
                for cell in &mut row.cells {
                    cell.clear_cache();
                    clear_cached_elements(cell);
                }
            }
        }
        Block::FormatContainer(group) => clear_cached_elements(group),
        Block::ListItem(group) => clear_cached_elements(group),
        Block::General(group) => clear_cached_elements(group),
        Block::Divider(_) | Block::Entity(_) => {}
    }
}

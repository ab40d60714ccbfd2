//! The Model: a typed tree of block groups, blocks and segments.
//!
//! The tree owns its children by value. Nodes carry only their own format
//! deltas and selection flags; the optional cache reference on blocks and
//! groups is a rendering hint that never takes part in equality.
//!
//! ## Modules
//!
//! - [`format`] - Format deltas for segments, blocks and list levels
//! - [`segment`] - Inline units inside a paragraph
//! - [`block`] - Paragraphs, tables, dividers and the [`Block`] variant set
//! - [`group`] - Block groups: document, list item, table cell, containers
//! - [`path`] - Addressing nodes by their position from the root
//! - [`builder`] - Appending blocks and segments with marker coalescing
//! - [`metadata`] - The JSON side channel stored in a node's dataset

pub mod block;
pub mod builder;
pub mod format;
pub mod group;
pub mod metadata;
pub mod path;
pub mod segment;

pub use block::*;
pub use builder::*;
pub use format::*;
pub use group::*;
pub use metadata::*;
pub use path::*;
pub use segment::*;

use weft_dom::NodeId;

/// Native node a block or group was last rendered into.
///
/// Always compares equal and is never serialized, so two trees that differ
/// only in cache hints are the same document.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedElement(Option<NodeId>);

impl CachedElement {
    pub fn new(node: NodeId) -> Self {
        Self(Some(node))
    }

    pub fn get(&self) -> Option<NodeId> {
        self.0
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn set(&mut self, node: Option<NodeId>) {
        self.0 = node;
    }

    /// Returns true if a cache reference was dropped
    pub(crate) fn clear(&mut self) -> bool {
        self.0.take().is_some()
    }
}

impl PartialEq for CachedElement {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

//! Reverse sync: model -> native tree.
//!
//! [`model_to_dom`] renders a [`Document`] into the children of a native
//! container, reusing cached elements of blocks that carry no selection and
//! dropping native nodes the model no longer represents. Rendering records
//! where selected content lands, and the recorded positions become the
//! returned native selection.
//!
//! ## Modules
//!
//! - [`handlers`] - The default handler registry
//! - [`format_appliers`] - Format delta -> native element

pub mod format_appliers;
pub mod handlers;

use weft_dom::{Dom, DomPosition, DomRange, DomSelection, NodeId, NodeKind};

use crate::indexer::DomIndexer;
use crate::model::{
    BlockFormat, BlockGroup, Br, Divider, Document, Entity, FormatContainer, GeneralContainer,
    Image, ListItem, ListLevel, Paragraph, Table, Text,
};
use crate::mutation::clear_cached_elements;

pub use format_appliers::FormatAppliers;

/// Renders one block before `reference` in `parent` and returns the node the
/// next block goes before
pub type BlockHandler<T> =
    fn(&mut Dom, NodeId, &mut T, &mut ModelToDomContext<'_>, Option<NodeId>) -> Option<NodeId>;

/// Appends one segment to the paragraph container `parent`
pub type SegmentHandler<T> = fn(&mut Dom, NodeId, &mut T, &mut ModelToDomContext<'_>);

pub type BlockGroupChildrenHandler = fn(&mut Dom, NodeId, &mut dyn BlockGroup, &mut ModelToDomContext<'_>);

/// One handler per model node kind
#[derive(Clone)]
pub struct ModelToDomHandlers {
    /// Reconciles the children of a native element with a block group
    pub block_group_children: BlockGroupChildrenHandler,
    pub paragraph: BlockHandler<Paragraph>,
    pub table: BlockHandler<Table>,
    pub divider: BlockHandler<Divider>,
    pub entity_block: BlockHandler<Entity>,
    pub format_container: BlockHandler<FormatContainer>,
    pub list_item: BlockHandler<ListItem>,
    pub general_block: BlockHandler<GeneralContainer>,
    pub text: SegmentHandler<Text>,
    pub br: SegmentHandler<Br>,
    pub image: SegmentHandler<Image>,
    pub general_segment: SegmentHandler<GeneralContainer>,
    pub entity_segment: SegmentHandler<Entity>,
}

impl Default for ModelToDomHandlers {
    fn default() -> Self {
        handlers::default_handlers()
    }
}

/// Where the selected content of the model landed
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectionRecord {
    pub start: Option<DomPosition>,
    pub end: Option<DomPosition>,
    pub table: Option<DomSelection>,
    pub image: Option<NodeId>,
}

pub struct ModelToDomContext<'a> {
    pub handlers: ModelToDomHandlers,
    pub format_appliers: FormatAppliers,
    /// Record rendered elements as cache hints on the model
    pub allow_cache_element: bool,
    pub indexer: Option<&'a mut dyn DomIndexer>,

    /// Block format inherited from the enclosing group
    pub(crate) block_format: BlockFormat,
    /// Open native lists, outermost first
    pub(crate) list_stack: Vec<(ListLevel, NodeId)>,
    pub(crate) selection: SelectionRecord,
}

impl Default for ModelToDomContext<'_> {
    fn default() -> Self {
        Self {
            handlers: ModelToDomHandlers::default(),
            format_appliers: FormatAppliers::default(),
            allow_cache_element: false,
            indexer: None,
            block_format: BlockFormat::default(),
            list_stack: Vec::new(),
            selection: SelectionRecord::default(),
        }
    }
}

impl<'a> ModelToDomContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, allow_cache_element: bool) -> Self {
        self.allow_cache_element = allow_cache_element;
        self
    }

    pub fn with_indexer(mut self, indexer: &'a mut dyn DomIndexer) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn with_handlers(mut self, handlers: ModelToDomHandlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Extend the range selection over content spanning `start..end`
    pub(crate) fn record_selected(&mut self, start: DomPosition, end: DomPosition) {
        if self.selection.start.is_none() {
            self.selection.start = Some(start);
        }
        self.selection.end = Some(end);
    }

    /// Record a selected node by the gaps around it
    pub(crate) fn record_selected_node(&mut self, dom: &Dom, node: NodeId) {
        if let (Some(start), Some(end)) = (DomPosition::before(dom, node), DomPosition::after(dom, node)) {
            self.record_selected(start, end);
        }
    }

    /// Positions recorded inside `fragment` before its children `moved` were
    /// inserted into `parent` ahead of `reference`. A fragment never anchors a
    /// final selection.
    pub(crate) fn relocate_fragment_positions(
        &mut self,
        dom: &Dom,
        fragment: NodeId,
        moved: &[NodeId],
        parent: NodeId,
        reference: Option<NodeId>,
    ) {
        let relocate = |position: DomPosition| {
            if position.node != fragment {
                return position;
            }
            let relocated = match moved.get(position.offset) {
                Some(&child) => DomPosition::before(dom, child),
                None => moved.last().and_then(|&last| DomPosition::after(dom, last)),
            };
            relocated.unwrap_or_else(|| {
                let offset = reference
                    .and_then(|node| dom.index_of(node))
                    .unwrap_or(dom.children(parent).len());
                DomPosition::new(parent, offset)
            })
        };
        self.selection.start = self.selection.start.map(&relocate);
        self.selection.end = self.selection.end.map(&relocate);
    }

    fn take_selection(&mut self, dom: &mut Dom, root: NodeId, is_reverted: bool) -> Option<DomSelection> {
        let record = std::mem::take(&mut self.selection);
        let mut tracked: Vec<DomPosition> = record.start.into_iter().chain(record.end).collect();
        dom.normalize(root, &mut tracked);

        if let Some(image) = record.image {
            return Some(DomSelection::Image { image });
        }
        if let &[start, end] = tracked.as_slice() {
            return Some(DomSelection::Range {
                range: DomRange::new(start, end),
                is_reverted,
            });
        }
        record.table
    }
}

/// A cache hint that names a live element of `dom` which can be moved under
/// `parent`
pub(crate) fn reusable_element(dom: &Dom, cached: Option<NodeId>, parent: NodeId) -> Option<NodeId> {
    cached.filter(|&node| {
        dom.has_node(node) && dom.kind(node) == NodeKind::Element && !dom.contains(node, parent)
    })
}

/// Put a cached element at `reference`, dropping the native nodes in between
/// which the model no longer holds. Returns the next reference.
pub(crate) fn reuse_cached_element(
    dom: &mut Dom,
    parent: NodeId,
    element: NodeId,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    if dom.parent(element) == Some(parent) {
        let mut reference = reference;
        while let Some(node) = reference
            && node != element
        {
            reference = dom.next_sibling(node);
            dom.detach(node);
        }
        if reference == Some(element) {
            return dom.next_sibling(element);
        }
    }
    dom.insert_before(parent, element, reference);
    reference.filter(|&node| dom.parent(node) == Some(parent))
}

/// Render `doc` into the children of `root` and return the native selection
/// matching the model's selection, if any.
///
/// Native children of `root` the model does not account for are removed and
/// `root` is normalized afterwards. Cache hints are cleared from the model
/// unless it asks to keep them.
pub fn model_to_dom(
    dom: &mut Dom,
    root: NodeId,
    doc: &mut Document,
    context: &mut ModelToDomContext<'_>,
) -> Option<DomSelection> {
    context.block_format = BlockFormat::default();
    context.list_stack.clear();
    context.selection = SelectionRecord::default();

    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.clear_index(dom, root);
    }

    let children = context.handlers.block_group_children;
    children(dom, root, doc, context);

    let selection = context.take_selection(dom, root, doc.has_reverted_range_selection);
    if !doc.persist_cache {
        clear_cached_elements(doc);
    }
    log::debug!("rendered {} top level blocks into {root}", doc.blocks.len());
    selection
}

#[cfg(test)]
mod tests;

//! Forward sync: native tree -> model.
//!
//! [`dom_to_model`] walks the children of a native root through a registry of
//! processors, one per element shape, and returns a fresh [`Document`]. The
//! walk never fails: shapes no processor knows are handled by a fallback and
//! ignored content is logged at debug level.
//!
//! A native selection handed in on the context is translated while walking.
//! Boundary points become selection markers or selected segments, a table
//! selection flags the covered cells and an image selection flags the image.
//!
//! ## Modules
//!
//! - [`processors`] - The default processor registry
//! - [`format_parsers`] - Native element -> format delta

pub mod format_parsers;
pub mod processors;

use std::collections::HashMap;

use weft_dom::{Dom, DomPosition, DomRange, DomSelection, NodeId};

use crate::indexer::DomIndexer;
use crate::model::{
    Block, BlockFormat, BlockGroup, Document, Link, ListLevel, SegmentFormat, SelectionMarker,
    Segment, add_segment,
};
use crate::normalize::normalize_document;

pub use format_parsers::FormatParsers;

/// Turns one native node into zero or more model nodes appended to `group`
pub type ElementProcessor = fn(&mut dyn BlockGroup, &Dom, NodeId, &mut DomToModelContext<'_>);

/// Processors keyed by element tag, plus the entry points every walk uses
#[derive(Clone)]
pub struct ProcessorMap {
    pub by_tag: HashMap<String, ElementProcessor>,
    /// Walks the children of a node; called once for the root
    pub child: ElementProcessor,
    pub text: ElementProcessor,
    /// Elements carrying `data-entity-type`
    pub entity: ElementProcessor,
    /// Elements no tag processor is registered for
    pub unknown: ElementProcessor,
}

impl ProcessorMap {
    pub fn get(&self, tag: &str) -> Option<ElementProcessor> {
        self.by_tag.get(tag).copied()
    }

    pub fn insert(&mut self, tag: &str, processor: ElementProcessor) {
        self.by_tag.insert(tag.to_ascii_lowercase(), processor);
    }
}

impl Default for ProcessorMap {
    fn default() -> Self {
        processors::default_processors()
    }
}

/// Everything a forward sync run reads and threads through the processors
pub struct DomToModelContext<'a> {
    pub processors: ProcessorMap,
    pub format_parsers: FormatParsers,
    /// Becomes the document's default format
    pub default_format: SegmentFormat,
    pub selection: Option<DomSelection>,
    /// Let processors record native elements as cache hints
    pub allow_cache_element: bool,
    pub indexer: Option<&'a mut dyn DomIndexer>,

    /// Inherited segment format of the element being processed
    pub segment_format: SegmentFormat,
    /// Inherited block format of the element being processed
    pub block_format: BlockFormat,
    pub link: Option<Link>,
    /// Enclosing native lists, outermost first
    pub list_levels: Vec<ListLevel>,
    pub is_in_selection: bool,

    pub(crate) in_list_item: bool,
    /// Items of lists nested inside the list item being built
    pub(crate) nested_list_blocks: Vec<Block>,
}

impl Default for DomToModelContext<'_> {
    fn default() -> Self {
        Self {
            processors: ProcessorMap::default(),
            format_parsers: FormatParsers::default(),
            default_format: SegmentFormat::default(),
            selection: None,
            allow_cache_element: false,
            indexer: None,
            segment_format: SegmentFormat::default(),
            block_format: BlockFormat::default(),
            link: None,
            list_levels: Vec::new(),
            is_in_selection: false,
            in_list_item: false,
            nested_list_blocks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    Start,
    End,
}

impl<'a> DomToModelContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: Option<DomSelection>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_cache(mut self, allow_cache_element: bool) -> Self {
        self.allow_cache_element = allow_cache_element;
        self
    }

    pub fn with_indexer(mut self, indexer: &'a mut dyn DomIndexer) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn with_default_format(mut self, format: SegmentFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn with_processor(mut self, tag: &str, processor: ElementProcessor) -> Self {
        self.processors.insert(tag, processor);
        self
    }

    /// Run `f`, then restore the inherited formats and link
    pub fn with_saved_format<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let segment_format = self.segment_format.clone();
        let block_format = self.block_format.clone();
        let link = self.link.clone();
        let result = f(self);
        self.segment_format = segment_format;
        self.block_format = block_format;
        self.link = link;
        result
    }

    pub(crate) fn range(&self) -> Option<DomRange> {
        match self.selection {
            Some(DomSelection::Range { range, .. }) => Some(range),
            _ => None,
        }
    }

    /// Boundaries of the range selection sitting at `position`, start first
    pub(crate) fn boundaries_at(&self, position: DomPosition) -> Vec<Boundary> {
        let Some(range) = self.range() else {
            return Vec::new();
        };
        let mut boundaries = Vec::new();
        if range.start == position {
            boundaries.push(Boundary::Start);
        }
        if range.end == position {
            boundaries.push(Boundary::End);
        }
        boundaries
    }

    /// Handle the range selection crossing `position` in the walk
    pub(crate) fn on_position(&mut self, group: &mut dyn BlockGroup, position: DomPosition) {
        for boundary in self.boundaries_at(position) {
            self.on_boundary(group, boundary);
        }
    }

    pub(crate) fn on_boundary(&mut self, group: &mut dyn BlockGroup, boundary: Boundary) {
        let collapsed = self.range().is_some_and(|range| range.is_collapsed());
        match boundary {
            Boundary::Start => {
                self.is_in_selection = true;
                self.add_selection_marker(group, Boundary::Start);
            }
            Boundary::End => {
                if !collapsed {
                    self.add_selection_marker(group, Boundary::End);
                }
                self.is_in_selection = false;
            }
        }
    }

    fn add_selection_marker(&self, group: &mut dyn BlockGroup, boundary: Boundary) {
        let marker = Segment::SelectionMarker(SelectionMarker::new(self.segment_format.clone()));
        let blocks = group.blocks_mut();
        let trailing_separator = matches!(
            blocks.last(),
            Some(Block::Paragraph(p)) if p.is_implicit && p.segments.is_empty()
        );

        match boundary {
            // A point between two blocks belongs to the end of the first one
            Boundary::Start if trailing_separator && blocks.len() >= 2 => {
                let index = blocks.len() - 2;
                if let Some(Block::Paragraph(previous)) = blocks.get_mut(index) {
                    previous.segments.push(marker);
                    return;
                }
                add_segment(group, marker, Some(&self.block_format));
            }
            Boundary::End if trailing_separator || blocks.is_empty() => {}
            _ => {
                add_segment(group, marker, Some(&self.block_format));
            }
        }
    }
}

/// Build a model from the children of `root`.
///
/// The result records a reverted range selection, asks for its cache hints
/// to be kept when an indexer was given and caching is allowed, and is
/// normalized before it is returned.
pub fn dom_to_model(dom: &Dom, root: NodeId, context: &mut DomToModelContext<'_>) -> Document {
    let mut doc = Document {
        format: context.default_format.clone(),
        ..Default::default()
    };

    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.clear_index(dom, root);
    }

    let child = context.processors.child;
    child(&mut doc, dom, root, context);

    doc.has_reverted_range_selection = matches!(
        context.selection,
        Some(DomSelection::Range {
            is_reverted: true,
            ..
        })
    );
    doc.persist_cache = context.indexer.is_some() && context.allow_cache_element;

    normalize_document(&mut doc);
    log::debug!("built model with {} top level blocks", doc.blocks.len());
    doc
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weft_dom::NodeId;

use crate::model::CachedElement;
use crate::model::block::Block;
use crate::model::format::{BlockFormat, ListLevelFormat, SegmentFormat};
use crate::model::segment::SelectionMarker;

/// Root of the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Document default segment format, the bottom of the format cascade
    #[serde(default)]
    pub format: SegmentFormat,
    /// The native selection this model came from had its focus before its anchor
    #[serde(default)]
    pub has_reverted_range_selection: bool,
    /// Keep cache hints after rendering
    #[serde(default)]
    pub persist_cache: bool,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }
}

/// Styled wrapper around blocks, e.g. `blockquote` or `pre`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatContainer {
    pub tag_name: String,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl FormatContainer {
    pub fn new(tag_name: &str, blocks: Vec<Block>) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            blocks,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListType {
    Ordered,
    #[default]
    Unordered,
}

impl ListType {
    pub fn tag_name(self) -> &'static str {
        match self {
            ListType::Ordered => "ol",
            ListType::Unordered => "ul",
        }
    }
}

/// One nesting level of a list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListLevel {
    pub list_type: ListType,
    #[serde(default)]
    pub format: ListLevelFormat,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dataset: BTreeMap<String, String>,
}

impl ListLevel {
    pub fn new(list_type: ListType) -> Self {
        Self {
            list_type,
            ..Default::default()
        }
    }
}

/// One list item. Nested lists are flattened into consecutive items whose
/// level stacks are longer; the last level is the item's own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
    pub levels: Vec<ListLevel>,
    /// Carries the format a caret at the item's bullet would get
    pub format_holder: SelectionMarker,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl ListItem {
    pub fn new(levels: Vec<ListLevel>, holder_format: SegmentFormat) -> Self {
        Self {
            blocks: Vec::new(),
            levels,
            format_holder: SelectionMarker {
                format: holder_format,
                is_selected: false,
            },
            format: BlockFormat::default(),
            cached: CachedElement::default(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub format: BlockFormat,
    /// Continuation of the cell to the left
    #[serde(default)]
    pub span_left: bool,
    /// Continuation of the cell above
    #[serde(default)]
    pub span_above: bool,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dataset: BTreeMap<String, String>,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl TableCell {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }

    pub fn spanned(span_left: bool, span_above: bool) -> Self {
        Self {
            span_left,
            span_above,
            ..Default::default()
        }
    }

    /// True for cells that render their own native element
    pub fn is_origin(&self) -> bool {
        !self.span_left && !self.span_above
    }
}

/// An opaque native subtree the model does not decompose. Used both as a
/// block and as an inline segment; its children become the inner blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralContainer {
    pub element: NodeId,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(default)]
    pub segment_format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

impl GeneralContainer {
    pub fn new(element: NodeId) -> Self {
        Self {
            element,
            blocks: Vec::new(),
            format: BlockFormat::default(),
            segment_format: SegmentFormat::default(),
            is_selected: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockGroupType {
    Document,
    FormatContainer,
    ListItem,
    TableCell,
    General,
}

/// Anything that owns an ordered list of blocks
pub trait BlockGroup {
    fn group_type(&self) -> BlockGroupType;
    fn blocks(&self) -> &[Block];
    fn blocks_mut(&mut self) -> &mut Vec<Block>;
}

macro_rules! impl_block_group {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl BlockGroup for $ty {
                fn group_type(&self) -> BlockGroupType {
                    BlockGroupType::$variant
                }

                fn blocks(&self) -> &[Block] {
                    &self.blocks
                }

                fn blocks_mut(&mut self) -> &mut Vec<Block> {
                    &mut self.blocks
                }
            }
        )*
    };
}

impl_block_group!(
    Document => Document,
    FormatContainer => FormatContainer,
    ListItem => ListItem,
    TableCell => TableCell,
    GeneralContainer => General,
);

/// Borrowed view of any block group, used for ancestor paths
#[derive(Debug, Clone, Copy)]
pub enum BlockGroupRef<'a> {
    Document(&'a Document),
    FormatContainer(&'a FormatContainer),
    ListItem(&'a ListItem),
    TableCell(&'a TableCell),
    General(&'a GeneralContainer),
}

impl<'a> BlockGroupRef<'a> {
    pub fn group_type(&self) -> BlockGroupType {
        match self {
            BlockGroupRef::Document(_) => BlockGroupType::Document,
            BlockGroupRef::FormatContainer(_) => BlockGroupType::FormatContainer,
            BlockGroupRef::ListItem(_) => BlockGroupType::ListItem,
            BlockGroupRef::TableCell(_) => BlockGroupType::TableCell,
            BlockGroupRef::General(_) => BlockGroupType::General,
        }
    }

    pub fn blocks(&self) -> &'a [Block] {
        match *self {
            BlockGroupRef::Document(g) => &g.blocks,
            BlockGroupRef::FormatContainer(g) => &g.blocks,
            BlockGroupRef::ListItem(g) => &g.blocks,
            BlockGroupRef::TableCell(g) => &g.blocks,
            BlockGroupRef::General(g) => &g.blocks,
        }
    }

    /// Whether both views borrow the very same group
    pub fn same_node(&self, other: &BlockGroupRef<'_>) -> bool {
        std::ptr::eq(self.address(), other.address())
    }

    fn address(&self) -> *const () {
        match *self {
            BlockGroupRef::Document(g) => g as *const Document as *const (),
            BlockGroupRef::FormatContainer(g) => g as *const FormatContainer as *const (),
            BlockGroupRef::ListItem(g) => g as *const ListItem as *const (),
            BlockGroupRef::TableCell(g) => g as *const TableCell as *const (),
            BlockGroupRef::General(g) => g as *const GeneralContainer as *const (),
        }
    }

    pub fn as_list_item(&self) -> Option<&'a ListItem> {
        match *self {
            BlockGroupRef::ListItem(item) => Some(item),
            _ => None,
        }
    }
}

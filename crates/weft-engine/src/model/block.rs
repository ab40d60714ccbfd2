use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::CachedElement;
use crate::model::format::{BlockFormat, SegmentFormat};
use crate::model::group::{FormatContainer, GeneralContainer, ListItem, TableCell};
use crate::model::segment::{Entity, Segment};

/// Semantic wrapper of a paragraph, e.g. a heading tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphDecorator {
    pub tag_name: String,
    #[serde(default)]
    pub format: SegmentFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub format: BlockFormat,
    /// Format shared by every segment, applied to a caret in this paragraph
    #[serde(default)]
    pub segment_format: SegmentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator: Option<ParagraphDecorator>,
    /// Created to hold loose inline content; rendered without a wrapper
    #[serde(default)]
    pub is_implicit: bool,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl Paragraph {
    pub fn new(format: BlockFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn implicit() -> Self {
        Self {
            is_implicit: true,
            ..Default::default()
        }
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_decorator(mut self, tag_name: &str, format: SegmentFormat) -> Self {
        self.decorator = Some(ParagraphDecorator {
            tag_name: tag_name.to_string(),
            format,
        });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }
}

/// A rectangular grid of cells. Merged regions are kept as cells flagged with
/// `span_left`/`span_above`, so every row has the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    /// Column widths in pixels
    #[serde(default)]
    pub widths: Vec<f32>,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dataset: BTreeMap<String, String>,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl Table {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }
}

/// Horizontal rule or similar visual separator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divider {
    pub tag_name: String,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(skip)]
    pub cached: CachedElement,
}

impl Divider {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            format: BlockFormat::default(),
            is_selected: false,
            cached: CachedElement::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Divider(Divider),
    Entity(Entity),
    FormatContainer(FormatContainer),
    ListItem(ListItem),
    General(GeneralContainer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Paragraph,
    Table,
    Divider,
    Entity,
    BlockGroup,
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Paragraph(_) => BlockType::Paragraph,
            Block::Table(_) => BlockType::Table,
            Block::Divider(_) => BlockType::Divider,
            Block::Entity(_) => BlockType::Entity,
            Block::FormatContainer(_) | Block::ListItem(_) | Block::General(_) => {
                BlockType::BlockGroup
            }
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&BlockFormat> {
        match self {
            Block::Paragraph(b) => Some(&b.format),
            Block::Table(b) => Some(&b.format),
            Block::Divider(b) => Some(&b.format),
            Block::Entity(_) => None,
            Block::FormatContainer(b) => Some(&b.format),
            Block::ListItem(b) => Some(&b.format),
            Block::General(b) => Some(&b.format),
        }
    }

    /// Cache reference of this block, if it carries one
    pub fn cached_element(&self) -> Option<weft_dom::NodeId> {
        match self {
            Block::Paragraph(b) => b.cached.get(),
            Block::Table(b) => b.cached.get(),
            Block::Divider(b) => b.cached.get(),
            Block::FormatContainer(b) => b.cached.get(),
            Block::ListItem(b) => b.cached.get(),
            Block::Entity(_) | Block::General(_) => None,
        }
    }
}

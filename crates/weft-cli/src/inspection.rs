//! One surface tree run through both sync directions.

use anyhow::{Context, Result};
use std::path::Path;
use weft_config::Config;
use weft_dom::{Dom, DomSelection, NodeId};
use weft_engine::{
    Block, Document, DomToModelContext, ModelPath, ModelToDomContext, NodeIndex, Paragraph,
    Segment, SegmentFormat, dom_to_model, model_to_dom, model_to_text, set_selection,
};

/// Engine options taken from the host config
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_format: SegmentFormat,
    pub allow_cache_element: bool,
    pub use_indexer: bool,
    pub line_separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_format: SegmentFormat {
                font_family: config.format.font_family.clone(),
                font_size: config.format.font_size.clone(),
                text_color: config.format.text_color.clone(),
                background_color: config.format.background_color.clone(),
                ..Default::default()
            },
            allow_cache_element: config.cache.allow_cache_element,
            use_indexer: config.cache.use_indexer,
            line_separator: config.text.line_separator.clone(),
        }
    }
}

pub struct Inspection {
    dom: Dom,
    root: NodeId,
    doc: Document,
    index: NodeIndex,
    settings: Settings,
    selected_block: Option<usize>,
    last_selection: Option<DomSelection>,
}

impl Inspection {
    pub fn load(path: &Path, settings: Settings) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read surface tree {}", path.display()))?;
        Self::from_json(&json, settings)
            .with_context(|| format!("Failed to load surface tree {}", path.display()))
    }

    pub fn from_json(json: &str, settings: Settings) -> Result<Self> {
        let (dom, root) = Dom::from_json(json)?;
        let mut inspection = Self {
            dom,
            root,
            doc: Document::default(),
            index: NodeIndex::new(),
            settings,
            selected_block: None,
            last_selection: None,
        };
        inspection.forward_sync();
        Ok(inspection)
    }

    fn forward_sync(&mut self) {
        let mut context = DomToModelContext::new()
            .with_default_format(self.settings.default_format.clone())
            .with_cache(self.settings.allow_cache_element);
        if self.settings.use_indexer {
            context = context.with_indexer(&mut self.index);
        }
        self.doc = dom_to_model(&self.dom, self.root, &mut context);
        log::debug!("forward sync produced {} blocks", self.doc.blocks.len());
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn block_count(&self) -> usize {
        self.doc.blocks.len()
    }

    pub fn selected_block(&self) -> Option<usize> {
        self.selected_block
    }

    /// Select the whole top-level block at `index`, or clear the selection
    pub fn select_block(&mut self, index: Option<usize>) {
        let index = index.filter(|&index| index < self.doc.blocks.len());
        let path = index.map(|index| ModelPath::root().block(index));
        set_selection(&mut self.doc, path.as_ref(), None);
        self.selected_block = index;
    }

    /// Render the model back into the surface root and return its HTML
    pub fn reverse_sync(&mut self) -> String {
        let mut context = ModelToDomContext::new().with_cache(self.settings.allow_cache_element);
        if self.settings.use_indexer {
            context = context.with_indexer(&mut self.index);
        }
        self.last_selection = model_to_dom(&mut self.dom, self.root, &mut self.doc, &mut context);
        self.dom.inner_html(self.root)
    }

    pub fn selection_description(&self) -> String {
        describe_selection(self.last_selection.as_ref())
    }

    pub fn text(&self) -> String {
        model_to_text(&self.doc, Some(&self.dom), &self.settings.line_separator)
    }

    /// One line per top-level block
    pub fn block_summaries(&self) -> Vec<String> {
        self.doc.blocks.iter().map(summarize_block).collect()
    }

    /// Every block and group, indented by nesting
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        outline_blocks(&self.doc.blocks, 0, &mut lines);
        lines
    }

    /// The full report written by `--print`
    pub fn report(&mut self) -> Vec<String> {
        let mut lines = vec!["# Model".to_string()];
        lines.extend(self.outline());
        lines.push(String::new());
        lines.push("# Text".to_string());
        lines.extend(self.text().lines().map(str::to_string));
        lines.push(String::new());
        lines.push("# Reverse sync".to_string());
        lines.push(self.reverse_sync());
        lines.push(format!("selection: {}", self.selection_description()));
        lines
    }
}

fn describe_selection(selection: Option<&DomSelection>) -> String {
    match selection {
        None => "none".to_string(),
        Some(DomSelection::Range { range, is_reverted }) => {
            let direction = if *is_reverted { " (reverted)" } else { "" };
            format!(
                "range {}:{} .. {}:{}{direction}",
                range.start.node, range.start.offset, range.end.node, range.end.offset
            )
        }
        Some(DomSelection::Table {
            table,
            first_row,
            first_column,
            last_row,
            last_column,
        }) => format!(
            "table {table} rows {first_row}..={last_row} columns {first_column}..={last_column}"
        ),
        Some(DomSelection::Image { image }) => format!("image {image}"),
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    paragraph
        .segments
        .iter()
        .map(|segment| {
            let text = match segment {
                Segment::Text(text) => text.text.clone(),
                Segment::Br(_) => "⏎".to_string(),
                Segment::Image(image) => format!("[img {}]", image.src),
                Segment::General(_) => "[general]".to_string(),
                Segment::Entity(entity) => {
                    format!("[{}]", entity.entity_type.as_deref().unwrap_or("entity"))
                }
                Segment::SelectionMarker(marker) => {
                    return if marker.is_selected { "|".to_string() } else { String::new() };
                }
            };
            if segment.is_selected() {
                format!("«{text}»")
            } else {
                text
            }
        })
        .collect()
}

fn summarize_block(block: &Block) -> String {
    match block {
        Block::Paragraph(paragraph) => {
            let tag = match &paragraph.decorator {
                Some(decorator) => decorator.tag_name.as_str(),
                None if paragraph.is_implicit => "¶",
                None => "div",
            };
            format!("{tag} {}", paragraph_text(paragraph))
        }
        Block::Table(table) => format!("table {}x{}", table.rows.len(), table.column_count()),
        Block::Divider(divider) => divider.tag_name.clone(),
        Block::Entity(entity) => {
            format!("entity {}", entity.entity_type.as_deref().unwrap_or("?"))
        }
        Block::FormatContainer(container) => {
            format!("{} ({} blocks)", container.tag_name, container.blocks.len())
        }
        Block::ListItem(item) => {
            let tag = item.levels.last().map_or("li", |level| level.list_type.tag_name());
            format!("{tag}{} ({} blocks)", item.depth(), item.blocks.len())
        }
        Block::General(general) => format!("general ({} blocks)", general.blocks.len()),
    }
}

fn outline_blocks(blocks: &[Block], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for block in blocks {
        lines.push(format!("{indent}{}", summarize_block(block)));
        match block {
            Block::FormatContainer(container) => outline_blocks(&container.blocks, depth + 1, lines),
            Block::ListItem(item) => outline_blocks(&item.blocks, depth + 1, lines),
            Block::General(general) => outline_blocks(&general.blocks, depth + 1, lines),
            Block::Table(table) => {
                for (row_index, row) in table.rows.iter().enumerate() {
                    for (col_index, cell) in row.cells.iter().enumerate() {
                        if !cell.is_origin() {
                            continue;
                        }
                        let mark = if cell.is_selected { "*" } else { "" };
                        lines.push(format!("{indent}  cell {row_index}.{col_index}{mark}"));
                        outline_blocks(&cell.blocks, depth + 2, lines);
                    }
                }
            }
            _ => {}
        }
    }
}

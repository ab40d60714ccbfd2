//! Default processors for forward sync.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use weft_dom::{Dom, DomPosition, DomSelection, Element, NodeData, NodeId, ParsedTableCell};

use crate::dom_to_model::{Boundary, DomToModelContext, ElementProcessor, ProcessorMap};
use crate::model::{
    Block, BlockGroup, Br, Divider, Document, Entity, FormatContainer, GeneralContainer, Image,
    Link, ListItem, ListLevel, ListType, Paragraph, ParagraphDecorator, Segment, SegmentFormat,
    Table, TableCell, TableRow, Text, add_block, add_segment,
};
use crate::selection::{has_selection_in_block, has_selection_in_segment};

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "nav", "aside", "address",
    "center", "figure", "figcaption", "form", "fieldset", "dl", "dt", "dd",
];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const FORMAT_CONTAINER_TAGS: &[&str] = &["blockquote", "pre"];
const INLINE_FORMAT_TAGS: &[&str] = &[
    "b", "strong", "i", "em", "u", "s", "strike", "del", "sup", "sub", "span", "font",
];
const GENERAL_TAGS: &[&str] = &[
    "svg", "video", "audio", "iframe", "object", "embed", "canvas", "math",
];
const IGNORED_TAGS: &[&str] = &[
    "script", "style", "head", "meta", "title", "link", "template", "noscript",
];
/// Elements that always start a new block
const BLOCK_LEVEL_TAGS: &[&str] = &["blockquote", "pre", "ol", "ul", "li", "table", "hr"];

pub fn default_processors() -> ProcessorMap {
    let mut by_tag: HashMap<String, ElementProcessor> = HashMap::new();
    let mut register = |tags: &[&str], processor: ElementProcessor| {
        for tag in tags {
            by_tag.insert(tag.to_string(), processor);
        }
    };
    register(BLOCK_TAGS, block_processor);
    register(&["p"], paragraph_processor);
    register(HEADING_TAGS, heading_processor);
    register(FORMAT_CONTAINER_TAGS, format_container_processor);
    register(&["ol", "ul"], list_processor);
    register(&["li"], list_item_processor);
    register(&["table"], table_processor);
    register(&["img"], image_processor);
    register(&["br"], br_processor);
    register(&["hr"], hr_processor);
    register(&["a"], link_processor);
    register(INLINE_FORMAT_TAGS, format_processor);
    register(GENERAL_TAGS, general_processor);
    register(IGNORED_TAGS, ignored_processor);

    ProcessorMap {
        by_tag,
        child: child_processor,
        text: text_processor,
        entity: entity_processor,
        unknown: unknown_processor,
    }
}

/// Dispatch one native node to its processor
pub fn process_node(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let processor = match dom.data(node) {
        NodeData::Text(_) => context.processors.text,
        NodeData::Element(element) if element.attribute("data-entity-type").is_some() => {
            context.processors.entity
        }
        NodeData::Element(element) => context
            .processors
            .get(&element.tag)
            .unwrap_or(context.processors.unknown),
        NodeData::Document | NodeData::Fragment => context.processors.child,
        NodeData::Comment(_) => {
            log::debug!("skipping comment {node}");
            return;
        }
    };
    processor(group, dom, node, context);
}

/// Element block display, by tag or by inline style
pub fn is_block_element(dom: &Dom, node: NodeId) -> bool {
    let Some(element) = dom.element(node) else {
        return false;
    };
    let tag = element.tag.as_str();
    BLOCK_TAGS.contains(&tag)
        || HEADING_TAGS.contains(&tag)
        || BLOCK_LEVEL_TAGS.contains(&tag)
        || matches!(
            element.style("display"),
            Some("block" | "flex" | "grid" | "list-item" | "table")
        )
}

fn has_block_children(dom: &Dom, node: NodeId) -> bool {
    dom.children(node)
        .iter()
        .any(|&child| is_block_element(dom, child))
}

/// An empty implicit paragraph so inline content after a block starts a new
/// one. Normalization drops it if nothing lands in it.
fn add_separator(group: &mut dyn BlockGroup, context: &DomToModelContext<'_>) {
    let mut separator = Paragraph::implicit();
    separator.format = context.block_format.clone();
    add_block(group, Block::Paragraph(separator));
}

pub fn child_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    parent: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let children = dom.children(parent);
    for (index, &child) in children.iter().enumerate() {
        context.on_position(group, DomPosition::new(parent, index));
        process_node(group, dom, child, context);
    }
    context.on_position(group, DomPosition::new(parent, children.len()));
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"[ \t\r\n\f]+").expect("Invalid whitespace regex"))
}

fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(index, _)| index)
}

fn add_text(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    piece: &str,
    context: &mut DomToModelContext<'_>,
) {
    if piece.is_empty() {
        return;
    }
    let text = if context.block_format.preserves_whitespace() {
        piece.to_string()
    } else {
        whitespace_regex().replace_all(piece, " ").into_owned()
    };
    let segment = Text {
        text,
        format: context.segment_format.clone(),
        link: context.link.clone(),
        is_selected: context.is_in_selection,
    };
    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.on_segment(dom, node, &segment);
    }
    add_segment(group, Segment::Text(segment), Some(&context.block_format));
}

/// Text nodes, split wherever a range boundary falls inside them
pub fn text_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(text) = dom.text(node) else {
        return;
    };
    let length = text.chars().count();

    let mut points: Vec<(usize, Boundary)> = Vec::new();
    if let Some(range) = context.range() {
        if range.start.node == node {
            points.push((range.start.offset.min(length), Boundary::Start));
        }
        if range.end.node == node {
            points.push((range.end.offset.min(length), Boundary::End));
        }
    }

    let mut consumed = 0;
    for (offset, boundary) in points {
        let offset = offset.max(consumed);
        let piece = &text[byte_index(text, consumed)..byte_index(text, offset)];
        add_text(group, dom, node, piece, context);
        consumed = offset;
        context.on_boundary(group, boundary);
    }
    let rest = &text[byte_index(text, consumed)..];
    add_text(group, dom, node, rest, context);
}

fn element_of(dom: &Dom, node: NodeId) -> Option<&Element> {
    let element = dom.element(node);
    if element.is_none() {
        log::debug!("expected an element at {node}");
    }
    element
}

/// A block element holding only inline content becomes one paragraph
fn leaf_block(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
    decorator: Option<ParagraphDecorator>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    context.with_saved_format(|context| {
        let mut format = context.block_format.clone();
        context.format_parsers.parse_block(&mut format, element);
        let is_heading = decorator
            .as_ref()
            .is_some_and(|decorator| decorator.tag_name != "p");
        if !is_heading {
            context
                .format_parsers
                .parse_segment_on_block(&mut context.segment_format, element);
        }
        context.block_format = format.inheritable();

        let mut paragraph = Paragraph::new(format);
        paragraph.decorator = decorator;
        let index = group.blocks().len();
        add_block(group, Block::Paragraph(paragraph));

        let child = context.processors.child;
        child(group, dom, node, context);

        if let Some(indexer) = context.indexer.as_deref_mut() {
            indexer.on_paragraph(dom, node);
        }
        if context.allow_cache_element
            && group.blocks().len() == index + 1
            && let Some(Block::Paragraph(paragraph)) = group.blocks_mut().last_mut()
            && !paragraph.segments.iter().any(has_selection_in_segment)
        {
            paragraph.cached.set(Some(node));
        }
    });
    add_separator(group, context);
}

/// A block element with block children becomes a format container
fn container_block(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
    default_white_space: Option<&str>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let mut container = FormatContainer::new(&element.tag, Vec::new());
    container.format = context.block_format.clone();
    context
        .format_parsers
        .parse_block(&mut container.format, element);
    if container.format.white_space.is_none() {
        container.format.white_space = default_white_space.map(str::to_string);
    }

    context.with_saved_format(|context| {
        context
            .format_parsers
            .parse_segment_on_block(&mut context.segment_format, element);
        context.block_format = container.format.inheritable();
        let child = context.processors.child;
        child(&mut container, dom, node, context);
    });

    if context.allow_cache_element && !container.blocks.iter().any(has_selection_in_block) {
        container.cached.set(Some(node));
    }
    add_block(group, Block::FormatContainer(container));
    add_separator(group, context);
}

pub fn block_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    if has_block_children(dom, node) {
        container_block(group, dom, node, context, None);
    } else {
        leaf_block(group, dom, node, context, None);
    }
}

pub fn paragraph_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let decorator = ParagraphDecorator {
        tag_name: "p".to_string(),
        format: SegmentFormat::default(),
    };
    leaf_block(group, dom, node, context, Some(decorator));
}

pub fn heading_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let mut format = SegmentFormat::default();
    context.format_parsers.parse_segment(&mut format, element);
    let decorator = ParagraphDecorator {
        tag_name: element.tag.clone(),
        format,
    };
    leaf_block(group, dom, node, context, Some(decorator));
}

pub fn format_container_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let white_space = dom.is_element(node, "pre").then_some("pre");
    container_block(group, dom, node, context, white_space);
}

pub fn list_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let list_type = if element.tag == "ol" {
        ListType::Ordered
    } else {
        ListType::Unordered
    };
    let mut level = ListLevel::new(list_type);
    context
        .format_parsers
        .parse_list_level(&mut level.format, element);
    level.dataset = element.dataset();

    context.list_levels.push(level);
    let was_in_list_item = std::mem::replace(&mut context.in_list_item, false);
    let child = context.processors.child;
    if was_in_list_item {
        // Nested list items follow the enclosing item rather than living in it
        let mut nested = Document::default();
        child(&mut nested, dom, node, context);
        context.nested_list_blocks.extend(nested.blocks);
    } else {
        child(group, dom, node, context);
    }
    context.in_list_item = was_in_list_item;
    context.list_levels.pop();
}

pub fn list_item_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let (item, nested) = context.with_saved_format(|context| {
        context
            .format_parsers
            .parse_segment_on_block(&mut context.segment_format, element);
        let mut item = ListItem::new(context.list_levels.clone(), context.segment_format.clone());
        context.format_parsers.parse_block(&mut item.format, element);
        context.block_format = context
            .block_format
            .merged(&item.format.inheritable())
            .inheritable();

        let outer_nested = std::mem::take(&mut context.nested_list_blocks);
        let was_in_list_item = std::mem::replace(&mut context.in_list_item, true);
        let child = context.processors.child;
        child(&mut item, dom, node, context);
        context.in_list_item = was_in_list_item;
        let nested = std::mem::replace(&mut context.nested_list_blocks, outer_nested);
        (item, nested)
    });

    add_block(group, Block::ListItem(item));
    for block in nested {
        add_block(group, block);
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

fn column_widths(dom: &Dom, table: NodeId) -> Vec<f32> {
    dom.children(table)
        .iter()
        .filter(|&&child| dom.is_element(child, "colgroup"))
        .flat_map(|&colgroup| dom.children(colgroup).iter().copied())
        .filter(|&col| dom.is_element(col, "col"))
        .map(|col| dom.style(col, "width").and_then(parse_px).unwrap_or(0.0))
        .collect()
}

pub fn table_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let grid = weft_dom::parse_table_cells(dom, node);
    let native_rows = weft_dom::table_rows(dom, node);

    let mut table = Table::default();
    context.format_parsers.parse_block(&mut table.format, element);
    table.dataset = element.dataset();
    table.widths = column_widths(dom, node);

    let rectangle = match context.selection {
        Some(DomSelection::Table {
            table: selected_table,
            first_row,
            first_column,
            last_row,
            last_column,
        }) if selected_table == node => Some((
            first_row.min(last_row)..=first_row.max(last_row),
            first_column.min(last_column)..=first_column.max(last_column),
        )),
        _ => None,
    };
    let in_rectangle = |row: usize, col: usize| {
        rectangle
            .as_ref()
            .is_some_and(|(rows, cols)| rows.contains(&row) && cols.contains(&col))
    };

    for (row_index, slots) in grid.iter().enumerate() {
        let mut row = TableRow::default();
        let native_row = native_rows.get(row_index).copied();
        if let Some(tr) = native_row.and_then(|tr| dom.element(tr)) {
            context.format_parsers.parse_block(&mut row.format, tr);
            row.height = tr.style("height").and_then(parse_px);
        }

        for (col_index, slot) in slots.iter().enumerate() {
            let mut cell = match *slot {
                ParsedTableCell::Cell(td) => table_cell(dom, td, context),
                ParsedTableCell::Empty => TableCell::default(),
                other => TableCell::spanned(other.span_left(), other.span_above()),
            };
            if in_rectangle(row_index, col_index) {
                cell.is_selected = true;
            }
            row.cells.push(cell);
        }

        if context.allow_cache_element
            && let Some(tr) = native_row
        {
            row.cached.set(Some(tr));
        }
        table.rows.push(row);
    }

    let has_selection = table
        .rows
        .iter()
        .flat_map(|row| &row.cells)
        .any(|cell| cell.is_selected || cell.blocks.iter().any(has_selection_in_block));
    if context.allow_cache_element && !has_selection {
        table.cached.set(Some(node));
    }
    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.on_table(dom, node, &table);
    }
    add_block(group, Block::Table(table));
}

fn table_cell(dom: &Dom, td: NodeId, context: &mut DomToModelContext<'_>) -> TableCell {
    let mut cell = TableCell::default();
    let Some(element) = dom.element(td) else {
        return cell;
    };
    cell.is_header = element.tag == "th";
    context.format_parsers.parse_block(&mut cell.format, element);
    cell.dataset = element.dataset();

    let inherited = context
        .block_format
        .merged(&cell.format.inheritable())
        .inheritable();
    let covered_by_range = context.with_saved_format(|context| {
        context
            .format_parsers
            .parse_segment_on_block(&mut context.segment_format, element);
        context.block_format = inherited;
        let entered = context.is_in_selection;
        let child = context.processors.child;
        child(&mut cell, dom, td, context);
        entered && context.is_in_selection
    });
    cell.is_selected = covered_by_range;

    if context.allow_cache_element && !cell.blocks.iter().any(has_selection_in_block) {
        cell.cached.set(Some(td));
    }
    cell
}

pub fn image_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let mut image = Image::new(
        element.attribute("src").unwrap_or_default(),
        context.segment_format.clone(),
    );
    context.format_parsers.parse_segment(&mut image.format, element);
    image.alt = element.attribute("alt").map(str::to_string);
    image.title = element.attribute("title").map(str::to_string);
    image.width = element
        .attribute("width")
        .or_else(|| element.style("width"))
        .map(str::to_string);
    image.height = element
        .attribute("height")
        .or_else(|| element.style("height"))
        .map(str::to_string);
    image.link = context.link.clone();
    image.dataset = element.dataset();
    image.is_selected = context.is_in_selection;
    if context.selection == Some(DomSelection::Image { image: node }) {
        image.is_selected = true;
        image.is_selected_as_image_selection = true;
    }
    add_segment(group, Segment::Image(image), Some(&context.block_format));
}

pub fn br_processor(
    group: &mut dyn BlockGroup,
    _dom: &Dom,
    _node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let br = Br {
        format: context.segment_format.clone(),
        is_selected: context.is_in_selection,
    };
    add_segment(group, Segment::Br(br), Some(&context.block_format));
}

pub fn hr_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let mut divider = Divider::new(&element.tag);
    context.format_parsers.parse_block(&mut divider.format, element);
    divider.is_selected = context.is_in_selection;
    if context.allow_cache_element && !divider.is_selected {
        divider.cached.set(Some(node));
    }
    add_block(group, Block::Divider(divider));
}

pub fn link_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    context.with_saved_format(|context| {
        if let Some(href) = element.attribute("href") {
            context.link = Some(Link {
                href: href.to_string(),
                target: element.attribute("target").map(str::to_string),
            });
        }
        context
            .format_parsers
            .parse_segment(&mut context.segment_format, element);
        let child = context.processors.child;
        child(group, dom, node, context);
    });
}

pub fn format_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    context.with_saved_format(|context| {
        context
            .format_parsers
            .parse_segment(&mut context.segment_format, element);
        let child = context.processors.child;
        child(group, dom, node, context);
    });
}

pub fn entity_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let dataset = element.dataset();
    let is_readonly = dataset.get("entityReadonly").is_some_and(|value| value == "true")
        || element.attribute("contenteditable") == Some("false");
    let mut entity = Entity::new(
        node,
        dataset.get("entityType").map(String::as_str),
        is_readonly,
    );
    entity.id = Some(
        dataset
            .get("entityId")
            .cloned()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    );
    entity.format = context.segment_format.clone();
    entity.is_selected = context.is_in_selection;

    if is_block_element(dom, node) {
        add_block(group, Block::Entity(entity));
    } else {
        add_segment(group, Segment::Entity(entity), Some(&context.block_format));
    }
}

pub fn general_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let Some(element) = element_of(dom, node) else {
        return;
    };
    let is_block = is_block_element(dom, node);
    let mut general = GeneralContainer::new(node);
    general.is_selected = context.is_in_selection;
    if is_block {
        context.format_parsers.parse_block(&mut general.format, element);
    }
    context
        .format_parsers
        .parse_segment(&mut general.segment_format, element);

    context.with_saved_format(|context| {
        let child = context.processors.child;
        child(&mut general, dom, node, context);
    });

    if is_block {
        add_block(group, Block::General(general));
    } else {
        add_segment(group, Segment::General(general), Some(&context.block_format));
    }
}

pub fn ignored_processor(
    _group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    _context: &mut DomToModelContext<'_>,
) {
    log::debug!("ignoring <{}> at {node}", dom.tag_name(node).unwrap_or_default());
}

/// Custom elements become general containers; anything else is treated as a
/// block or an inline format element by its display
pub fn unknown_processor(
    group: &mut dyn BlockGroup,
    dom: &Dom,
    node: NodeId,
    context: &mut DomToModelContext<'_>,
) {
    let tag = dom.tag_name(node).unwrap_or_default();
    if tag.contains('-') {
        general_processor(group, dom, node, context);
    } else if is_block_element(dom, node) {
        log::debug!("unknown block element <{tag}> at {node}");
        block_processor(group, dom, node, context);
    } else {
        log::debug!("unknown inline element <{tag}> at {node}");
        format_processor(group, dom, node, context);
    }
}

//! Plain-text projection of a model.
//!
//! One line per paragraph and per table cell, joined with a caller-chosen
//! separator. Line breaks inside a paragraph also become separators. Entities
//! and general containers contribute the text of their native element when a
//! [`Dom`] is supplied. The projection is lossy and never parsed back.

use weft_dom::{Dom, NodeId};

use crate::model::{Block, BlockGroup, Document, Segment};

pub const DEFAULT_SEPARATOR: &str = "\n";

pub fn model_to_text(doc: &Document, dom: Option<&Dom>, separator: &str) -> String {
    let mut lines = Vec::new();
    group_to_lines(doc, dom, separator, &mut lines);
    lines.join(separator)
}

fn group_to_lines(group: &dyn BlockGroup, dom: Option<&Dom>, separator: &str, lines: &mut Vec<String>) {
    for block in group.blocks() {
        match block {
            Block::Paragraph(paragraph) => {
                let mut line = String::new();
                for segment in &paragraph.segments {
                    segment_to_text(segment, dom, separator, &mut line);
                }
                lines.push(line);
            }
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|row| &row.cells) {
                    if cell.is_origin() {
                        group_to_lines(cell, dom, separator, lines);
                    }
                }
            }
            Block::Entity(entity) => lines.push(native_text(dom, entity.wrapper)),
            Block::Divider(_) => {}
            Block::FormatContainer(container) => group_to_lines(container, dom, separator, lines),
            Block::ListItem(item) => group_to_lines(item, dom, separator, lines),
            Block::General(general) => group_to_lines(general, dom, separator, lines),
        }
    }
}

fn segment_to_text(segment: &Segment, dom: Option<&Dom>, separator: &str, line: &mut String) {
    match segment {
        Segment::Text(text) => line.push_str(&text.text),
        Segment::Br(_) => line.push_str(separator),
        Segment::Image(_) => line.push(' '),
        Segment::Entity(entity) => line.push_str(&native_text(dom, entity.wrapper)),
        Segment::General(general) => {
            let mut nested = Vec::new();
            group_to_lines(general, dom, separator, &mut nested);
            line.push_str(&nested.join(separator));
        }
        Segment::SelectionMarker(_) => {}
    }
}

fn native_text(dom: Option<&Dom>, node: NodeId) -> String {
    dom.filter(|dom| dom.has_node(node))
        .map(|dom| dom.text_content(node))
        .unwrap_or_default()
}

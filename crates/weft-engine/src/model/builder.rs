use crate::model::block::{Block, Paragraph};
use crate::model::format::BlockFormat;
use crate::model::group::BlockGroup;
use crate::model::segment::Segment;

pub fn add_block(group: &mut dyn BlockGroup, block: Block) {
    group.blocks_mut().push(block);
}

/// The paragraph new inline content goes into: the group's last block if it is
/// a paragraph, otherwise a fresh implicit one.
pub fn ensure_paragraph<'a>(
    group: &'a mut dyn BlockGroup,
    format: Option<&BlockFormat>,
) -> &'a mut Paragraph {
    let blocks = group.blocks_mut();
    if !matches!(blocks.last(), Some(Block::Paragraph(_))) {
        let mut paragraph = Paragraph::implicit();
        if let Some(format) = format {
            paragraph.format = format.clone();
        }
        blocks.push(Block::Paragraph(paragraph));
    }
    match blocks.last_mut() {
        Some(Block::Paragraph(paragraph)) => paragraph,
        _ => unreachable!("last block is a paragraph"),
    }
}

/// Append a segment, coalescing selection markers.
///
/// A selected marker is not added right after a selected segment, and a
/// selected segment replaces a selected marker that ends the paragraph.
pub fn add_segment<'a>(
    group: &'a mut dyn BlockGroup,
    segment: Segment,
    format: Option<&BlockFormat>,
) -> &'a mut Paragraph {
    let paragraph = ensure_paragraph(group, format);
    let last_selected = paragraph.segments.last().map(|last| (last.is_marker(), last.is_selected()));

    if segment.is_marker() {
        let after_selected = matches!(last_selected, Some((_, true)));
        if !after_selected || !segment.is_selected() {
            paragraph.segments.push(segment);
        }
    } else {
        if segment.is_selected() && last_selected == Some((true, true)) {
            paragraph.segments.pop();
        }
        paragraph.segments.push(segment);
    }
    paragraph
}

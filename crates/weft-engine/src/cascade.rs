//! Effective segment format at a position in the model.

use crate::error::ModelError;
use crate::model::{Block, Document, ModelPath, NodeRef, Segment, SegmentFormat};

/// The format a segment (or a caret at a list item's format holder) is shown
/// with, overlaying from the bottom up: document default, enclosing general
/// containers and list format holders, the paragraph's segment format, its
/// decorator, the segment itself, then `pending`.
pub fn effective_segment_format(
    doc: &Document,
    path: &ModelPath,
    pending: Option<&SegmentFormat>,
) -> Result<SegmentFormat, ModelError> {
    let mut format = doc.format.clone();
    let mut prefix = ModelPath::root();

    for step in path.steps() {
        prefix = prefix.child(*step);
        let node = prefix
            .resolve(doc)
            .ok_or_else(|| ModelError::PathNotFound(prefix.clone()))?;
        match node {
            NodeRef::Block(Block::ListItem(item)) => format.merge_from(&item.format_holder.format),
            NodeRef::Block(Block::General(general)) => format.merge_from(&general.segment_format),
            NodeRef::Block(Block::Paragraph(paragraph)) => {
                format.merge_from(&paragraph.segment_format);
                if let Some(decorator) = &paragraph.decorator {
                    format.merge_from(&decorator.format);
                }
            }
            NodeRef::Segment(Segment::General(general)) => {
                format.merge_from(&general.segment_format);
            }
            NodeRef::Segment(segment) => format.merge_from(segment.format()),
            NodeRef::Document(_) | NodeRef::Block(_) | NodeRef::Cell(_) | NodeRef::FormatHolder(_) => {}
        }
    }

    if let Some(pending) = pending {
        format.merge_from(pending);
    }
    Ok(format)
}

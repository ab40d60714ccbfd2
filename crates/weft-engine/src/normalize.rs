//! Model normalization.
//!
//! Runs after forward sync so that equivalent native trees give equal models.
//! Every rule is idempotent: normalizing a normalized tree changes nothing.

use crate::model::{Block, BlockGroup, Br, Document, Paragraph, Segment, Table, TableCell};

pub fn normalize_document(doc: &mut Document) {
    normalize_group(doc);
}

/// Normalize every block of `group`, then drop implicit paragraphs and
/// format containers left empty and merge neighbouring implicit paragraphs.
pub fn normalize_group(group: &mut dyn BlockGroup) {
    let blocks = group.blocks_mut();
    for block in blocks.iter_mut() {
        match block {
            Block::Paragraph(paragraph) => normalize_paragraph(paragraph),
            Block::Table(table) => normalize_table(table),
            Block::FormatContainer(container) => normalize_group(container),
            Block::ListItem(item) => normalize_group(item),
            Block::General(general) => normalize_group(general),
            Block::Divider(_) | Block::Entity(_) => {}
        }
    }

    blocks.retain(|block| match block {
        Block::Paragraph(paragraph) => !paragraph.is_implicit || !paragraph.segments.is_empty(),
        Block::FormatContainer(container) => !container.blocks.is_empty(),
        _ => true,
    });

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks.drain(..) {
        if let Block::Paragraph(next) = &block
            && let Some(Block::Paragraph(previous)) = merged.last_mut()
            && can_merge(previous, next)
        {
            previous.segments.extend(next.segments.iter().cloned());
            previous.cached.clear();
            normalize_paragraph(previous);
            continue;
        }
        merged.push(block);
    }
    *blocks = merged;
}

/// Two implicit paragraphs side by side render into one run of inline content
fn can_merge(previous: &Paragraph, next: &Paragraph) -> bool {
    previous.is_implicit
        && next.is_implicit
        && previous.decorator.is_none()
        && next.decorator.is_none()
        && previous.format == next.format
}

pub fn normalize_table(table: &mut Table) {
    let columns = table.column_count();
    for row in &mut table.rows {
        while row.cells.len() < columns {
            row.cells.push(TableCell::default());
        }
        for cell in &mut row.cells {
            normalize_group(cell);
        }
    }
}

pub fn normalize_paragraph(paragraph: &mut Paragraph) {
    for segment in &mut paragraph.segments {
        if let Segment::General(general) = segment {
            normalize_group(general);
        }
    }

    if !paragraph.format.preserves_whitespace() {
        // Dropping an empty edge segment can expose whitespace on the next one
        loop {
            let before = paragraph.segments.len();
            drop_empty_text(paragraph);
            trim_edges(paragraph);
            drop_empty_text(paragraph);
            if paragraph.segments.len() == before {
                break;
            }
        }
    } else {
        drop_empty_text(paragraph);
    }

    merge_text_segments(paragraph);
    normalize_trailing_br(paragraph);
    copy_shared_format_up(paragraph);
}

fn drop_empty_text(paragraph: &mut Paragraph) {
    paragraph
        .segments
        .retain(|segment| !matches!(segment, Segment::Text(text) if text.text.is_empty() && !text.is_selected));
}

fn trim_edges(paragraph: &mut Paragraph) {
    let is_ascii_space = |c: char| c.is_ascii_whitespace();
    if let Some(Segment::Text(first)) = paragraph.segments.iter_mut().find(|s| !s.is_marker()) {
        let trimmed = first.text.trim_start_matches(is_ascii_space);
        if trimmed.len() != first.text.len() {
            first.text = trimmed.to_string();
        }
    }
    if let Some(Segment::Text(last)) = paragraph.segments.iter_mut().rev().find(|s| !s.is_marker()) {
        let trimmed = last.text.trim_end_matches(is_ascii_space);
        if trimmed.len() != last.text.len() {
            last.text = trimmed.to_string();
        }
    }
}

fn merge_text_segments(paragraph: &mut Paragraph) {
    let mut merged: Vec<Segment> = Vec::with_capacity(paragraph.segments.len());
    for segment in paragraph.segments.drain(..) {
        if let Segment::Text(next) = &segment
            && let Some(Segment::Text(previous)) = merged.last_mut()
            && previous.format == next.format
            && previous.link == next.link
            && previous.is_selected == next.is_selected
        {
            previous.text.push_str(&next.text);
            continue;
        }
        merged.push(segment);
    }
    paragraph.segments = merged;
}

/// A caret alone on a line needs a `Br` to give the line height; a single
/// `Br` closing a line of content is redundant.
fn normalize_trailing_br(paragraph: &mut Paragraph) {
    if paragraph.is_implicit {
        return;
    }
    let segments = &mut paragraph.segments;
    match segments.as_slice() {
        [.., Segment::SelectionMarker(marker)]
            if segments.len() == 1 || matches!(segments[segments.len() - 2], Segment::Br(_)) =>
        {
            let format = marker.format.clone();
            segments.push(Segment::Br(Br {
                format,
                is_selected: false,
            }));
        }
        [.., Segment::Br(_)] => {
            let content_before = segments[..segments.len() - 1]
                .iter()
                .rev()
                .find(|segment| !segment.is_marker());
            if content_before.is_some_and(|segment| !matches!(segment, Segment::Br(_))) {
                segments.pop();
            }
        }
        _ => {}
    }
}

/// Font family, size and color shared by every segment also become the
/// paragraph's segment format
fn copy_shared_format_up(paragraph: &mut Paragraph) {
    let formats: Vec<_> = paragraph
        .segments
        .iter()
        .filter(|segment| !segment.is_marker())
        .map(Segment::format)
        .collect();
    let Some((first, rest)) = formats.split_first() else {
        return;
    };

    macro_rules! copy_up {
        ($($field:ident),*) => {
            $(
                if first.$field.is_some() && rest.iter().all(|format| format.$field == first.$field) {
                    paragraph.segment_format.$field = first.$field.clone();
                }
            )*
        };
    }
    copy_up!(font_family, font_size, text_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormatContainer, SegmentFormat, TableRow, Text};
    use pretty_assertions::assert_eq;

    fn implicit(segments: Vec<Segment>) -> Block {
        Block::Paragraph(Paragraph::implicit().with_segments(segments))
    }

    fn explicit(segments: Vec<Segment>) -> Block {
        Block::Paragraph(Paragraph::default().with_segments(segments))
    }

    fn texts(block: &Block) -> Vec<String> {
        block
            .as_paragraph()
            .map(|p| {
                p.segments
                    .iter()
                    .map(|s| match s {
                        Segment::Text(t) => t.text.clone(),
                        Segment::Br(_) => "<br>".into(),
                        Segment::SelectionMarker(_) => "|".into(),
                        _ => "?".into(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn trims_edges_and_drops_whitespace_only_paragraphs() {
        let mut doc = Document::new(vec![
            implicit(vec![Segment::text("\n  ")]),
            explicit(vec![Segment::text("  a "), Segment::text(""), Segment::text(" b  ")]),
        ]);

        normalize_document(&mut doc);

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(texts(&doc.blocks[0]), vec!["a  b"]);
    }

    #[test]
    fn keeps_edge_whitespace_in_pre() {
        let mut paragraph = Paragraph::default().with_segments(vec![Segment::text("  code  ")]);
        paragraph.format.white_space = Some("pre".into());
        let mut doc = Document::new(vec![Block::Paragraph(paragraph)]);

        normalize_document(&mut doc);

        assert_eq!(texts(&doc.blocks[0]), vec!["  code  "]);
    }

    #[test]
    fn merges_only_compatible_text() {
        let bold = SegmentFormat {
            font_weight: Some("bold".into()),
            ..Default::default()
        };
        let mut doc = Document::new(vec![explicit(vec![
            Segment::text("a"),
            Segment::text("b"),
            Segment::Text(Text::new("c", bold)),
        ])]);

        normalize_document(&mut doc);

        assert_eq!(texts(&doc.blocks[0]), vec!["ab", "c"]);
    }

    #[test]
    fn lone_caret_gets_br_and_trailing_br_is_dropped() {
        let mut doc = Document::new(vec![
            explicit(vec![Segment::marker()]),
            explicit(vec![Segment::text("x"), Segment::br()]),
            explicit(vec![Segment::text("y"), Segment::br(), Segment::marker()]),
        ]);

        normalize_document(&mut doc);

        assert_eq!(texts(&doc.blocks[0]), vec!["|", "<br>"]);
        assert_eq!(texts(&doc.blocks[1]), vec!["x"]);
        assert_eq!(texts(&doc.blocks[2]), vec!["y", "<br>", "|", "<br>"]);
    }

    #[test]
    fn shared_font_is_copied_to_paragraph() {
        let format = SegmentFormat {
            font_family: Some("Arial".into()),
            text_color: Some("red".into()),
            ..Default::default()
        };
        let other = SegmentFormat {
            font_family: Some("Arial".into()),
            ..Default::default()
        };
        let mut doc = Document::new(vec![explicit(vec![
            Segment::Text(Text::new("a", format)),
            Segment::Br(Br {
                format: other,
                is_selected: false,
            }),
            Segment::text("b"),
        ])]);
        if let Some(Block::Paragraph(p)) = doc.blocks.first_mut()
            && let Some(Segment::Text(t)) = p.segments.last_mut()
        {
            t.format.font_family = Some("Arial".into());
        }

        normalize_document(&mut doc);

        let paragraph = doc.blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.segment_format.font_family.as_deref(), Some("Arial"));
        assert_eq!(paragraph.segment_format.text_color, None);
    }

    #[test]
    fn pads_ragged_tables_and_removes_empty_containers() {
        let mut doc = Document::new(vec![
            Block::Table(Table::new(vec![
                TableRow::new(vec![TableCell::default(), TableCell::default()]),
                TableRow::new(vec![TableCell::default()]),
            ])),
            Block::FormatContainer(FormatContainer::new(
                "blockquote",
                vec![implicit(vec![Segment::text(" ")])],
            )),
        ]);

        normalize_document(&mut doc);

        assert_eq!(doc.blocks.len(), 1);
        let table = doc.blocks[0].as_table().unwrap();
        assert_eq!(table.rows[1].cells.len(), 2);
    }

    #[test]
    fn adjacent_implicit_paragraphs_merge() {
        let mut doc = Document::new(vec![
            implicit(vec![Segment::text("a")]),
            implicit(vec![]),
            implicit(vec![Segment::text("b")]),
        ]);

        normalize_document(&mut doc);

        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(texts(&doc.blocks[0]), vec!["ab"]);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let mut doc = Document::new(vec![
            implicit(vec![Segment::text("  a"), Segment::text(" ")]),
            explicit(vec![Segment::text("b "), Segment::br(), Segment::marker()]),
            implicit(vec![]),
        ]);

        normalize_document(&mut doc);
        let once = doc.clone();
        normalize_document(&mut doc);

        assert_eq!(doc, once);
    }
}

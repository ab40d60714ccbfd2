use crate::model::{
    Block, BlockGroupRef, BlockGroupType, Document, ListItem, ModelPath, Paragraph, Segment,
    Table, TableCell,
};
use crate::selection::iterate::{
    IterateSelectionsOption, ListFormatHolderInclusion, SegmentRef, SelectionInfo,
    iterate_selections,
};

/// Every selection unit, with a lone caret at either edge dropped.
pub fn collect_selections(doc: &Document, option: IterateSelectionsOption) -> Vec<SelectionInfo<'_>> {
    let mut selections = Vec::new();
    iterate_selections(
        doc,
        |info| {
            selections.push(info);
            false
        },
        option,
    );
    remove_unmeaningful_selections(&mut selections);
    selections
}

/// Drop a trailing unit that is only a caret at the start of its paragraph,
/// then a leading unit that is only a caret at the end of its paragraph.
///
/// Triple-clicking a line selects up to the caret position at the start of
/// the next line; that next line is not part of the selection.
pub fn remove_unmeaningful_selections(selections: &mut Vec<SelectionInfo<'_>>) {
    if selections.len() > 1
        && selections
            .last()
            .is_some_and(|last| is_only_marker_at(last, Edge::Start))
    {
        selections.pop();
    }
    if selections.len() > 1
        && selections
            .first()
            .is_some_and(|first| is_only_marker_at(first, Edge::End))
    {
        selections.remove(0);
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Start,
    End,
}

fn is_only_marker_at(selection: &SelectionInfo<'_>, edge: Edge) -> bool {
    let (Some(paragraph), Some(segments)) = (selection.paragraph(), &selection.segments) else {
        return false;
    };
    let [SegmentRef::Segment { index, segment }] = segments.as_slice() else {
        return false;
    };
    let edge_index = match edge {
        Edge::Start => 0,
        Edge::End => paragraph.segments.len().saturating_sub(1),
    };
    segment.is_marker() && *index == edge_index
}

/// A selected segment together with where it lives
#[derive(Debug, Clone)]
pub struct SelectedSegment<'a> {
    pub segment: SegmentRef<'a>,
    /// `None` for a list item's format holder
    pub paragraph: Option<&'a Paragraph>,
    /// Location of the paragraph, or of the list item for a format holder
    pub location: ModelPath,
    pub path: Vec<BlockGroupRef<'a>>,
}

impl SelectedSegment<'_> {
    /// Address of the segment itself
    pub fn segment_location(&self) -> ModelPath {
        match self.segment {
            SegmentRef::Segment { index, .. } => self.location.clone().segment(index),
            SegmentRef::FormatHolder(_) => self.location.clone().format_holder(),
        }
    }
}

/// Selected segments with their paragraphs. Read-only entities are left out
/// unless `include_entity` is set.
pub fn get_selected_segments_and_paragraphs(
    doc: &Document,
    include_format_holder: bool,
    include_entity: bool,
) -> Vec<SelectedSegment<'_>> {
    let option = IterateSelectionsOption {
        include_list_format_holder: if include_format_holder {
            ListFormatHolderInclusion::OnlyFullySelected
        } else {
            ListFormatHolderInclusion::Never
        },
        ..Default::default()
    };

    let mut result = Vec::new();
    for selection in collect_selections(doc, option) {
        let Some(segments) = &selection.segments else {
            continue;
        };
        match (selection.block, segments.as_slice()) {
            (None, [holder @ SegmentRef::FormatHolder(_)]) if include_format_holder => {
                result.push(SelectedSegment {
                    segment: *holder,
                    paragraph: None,
                    location: selection.location.clone(),
                    path: selection.path.clone(),
                });
            }
            (Some(Block::Paragraph(paragraph)), segments) => {
                for segment in segments {
                    let readonly_entity =
                        matches!(segment.segment(), Some(Segment::Entity(entity)) if entity.is_readonly);
                    if include_entity || !readonly_entity {
                        result.push(SelectedSegment {
                            segment: *segment,
                            paragraph: Some(paragraph),
                            location: selection.location.clone(),
                            path: selection.path.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
    result
}

pub fn get_selected_segments(doc: &Document, include_format_holder: bool) -> Vec<SegmentRef<'_>> {
    get_selected_segments_and_paragraphs(doc, include_format_holder, false)
        .into_iter()
        .map(|selected| selected.segment)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SelectedParagraph<'a> {
    pub paragraph: &'a Paragraph,
    pub location: ModelPath,
    pub path: Vec<BlockGroupRef<'a>>,
}

/// Paragraphs containing selected segments, each once, in document order
pub fn get_selected_paragraphs(doc: &Document) -> Vec<SelectedParagraph<'_>> {
    let mut result: Vec<SelectedParagraph<'_>> = Vec::new();
    for selected in get_selected_segments_and_paragraphs(doc, false, true) {
        let Some(paragraph) = selected.paragraph else {
            continue;
        };
        if result.last().is_none_or(|last| last.location != selected.location) {
            result.push(SelectedParagraph {
                paragraph,
                location: selected.location,
                path: selected.path,
            });
        }
    }
    result
}

/// A block an operation should act on
#[derive(Debug, Clone)]
pub enum OperationalBlock<'a> {
    /// The closest enclosing group of a requested type
    Group {
        group: BlockGroupRef<'a>,
        parent: Option<BlockGroupRef<'a>>,
        path: Vec<BlockGroupRef<'a>>,
    },
    /// A selected block with no such group around it
    Block { block: &'a Block, location: ModelPath },
}

/// For every selected unit, the closest ancestor group whose type is in
/// `group_types`, searching no further than a group in `stop_types`. Units
/// with no such ancestor contribute their own block.
///
/// With `deep_first`, each type in `group_types` is tried in turn across the
/// whole path before the next; otherwise the closest match of any type wins.
pub fn get_operational_blocks<'a>(
    doc: &'a Document,
    group_types: &[BlockGroupType],
    stop_types: &[BlockGroupType],
    deep_first: bool,
) -> Vec<OperationalBlock<'a>> {
    let sequence: Vec<Vec<BlockGroupType>> = if deep_first {
        group_types.iter().map(|group_type| vec![*group_type]).collect()
    } else {
        vec![group_types.to_vec()]
    };

    let mut result: Vec<OperationalBlock<'a>> = Vec::new();
    for selection in collect_selections(doc, IterateSelectionsOption::for_operational_blocks()) {
        for (attempt, types) in sequence.iter().enumerate() {
            if let Some(index) = closest_ancestor_index(&selection.path, types, stop_types) {
                let group = selection.path[index];
                let seen = result.iter().any(|existing| {
                    matches!(existing, OperationalBlock::Group { group: g, .. } if g.same_node(&group))
                });
                if !seen {
                    result.push(OperationalBlock::Group {
                        group,
                        parent: selection.path.get(index + 1).copied(),
                        path: selection.path.clone(),
                    });
                }
                break;
            }
            if attempt == sequence.len() - 1
                && let Some(block) = selection.block
            {
                let seen = result.iter().any(|existing| {
                    matches!(existing, OperationalBlock::Block { block: b, .. } if std::ptr::eq(*b, block))
                });
                if !seen {
                    result.push(OperationalBlock::Block {
                        block,
                        location: selection.location.clone(),
                    });
                }
            }
        }
    }
    result
}

fn closest_ancestor_index(
    path: &[BlockGroupRef<'_>],
    group_types: &[BlockGroupType],
    stop_types: &[BlockGroupType],
) -> Option<usize> {
    for (index, group) in path.iter().enumerate() {
        let group_type = group.group_type();
        if group_types.contains(&group_type) {
            return Some(index);
        }
        if stop_types.contains(&group_type) {
            return None;
        }
    }
    None
}

/// The first table touched by the selection and its location
pub fn get_first_selected_table(doc: &Document) -> Option<(&Table, ModelPath)> {
    let option = IterateSelectionsOption {
        include_list_format_holder: ListFormatHolderInclusion::Never,
        ..Default::default()
    };
    collect_selections(doc, option)
        .into_iter()
        .find_map(|selection| match (&selection.table_context, selection.block) {
            (Some(context), _) => Some((context.table, context.table_location.clone())),
            (None, Some(Block::Table(table))) => Some((table, selection.location.clone())),
            _ => None,
        })
}

/// The first list item containing selection, not looking outside table cells
pub fn get_first_selected_list_item(doc: &Document) -> Option<&ListItem> {
    get_operational_blocks(doc, &[BlockGroupType::ListItem], &[BlockGroupType::TableCell], false)
        .into_iter()
        .find_map(|block| match block {
            OperationalBlock::Group { group, .. } => group.as_list_item(),
            OperationalBlock::Block { .. } => None,
        })
}

pub fn has_selection_in_segment(segment: &Segment) -> bool {
    segment.is_selected()
        || matches!(segment, Segment::General(general) if general.blocks.iter().any(has_selection_in_block))
}

pub fn has_selection_in_block(block: &Block) -> bool {
    match block {
        Block::Paragraph(paragraph) => paragraph.segments.iter().any(has_selection_in_segment),
        Block::Table(table) => table
            .rows
            .iter()
            .any(|row| row.cells.iter().any(has_selection_in_cell)),
        Block::Divider(divider) => divider.is_selected,
        Block::Entity(entity) => entity.is_selected,
        Block::FormatContainer(group) => group.blocks.iter().any(has_selection_in_block),
        Block::ListItem(group) => group.blocks.iter().any(has_selection_in_block),
        Block::General(group) => group.is_selected || group.blocks.iter().any(has_selection_in_block),
    }
}

fn has_selection_in_cell(cell: &TableCell) -> bool {
    cell.is_selected || cell.blocks.iter().any(has_selection_in_block)
}

pub fn has_selection_in_group(group: BlockGroupRef<'_>) -> bool {
    match group {
        BlockGroupRef::TableCell(cell) => has_selection_in_cell(cell),
        BlockGroupRef::General(general) if general.is_selected => true,
        other => other.blocks().iter().any(has_selection_in_block),
    }
}

/// Bounding box of the selected cells of a table, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSelectionCoordinates {
    pub first_row: usize,
    pub first_column: usize,
    pub last_row: usize,
    pub last_column: usize,
}

pub fn get_selected_cells(table: &Table) -> Option<TableSelectionCoordinates> {
    let mut coordinates: Option<TableSelectionCoordinates> = None;
    for (row_index, row) in table.rows.iter().enumerate() {
        for (col_index, cell) in row.cells.iter().enumerate() {
            if !cell.is_selected {
                continue;
            }
            coordinates = Some(match coordinates {
                None => TableSelectionCoordinates {
                    first_row: row_index,
                    first_column: col_index,
                    last_row: row_index,
                    last_column: col_index,
                },
                Some(c) => TableSelectionCoordinates {
                    first_row: c.first_row.min(row_index),
                    first_column: c.first_column.min(col_index),
                    last_row: c.last_row.max(row_index),
                    last_column: c.last_column.max(col_index),
                },
            });
        }
    }
    coordinates
}

pub fn is_whole_table_selected(table: &Table) -> bool {
    let Some(selected) = get_selected_cells(table) else {
        return false;
    };
    selected.first_row == 0
        && selected.first_column == 0
        && selected.last_row + 1 == table.rows.len()
        && selected.last_column + 1 == table.column_count()
}

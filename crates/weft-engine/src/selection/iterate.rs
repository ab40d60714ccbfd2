//! Reading the selection.
//!
//! [`iterate_selections`] walks the tree depth first and reports every selected
//! unit: a paragraph with its selected segments, a selected divider or entity,
//! a selected table cell, a whole table, a general element, or a list item's
//! format holder.
//!
//! [`iterate_selections`] is the read-only walk and trusts every cache
//! reference. [`iterate_selections_mut`] is for callers about to change what
//! they find: each reported unit, and every group above it, loses its cache
//! reference once.

use crate::model::{
    Block, BlockGroupRef, Document, ModelPath, Paragraph, Segment, SelectionMarker, Table,
};
use crate::mutation::invalidate_path;

/// When a list item's format holder is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFormatHolderInclusion {
    Never,
    /// Every segment of the item's own paragraphs is selected
    #[default]
    OnlyFullySelected,
    /// At least one segment of the item's own paragraphs is selected
    AnyPartiallySelected,
}

/// What to do with the content of selected table cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentUnderSelectedTableCell {
    /// Report the cell, then everything inside it as selected
    #[default]
    Include,
    /// A fully selected table is reported once as a block; otherwise as `Include`
    IgnoreForTable,
    /// As `IgnoreForTable`, and selected cells are reported without their content
    IgnoreForTableOrCell,
}

/// What to report for a selected general element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentUnderSelectedGeneralElement {
    #[default]
    ContentOnly,
    GeneralElementOnly,
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterateSelectionsOption {
    pub include_list_format_holder: ListFormatHolderInclusion,
    pub content_under_selected_table_cell: ContentUnderSelectedTableCell,
    pub content_under_selected_general_element: ContentUnderSelectedGeneralElement,
}

impl IterateSelectionsOption {
    /// Used when reading the format at the selection: fully selected tables are
    /// entered so their text contributes.
    pub fn for_format_state() -> Self {
        Self::default()
    }

    /// Used when collecting blocks to operate on: a fully selected table is one
    /// unit and list format holders are not reported.
    pub fn for_operational_blocks() -> Self {
        Self {
            include_list_format_holder: ListFormatHolderInclusion::Never,
            content_under_selected_table_cell: ContentUnderSelectedTableCell::IgnoreForTable,
            ..Self::default()
        }
    }
}

/// The table cell a selection was found in. Built per walk, never stored.
#[derive(Debug, Clone)]
pub struct TableSelectionContext<'a> {
    pub table: &'a Table,
    pub table_location: ModelPath,
    pub row_index: usize,
    pub col_index: usize,
    pub is_whole_table_selected: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum SegmentRef<'a> {
    Segment { index: usize, segment: &'a Segment },
    FormatHolder(&'a SelectionMarker),
}

impl<'a> SegmentRef<'a> {
    pub fn segment(&self) -> Option<&'a Segment> {
        match *self {
            SegmentRef::Segment { segment, .. } => Some(segment),
            SegmentRef::FormatHolder(_) => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        match self {
            SegmentRef::Segment { segment, .. } => segment.is_marker(),
            SegmentRef::FormatHolder(_) => true,
        }
    }
}

/// One reported selection unit
#[derive(Debug, Clone)]
pub struct SelectionInfo<'a> {
    /// Enclosing block groups, innermost first, ending with the document
    pub path: Vec<BlockGroupRef<'a>>,
    pub table_context: Option<TableSelectionContext<'a>>,
    pub block: Option<&'a Block>,
    pub segments: Option<Vec<SegmentRef<'a>>>,
    /// Address of the reported unit: paragraph, block, table, cell or list item
    pub location: ModelPath,
}

impl<'a> SelectionInfo<'a> {
    pub fn paragraph(&self) -> Option<&'a Paragraph> {
        self.block.and_then(Block::as_paragraph)
    }
}

/// Call `callback` for every selected unit in document order. Returning true
/// from the callback stops the walk.
pub fn iterate_selections<'a, F>(doc: &'a Document, mut callback: F, option: IterateSelectionsOption)
where
    F: FnMut(SelectionInfo<'a>) -> bool,
{
    let walker = Walker { option };
    walker.group(
        &[BlockGroupRef::Document(doc)],
        &ModelPath::root(),
        None,
        false,
        &mut callback,
    );
}

/// [`iterate_selections`] over a tree the caller will change afterwards.
///
/// Every unit the callback saw, up to and including the one that stopped the
/// walk, is invalidated together with its ancestors. Units never reached keep
/// their caches.
pub fn iterate_selections_mut<F>(doc: &mut Document, mut callback: F, option: IterateSelectionsOption)
where
    F: FnMut(SelectionInfo<'_>) -> bool,
{
    let mut visited: Vec<ModelPath> = Vec::new();
    iterate_selections(
        &*doc,
        |info| {
            if visited.last() != Some(&info.location) {
                visited.push(info.location.clone());
            }
            callback(info)
        },
        option,
    );
    for location in &visited {
        if let Err(err) = invalidate_path(doc, location) {
            log::debug!("selection unit vanished before invalidation: {err}");
        }
    }
}

struct Walker {
    option: IterateSelectionsOption,
}

type Callback<'c, 'a> = &'c mut dyn FnMut(SelectionInfo<'a>) -> bool;

fn with_group<'a>(group: BlockGroupRef<'a>, path: &[BlockGroupRef<'a>]) -> Vec<BlockGroupRef<'a>> {
    let mut new_path = Vec::with_capacity(path.len() + 1);
    new_path.push(group);
    new_path.extend_from_slice(path);
    new_path
}

impl Walker {
    /// Returns true when the callback asked to stop
    fn group<'a>(
        &self,
        path: &[BlockGroupRef<'a>],
        location: &ModelPath,
        table: Option<&TableSelectionContext<'a>>,
        treat_all_as_select: bool,
        callback: Callback<'_, 'a>,
    ) -> bool {
        let Some(parent) = path.first() else {
            return false;
        };
        let mut has_selected_segment = false;
        let mut has_unselected_segment = false;

        for (index, block) in parent.blocks().iter().enumerate() {
            let block_location = location.clone().block(index);
            let block_info = |path: Vec<BlockGroupRef<'a>>| SelectionInfo {
                path,
                table_context: table.cloned(),
                block: Some(block),
                segments: None,
                location: block_location.clone(),
            };

            match block {
                Block::FormatContainer(group) => {
                    let new_path = with_group(BlockGroupRef::FormatContainer(group), path);
                    if self.group(&new_path, &block_location, table, treat_all_as_select, callback) {
                        return true;
                    }
                }
                Block::ListItem(item) => {
                    let new_path = with_group(BlockGroupRef::ListItem(item), path);
                    if self.group(&new_path, &block_location, table, treat_all_as_select, callback) {
                        return true;
                    }
                }
                Block::General(general) => {
                    let new_path = with_group(BlockGroupRef::General(general), path);
                    let is_selected = treat_all_as_select || general.is_selected;
                    let stop = match self.option.content_under_selected_general_element {
                        ContentUnderSelectedGeneralElement::ContentOnly => {
                            self.group(&new_path, &block_location, table, is_selected, callback)
                        }
                        ContentUnderSelectedGeneralElement::GeneralElementOnly => {
                            if is_selected {
                                callback(block_info(new_path))
                            } else {
                                self.group(&new_path, &block_location, table, false, callback)
                            }
                        }
                        ContentUnderSelectedGeneralElement::Both => {
                            (is_selected && callback(block_info(new_path.clone())))
                                || self.group(&new_path, &block_location, table, is_selected, callback)
                        }
                    };
                    if stop {
                        return true;
                    }
                }
                Block::Table(t) => {
                    if self.table(t, block, path, &block_location, table, treat_all_as_select, callback) {
                        return true;
                    }
                }
                Block::Paragraph(paragraph) => {
                    let mut segments = Vec::new();
                    for (segment_index, segment) in paragraph.segments.iter().enumerate() {
                        let is_selected = treat_all_as_select || segment.is_selected();
                        let segment_ref = SegmentRef::Segment {
                            index: segment_index,
                            segment,
                        };
                        if let Segment::General(general) = segment {
                            let new_path = with_group(BlockGroupRef::General(general), path);
                            let segment_location = block_location.clone().segment(segment_index);
                            let (report_element, walk_content) =
                                match self.option.content_under_selected_general_element {
                                    ContentUnderSelectedGeneralElement::ContentOnly => (false, true),
                                    ContentUnderSelectedGeneralElement::GeneralElementOnly => {
                                        (is_selected, !is_selected)
                                    }
                                    ContentUnderSelectedGeneralElement::Both => (is_selected, true),
                                };
                            if report_element {
                                segments.push(segment_ref);
                            }
                            if walk_content
                                && self.group(&new_path, &segment_location, table, is_selected, callback)
                            {
                                return true;
                            }
                        } else if is_selected {
                            segments.push(segment_ref);
                        }

                        if is_selected {
                            has_selected_segment = true;
                        } else {
                            has_unselected_segment = true;
                        }
                    }

                    if !segments.is_empty()
                        && callback(SelectionInfo {
                            path: path.to_vec(),
                            table_context: table.cloned(),
                            block: Some(block),
                            segments: Some(segments),
                            location: block_location.clone(),
                        })
                    {
                        return true;
                    }
                }
                Block::Divider(divider) => {
                    if (treat_all_as_select || divider.is_selected) && callback(block_info(path.to_vec())) {
                        return true;
                    }
                }
                Block::Entity(entity) => {
                    if (treat_all_as_select || entity.is_selected) && callback(block_info(path.to_vec())) {
                        return true;
                    }
                }
            }
        }

        if let BlockGroupRef::ListItem(item) = *parent {
            let include = match self.option.include_list_format_holder {
                ListFormatHolderInclusion::Never => false,
                ListFormatHolderInclusion::OnlyFullySelected => {
                    has_selected_segment && !has_unselected_segment
                }
                ListFormatHolderInclusion::AnyPartiallySelected => has_selected_segment,
            };
            if include
                && callback(SelectionInfo {
                    path: path.to_vec(),
                    table_context: table.cloned(),
                    block: None,
                    segments: Some(vec![SegmentRef::FormatHolder(&item.format_holder)]),
                    location: location.clone(),
                })
            {
                return true;
            }
        }
        false
    }

    #[allow(clippy::too_many_arguments)]
    fn table<'a>(
        &self,
        t: &'a Table,
        block: &'a Block,
        path: &[BlockGroupRef<'a>],
        location: &ModelPath,
        table: Option<&TableSelectionContext<'a>>,
        treat_all_as_select: bool,
        callback: Callback<'_, 'a>,
    ) -> bool {
        let has_cells = t.rows.iter().any(|row| !row.cells.is_empty());
        let is_whole_table_selected =
            has_cells && t.rows.iter().all(|row| row.cells.iter().all(|cell| cell.is_selected));
        let content_option = self.option.content_under_selected_table_cell;

        if content_option != ContentUnderSelectedTableCell::Include && is_whole_table_selected {
            return callback(SelectionInfo {
                path: path.to_vec(),
                table_context: table.cloned(),
                block: Some(block),
                segments: None,
                location: location.clone(),
            });
        }

        for (row_index, row) in t.rows.iter().enumerate() {
            for (col_index, cell) in row.cells.iter().enumerate() {
                let context = TableSelectionContext {
                    table: t,
                    table_location: location.clone(),
                    row_index,
                    col_index,
                    is_whole_table_selected,
                };
                let cell_path = with_group(BlockGroupRef::TableCell(cell), path);
                let cell_location = location.clone().cell(row_index, col_index);

                if cell.is_selected
                    && callback(SelectionInfo {
                        path: cell_path.clone(),
                        table_context: Some(context.clone()),
                        block: None,
                        segments: None,
                        location: cell_location.clone(),
                    })
                {
                    return true;
                }

                if !cell.is_selected
                    || content_option != ContentUnderSelectedTableCell::IgnoreForTableOrCell
                {
                    let treat = treat_all_as_select || cell.is_selected;
                    if self.group(&cell_path, &cell_location, Some(&context), treat, callback) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

//! Writing selection flags.
//!
//! One pre-order walk carries an "in selection" flag. It turns on at the start
//! node and, after that node is processed, turns off at the end node. Tables
//! are the exception: when both endpoints are cells of the same table, the
//! selected cells are the rectangle they span rather than a document range.

use crate::error::ModelError;
use crate::model::{
    Block, Document, ModelPath, PathStep, Segment, SelectionMarker, Table,
};
use crate::mutation::{Cacheable, mutate_block};

/// Select everything from `start` to `end` inclusive and clear all other
/// selection flags.
///
/// Omitting `end` selects only `start`; omitting `start` clears the selection.
/// Endpoints that do not resolve in `doc` also clear it. Endpoints given in
/// reverse document order are swapped, and an endpoint nested inside the
/// other selects the outer node as a whole. Stale selection markers are deleted,
/// as are implicit paragraphs left empty. Every node whose flags change loses
/// its cache reference, and so do its ancestors.
pub fn set_selection(doc: &mut Document, start: Option<&ModelPath>, end: Option<&ModelPath>) {
    let resolves = |path: &ModelPath| path.resolve(doc).is_some();
    let (start, end) = match (start, end) {
        (Some(start), _) if !resolves(start) => (None, None),
        (_, Some(end)) if !resolves(end) => (None, None),
        (None, _) => (None, None),
        (Some(start), Some(end)) if end < start => (Some(end.clone()), Some(start.clone())),
        (start, end) => (start.cloned(), end.cloned()),
    };
    // An endpoint inside the other one ends the selection at the outer node
    let end = match (&start, end) {
        (Some(start), Some(end)) if start.is_ancestor_of(&end) => Some(start.clone()),
        (_, end) => end,
    };
    if start.is_none() {
        log::debug!("clearing selection");
    }

    let walk = Walk {
        start: start.as_ref(),
        end: end.as_ref(),
    };
    let mut changed = false;
    walk.group(&mut doc.blocks, &ModelPath::root(), false, &mut changed);
}

/// Clear the selection and put a single caret at `index` in the paragraph at
/// `paragraph_path`. The caret takes the format of the segment before it.
pub fn collapse_selection_at(
    doc: &mut Document,
    paragraph_path: &ModelPath,
    index: usize,
) -> Result<(), ModelError> {
    let marker_path = {
        let mut block = mutate_block(doc, paragraph_path)?;
        let Block::Paragraph(paragraph) = &mut *block else {
            return Err(ModelError::WrongNodeKind {
                path: paragraph_path.clone(),
                expected: "paragraph",
            });
        };
        let index = index.min(paragraph.segments.len());
        let format = index
            .checked_sub(1)
            .and_then(|i| paragraph.segments.get(i))
            .map(|segment| segment.format().clone())
            .unwrap_or_else(|| paragraph.segment_format.clone());
        paragraph
            .segments
            .insert(index, Segment::SelectionMarker(SelectionMarker::new(format)));
        paragraph_path.clone().segment(index)
    };
    set_selection(doc, Some(&marker_path), None);
    Ok(())
}

fn set_flag(flag: &mut bool, value: bool, changed: &mut bool) {
    if *flag != value {
        *flag = value;
        *changed = true;
    }
}

struct Walk<'p> {
    start: Option<&'p ModelPath>,
    end: Option<&'p ModelPath>,
}

/// A walk with no endpoints, which clears everything it visits
const CLEAR: Walk<'static> = Walk {
    start: None,
    end: None,
};

impl Walk<'_> {
    fn is_start(&self, path: &ModelPath) -> bool {
        self.start == Some(path)
    }

    fn is_end(&self, path: &ModelPath) -> bool {
        self.end == Some(path)
    }

    fn enter(&self, in_selection: bool, path: &ModelPath) -> bool {
        in_selection || self.is_start(path)
    }

    fn leave(&self, in_selection: bool, path: &ModelPath) -> bool {
        in_selection && self.end.is_some() && !self.is_end(path)
    }

    fn group(
        &self,
        blocks: &mut Vec<Block>,
        path: &ModelPath,
        in_selection: bool,
        changed: &mut bool,
    ) -> bool {
        let mut in_selection = self.enter(in_selection, path);
        for (index, block) in blocks.iter_mut().enumerate() {
            let mut block_changed = false;
            in_selection = self.block(block, &path.clone().block(index), in_selection, &mut block_changed);
            if block_changed {
                block.clear_cache();
                *changed = true;
            }
        }

        let count = blocks.len();
        blocks.retain(|block| {
            !matches!(block, Block::Paragraph(p) if p.is_implicit && p.segments.is_empty())
        });
        if blocks.len() != count {
            *changed = true;
        }
        self.leave(in_selection, path)
    }

    fn block(
        &self,
        block: &mut Block,
        path: &ModelPath,
        in_selection: bool,
        changed: &mut bool,
    ) -> bool {
        match block {
            // A paragraph endpoint takes in the whole paragraph
            Block::Paragraph(paragraph) if self.is_start(path) || self.is_end(path) => {
                let in_selection = self.enter(in_selection, path);
                self.cover_segments(&mut paragraph.segments, path, in_selection, changed);
                self.leave(in_selection, path)
            }
            Block::Paragraph(paragraph) => {
                self.segments(&mut paragraph.segments, path, in_selection, changed)
            }
            Block::Table(table) => self.table(table, path, in_selection, changed),
            Block::Divider(divider) => {
                let in_selection = self.enter(in_selection, path);
                set_flag(&mut divider.is_selected, in_selection, changed);
                self.leave(in_selection, path)
            }
            Block::Entity(entity) => {
                let in_selection = self.enter(in_selection, path);
                set_flag(&mut entity.is_selected, in_selection, changed);
                self.leave(in_selection, path)
            }
            Block::FormatContainer(group) => self.group(&mut group.blocks, path, in_selection, changed),
            Block::ListItem(item) => {
                let holder = path.clone().format_holder();
                let in_selection = self.enter(in_selection, path);
                let holder_selected = self.enter(in_selection, &holder);
                set_flag(&mut item.format_holder.is_selected, holder_selected, changed);
                let in_selection = self.leave(holder_selected, &holder);
                self.group(&mut item.blocks, path, in_selection, changed)
            }
            Block::General(general) => {
                set_flag(
                    &mut general.is_selected,
                    self.enter(in_selection, path),
                    changed,
                );
                self.group(&mut general.blocks, path, in_selection, changed)
            }
        }
    }

    fn segments(
        &self,
        segments: &mut Vec<Segment>,
        paragraph_path: &ModelPath,
        mut in_selection: bool,
        changed: &mut bool,
    ) -> bool {
        let mut stale_markers = Vec::new();
        for (index, segment) in segments.iter_mut().enumerate() {
            let path = paragraph_path.clone().segment(index);
            let is_start = self.is_start(&path);
            let is_end = self.is_end(&path);
            let mut now = in_selection || is_start;

            match segment {
                Segment::SelectionMarker(marker) => {
                    if now && (is_start || is_end) {
                        set_flag(&mut marker.is_selected, true, changed);
                    } else {
                        stale_markers.push(index);
                    }
                }
                Segment::General(general) => {
                    set_flag(&mut general.is_selected, now, changed);
                    // The group walk shares this segment's path, so it also
                    // leaves the selection when the segment is the end
                    now = self.group(&mut general.blocks, &path, now, changed);
                }
                Segment::Image(image) => {
                    let as_object = now && is_start && (self.end.is_none() || is_end);
                    set_flag(&mut image.is_selected, now, changed);
                    set_flag(&mut image.is_selected_as_image_selection, as_object, changed);
                }
                other => {
                    if other.is_selected() != now {
                        other.set_selected(now);
                        *changed = true;
                    }
                }
            }
            in_selection = now && self.end.is_some() && !is_end;
        }

        for index in stale_markers.into_iter().rev() {
            segments.remove(index);
            *changed = true;
        }
        in_selection
    }

    /// Flag every segment of a paragraph alike and drop its markers
    fn cover_segments(
        &self,
        segments: &mut Vec<Segment>,
        paragraph_path: &ModelPath,
        in_selection: bool,
        changed: &mut bool,
    ) {
        let count = segments.len();
        segments.retain(|segment| !segment.is_marker());
        if segments.len() != count {
            *changed = true;
        }
        for (index, segment) in segments.iter_mut().enumerate() {
            match segment {
                Segment::General(general) => {
                    set_flag(&mut general.is_selected, in_selection, changed);
                    let path = paragraph_path.clone().segment(index);
                    self.group(&mut general.blocks, &path, in_selection, changed);
                }
                Segment::Image(image) => {
                    set_flag(&mut image.is_selected, in_selection, changed);
                    set_flag(&mut image.is_selected_as_image_selection, false, changed);
                }
                other => {
                    if other.is_selected() != in_selection {
                        other.set_selected(in_selection);
                        *changed = true;
                    }
                }
            }
        }
    }

    /// `(row, col)` of an endpoint that is a cell of the table at `table_path`
    fn cell_of(endpoint: Option<&ModelPath>, table_path: &ModelPath) -> Option<(usize, usize)> {
        let endpoint = endpoint?;
        match endpoint.last() {
            Some(PathStep::Cell { row, col }) if endpoint.parent().as_ref() == Some(table_path) => {
                Some((row, col))
            }
            _ => None,
        }
    }

    fn table(
        &self,
        table: &mut Table,
        path: &ModelPath,
        in_selection: bool,
        changed: &mut bool,
    ) -> bool {
        let in_selection = self.enter(in_selection, path);
        let first = Self::cell_of(self.start, path);
        let last = if self.end.is_some() {
            Self::cell_of(self.end, path)
        } else {
            first
        };

        match (in_selection, first, last) {
            (false, Some(first), Some(last)) => {
                self.table_rectangle(table, path, first, last, changed);
                false
            }
            _ => {
                let in_selection = self.table_range(table, path, in_selection, changed);
                self.leave(in_selection, path)
            }
        }
    }

    /// Select the bounding rectangle of two cells; everything inside cells is
    /// cleared.
    fn table_rectangle(
        &self,
        table: &mut Table,
        path: &ModelPath,
        (r1, c1): (usize, usize),
        (r2, c2): (usize, usize),
        changed: &mut bool,
    ) {
        let rows = r1.min(r2)..=r1.max(r2);
        let cols = c1.min(c2)..=c1.max(c2);
        for (row_index, row) in table.rows.iter_mut().enumerate() {
            let mut row_changed = false;
            for (col_index, cell) in row.cells.iter_mut().enumerate() {
                let mut cell_changed = false;
                let selected = rows.contains(&row_index) && cols.contains(&col_index);
                set_flag(&mut cell.is_selected, selected, &mut cell_changed);
                let cell_path = path.clone().cell(row_index, col_index);
                CLEAR.group(&mut cell.blocks, &cell_path, false, &mut cell_changed);
                if cell_changed {
                    cell.cached.clear();
                    row_changed = true;
                }
            }
            if row_changed {
                row.cached.clear();
                *changed = true;
            }
        }
    }

    /// Walk cells in reading order as part of a document range. A cell is
    /// flagged when the range covers it entirely.
    fn table_range(
        &self,
        table: &mut Table,
        path: &ModelPath,
        mut in_selection: bool,
        changed: &mut bool,
    ) -> bool {
        for (row_index, row) in table.rows.iter_mut().enumerate() {
            let mut row_changed = false;
            for (col_index, cell) in row.cells.iter_mut().enumerate() {
                let mut cell_changed = false;
                let cell_path = path.clone().cell(row_index, col_index);
                let entered = self.enter(in_selection, &cell_path);
                in_selection = self.group(&mut cell.blocks, &cell_path, in_selection, &mut cell_changed);
                set_flag(&mut cell.is_selected, entered && in_selection, &mut cell_changed);
                if cell_changed {
                    cell.cached.clear();
                    row_changed = true;
                }
            }
            if row_changed {
                row.cached.clear();
                *changed = true;
            }
        }
        in_selection
    }
}

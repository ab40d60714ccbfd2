use crate::node::NodeId;
use crate::tree::Dom;

/// Upper bound accepted for `colspan`/`rowspan`
pub const MAX_SPAN: usize = 1000;

/// One slot of the logical table grid.
///
/// Spanned slots remember the cell element that covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTableCell {
    Cell(NodeId),
    /// Covered by the cell to the left (colspan)
    SpanLeft(NodeId),
    /// Covered by the cell above (rowspan)
    SpanTop(NodeId),
    /// Covered both from the left and from above
    SpanBoth(NodeId),
    /// Nothing covers this slot (ragged row)
    Empty,
}

impl ParsedTableCell {
    /// The cell element covering this slot, if any
    pub fn element(self) -> Option<NodeId> {
        match self {
            ParsedTableCell::Cell(id)
            | ParsedTableCell::SpanLeft(id)
            | ParsedTableCell::SpanTop(id)
            | ParsedTableCell::SpanBoth(id) => Some(id),
            ParsedTableCell::Empty => None,
        }
    }

    pub fn span_left(self) -> bool {
        matches!(self, ParsedTableCell::SpanLeft(_) | ParsedTableCell::SpanBoth(_))
    }

    pub fn span_above(self) -> bool {
        matches!(self, ParsedTableCell::SpanTop(_) | ParsedTableCell::SpanBoth(_))
    }
}

pub type ParsedTable = Vec<Vec<ParsedTableCell>>;

/// Rows of a table in order, looking through `thead`, `tbody` and `tfoot`.
pub fn table_rows(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for &child in dom.children(table) {
        match dom.tag_name(child) {
            Some("tr") => rows.push(child),
            Some("thead" | "tbody" | "tfoot") => rows.extend(
                dom.children(child)
                    .iter()
                    .copied()
                    .filter(|&row| dom.is_element(row, "tr")),
            ),
            _ => {}
        }
    }
    rows
}

/// `td`/`th` children of a row
pub fn row_cells(dom: &Dom, row: NodeId) -> Vec<NodeId> {
    dom.children(row)
        .iter()
        .copied()
        .filter(|&cell| matches!(dom.tag_name(cell), Some("td" | "th")))
        .collect()
}

fn span_attribute(dom: &Dom, cell: NodeId, name: &str) -> usize {
    dom.attribute(cell, name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// Lay out the cells of `table` on a rectangular grid.
///
/// Each cell is placed in the first free column of its row, then its span
/// slots are filled. Rowspans never extend past the last row. Short rows are
/// padded with [`ParsedTableCell::Empty`]. A table without rows yields an
/// empty grid.
pub fn parse_table_cells(dom: &Dom, table: NodeId) -> ParsedTable {
    let rows = table_rows(dom, table);
    let mut grid: Vec<Vec<Option<ParsedTableCell>>> = vec![Vec::new(); rows.len()];

    for (row_index, &row) in rows.iter().enumerate() {
        let mut column = 0;
        for cell in row_cells(dom, row) {
            while grid[row_index].get(column).is_some_and(Option::is_some) {
                column += 1;
            }
            let colspan = span_attribute(dom, cell, "colspan");
            let rowspan = span_attribute(dom, cell, "rowspan").min(rows.len() - row_index);

            for i in 0..rowspan {
                let target = &mut grid[row_index + i];
                for j in 0..colspan {
                    let slot = match (i, j) {
                        (0, 0) => ParsedTableCell::Cell(cell),
                        (0, _) => ParsedTableCell::SpanLeft(cell),
                        (_, 0) => ParsedTableCell::SpanTop(cell),
                        _ => ParsedTableCell::SpanBoth(cell),
                    };
                    if target.len() <= column + j {
                        target.resize(column + j + 1, None);
                    }
                    target[column + j] = Some(slot);
                }
            }
            column += colspan;
        }
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    grid.into_iter()
        .map(|row| {
            let mut row: Vec<ParsedTableCell> = row
                .into_iter()
                .map(|slot| slot.unwrap_or(ParsedTableCell::Empty))
                .collect();
            row.resize(width, ParsedTableCell::Empty);
            row
        })
        .collect()
}

/// Grid coordinate `(row, column)` where `cell` starts
pub fn find_cell(table: &ParsedTable, cell: NodeId) -> Option<(usize, usize)> {
    table.iter().enumerate().find_map(|(row_index, row)| {
        row.iter()
            .position(|slot| *slot == ParsedTableCell::Cell(cell))
            .map(|column| (row_index, column))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::NodeSpec;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use super::ParsedTableCell::*;

    fn build(spec: NodeSpec) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let document = dom.document();
        let table = dom.build(document, &spec);
        (dom, table)
    }

    fn cell(text: &str) -> NodeSpec {
        NodeSpec::element("td").child(NodeSpec::text(text))
    }

    #[test]
    fn empty_table_yields_empty_grid() {
        let (dom, table) = build(NodeSpec::element("table"));
        assert_eq!(parse_table_cells(&dom, table), ParsedTable::new());
    }

    #[test]
    fn colspan_and_rowspan_fill_span_slots() {
        // +---+---+---+
        // | a     | b |
        // +---+---+   +
        // | c | d |   |
        // +---+---+---+
        let (dom, table) = build(
            NodeSpec::element("table").child(
                NodeSpec::element("tbody")
                    .child(
                        NodeSpec::element("tr")
                            .child(cell("a").attr("colspan", "2"))
                            .child(cell("b").attr("rowspan", "2")),
                    )
                    .child(NodeSpec::element("tr").child(cell("c")).child(cell("d"))),
            ),
        );
        let rows = table_rows(&dom, table);
        let r0 = row_cells(&dom, rows[0]);
        let r1 = row_cells(&dom, rows[1]);

        assert_eq!(
            parse_table_cells(&dom, table),
            vec![
                vec![Cell(r0[0]), SpanLeft(r0[0]), Cell(r0[1])],
                vec![Cell(r1[0]), Cell(r1[1]), SpanTop(r0[1])],
            ]
        );
        assert_eq!(find_cell(&parse_table_cells(&dom, table), r1[1]), Some((1, 1)));
    }

    #[test]
    fn rowspan_is_clipped_and_rows_are_padded() {
        let (dom, table) = build(
            NodeSpec::element("table")
                .child(
                    NodeSpec::element("tr")
                        .child(cell("a").attr("rowspan", "5").attr("colspan", "2")),
                )
                .child(NodeSpec::element("tr")),
        );
        let a = row_cells(&dom, table_rows(&dom, table)[0])[0];

        let grid = parse_table_cells(&dom, table);

        assert_eq!(
            grid,
            vec![
                vec![Cell(a), SpanLeft(a)],
                vec![SpanTop(a), SpanBoth(a)],
            ]
        );
    }

    #[test]
    fn ragged_rows_are_padded_with_empty() {
        let (dom, table) = build(
            NodeSpec::element("table")
                .child(NodeSpec::element("tr").child(cell("a")).child(cell("b")))
                .child(NodeSpec::element("tr").child(cell("c"))),
        );

        let grid = parse_table_cells(&dom, table);

        assert_eq!(grid[1][1], Empty);
        assert!(grid[1][0].element().is_some());
    }

    #[rstest]
    #[case::missing(None, 1)]
    #[case::not_a_number(Some("zero"), 1)]
    #[case::zero(Some("0"), 1)]
    #[case::padded(Some(" 3 "), 3)]
    #[case::oversized(Some("5000"), MAX_SPAN)]
    fn colspan_value_sets_grid_width(#[case] colspan: Option<&str>, #[case] width: usize) {
        let mut td = cell("a");
        if let Some(value) = colspan {
            td = td.attr("colspan", value);
        }
        let (dom, table) = build(NodeSpec::element("table").child(NodeSpec::element("tr").child(td)));

        let grid = parse_table_cells(&dom, table);

        assert_eq!(grid[0].len(), width);
        assert!(grid[0][1..].iter().all(|slot| slot.span_left()));
    }
}

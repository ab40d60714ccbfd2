use pretty_assertions::assert_eq;
use rstest::rstest;
use weft_dom::{Dom, NodeId};

use crate::model::{
    Block, BlockGroupType, CachedElement, Document, GeneralContainer, Image, ListItem, ListLevel,
    ListType, ModelPath, Paragraph, Segment, Table, TableCell, TableRow, Text,
};
use crate::selection::{
    ContentUnderSelectedTableCell, IterateSelectionsOption, ListFormatHolderInclusion,
    OperationalBlock, SegmentRef, collapse_selection_at, collect_selections,
    get_first_selected_list_item, get_first_selected_table, get_operational_blocks,
    get_selected_paragraphs, get_selected_segments, has_selection_in_block,
    is_whole_table_selected, iterate_selections, iterate_selections_mut, set_selection,
};

fn paragraph(segments: Vec<Segment>) -> Block {
    Block::Paragraph(Paragraph::default().with_segments(segments))
}

fn selected(text: &str) -> Segment {
    Segment::Text(Text::new(text, Default::default()).selected())
}

fn path(text: &str) -> ModelPath {
    text.parse().unwrap()
}

fn selection_flags(block: &Block) -> Vec<bool> {
    block
        .as_paragraph()
        .map(|p| p.segments.iter().map(Segment::is_selected).collect())
        .unwrap_or_default()
}

fn marker_count(doc: &Document) -> usize {
    fn count(blocks: &[Block]) -> usize {
        blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => p.segments.iter().filter(|s| s.is_marker()).count(),
                Block::ListItem(item) => count(&item.blocks),
                Block::FormatContainer(group) => count(&group.blocks),
                Block::Table(table) => table
                    .rows
                    .iter()
                    .flat_map(|row| &row.cells)
                    .map(|cell| count(&cell.blocks))
                    .sum(),
                _ => 0,
            })
            .sum()
    }
    count(&doc.blocks)
}

fn table_2x2() -> Block {
    let cell = |text: &str| TableCell::new(vec![paragraph(vec![Segment::text(text)])]);
    Block::Table(Table::new(vec![
        TableRow::new(vec![cell("a"), cell("b")]),
        TableRow::new(vec![cell("c"), cell("d")]),
    ]))
}

// set_selection

#[test]
fn range_selects_between_endpoints_and_drops_inner_marker() {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("ab"), Segment::marker(), Segment::text("cd")]),
        paragraph(vec![Segment::text("ef"), Segment::text("gh")]),
    ]);

    set_selection(&mut doc, Some(&path("/b0/s0")), Some(&path("/b1/s0")));

    assert_eq!(selection_flags(&doc.blocks[0]), vec![true, true]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![true, false]);
    assert_eq!(marker_count(&doc), 0);
}

#[test]
fn reversed_endpoints_are_swapped() {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("a")]),
        paragraph(vec![Segment::text("b")]),
        paragraph(vec![Segment::text("c")]),
    ]);

    set_selection(&mut doc, Some(&path("/b1/s0")), Some(&path("/b0/s0")));

    assert_eq!(selection_flags(&doc.blocks[0]), vec![true]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![true]);
    assert_eq!(selection_flags(&doc.blocks[2]), vec![false]);
}

#[test]
fn collapsed_selection_keeps_its_marker() {
    let mut doc = Document::new(vec![paragraph(vec![
        Segment::text("a"),
        Segment::marker(),
        Segment::text("b"),
    ])]);

    set_selection(&mut doc, Some(&path("/b0/s1")), Some(&path("/b0/s1")));

    assert_eq!(selection_flags(&doc.blocks[0]), vec![false, true, false]);
    assert_eq!(marker_count(&doc), 1);
}

#[test]
fn paragraph_endpoint_selects_the_whole_paragraph() {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("a"), Segment::marker(), Segment::text("b")]),
        paragraph(vec![Segment::text("c"), Segment::text("d")]),
        paragraph(vec![Segment::text("e")]),
    ]);

    set_selection(&mut doc, Some(&path("/b0")), None);
    assert_eq!(selection_flags(&doc.blocks[0]), vec![true, true]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![false, false]);

    set_selection(&mut doc, Some(&path("/b0/s1")), Some(&path("/b1")));
    assert_eq!(selection_flags(&doc.blocks[0]), vec![false, true]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![true, true]);
    assert_eq!(selection_flags(&doc.blocks[2]), vec![false]);
    assert_eq!(marker_count(&doc), 0);
}

#[test]
fn clearing_removes_markers_and_empty_implicit_paragraphs() {
    let mut doc = Document::new(vec![
        paragraph(vec![selected("a")]),
        Block::Paragraph(Paragraph::implicit().with_segments(vec![Segment::marker()])),
    ]);

    set_selection(&mut doc, None, None);

    assert_eq!(doc.blocks.len(), 1);
    assert_eq!(selection_flags(&doc.blocks[0]), vec![false]);
}

#[test]
fn unresolvable_endpoint_clears_everything() {
    let mut doc = Document::new(vec![paragraph(vec![selected("a"), Segment::text("b")])]);

    set_selection(&mut doc, Some(&path("/b0/s1")), Some(&path("/b9/s0")));

    assert_eq!(selection_flags(&doc.blocks[0]), vec![false, false]);
}

#[test]
fn image_is_object_selected_only_when_it_is_both_endpoints() {
    let image = Segment::Image(Image::new("cat.png", Default::default()));
    let mut doc = Document::new(vec![paragraph(vec![image, Segment::text("x")])]);

    set_selection(&mut doc, Some(&path("/b0/s0")), None);
    let Some(Segment::Image(image)) = doc.blocks[0].as_paragraph().map(|p| &p.segments[0]) else {
        panic!("expected image");
    };
    assert!(image.is_selected);
    assert!(image.is_selected_as_image_selection);

    set_selection(&mut doc, Some(&path("/b0/s0")), Some(&path("/b0/s1")));
    let Some(Segment::Image(image)) = doc.blocks[0].as_paragraph().map(|p| &p.segments[0]) else {
        panic!("expected image");
    };
    assert!(image.is_selected);
    assert!(!image.is_selected_as_image_selection);
}

#[test]
fn changed_blocks_lose_cache_and_untouched_blocks_keep_it() {
    let mut dom = Dom::new();
    let mut blocks = vec![
        paragraph(vec![Segment::text("a")]),
        paragraph(vec![Segment::text("b")]),
    ];
    for block in &mut blocks {
        if let Block::Paragraph(p) = block {
            p.cached = CachedElement::new(dom.create_element("div"));
        }
    }
    let mut doc = Document::new(blocks);

    set_selection(&mut doc, Some(&path("/b0/s0")), None);

    assert_eq!(doc.blocks[0].cached_element(), None);
    assert!(doc.blocks[1].cached_element().is_some());
}

#[test]
fn table_cell_endpoints_select_a_rectangle() {
    let mut doc = Document::new(vec![table_2x2()]);

    set_selection(&mut doc, Some(&path("/b0/c1.1")), Some(&path("/b0/c0.1")));

    let Block::Table(table) = &doc.blocks[0] else {
        panic!("expected table");
    };
    let flags: Vec<Vec<bool>> = table
        .rows
        .iter()
        .map(|row| row.cells.iter().map(|cell| cell.is_selected).collect())
        .collect();
    assert_eq!(flags, vec![vec![false, true], vec![false, true]]);
    assert!(!has_selection_in_block(&table.rows[0].cells[0].blocks[0]));
}

#[test]
fn range_through_a_table_selects_fully_covered_cells() {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("before")]),
        table_2x2(),
        paragraph(vec![Segment::text("after")]),
    ]);

    set_selection(&mut doc, Some(&path("/b0/s0")), Some(&path("/b2/s0")));

    let Block::Table(table) = &doc.blocks[1] else {
        panic!("expected table");
    };
    assert!(is_whole_table_selected(table));
    assert_eq!(selection_flags(&doc.blocks[2]), vec![true]);
}

#[test]
fn collapse_leaves_exactly_one_marker() {
    let mut doc = Document::new(vec![
        paragraph(vec![selected("ab"), Segment::marker()]),
        paragraph(vec![Segment::marker(), Segment::text("x")]),
    ]);

    collapse_selection_at(&mut doc, &path("/b1"), 0).unwrap();

    assert_eq!(marker_count(&doc), 1);
    assert_eq!(selection_flags(&doc.blocks[0]), vec![false]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![true, false]);
}

#[test]
fn collapse_rejects_non_paragraph() {
    let mut doc = Document::new(vec![table_2x2()]);
    assert!(collapse_selection_at(&mut doc, &path("/b0"), 0).is_err());
}

#[test]
fn general_segment_endpoint_recomputes_its_content() {
    let mut dom = Dom::new();
    let mut general = GeneralContainer::new(dom.create_element("span"));
    general.blocks = vec![paragraph(vec![Segment::text("in"), Segment::marker()])];
    let mut doc = Document::new(vec![paragraph(vec![
        Segment::General(general),
        Segment::text("x"),
        Segment::text("y"),
    ])]);

    let inner_flags = |doc: &Document| match &doc.blocks[0].as_paragraph().unwrap().segments[0] {
        Segment::General(general) => selection_flags(&general.blocks[0]),
        other => panic!("expected a general segment, got {other:?}"),
    };

    set_selection(&mut doc, Some(&path("/b0/s0")), Some(&path("/b0/s1")));
    assert_eq!(inner_flags(&doc), vec![true]);
    assert_eq!(selection_flags(&doc.blocks[0]), vec![true, true, false]);

    set_selection(&mut doc, Some(&path("/b0/s2")), None);
    assert_eq!(inner_flags(&doc), vec![false]);
    assert_eq!(selection_flags(&doc.blocks[0]), vec![false, false, true]);
}

#[rstest]
#[case("/b0", "/b0/s1")]
#[case("/b0/s1", "/b0")]
fn endpoint_inside_the_other_selects_only_the_outer_node(#[case] start: &str, #[case] end: &str) {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("a"), Segment::text("b")]),
        paragraph(vec![Segment::text("c")]),
        paragraph(vec![Segment::text("d")]),
    ]);

    set_selection(&mut doc, Some(&path(start)), Some(&path(end)));

    assert_eq!(selection_flags(&doc.blocks[0]), vec![true, true]);
    assert_eq!(selection_flags(&doc.blocks[1]), vec![false]);
    assert_eq!(selection_flags(&doc.blocks[2]), vec![false]);
}

#[test]
fn table_endpoint_with_the_other_in_a_cell_selects_the_table() {
    let mut doc = Document::new(vec![
        paragraph(vec![Segment::text("x")]),
        table_2x2(),
        paragraph(vec![Segment::text("y")]),
    ]);

    set_selection(&mut doc, Some(&path("/b1")), Some(&path("/b1/c1.1/b0/s0")));

    let Block::Table(table) = &doc.blocks[1] else {
        panic!("expected a table");
    };
    assert!(is_whole_table_selected(table));
    assert_eq!(selection_flags(&doc.blocks[0]), vec![false]);
    assert_eq!(selection_flags(&doc.blocks[2]), vec![false]);
}

#[test]
fn list_format_holder_flag_follows_the_selection() {
    let mut dom = Dom::new();
    let mut doc = list_doc(vec![Segment::text("a")]);
    let holder_selected = |doc: &Document| match &doc.blocks[0] {
        Block::ListItem(item) => item.format_holder.is_selected,
        other => panic!("expected a list item, got {other:?}"),
    };

    set_selection(&mut doc, Some(&path("/b0/fh")), None);
    assert!(holder_selected(&doc));
    if let Block::ListItem(item) = &doc.blocks[0] {
        assert_eq!(selection_flags(&item.blocks[0]), vec![false]);
    }

    if let Block::ListItem(item) = &mut doc.blocks[0] {
        item.cached = CachedElement::new(dom.create_element("li"));
    }
    set_selection(&mut doc, None, None);
    assert!(!holder_selected(&doc));
    assert_eq!(doc.blocks[0].cached_element(), None);
}

// iterate_selections

fn list_doc(segments: Vec<Segment>) -> Document {
    let item = ListItem::new(vec![ListLevel::new(ListType::Unordered)], Default::default())
        .with_blocks(vec![paragraph(segments)]);
    Document::new(vec![Block::ListItem(item)])
}

fn holder_reported(doc: &Document, inclusion: ListFormatHolderInclusion) -> bool {
    let option = IterateSelectionsOption {
        include_list_format_holder: inclusion,
        ..Default::default()
    };
    let mut found = false;
    iterate_selections(
        doc,
        |info| {
            if let Some([SegmentRef::FormatHolder(_)]) = info.segments.as_deref() {
                found = true;
                assert!(info.block.is_none());
                assert_eq!(info.location, path("/b0"));
            }
            false
        },
        option,
    );
    found
}

#[test]
fn list_format_holder_inclusion() {
    let full = list_doc(vec![selected("a"), selected("b")]);
    let partial = list_doc(vec![selected("a"), Segment::text("b")]);

    assert!(holder_reported(&full, ListFormatHolderInclusion::OnlyFullySelected));
    assert!(!holder_reported(&full, ListFormatHolderInclusion::Never));
    assert!(!holder_reported(&partial, ListFormatHolderInclusion::OnlyFullySelected));
    assert!(holder_reported(&partial, ListFormatHolderInclusion::AnyPartiallySelected));
}

#[test]
fn whole_table_reported_once_for_operational_blocks() {
    let mut doc = Document::new(vec![table_2x2()]);
    set_selection(&mut doc, Some(&path("/b0/c0.0")), Some(&path("/b0/c1.1")));

    let units = collect_selections(&doc, IterateSelectionsOption::for_operational_blocks());
    assert_eq!(units.len(), 1);
    assert!(matches!(units[0].block, Some(Block::Table(_))));

    // four cells, each followed by its content treated as selected
    let units = collect_selections(&doc, IterateSelectionsOption::for_format_state());
    assert_eq!(units.len(), 8);
    assert!(units[1].table_context.as_ref().is_some_and(|c| c.is_whole_table_selected));

    let ignore_cells = IterateSelectionsOption {
        content_under_selected_table_cell: ContentUnderSelectedTableCell::IgnoreForTableOrCell,
        ..Default::default()
    };
    assert_eq!(collect_selections(&doc, ignore_cells).len(), 1);
}

#[test]
fn callback_returning_true_stops_the_walk() {
    let doc = Document::new(vec![
        paragraph(vec![selected("a")]),
        paragraph(vec![selected("b")]),
    ]);

    let mut calls = 0;
    iterate_selections(
        &doc,
        |_| {
            calls += 1;
            true
        },
        IterateSelectionsOption::default(),
    );

    assert_eq!(calls, 1);
}

#[test]
fn lone_trailing_caret_does_not_select_next_paragraph() {
    let doc = Document::new(vec![
        paragraph(vec![selected("line")]),
        paragraph(vec![Segment::marker(), Segment::text("next")]),
    ]);

    let paragraphs = get_selected_paragraphs(&doc);

    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].location, path("/b0"));
}

#[test]
fn selected_segments_skip_readonly_entities() {
    let mut dom = Dom::new();
    let wrapper = dom.create_element("span");
    let mut entity = crate::model::Entity::new(wrapper, Some("mention"), true);
    entity.is_selected = true;
    let doc = Document::new(vec![paragraph(vec![selected("a"), Segment::Entity(entity)])]);

    assert_eq!(get_selected_segments(&doc, false).len(), 1);
}

#[test]
fn first_selected_table_and_list_item() {
    let mut doc = Document::new(vec![paragraph(vec![Segment::text("x")]), table_2x2()]);
    set_selection(&mut doc, Some(&path("/b1/c1.0")), None);

    let (_, location) = get_first_selected_table(&doc).unwrap();
    assert_eq!(location, path("/b1"));

    let list = list_doc(vec![selected("a")]);
    assert!(get_first_selected_list_item(&list).is_some());
    assert!(get_first_selected_list_item(&doc).is_none());
}

#[rstest]
#[case(ContentUnderSelectedTableCell::Include, 4, 2)]
#[case(ContentUnderSelectedTableCell::IgnoreForTable, 4, 2)]
#[case(ContentUnderSelectedTableCell::IgnoreForTableOrCell, 2, 0)]
fn partly_selected_table_reports_cells_and_their_content(
    #[case] content: ContentUnderSelectedTableCell,
    #[case] units: usize,
    #[case] paragraphs: usize,
) {
    let mut doc = Document::new(vec![table_2x2()]);
    set_selection(&mut doc, Some(&path("/b0/c0.0")), Some(&path("/b0/c0.1")));
    let option = IterateSelectionsOption {
        content_under_selected_table_cell: content,
        ..Default::default()
    };

    let selections = collect_selections(&doc, option);

    assert_eq!(selections.len(), units);
    assert_eq!(
        selections.iter().filter(|info| info.paragraph().is_some()).count(),
        paragraphs
    );
    assert!(selections.iter().all(|info| info.table_context.is_some()));
}

#[test]
fn operational_blocks_include_paragraphs_of_selected_cells() {
    let mut doc = Document::new(vec![table_2x2()]);
    set_selection(&mut doc, Some(&path("/b0/c0.0")), Some(&path("/b0/c0.1")));

    let blocks = get_operational_blocks(&doc, &[BlockGroupType::FormatContainer], &[], false);

    let locations: Vec<String> = blocks
        .iter()
        .map(|block| match block {
            OperationalBlock::Block { location, .. } => location.to_string(),
            OperationalBlock::Group { .. } => "group".to_string(),
        })
        .collect();
    assert_eq!(locations, vec!["/b0/c0.0/b0", "/b0/c0.1/b0"]);
}

/// doc
///   b0 paragraph "a" (selected, cached)
///   b1 paragraph "b" (cached)
///   b2 list item (cached)
///     b0 paragraph "c" (selected, cached)
///     b1 paragraph "d" (cached)
fn cached_selection_doc(dom: &mut Dom) -> Document {
    let mut cached = |segments: Vec<Segment>| {
        let mut p = Paragraph::default().with_segments(segments);
        p.cached = CachedElement::new(dom.create_element("p"));
        Block::Paragraph(p)
    };
    let first = cached(vec![selected("a")]);
    let second = cached(vec![Segment::text("b")]);
    let inner = vec![cached(vec![selected("c")]), cached(vec![Segment::text("d")])];
    let mut item = ListItem::new(vec![ListLevel::new(ListType::Unordered)], Default::default())
        .with_blocks(inner);
    item.cached = CachedElement::new(dom.create_element("li"));
    Document::new(vec![first, second, Block::ListItem(item)])
}

fn list_child_cache(doc: &Document, index: usize) -> Option<NodeId> {
    match &doc.blocks[2] {
        Block::ListItem(item) => item.blocks[index].cached_element(),
        other => panic!("expected a list item, got {other:?}"),
    }
}

#[test]
fn read_only_walk_keeps_caches() {
    let mut dom = Dom::new();
    let doc = cached_selection_doc(&mut dom);

    let mut units = 0;
    iterate_selections(
        &doc,
        |_| {
            units += 1;
            false
        },
        IterateSelectionsOption::default(),
    );

    assert_eq!(units, 2);
    assert!(doc.blocks.iter().all(|block| block.cached_element().is_some()));
    assert!(list_child_cache(&doc, 0).is_some());
}

#[test]
fn mutating_walk_invalidates_reported_units_and_their_ancestors() {
    let mut dom = Dom::new();
    let mut doc = cached_selection_doc(&mut dom);

    let mut units = 0;
    iterate_selections_mut(
        &mut doc,
        |_| {
            units += 1;
            false
        },
        IterateSelectionsOption::default(),
    );

    assert_eq!(units, 2);
    assert_eq!(doc.blocks[0].cached_element(), None);
    assert!(doc.blocks[1].cached_element().is_some());
    assert_eq!(doc.blocks[2].cached_element(), None);
    assert_eq!(list_child_cache(&doc, 0), None);
    assert!(list_child_cache(&doc, 1).is_some());
}

#[test]
fn mutating_walk_stops_invalidating_where_the_callback_stops() {
    let mut dom = Dom::new();
    let mut doc = cached_selection_doc(&mut dom);

    iterate_selections_mut(&mut doc, |_| true, IterateSelectionsOption::default());

    assert_eq!(doc.blocks[0].cached_element(), None);
    assert!(doc.blocks[2].cached_element().is_some());
    assert!(list_child_cache(&doc, 0).is_some());
}

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use weft_dom::{Dom, DomPosition, DomRange, DomSelection, NodeId};

use crate::indexer::NodeIndex;
use crate::model::{
    Block, BlockFormat, Divider, Document, Entity, FormatContainer, Image, Link, ListItem,
    ListLevel, ListType, Paragraph, Segment, SegmentFormat, Table, TableCell, TableRow, Text,
};
use crate::model_to_dom::{ModelToDomContext, ModelToDomHandlers, model_to_dom};

fn container() -> (Dom, NodeId) {
    let mut dom = Dom::new();
    let root = dom.create_element("div");
    (dom, root)
}

fn render(doc: &mut Document) -> (Dom, NodeId, Option<DomSelection>) {
    let (mut dom, root) = container();
    let selection = model_to_dom(&mut dom, root, doc, &mut ModelToDomContext::new());
    (dom, root, selection)
}

fn p(segments: Vec<Segment>) -> Block {
    Block::Paragraph(
        Paragraph::new(BlockFormat::default())
            .with_decorator("p", SegmentFormat::default())
            .with_segments(segments),
    )
}

fn implicit(segments: Vec<Segment>) -> Block {
    Block::Paragraph(Paragraph::implicit().with_segments(segments))
}

fn selected(text: &str) -> Segment {
    Segment::Text(Text::new(text, SegmentFormat::default()).selected())
}

fn list_item(list_types: &[ListType], text: &str) -> Block {
    let levels = list_types.iter().map(|&list_type| ListLevel::new(list_type)).collect();
    Block::ListItem(
        ListItem::new(levels, SegmentFormat::default())
            .with_blocks(vec![implicit(vec![Segment::text(text)])]),
    )
}

#[test]
fn explicit_and_implicit_paragraphs_around_a_divider() {
    let mut doc = Document::new(vec![
        p(vec![Segment::text("a")]),
        implicit(vec![Segment::text("b")]),
        Block::Divider(Divider::new("hr")),
    ]);

    let (dom, root, selection) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @"<p>a</p>b<hr>");
    assert_eq!(selection, None);
}

#[test]
fn segment_format_wraps_the_link() {
    let text = Text {
        link: Some(Link {
            href: "/x".into(),
            target: None,
        }),
        ..Text::new(
            "go",
            SegmentFormat {
                font_weight: Some("bold".into()),
                ..Default::default()
            },
        )
    };
    let mut doc = Document::new(vec![implicit(vec![Segment::Text(text)])]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @r#"<span style="font-weight: bold"><a href="/x">go</a></span>"#);
}

#[test]
fn heading_carries_its_decorator_format() {
    let heading = Paragraph::new(BlockFormat::default())
        .with_decorator(
            "h1",
            SegmentFormat {
                font_size: Some("20px".into()),
                ..Default::default()
            },
        )
        .with_segments(vec![Segment::text("T")]);
    let mut doc = Document::new(vec![Block::Paragraph(heading)]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @r#"<h1 style="font-size: 20px">T</h1>"#);
}

#[test]
fn implicit_paragraph_with_own_format_gets_a_wrapper() {
    let centered = BlockFormat {
        text_align: Some("center".into()),
        ..Default::default()
    };
    let mut paragraph = Paragraph::implicit().with_segments(vec![Segment::text("x")]);
    paragraph.format = centered;
    let mut doc = Document::new(vec![Block::Paragraph(paragraph)]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @r#"<div style="text-align: center">x</div>"#);
}

#[test]
fn implicit_paragraph_matching_inherited_format_stays_bare() {
    let centered = BlockFormat {
        text_align: Some("center".into()),
        ..Default::default()
    };
    let mut paragraph = Paragraph::implicit().with_segments(vec![Segment::text("q")]);
    paragraph.format = centered.clone();
    let mut quote = FormatContainer::new("blockquote", vec![Block::Paragraph(paragraph)]);
    quote.format = centered;
    let mut doc = Document::new(vec![Block::FormatContainer(quote)]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @r#"<blockquote style="text-align: center">q</blockquote>"#);
}

#[test]
fn selected_text_becomes_a_range_over_merged_text() {
    let mut doc = Document::new(vec![implicit(vec![Segment::text("ab"), selected("cd")])]);

    let (dom, root, selection) = render(&mut doc);

    let text = dom.first_child(root).unwrap();
    assert_eq!(dom.children(root).len(), 1);
    assert_eq!(dom.text(text), Some("abcd"));
    assert_eq!(
        selection,
        Some(DomSelection::Range {
            range: DomRange::new(DomPosition::new(text, 2), DomPosition::new(text, 4)),
            is_reverted: false,
        })
    );
}

#[test]
fn range_across_paragraphs_and_reverted_flag() {
    let mut doc = Document::new(vec![
        p(vec![Segment::text("a"), selected("b")]),
        p(vec![selected("c"), Segment::text("d")]),
    ]);
    doc.has_reverted_range_selection = true;

    let (dom, root, selection) = render(&mut doc);

    let first = dom.first_child(dom.children(root)[0]).unwrap();
    let second = dom.first_child(dom.children(root)[1]).unwrap();
    assert_eq!(
        selection,
        Some(DomSelection::Range {
            range: DomRange::new(DomPosition::new(first, 1), DomPosition::new(second, 1)),
            is_reverted: true,
        })
    );
}

#[test]
fn marker_between_texts_collapses_into_merged_text() {
    let mut doc = Document::new(vec![p(vec![
        Segment::text("ab"),
        Segment::marker(),
        Segment::text("cd"),
    ])]);

    let (dom, root, selection) = render(&mut doc);

    let text = dom.first_child(dom.children(root)[0]).unwrap();
    assert_eq!(
        selection,
        Some(DomSelection::collapsed(DomPosition::new(text, 2)))
    );
}

#[test]
fn marker_at_end_of_implicit_paragraph_lands_in_the_parent() {
    let mut doc = Document::new(vec![implicit(vec![Segment::text("ab"), Segment::marker()])]);

    let (_, root, selection) = render(&mut doc);

    assert_eq!(
        selection,
        Some(DomSelection::collapsed(DomPosition::new(root, 1)))
    );
}

#[test]
fn image_selection_wins_over_range() {
    let image = Image {
        alt: Some("A".into()),
        is_selected: true,
        is_selected_as_image_selection: true,
        ..Image::new("a.png", SegmentFormat::default())
    };
    let mut doc = Document::new(vec![implicit(vec![Segment::Image(image)])]);

    let (dom, root, selection) = render(&mut doc);

    assert_snapshot!(dom.inner_html(root), @r#"<img alt="A" src="a.png">"#);
    let img = dom.first_child(root).unwrap();
    assert_eq!(selection, Some(DomSelection::Image { image: img }));
}

fn cell(text: &str) -> TableCell {
    TableCell::new(vec![implicit(vec![Segment::text(text)])])
}

#[test]
fn table_spans_widths_and_cell_selection() {
    let mut origin = cell("a");
    origin.is_selected = true;
    let mut table = Table::new(vec![
        TableRow::new(vec![origin, TableCell::spanned(true, false)]),
        TableRow::new(vec![cell("b"), cell("c")]),
    ]);
    table.widths = vec![10.0, 20.0];
    let mut doc = Document::new(vec![Block::Table(table)]);

    let (dom, root, selection) = render(&mut doc);

    assert_snapshot!(
        dom.inner_html(root),
        @r#"<table><colgroup><col style="width: 10px"><col style="width: 20px"></colgroup><tbody><tr><td colspan="2">a</td></tr><tr><td>b</td><td>c</td></tr></tbody></table>"#
    );
    let table = dom.first_child(root).unwrap();
    assert_eq!(
        selection,
        Some(DomSelection::Table {
            table,
            first_row: 0,
            first_column: 0,
            last_row: 0,
            last_column: 0,
        })
    );
}

#[test]
fn vertical_span_becomes_rowspan() {
    let mut doc = Document::new(vec![Block::Table(Table::new(vec![
        TableRow::new(vec![cell("a"), cell("b")]),
        TableRow::new(vec![TableCell::spanned(false, true), cell("c")]),
    ]))]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(
        dom.inner_html(root),
        @r#"<table><tbody><tr><td rowspan="2">a</td><td>b</td></tr><tr><td>c</td></tr></tbody></table>"#
    );
}

#[test]
fn empty_table_renders_nothing() {
    let mut doc = Document::new(vec![Block::Table(Table::new(Vec::new()))]);

    let (dom, root, _) = render(&mut doc);

    assert_eq!(dom.inner_html(root), "");
}

#[test]
fn list_items_share_open_lists() {
    let mut doc = Document::new(vec![
        list_item(&[ListType::Ordered], "a"),
        list_item(&[ListType::Ordered, ListType::Unordered], "b"),
        list_item(&[ListType::Ordered], "c"),
        implicit(vec![Segment::text("x")]),
        list_item(&[ListType::Ordered], "d"),
    ]);

    let (dom, root, _) = render(&mut doc);

    assert_snapshot!(
        dom.inner_html(root),
        @"<ol><li>a</li><ul><li>b</li></ul><li>c</li></ol>x<ol><li>d</li></ol>"
    );
}

#[test]
fn entity_wrapper_is_moved_and_stamped() {
    let (mut dom, root) = container();
    let wrapper = dom.create_element("div");
    let inner = dom.create_text("w");
    dom.append_child(wrapper, inner);
    let mut entity = Entity::new(wrapper, Some("mention"), true);
    entity.id = Some("e1".into());
    let mut doc = Document::new(vec![Block::Entity(entity)]);

    model_to_dom(&mut dom, root, &mut doc, &mut ModelToDomContext::new());

    assert_eq!(dom.first_child(root), Some(wrapper));
    assert_snapshot!(
        dom.inner_html(root),
        @r#"<div contenteditable="false" data-entity-id="e1" data-entity-readonly="true" data-entity-type="mention">w</div>"#
    );
}

#[test]
fn cached_elements_are_reused_and_stale_nodes_removed() {
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![p(vec![Segment::text("a")]), Block::Divider(Divider::new("hr"))]);
    doc.persist_cache = true;
    let mut context = ModelToDomContext::new().with_cache(true);

    model_to_dom(&mut dom, root, &mut doc, &mut context);
    let paragraph = doc.blocks[0].cached_element().unwrap();
    let divider = doc.blocks[1].cached_element().unwrap();
    let stray = dom.create_element("span");
    dom.append_child(root, stray);

    model_to_dom(&mut dom, root, &mut doc, &mut context);

    assert_eq!(dom.children(root), &[paragraph, divider]);
    assert_eq!(dom.parent(stray), None);
}

#[test]
fn cleared_cache_renders_fresh_element_in_place() {
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![p(vec![Segment::text("a")]), Block::Divider(Divider::new("hr"))]);
    doc.persist_cache = true;
    let mut context = ModelToDomContext::new().with_cache(true);
    model_to_dom(&mut dom, root, &mut doc, &mut context);
    let old = doc.blocks[0].cached_element().unwrap();

    let Block::Paragraph(paragraph) = &mut doc.blocks[0] else {
        unreachable!()
    };
    paragraph.segments = vec![Segment::text("b")];
    paragraph.cached.clear();
    model_to_dom(&mut dom, root, &mut doc, &mut context);

    assert_snapshot!(dom.inner_html(root), @"<p>b</p><hr>");
    assert_eq!(dom.parent(old), None);
}

#[test]
fn caches_are_dropped_unless_persisted() {
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![p(vec![Segment::text("a")])]);
    let mut context = ModelToDomContext::new().with_cache(true);

    model_to_dom(&mut dom, root, &mut doc, &mut context);

    assert_eq!(doc.blocks[0].cached_element(), None);
}

#[test]
fn selected_blocks_are_rebuilt_not_reused() {
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![p(vec![Segment::text("a")])]);
    doc.persist_cache = true;
    let mut context = ModelToDomContext::new().with_cache(true);
    model_to_dom(&mut dom, root, &mut doc, &mut context);
    let old = doc.blocks[0].cached_element().unwrap();

    let Block::Paragraph(paragraph) = &mut doc.blocks[0] else {
        unreachable!()
    };
    paragraph.segments[0].set_selected(true);
    let selection = model_to_dom(&mut dom, root, &mut doc, &mut context);

    let fresh = dom.first_child(root).unwrap();
    assert_ne!(fresh, old);
    let text = dom.first_child(fresh).unwrap();
    assert_eq!(
        selection,
        Some(DomSelection::Range {
            range: DomRange::new(DomPosition::new(text, 0), DomPosition::new(text, 1)),
            is_reverted: false,
        })
    );
}

#[test]
fn indexer_sees_rendered_paragraphs_segments_and_tables() {
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![
        p(vec![Segment::text("a")]),
        Block::Table(Table::new(vec![TableRow::new(vec![cell("b")])])),
    ]);
    let mut index = NodeIndex::new();

    model_to_dom(
        &mut dom,
        root,
        &mut doc,
        &mut ModelToDomContext::new().with_indexer(&mut index),
    );

    let paragraph = dom.children(root)[0];
    let table = dom.children(root)[1];
    let text = dom.first_child(paragraph).unwrap();
    assert!(index.is_paragraph(paragraph));
    assert!(index.is_segment_current(&dom, text));
    assert_eq!(index.table_size(table), Some((1, 1)));
}

fn boxed_divider(
    dom: &mut Dom,
    parent: NodeId,
    _divider: &mut Divider,
    _context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let element = dom.create_element("div");
    dom.set_attribute(element, "class", "rule");
    dom.insert_before(parent, element, reference);
    reference
}

#[test]
fn custom_handler_replaces_default() {
    let handlers = ModelToDomHandlers {
        divider: boxed_divider,
        ..ModelToDomHandlers::default()
    };
    let (mut dom, root) = container();
    let mut doc = Document::new(vec![Block::Divider(Divider::new("hr"))]);

    model_to_dom(
        &mut dom,
        root,
        &mut doc,
        &mut ModelToDomContext::new().with_handlers(handlers),
    );

    assert_snapshot!(dom.inner_html(root), @r#"<div class="rule"></div>"#);
}

//! Default handlers for reverse sync.

use weft_dom::{Dom, DomPosition, DomSelection, NodeId, NodeKind};

use crate::model::{
    Block, BlockFormat, BlockGroup, Br, Divider, Entity, FormatContainer, GeneralContainer, Image,
    Link, ListItem, ListLevel, Paragraph, Segment, SegmentFormat, Table, Text,
};
use crate::model_to_dom::{ModelToDomContext, ModelToDomHandlers, reusable_element, reuse_cached_element};
use crate::selection::{get_selected_cells, has_selection_in_block, has_selection_in_segment};

pub fn default_handlers() -> ModelToDomHandlers {
    ModelToDomHandlers {
        block_group_children: handle_block_group_children,
        paragraph: handle_paragraph,
        table: handle_table,
        divider: handle_divider,
        entity_block: handle_entity_block,
        format_container: handle_format_container,
        list_item: handle_list_item,
        general_block: handle_general_block,
        text: handle_text,
        br: handle_br,
        image: handle_image,
        general_segment: handle_general_segment,
        entity_segment: handle_entity_segment,
    }
}

/// Render `group` into `parent`, reusing what is already there and removing
/// the native children left over at the end
pub fn handle_block_group_children(
    dom: &mut Dom,
    parent: NodeId,
    group: &mut dyn BlockGroup,
    context: &mut ModelToDomContext<'_>,
) {
    let outer_lists = std::mem::take(&mut context.list_stack);
    let mut reference = dom.first_child(parent);
    for block in group.blocks_mut() {
        reference = handle_block(dom, parent, block, context, reference);
    }
    while let Some(node) = reference {
        reference = dom.next_sibling(node);
        log::debug!("removing {node}, it is not in the model");
        dom.detach(node);
    }
    context.list_stack = outer_lists;
}

pub fn handle_block(
    dom: &mut Dom,
    parent: NodeId,
    block: &mut Block,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    if !matches!(block, Block::ListItem(_)) {
        context.list_stack.clear();
    }
    match block {
        Block::Paragraph(paragraph) => {
            let handler = context.handlers.paragraph;
            handler(dom, parent, paragraph, context, reference)
        }
        Block::Table(table) => {
            let handler = context.handlers.table;
            handler(dom, parent, table, context, reference)
        }
        Block::Divider(divider) => {
            let handler = context.handlers.divider;
            handler(dom, parent, divider, context, reference)
        }
        Block::Entity(entity) => {
            let handler = context.handlers.entity_block;
            handler(dom, parent, entity, context, reference)
        }
        Block::FormatContainer(container) => {
            let handler = context.handlers.format_container;
            handler(dom, parent, container, context, reference)
        }
        Block::ListItem(item) => {
            let handler = context.handlers.list_item;
            handler(dom, parent, item, context, reference)
        }
        Block::General(general) => {
            let handler = context.handlers.general_block;
            handler(dom, parent, general, context, reference)
        }
    }
}

/// Render the children of `group` into `element` with `inherited` as the
/// block format their implicit paragraphs are compared against
fn render_children(
    dom: &mut Dom,
    element: NodeId,
    group: &mut dyn BlockGroup,
    context: &mut ModelToDomContext<'_>,
    inherited: BlockFormat,
) {
    let outer = std::mem::replace(&mut context.block_format, inherited);
    let children = context.handlers.block_group_children;
    children(dom, element, group, context);
    context.block_format = outer;
}

/// Implicit paragraphs that match the inherited block format render their
/// segments straight into `parent`; everything else gets a wrapper element.
pub fn handle_paragraph(
    dom: &mut Dom,
    parent: NodeId,
    paragraph: &mut Paragraph,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let has_selection = paragraph.segments.iter().any(has_selection_in_segment);
    if !has_selection && let Some(element) = reusable_element(dom, paragraph.cached.get(), parent) {
        log::debug!("reusing cached paragraph {element}");
        return reuse_cached_element(dom, parent, element, reference);
    }

    let needs_wrapper = !paragraph.is_implicit
        || paragraph.decorator.is_some()
        || paragraph.format != context.block_format;
    if !needs_wrapper {
        let fragment = dom.create_fragment();
        handle_segments(dom, fragment, paragraph, context);
        let moved = dom.children(fragment).to_vec();
        for &child in &moved {
            dom.insert_before(parent, child, reference);
        }
        context.relocate_fragment_positions(dom, fragment, &moved, parent, reference);
        return reference;
    }

    let tag = paragraph
        .decorator
        .as_ref()
        .map_or("div", |decorator| decorator.tag_name.as_str());
    let element = dom.create_element(tag);
    dom.insert_before(parent, element, reference);
    context
        .format_appliers
        .apply_block(&paragraph.format, dom, element);
    match &paragraph.decorator {
        // Heading formats live on the decorator alone
        Some(decorator) if decorator.tag_name != "p" => {
            context
                .format_appliers
                .apply_segment(&decorator.format, dom, element);
        }
        _ => {
            context
                .format_appliers
                .apply_segment_on_block(&paragraph.segment_format, dom, element);
        }
    }

    handle_segments(dom, element, paragraph, context);

    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.on_paragraph(dom, element);
    }
    if context.allow_cache_element {
        paragraph.cached.set(Some(element));
    }
    reference
}

fn handle_segments(
    dom: &mut Dom,
    container: NodeId,
    paragraph: &mut Paragraph,
    context: &mut ModelToDomContext<'_>,
) {
    for segment in &mut paragraph.segments {
        handle_segment(dom, container, segment, context);
    }
}

pub fn handle_segment(
    dom: &mut Dom,
    parent: NodeId,
    segment: &mut Segment,
    context: &mut ModelToDomContext<'_>,
) {
    match segment {
        Segment::Text(text) => {
            let handler = context.handlers.text;
            handler(dom, parent, text, context);
        }
        Segment::Br(br) => {
            let handler = context.handlers.br;
            handler(dom, parent, br, context);
        }
        Segment::Image(image) => {
            let handler = context.handlers.image;
            handler(dom, parent, image, context);
        }
        Segment::General(general) => {
            let handler = context.handlers.general_segment;
            handler(dom, parent, general, context);
        }
        Segment::Entity(entity) => {
            let handler = context.handlers.entity_segment;
            handler(dom, parent, entity, context);
        }
        Segment::SelectionMarker(marker) => {
            if marker.is_selected {
                let position = DomPosition::new(parent, dom.children(parent).len());
                context.record_selected(position, position);
            }
        }
    }
}

/// Wrap `node` in a link, then in a styled span, as `link` and `format` ask.
/// Returns the outermost node.
fn wrap_segment(
    dom: &mut Dom,
    node: NodeId,
    format: &SegmentFormat,
    link: Option<&Link>,
    context: &ModelToDomContext<'_>,
) -> NodeId {
    let mut outer = node;
    if let Some(link) = link {
        let anchor = dom.create_element("a");
        dom.set_attribute(anchor, "href", &link.href);
        if let Some(target) = &link.target {
            dom.set_attribute(anchor, "target", target);
        }
        dom.append_child(anchor, outer);
        outer = anchor;
    }
    if !format.is_empty() {
        let span = dom.create_element("span");
        context.format_appliers.apply_segment(format, dom, span);
        dom.append_child(span, outer);
        outer = span;
    }
    outer
}

pub fn handle_text(
    dom: &mut Dom,
    parent: NodeId,
    text: &mut Text,
    context: &mut ModelToDomContext<'_>,
) {
    let node = dom.create_text(text.text.as_str());
    let outer = wrap_segment(dom, node, &text.format, text.link.as_ref(), context);
    dom.append_child(parent, outer);

    if text.is_selected {
        let length = text.text.chars().count();
        context.record_selected(DomPosition::new(node, 0), DomPosition::new(node, length));
    }
    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.on_segment(dom, node, text);
    }
}

pub fn handle_br(dom: &mut Dom, parent: NodeId, br: &mut Br, context: &mut ModelToDomContext<'_>) {
    let node = dom.create_element("br");
    let outer = wrap_segment(dom, node, &br.format, None, context);
    dom.append_child(parent, outer);
    if br.is_selected {
        context.record_selected_node(dom, node);
    }
}

pub fn handle_image(
    dom: &mut Dom,
    parent: NodeId,
    image: &mut Image,
    context: &mut ModelToDomContext<'_>,
) {
    let node = dom.create_element("img");
    dom.set_attribute(node, "src", &image.src);
    let attributes = [
        ("alt", &image.alt),
        ("title", &image.title),
        ("width", &image.width),
        ("height", &image.height),
    ];
    for (name, value) in attributes {
        if let Some(value) = value {
            dom.set_attribute(node, name, value);
        }
    }
    if let Some(element) = dom.element_mut(node) {
        for (key, value) in &image.dataset {
            element.set_dataset(key, value);
        }
    }
    context.format_appliers.apply_segment(&image.format, dom, node);

    let outer = wrap_segment(dom, node, &SegmentFormat::default(), image.link.as_ref(), context);
    dom.append_child(parent, outer);

    if image.is_selected {
        context.record_selected_node(dom, node);
    }
    if image.is_selected_as_image_selection {
        context.selection.image = Some(node);
    }
}

/// A shallow copy of the element a general container came from, or a bare
/// span if it is gone
fn general_element(dom: &mut Dom, source: NodeId) -> NodeId {
    if dom.has_node(source) && dom.kind(source) == NodeKind::Element {
        dom.clone_node(source, false)
    } else {
        log::debug!("general element {source} is gone, rendering a span");
        dom.create_element("span")
    }
}

pub fn handle_general_segment(
    dom: &mut Dom,
    parent: NodeId,
    general: &mut GeneralContainer,
    context: &mut ModelToDomContext<'_>,
) {
    let element = general_element(dom, general.element);
    dom.append_child(parent, element);
    let inherited = context.block_format.clone();
    render_children(dom, element, general, context, inherited);
    if general.is_selected {
        context.record_selected_node(dom, element);
    }
}

pub fn handle_general_block(
    dom: &mut Dom,
    parent: NodeId,
    general: &mut GeneralContainer,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let element = general_element(dom, general.element);
    dom.insert_before(parent, element, reference);
    let inherited = context.block_format.clone();
    render_children(dom, element, general, context, inherited);
    if general.is_selected {
        context.record_selected_node(dom, element);
    }
    reference
}

/// The entity's own wrapper, stamped with its identity
fn entity_wrapper(dom: &mut Dom, entity: &Entity, parent: NodeId, fallback_tag: &str) -> NodeId {
    let wrapper = reusable_element(dom, Some(entity.wrapper), parent).unwrap_or_else(|| {
        log::debug!("entity wrapper {} is gone, rendering a placeholder", entity.wrapper);
        dom.create_element(fallback_tag)
    });
    if let Some(element) = dom.element_mut(wrapper) {
        if let Some(entity_type) = &entity.entity_type {
            element.set_dataset("entityType", entity_type);
        }
        if let Some(id) = &entity.id {
            element.set_dataset("entityId", id);
        }
        if entity.is_readonly {
            element.set_dataset("entityReadonly", "true");
            element.set_attribute("contenteditable", "false");
        }
    }
    wrapper
}

pub fn handle_entity_segment(
    dom: &mut Dom,
    parent: NodeId,
    entity: &mut Entity,
    context: &mut ModelToDomContext<'_>,
) {
    let wrapper = entity_wrapper(dom, entity, parent, "span");
    dom.append_child(parent, wrapper);
    if entity.is_selected {
        context.record_selected_node(dom, wrapper);
    }
}

pub fn handle_entity_block(
    dom: &mut Dom,
    parent: NodeId,
    entity: &mut Entity,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let wrapper = entity_wrapper(dom, entity, parent, "div");
    let next = reuse_cached_element(dom, parent, wrapper, reference);
    if entity.is_selected {
        context.record_selected_node(dom, wrapper);
    }
    next
}

pub fn handle_divider(
    dom: &mut Dom,
    parent: NodeId,
    divider: &mut Divider,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    if !divider.is_selected
        && let Some(element) = reusable_element(dom, divider.cached.get(), parent)
    {
        return reuse_cached_element(dom, parent, element, reference);
    }

    let element = dom.create_element(&divider.tag_name);
    dom.insert_before(parent, element, reference);
    context
        .format_appliers
        .apply_block(&divider.format, dom, element);
    if divider.is_selected {
        context.record_selected_node(dom, element);
    }
    if context.allow_cache_element {
        divider.cached.set(Some(element));
    }
    reference
}

pub fn handle_format_container(
    dom: &mut Dom,
    parent: NodeId,
    container: &mut FormatContainer,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let has_selection = container.blocks.iter().any(has_selection_in_block);
    if !has_selection && let Some(element) = reusable_element(dom, container.cached.get(), parent) {
        log::debug!("reusing cached <{}> {element}", container.tag_name);
        return reuse_cached_element(dom, parent, element, reference);
    }

    let element = dom.create_element(&container.tag_name);
    dom.insert_before(parent, element, reference);
    context
        .format_appliers
        .apply_block(&container.format, dom, element);
    let inherited = container.format.inheritable();
    render_children(dom, element, container, context, inherited);

    if context.allow_cache_element {
        container.cached.set(Some(element));
    }
    reference
}

/// `colspan` and `rowspan` of the cell at `(row, col)`, counted over the
/// continuation cells right of and below it
fn cell_spans(table: &Table, row: usize, col: usize) -> (usize, usize) {
    let colspan = 1 + table.rows[row]
        .cells
        .iter()
        .skip(col + 1)
        .take_while(|cell| cell.span_left && !cell.span_above)
        .count();
    let rowspan = 1 + table
        .rows
        .iter()
        .skip(row + 1)
        .take_while(|next| {
            next.cells
                .get(col)
                .is_some_and(|cell| cell.span_above && !cell.span_left)
        })
        .count();
    (colspan, rowspan)
}

fn px(value: f32) -> String {
    format!("{value}px")
}

pub fn handle_table(
    dom: &mut Dom,
    parent: NodeId,
    table: &mut Table,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    if table.rows.is_empty() {
        return reference;
    }
    let has_selection = table
        .rows
        .iter()
        .flat_map(|row| &row.cells)
        .any(|cell| cell.is_selected || cell.blocks.iter().any(has_selection_in_block));
    if !has_selection && let Some(element) = reusable_element(dom, table.cached.get(), parent) {
        log::debug!("reusing cached table {element}");
        return reuse_cached_element(dom, parent, element, reference);
    }

    let element = dom.create_element("table");
    dom.insert_before(parent, element, reference);
    context.format_appliers.apply_block(&table.format, dom, element);
    if let Some(table_element) = dom.element_mut(element) {
        for (key, value) in &table.dataset {
            table_element.set_dataset(key, value);
        }
    }

    if !table.widths.is_empty() {
        let colgroup = dom.create_element("colgroup");
        dom.append_child(element, colgroup);
        for &width in &table.widths {
            let col = dom.create_element("col");
            dom.set_style(col, "width", &px(width));
            dom.append_child(colgroup, col);
        }
    }
    let tbody = dom.create_element("tbody");
    dom.append_child(element, tbody);

    for row_index in 0..table.rows.len() {
        let tr = dom.create_element("tr");
        dom.append_child(tbody, tr);
        if let Some(height) = table.rows[row_index].height {
            dom.set_style(tr, "height", &px(height));
        }
        context
            .format_appliers
            .apply_block(&table.rows[row_index].format, dom, tr);

        for col_index in 0..table.rows[row_index].cells.len() {
            if !table.rows[row_index].cells[col_index].is_origin() {
                continue;
            }
            let (colspan, rowspan) = cell_spans(table, row_index, col_index);
            let cell = &mut table.rows[row_index].cells[col_index];

            let td = dom.create_element(if cell.is_header { "th" } else { "td" });
            dom.append_child(tr, td);
            context.format_appliers.apply_block(&cell.format, dom, td);
            if let Some(td_element) = dom.element_mut(td) {
                for (key, value) in &cell.dataset {
                    td_element.set_dataset(key, value);
                }
                if colspan > 1 {
                    td_element.set_attribute("colspan", &colspan.to_string());
                }
                if rowspan > 1 {
                    td_element.set_attribute("rowspan", &rowspan.to_string());
                }
            }

            let inherited = context
                .block_format
                .merged(&cell.format.inheritable())
                .inheritable();
            render_children(dom, td, cell, context, inherited);
            if context.allow_cache_element {
                cell.cached.set(Some(td));
            }
        }

        if context.allow_cache_element {
            table.rows[row_index].cached.set(Some(tr));
        }
    }

    if context.selection.table.is_none()
        && let Some(selected) = get_selected_cells(table)
    {
        context.selection.table = Some(DomSelection::Table {
            table: element,
            first_row: selected.first_row,
            first_column: selected.first_column,
            last_row: selected.last_row,
            last_column: selected.last_column,
        });
    }
    if let Some(indexer) = context.indexer.as_deref_mut() {
        indexer.on_table(dom, element, table);
    }
    if context.allow_cache_element {
        table.cached.set(Some(element));
    }
    reference
}

/// Open the native lists `levels` needs, reusing the open ones whose levels
/// match. Returns the innermost list.
fn open_lists(
    dom: &mut Dom,
    parent: NodeId,
    levels: &[ListLevel],
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let shared = context
        .list_stack
        .iter()
        .zip(levels)
        .take_while(|(open, level)| open.0 == **level)
        .count();
    context.list_stack.truncate(shared);

    for level in &levels[shared..] {
        let list = dom.create_element(level.list_type.tag_name());
        context
            .format_appliers
            .apply_list_level(&level.format, dom, list);
        if let Some(list_element) = dom.element_mut(list) {
            for (key, value) in &level.dataset {
                list_element.set_dataset(key, value);
            }
        }
        match context.list_stack.last() {
            // Nested lists sit directly inside the enclosing list
            Some(&(_, outer)) => dom.append_child(outer, list),
            None => dom.insert_before(parent, list, reference),
        }
        context.list_stack.push((level.clone(), list));
    }
    context.list_stack.last().map(|&(_, list)| list)
}

pub fn handle_list_item(
    dom: &mut Dom,
    parent: NodeId,
    item: &mut ListItem,
    context: &mut ModelToDomContext<'_>,
    reference: Option<NodeId>,
) -> Option<NodeId> {
    let levels = if item.levels.is_empty() {
        vec![ListLevel::default()]
    } else {
        item.levels.clone()
    };
    let Some(list) = open_lists(dom, parent, &levels, context, reference) else {
        return reference;
    };

    let has_selection = item.format_holder.is_selected || item.blocks.iter().any(has_selection_in_block);
    if !has_selection && let Some(li) = reusable_element(dom, item.cached.get(), list) {
        log::debug!("reusing cached list item {li}");
        dom.append_child(list, li);
        return reference;
    }

    let li = dom.create_element("li");
    dom.append_child(list, li);
    context.format_appliers.apply_block(&item.format, dom, li);
    context
        .format_appliers
        .apply_segment_on_block(&item.format_holder.format, dom, li);

    let inherited = context
        .block_format
        .merged(&item.format.inheritable())
        .inheritable();
    render_children(dom, li, item, context, inherited);

    if context.allow_cache_element {
        item.cached.set(Some(li));
    }
    reference
}

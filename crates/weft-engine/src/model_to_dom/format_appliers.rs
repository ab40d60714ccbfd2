//! Format delta -> native element.
//!
//! The inverse of the forward sync format parsers: each applier writes the
//! properties it owns as inline style or attributes on the element.

use weft_dom::{Dom, Element, NodeId};

use crate::model::{BlockFormat, ListLevelFormat, SegmentFormat};

pub type SegmentFormatApplier = fn(&SegmentFormat, &mut Element);
pub type BlockFormatApplier = fn(&BlockFormat, &mut Element);
pub type ListLevelFormatApplier = fn(&ListLevelFormat, &mut Element);

#[derive(Debug, Clone)]
pub struct FormatAppliers {
    /// Inline wrappers of segments, heading decorators
    pub segment: Vec<SegmentFormatApplier>,
    /// Segment properties carried by block elements and list items
    pub segment_on_block: Vec<SegmentFormatApplier>,
    pub block: Vec<BlockFormatApplier>,
    pub list_level: Vec<ListLevelFormatApplier>,
}

impl Default for FormatAppliers {
    fn default() -> Self {
        Self {
            segment: vec![
                font_family,
                font_size,
                font_weight,
                italic,
                text_decoration,
                super_or_sub_script,
                text_color,
                background_color,
            ],
            segment_on_block: vec![
                font_family,
                font_size,
                font_weight,
                italic,
                text_decoration,
                text_color,
            ],
            block: vec![
                direction,
                text_align,
                line_height,
                white_space,
                block_background_color,
                margins,
            ],
            list_level: vec![list_start, list_style_type],
        }
    }
}

impl FormatAppliers {
    pub fn apply_segment(&self, format: &SegmentFormat, dom: &mut Dom, node: NodeId) {
        if let Some(element) = dom.element_mut(node) {
            self.segment.iter().for_each(|applier| applier(format, element));
        }
    }

    pub fn apply_segment_on_block(&self, format: &SegmentFormat, dom: &mut Dom, node: NodeId) {
        if let Some(element) = dom.element_mut(node) {
            self.segment_on_block
                .iter()
                .for_each(|applier| applier(format, element));
        }
    }

    pub fn apply_block(&self, format: &BlockFormat, dom: &mut Dom, node: NodeId) {
        if let Some(element) = dom.element_mut(node) {
            self.block.iter().for_each(|applier| applier(format, element));
        }
    }

    pub fn apply_list_level(&self, format: &ListLevelFormat, dom: &mut Dom, node: NodeId) {
        if let Some(element) = dom.element_mut(node) {
            self.list_level.iter().for_each(|applier| applier(format, element));
        }
    }
}

fn set_style(element: &mut Element, property: &str, value: Option<&String>) {
    if let Some(value) = value {
        element.set_style(property, value);
    }
}

pub fn font_family(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "font-family", format.font_family.as_ref());
}

pub fn font_size(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "font-size", format.font_size.as_ref());
}

pub fn font_weight(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "font-weight", format.font_weight.as_ref());
}

pub fn italic(format: &SegmentFormat, element: &mut Element) {
    match format.italic {
        Some(true) => element.set_style("font-style", "italic"),
        Some(false) => element.set_style("font-style", "normal"),
        None => {}
    }
}

pub fn text_decoration(format: &SegmentFormat, element: &mut Element) {
    let mut lines = Vec::new();
    if format.underline == Some(true) {
        lines.push("underline");
    }
    if format.strikethrough == Some(true) {
        lines.push("line-through");
    }
    if !lines.is_empty() {
        element.set_style("text-decoration", &lines.join(" "));
    } else if format.underline.is_some() || format.strikethrough.is_some() {
        element.set_style("text-decoration", "none");
    }
}

pub fn super_or_sub_script(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "vertical-align", format.super_or_sub_script.as_ref());
}

pub fn text_color(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "color", format.text_color.as_ref());
}

pub fn background_color(format: &SegmentFormat, element: &mut Element) {
    set_style(element, "background-color", format.background_color.as_ref());
}

pub fn direction(format: &BlockFormat, element: &mut Element) {
    set_style(element, "direction", format.direction.as_ref());
}

pub fn text_align(format: &BlockFormat, element: &mut Element) {
    set_style(element, "text-align", format.text_align.as_ref());
}

pub fn line_height(format: &BlockFormat, element: &mut Element) {
    set_style(element, "line-height", format.line_height.as_ref());
}

pub fn white_space(format: &BlockFormat, element: &mut Element) {
    set_style(element, "white-space", format.white_space.as_ref());
}

pub fn block_background_color(format: &BlockFormat, element: &mut Element) {
    set_style(element, "background-color", format.background_color.as_ref());
}

pub fn margins(format: &BlockFormat, element: &mut Element) {
    set_style(element, "margin-top", format.margin_top.as_ref());
    set_style(element, "margin-bottom", format.margin_bottom.as_ref());
    set_style(element, "margin-left", format.margin_left.as_ref());
    set_style(element, "margin-right", format.margin_right.as_ref());
}

pub fn list_start(format: &ListLevelFormat, element: &mut Element) {
    if let Some(start) = format.start_number_override {
        element.set_attribute("start", &start.to_string());
    }
}

pub fn list_style_type(format: &ListLevelFormat, element: &mut Element) {
    set_style(element, "list-style-type", format.list_style_type.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_to_model::FormatParsers;
    use pretty_assertions::assert_eq;

    #[test]
    fn segment_format_survives_apply_then_parse() {
        let format = SegmentFormat {
            font_family: Some("Arial".into()),
            font_weight: Some("bold".into()),
            italic: Some(true),
            underline: Some(true),
            strikethrough: Some(true),
            super_or_sub_script: Some("sub".into()),
            background_color: Some("yellow".into()),
            ..Default::default()
        };
        let mut element = Element::new("span");
        FormatAppliers::default()
            .segment
            .iter()
            .for_each(|applier| applier(&format, &mut element));

        let mut parsed = SegmentFormat::default();
        FormatParsers::default().parse_segment(&mut parsed, &element);

        assert_eq!(parsed, format);
    }

    #[test]
    fn decoration_turned_off_writes_none() {
        let format = SegmentFormat {
            underline: Some(false),
            ..Default::default()
        };
        let mut element = Element::new("span");
        text_decoration(&format, &mut element);
        assert_eq!(element.style("text-decoration"), Some("none"));
    }

    #[test]
    fn appliers_skip_non_elements() {
        let mut dom = Dom::new();
        let text = dom.create_text("x");
        let format = BlockFormat {
            text_align: Some("center".into()),
            ..Default::default()
        };

        FormatAppliers::default().apply_block(&format, &mut dom, text);

        assert_eq!(dom.text(text), Some("x"));
    }

    #[test]
    fn list_level_format_becomes_start_and_style() {
        let mut dom = Dom::new();
        let ol = dom.create_element("ol");
        let format = ListLevelFormat {
            start_number_override: Some(4),
            list_style_type: Some("lower-alpha".into()),
        };

        FormatAppliers::default().apply_list_level(&format, &mut dom, ol);

        assert_eq!(dom.attribute(ol, "start"), Some("4"));
        assert_eq!(dom.style(ol, "list-style-type"), Some("lower-alpha"));
    }
}

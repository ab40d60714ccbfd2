//! Native element -> format delta.
//!
//! Each parser looks at one concern (tag semantics, one or two style
//! properties) and overlays what it finds onto the format being built.

use weft_dom::Element;

use crate::model::{BlockFormat, ListLevelFormat, SegmentFormat};

pub type SegmentFormatParser = fn(&mut SegmentFormat, &Element);
pub type BlockFormatParser = fn(&mut BlockFormat, &Element);
pub type ListLevelFormatParser = fn(&mut ListLevelFormat, &Element);

/// Parsers run for each kind of format, in order
#[derive(Debug, Clone)]
pub struct FormatParsers {
    /// Inline elements
    pub segment: Vec<SegmentFormatParser>,
    /// Segment properties read from block elements and list items
    pub segment_on_block: Vec<SegmentFormatParser>,
    pub block: Vec<BlockFormatParser>,
    pub list_level: Vec<ListLevelFormatParser>,
}

impl Default for FormatParsers {
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

impl FormatParsers {
    pub fn parse_segment(&self, format: &mut SegmentFormat, element: &Element) {
        self.segment.iter().for_each(|parser| parser(format, element));
    }

    pub fn parse_segment_on_block(&self, format: &mut SegmentFormat, element: &Element) {
        self.segment_on_block
            .iter()
            .for_each(|parser| parser(format, element));
    }

    pub fn parse_block(&self, format: &mut BlockFormat, element: &Element) {
        self.block.iter().for_each(|parser| parser(format, element));
    }

    pub fn parse_list_level(&self, format: &mut ListLevelFormat, element: &Element) {
        self.list_level.iter().for_each(|parser| parser(format, element));
    }
}

fn set_from(target: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *target = Some(value.to_string());
    }
}

pub fn font_family(format: &mut SegmentFormat, element: &Element) {
    if element.tag == "font" {
        set_from(&mut format.font_family, element.attribute("face"));
    }
    set_from(&mut format.font_family, element.style("font-family"));
}

pub fn font_size(format: &mut SegmentFormat, element: &Element) {
    set_from(&mut format.font_size, element.style("font-size"));
}

pub fn font_weight(format: &mut SegmentFormat, element: &Element) {
    if matches!(element.tag.as_str(), "b" | "strong") {
        format.font_weight = Some("bold".to_string());
    }
    set_from(&mut format.font_weight, element.style("font-weight"));
}

pub fn italic(format: &mut SegmentFormat, element: &Element) {
    if matches!(element.tag.as_str(), "i" | "em") {
        format.italic = Some(true);
    }
    match element.style("font-style") {
        Some("italic" | "oblique") => format.italic = Some(true),
        Some("normal") => format.italic = Some(false),
        _ => {}
    }
}

pub fn text_decoration(format: &mut SegmentFormat, element: &Element) {
    match element.tag.as_str() {
        "u" => format.underline = Some(true),
        "s" | "strike" | "del" => format.strikethrough = Some(true),
        _ => {}
    }
    let Some(decoration) = element
        .style("text-decoration")
        .or_else(|| element.style("text-decoration-line"))
    else {
        return;
    };
    if decoration == "none" {
        format.underline = Some(false);
        format.strikethrough = Some(false);
        return;
    }
    if decoration.contains("underline") {
        format.underline = Some(true);
    }
    if decoration.contains("line-through") {
        format.strikethrough = Some(true);
    }
}

pub fn super_or_sub_script(format: &mut SegmentFormat, element: &Element) {
    match element.tag.as_str() {
        "sup" => format.super_or_sub_script = Some("super".to_string()),
        "sub" => format.super_or_sub_script = Some("sub".to_string()),
        _ => {}
    }
    if let Some(value @ ("super" | "sub")) = element.style("vertical-align") {
        format.super_or_sub_script = Some(value.to_string());
    }
}

pub fn text_color(format: &mut SegmentFormat, element: &Element) {
    if element.tag == "font" {
        set_from(&mut format.text_color, element.attribute("color"));
    }
    set_from(&mut format.text_color, element.style("color"));
}

pub fn background_color(format: &mut SegmentFormat, element: &Element) {
    set_from(&mut format.background_color, element.style("background-color"));
}

pub fn direction(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.direction, element.attribute("dir"));
    set_from(&mut format.direction, element.style("direction"));
}

pub fn text_align(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.text_align, element.attribute("align"));
    set_from(&mut format.text_align, element.style("text-align"));
}

pub fn line_height(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.line_height, element.style("line-height"));
}

pub fn white_space(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.white_space, element.style("white-space"));
}

pub fn block_background_color(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.background_color, element.style("background-color"));
}

pub fn margins(format: &mut BlockFormat, element: &Element) {
    set_from(&mut format.margin_top, element.style("margin-top"));
    set_from(&mut format.margin_bottom, element.style("margin-bottom"));
    set_from(&mut format.margin_left, element.style("margin-left"));
    set_from(&mut format.margin_right, element.style("margin-right"));
}

pub fn list_start(format: &mut ListLevelFormat, element: &Element) {
    if let Some(start) = element.attribute("start").and_then(|s| s.trim().parse().ok()) {
        format.start_number_override = Some(start);
    }
}

pub fn list_style_type(format: &mut ListLevelFormat, element: &Element) {
    set_from(&mut format.list_style_type, element.style("list-style-type"));
}

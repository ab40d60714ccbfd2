use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weft_dom::NodeId;

use crate::model::format::{BlockFormat, SegmentFormat};
use crate::model::group::GeneralContainer;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(default)]
    pub is_selected: bool,
}

impl Text {
    pub fn new(text: &str, format: SegmentFormat) -> Self {
        Self {
            text: text.to_string(),
            format,
            ..Default::default()
        }
    }

    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Br {
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dataset: BTreeMap<String, String>,
    /// Selected as part of a text range
    #[serde(default)]
    pub is_selected: bool,
    /// Selected as a single object
    #[serde(default)]
    pub is_selected_as_image_selection: bool,
}

impl Image {
    pub fn new(src: &str, format: SegmentFormat) -> Self {
        Self {
            src: src.to_string(),
            format,
            ..Default::default()
        }
    }
}

/// An atomic, opaque piece of native content (a mention, a widget, ...).
///
/// The wrapper element is moved into the output as is; the model never looks
/// inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub wrapper: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub is_readonly: bool,
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

impl Entity {
    pub fn new(wrapper: NodeId, entity_type: Option<&str>, is_readonly: bool) -> Self {
        Self {
            wrapper,
            entity_type: entity_type.map(str::to_string),
            id: None,
            is_readonly,
            format: SegmentFormat::default(),
            is_selected: false,
        }
    }
}

/// Zero-width caret placeholder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionMarker {
    #[serde(default)]
    pub format: SegmentFormat,
    #[serde(default)]
    pub is_selected: bool,
}

impl SelectionMarker {
    pub fn new(format: SegmentFormat) -> Self {
        Self {
            format,
            is_selected: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "segmentType")]
pub enum Segment {
    Text(Text),
    Br(Br),
    Image(Image),
    General(GeneralContainer),
    Entity(Entity),
    SelectionMarker(SelectionMarker),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Text,
    Br,
    Image,
    General,
    Entity,
    SelectionMarker,
}

impl Segment {
    pub fn text(text: &str) -> Self {
        Segment::Text(Text::new(text, SegmentFormat::default()))
    }

    pub fn br() -> Self {
        Segment::Br(Br::default())
    }

    pub fn marker() -> Self {
        Segment::SelectionMarker(SelectionMarker::new(SegmentFormat::default()))
    }

    pub fn segment_type(&self) -> SegmentType {
        match self {
            Segment::Text(_) => SegmentType::Text,
            Segment::Br(_) => SegmentType::Br,
            Segment::Image(_) => SegmentType::Image,
            Segment::General(_) => SegmentType::General,
            Segment::Entity(_) => SegmentType::Entity,
            Segment::SelectionMarker(_) => SegmentType::SelectionMarker,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, Segment::SelectionMarker(_))
    }

    pub fn is_selected(&self) -> bool {
        match self {
            Segment::Text(s) => s.is_selected,
            Segment::Br(s) => s.is_selected,
            Segment::Image(s) => s.is_selected,
            Segment::General(s) => s.is_selected,
            Segment::Entity(s) => s.is_selected,
            Segment::SelectionMarker(s) => s.is_selected,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Segment::Text(s) => s.is_selected = selected,
            Segment::Br(s) => s.is_selected = selected,
            Segment::Image(s) => s.is_selected = selected,
            Segment::General(s) => s.is_selected = selected,
            Segment::Entity(s) => s.is_selected = selected,
            Segment::SelectionMarker(s) => s.is_selected = selected,
        }
    }

    pub fn format(&self) -> &SegmentFormat {
        match self {
            Segment::Text(s) => &s.format,
            Segment::Br(s) => &s.format,
            Segment::Image(s) => &s.format,
            Segment::General(s) => &s.segment_format,
            Segment::Entity(s) => &s.format,
            Segment::SelectionMarker(s) => &s.format,
        }
    }

    pub fn format_mut(&mut self) -> &mut SegmentFormat {
        match self {
            Segment::Text(s) => &mut s.format,
            Segment::Br(s) => &mut s.format,
            Segment::Image(s) => &mut s.format,
            Segment::General(s) => &mut s.segment_format,
            Segment::Entity(s) => &mut s.format,
            Segment::SelectionMarker(s) => &mut s.format,
        }
    }

    pub fn link(&self) -> Option<&Link> {
        match self {
            Segment::Text(s) => s.link.as_ref(),
            Segment::Image(s) => s.link.as_ref(),
            _ => None,
        }
    }

    /// Block format of an inline general container, `None` for other segments
    pub fn container_format(&self) -> Option<&BlockFormat> {
        match self {
            Segment::General(general) => Some(&general.format),
            _ => None,
        }
    }
}

//! Format deltas.
//!
//! Nodes never store resolved formatting. Each format struct holds only the
//! properties set on that node; [`merge_from`](SegmentFormat::merge_from)
//! overlays one delta onto another to compute an effective format.

use serde::{Deserialize, Serialize};

macro_rules! format_struct {
    ($(#[$meta:meta])* $name:ident { $($(#[$field_meta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $name {
            /// Overlay every property set in `other` onto `self`.
            pub fn merge_from(&mut self, other: &$name) {
                $(
                    if other.$field.is_some() {
                        self.$field = other.$field.clone();
                    }
                )*
            }

            pub fn merged(&self, other: &$name) -> $name {
                let mut result = self.clone();
                result.merge_from(other);
                result
            }

            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }
    };
}

format_struct!(
    /// Inline formatting of a segment
    SegmentFormat {
        font_family: String,
        font_size: String,
        /// CSS weight, e.g. `bold` or `600`
        font_weight: String,
        italic: bool,
        underline: bool,
        strikethrough: bool,
        /// `super` or `sub`
        super_or_sub_script: String,
        text_color: String,
        background_color: String,
    }
);

format_struct!(
    /// Formatting of a block or block group
    BlockFormat {
        direction: String,
        text_align: String,
        line_height: String,
        white_space: String,
        background_color: String,
        margin_top: String,
        margin_bottom: String,
        margin_left: String,
        margin_right: String,
    }
);

format_struct!(
    /// Formatting of one list nesting level
    ListLevelFormat {
        start_number_override: u32,
        list_style_type: String,
    }
);

impl SegmentFormat {
    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_deref() {
            Some("bold" | "bolder") => true,
            Some(weight) => weight.parse::<u32>().is_ok_and(|w| w >= 600),
            None => false,
        }
    }
}

impl BlockFormat {
    /// `white-space: pre*` keeps edge whitespace in paragraphs
    pub fn preserves_whitespace(&self) -> bool {
        self.white_space
            .as_deref()
            .is_some_and(|value| value.starts_with("pre"))
    }

    /// The properties nested blocks take over from their container
    pub fn inheritable(&self) -> BlockFormat {
        BlockFormat {
            direction: self.direction.clone(),
            text_align: self.text_align.clone(),
            line_height: self.line_height.clone(),
            white_space: self.white_space.clone(),
            ..Default::default()
        }
    }
}

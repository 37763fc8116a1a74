//! Element kinds and text marks.
//!
//! Behavioural differences between kinds (void, inline, list container) are
//! answered here and nowhere else; the editor and renderer only ask.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of element kinds. Serialized as the `type` field of an
/// element object; image and link carry their attributes alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    Image {
        url: String,
        #[serde(default)]
        alt: String,
    },
    Link {
        url: String,
    },
}

impl ElementKind {
    pub fn image(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            alt: alt.into(),
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self::Link { url: url.into() }
    }

    /// Void elements hold no cursor-editable text.
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Image { .. } | Self::Link { .. })
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    pub fn is_list_container(&self) -> bool {
        matches!(self, Self::BulletedList | Self::NumberedList)
    }

    /// Blocks whose children are leaves and inline elements.
    pub fn is_text_block(&self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::HeadingOne
                | Self::HeadingTwo
                | Self::HeadingThree
                | Self::BlockQuote
                | Self::ListItem
        )
    }

    /// Same variant, ignoring attributes.
    pub fn same_type(&self, other: &ElementKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Image { url, .. } | Self::Link { url } => Some(url),
            _ => None,
        }
    }

    /// The `type` string as persisted.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::HeadingOne => "heading-one",
            Self::HeadingTwo => "heading-two",
            Self::HeadingThree => "heading-three",
            Self::BlockQuote => "block-quote",
            Self::BulletedList => "bulleted-list",
            Self::NumberedList => "numbered-list",
            Self::ListItem => "list-item",
            Self::Image { .. } => "image",
            Self::Link { .. } => "link",
        }
    }

    /// Parses an attribute-free kind from its type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "paragraph" => Self::Paragraph,
            "heading-one" => Self::HeadingOne,
            "heading-two" => Self::HeadingTwo,
            "heading-three" => Self::HeadingThree,
            "block-quote" => Self::BlockQuote,
            "bulleted-list" => Self::BulletedList,
            "numbered-list" => Self::NumberedList,
            "list-item" => Self::ListItem,
            _ => return None,
        })
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A boolean text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
}

impl Mark {
    /// Application order when rendering; each wraps the previous.
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Underline, Mark::Code];

    pub fn name(&self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Code => "code",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Mark::Bold),
            "italic" => Some(Mark::Italic),
            "underline" => Some(Mark::Underline),
            "code" => Some(Mark::Code),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The mark set carried by a leaf. False marks are left out of the JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Marks {
    pub fn get(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
        }
    }

    pub fn set(&mut self, mark: Mark, value: bool) {
        match mark {
            Mark::Bold => self.bold = value,
            Mark::Italic => self.italic = value,
            Mark::Underline => self.underline = value,
            Mark::Code => self.code = value,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn is_empty(&self) -> bool {
        Mark::ALL.iter().all(|mark| !self.get(*mark))
    }

    /// Active marks in rendering order.
    pub fn active(&self) -> impl Iterator<Item = Mark> + '_ {
        Mark::ALL.into_iter().filter(move |mark| self.get(*mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(ElementKind::image("a.png", "").is_void());
        assert!(!ElementKind::image("a.png", "").is_inline());
        assert!(ElementKind::link("https://x.dev").is_void());
        assert!(ElementKind::link("https://x.dev").is_inline());
        assert!(ElementKind::BulletedList.is_list_container());
        assert!(ElementKind::ListItem.is_text_block());
        assert!(!ElementKind::NumberedList.is_text_block());
        assert!(!ElementKind::Paragraph.is_void());
    }

    #[test]
    fn test_type_names_round_trip() {
        for name in [
            "paragraph",
            "heading-one",
            "heading-two",
            "heading-three",
            "block-quote",
            "bulleted-list",
            "numbered-list",
            "list-item",
        ] {
            let kind = ElementKind::from_type_name(name).unwrap();
            assert_eq!(kind.type_name(), name);
        }
        assert_eq!(ElementKind::from_type_name("image"), None);
    }

    #[test]
    fn test_marks_serialize_only_true_values() {
        let marks = Marks::default().with(Mark::Bold);
        let json = serde_json::to_value(marks).unwrap();
        assert_eq!(json, serde_json::json!({ "bold": true }));

        let active: Vec<Mark> = Marks::default()
            .with(Mark::Code)
            .with(Mark::Bold)
            .active()
            .collect();
        assert_eq!(active, vec![Mark::Bold, Mark::Code]);
    }
}

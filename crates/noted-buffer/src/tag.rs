//! The fixed set of formatting tags.
//!
//! ## Learning: Closed Enums Instead of Lookup Tables
//!
//! A tag is a plain `Copy` enum rather than a string key into a map.
//! Misspelling a tag becomes a compile error, and the exclusion group
//! of every tag is answered by a `match` the compiler checks for
//! exhaustiveness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BufferError;

/// A named formatting attribute that can cover a range of characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Bold,
    Italic,
    Underline,
    /// Fixed-width font
    Monospace,
    Title,
    Header,
    JustLeft,
    JustCenter,
    JustRight,
    JustFill,
}

/// A set of tags that may not overlap each other.
///
/// Applying one member to a range first strips every sibling from
/// that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionGroup {
    /// Paragraph alignment: `just_left`, `just_center`, `just_right`, `just_fill`
    Justification,
    /// Heading size: `title`, `header`
    Heading,
}

impl Tag {
    /// Every tag, in declaration order.
    pub const ALL: [Tag; 10] = [
        Tag::Bold,
        Tag::Italic,
        Tag::Underline,
        Tag::Monospace,
        Tag::Title,
        Tag::Header,
        Tag::JustLeft,
        Tag::JustCenter,
        Tag::JustRight,
        Tag::JustFill,
    ];

    /// Returns the persisted name of the tag.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Bold => "bold",
            Tag::Italic => "italic",
            Tag::Underline => "underline",
            Tag::Monospace => "monospace",
            Tag::Title => "title",
            Tag::Header => "header",
            Tag::JustLeft => "just_left",
            Tag::JustCenter => "just_center",
            Tag::JustRight => "just_right",
            Tag::JustFill => "just_fill",
        }
    }

    /// Returns the exclusion group this tag belongs to, if any.
    pub fn group(self) -> Option<ExclusionGroup> {
        match self {
            Tag::JustLeft | Tag::JustCenter | Tag::JustRight | Tag::JustFill => {
                Some(ExclusionGroup::Justification)
            }
            Tag::Title | Tag::Header => Some(ExclusionGroup::Heading),
            Tag::Bold | Tag::Italic | Tag::Underline | Tag::Monospace => None,
        }
    }

    /// Returns true for the four paragraph alignment tags.
    pub fn is_justification(self) -> bool {
        self.group() == Some(ExclusionGroup::Justification)
    }

    /// Returns the other members of this tag's exclusion group.
    ///
    /// Ungrouped tags have no siblings.
    pub fn siblings(self) -> impl Iterator<Item = Tag> {
        let group = self.group();
        Tag::ALL
            .into_iter()
            .filter(move |other| *other != self && group.is_some() && other.group() == group)
    }
}

impl ExclusionGroup {
    /// Returns the members of the group.
    pub fn members(self) -> impl Iterator<Item = Tag> {
        Tag::ALL
            .into_iter()
            .filter(move |tag| tag.group() == Some(self))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tag {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .into_iter()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| BufferError::UnknownTag(s.to_string()))
    }
}

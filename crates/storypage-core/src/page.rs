use crate::extraction::PageLayout;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a page within its story.
///
/// Serialized as the ordinal the template API expects: First = 0,
/// Last = 1, Middle = 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PageType {
    First,
    Last,
    Middle,
}

impl PageType {
    /// Classify a page from its 0-based index and the document's page count.
    ///
    /// Index 0 is always `First`, so a single-page document is `First`.
    pub fn for_position(index: usize, total_pages: usize) -> PageType {
        if index == 0 {
            PageType::First
        } else if index + 1 >= total_pages {
            PageType::Last
        } else {
            PageType::Middle
        }
    }

    /// Classify using the legacy caller convention.
    ///
    /// `0` is the first page and `-1` stands for "the last page". Callers on
    /// this convention must substitute `-1` for the true last index
    /// themselves; every other value is a middle page.
    pub fn from_sentinel_index(index: i64) -> PageType {
        match index {
            0 => PageType::First,
            -1 => PageType::Last,
            _ => PageType::Middle,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            PageType::First => 0,
            PageType::Last => 1,
            PageType::Middle => 2,
        }
    }
}

impl From<PageType> for u8 {
    fn from(page_type: PageType) -> u8 {
        page_type.ordinal()
    }
}

impl TryFrom<u8> for PageType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PageType::First),
            1 => Ok(PageType::Last),
            2 => Ok(PageType::Middle),
            other => Err(format!("invalid page type ordinal {}", other)),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::First => write!(f, "first"),
            PageType::Last => write!(f, "last"),
            PageType::Middle => write!(f, "middle"),
        }
    }
}

/// Page size in whole points plus its position in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub page_type: PageType,
}

impl PageGeometry {
    pub fn new(page: &PageLayout, index: usize, total_pages: usize) -> Self {
        PageGeometry {
            width: page.width as i64,
            height: page.height as i64,
            page_type: PageType::for_position(index, total_pages),
        }
    }
}

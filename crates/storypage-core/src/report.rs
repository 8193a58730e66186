use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The page got a blank background instead of an embedded image.
    BackgroundFallback,
    /// More text boxes were found than the page record can carry.
    TextElementsTruncated,
    /// A span's font is missing from the font table.
    UnknownFont,
}

/// A recovered condition recorded while describing a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageWarning {
    pub page_number: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl PageWarning {
    pub fn new(page_number: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        PageWarning {
            page_number,
            kind,
            message: message.into(),
        }
    }
}

/// A page that could not be described.
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub page_number: usize,
    pub reason: String,
}

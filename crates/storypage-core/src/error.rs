use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoryPageError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("mutool not found. Install MuPDF tools: brew install mupdf-tools (macOS) or apt install mupdf-tools (Linux)")]
    MutoolNotFound,

    #[error("mutool {command} failed with exit code {code}: {stderr}")]
    MutoolFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("page {page}: text span is missing required field '{field}'")]
    MissingField { page: usize, field: &'static str },

    #[error("failed to decode embedded image: {0}")]
    ImageDecode(String),

    #[error("page index {index} out of range for a document with {total} page(s)")]
    PageOutOfRange { index: usize, total: usize },

    #[error("{failed} of {total} page(s) could not be described")]
    PagesFailed { failed: usize, total: usize },

    #[error("failed to load font table from {path}: {reason}")]
    FontTableLoad { path: PathBuf, reason: String },

    #[error("invalid font table: {0}")]
    FontTableInvalid(String),

    #[error("invalid template: {0}")]
    TemplateInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

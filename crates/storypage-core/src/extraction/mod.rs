pub mod mutool;

use crate::error::StoryPageError;
use serde::Serialize;

/// Axis-aligned rectangle in page points, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

/// A run of text sharing one font, size and fill color within a line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub bbox: BBox,
    pub text: String,
    pub font: Option<String>,
    /// Font size in points.
    pub size: Option<f64>,
    /// Packed fill color, 0xRRGGBB.
    pub color: Option<u32>,
}

/// An image embedded in the page, with its native pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// PDF object number of the image XObject.
    pub xref: u32,
    pub width: u32,
    pub height: u32,
    /// Encoded image file bytes (PNG, JPEG, ...), if the backend could extract them.
    pub data: Option<Vec<u8>>,
}

/// Layout content extracted from a single page of a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based page number.
    pub page_number: usize,
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Text spans in the backend's native traversal order.
    pub spans: Vec<TextSpan>,
    /// Embedded images in enumeration order.
    pub images: Vec<EmbeddedImage>,
    /// Placement rectangles of images drawn on the page.
    pub image_rects: Vec<BBox>,
}

/// Trait for PDF layout extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract layout content from PDF bytes, returning one PageLayout per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageLayout>, StoryPageError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_center_and_width() {
        let b = BBox::new(10.0, 20.0, 50.0, 40.0);
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.center(), (30.0, 30.0));
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 50.0, 40.0);
        let b = BBox::new(5.0, 25.0, 45.0, 60.0);
        assert_eq!(a.union(&b), BBox::new(5.0, 20.0, 50.0, 60.0));
    }
}

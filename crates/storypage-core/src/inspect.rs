use crate::extraction::{BBox, PageLayout};
use crate::layout::color::map_color;
use serde::Serialize;
use std::collections::BTreeMap;

/// Diagnostic view of a page's raw layout, before any field mapping.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    pub contains_text: bool,
    pub contains_images: bool,
    /// Span bboxes, top to bottom then left to right.
    pub text_bboxes: Vec<BBox>,
    pub centers: Vec<(f64, f64)>,
    /// Horizontal extent covered by all spans.
    pub text_width: f64,
    /// Raw font name per 1-based text box number.
    pub font_names: BTreeMap<usize, String>,
    /// Size of the first span on the page.
    pub font_size: Option<f64>,
    /// Color of the first span on the page.
    pub text_color: Option<String>,
    /// Same color as RGB components in `0.0..=1.0`.
    pub text_rgb: Option<[f64; 3]>,
    /// Image placements, top to bottom then left to right.
    pub image_rects: Vec<BBox>,
    /// Last image placement that starts right of the page's left edge.
    pub character_image_rect: Option<BBox>,
    pub embedded_images: Vec<ImageSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub xref: u32,
    pub width: u32,
    pub height: u32,
    pub has_samples: bool,
}

fn sort_reading_order(boxes: &mut [BBox]) {
    boxes.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));
}

/// Horizontal extent of a set of boxes: max `x1` minus min `x0`.
pub fn text_width(boxes: &[BBox]) -> f64 {
    if boxes.is_empty() {
        return 0.0;
    }
    let min_x = boxes.iter().map(|b| b.x0).fold(f64::INFINITY, f64::min);
    let max_x = boxes.iter().map(|b| b.x1).fold(f64::NEG_INFINITY, f64::max);
    max_x - min_x
}

/// The rightmost-placed "character" image: the last placement, in
/// enumeration order, whose left edge is past the page's left edge.
pub fn character_image_rect(image_rects: &[BBox]) -> Option<BBox> {
    image_rects.iter().rev().find(|r| r.x0 > 0.0).copied()
}

/// Split a packed 0xRRGGBB color into components scaled to `0.0..=1.0`.
pub fn normalized_rgb(color: u32) -> [f64; 3] {
    [
        ((color >> 16) & 0xff) as f64 / 255.0,
        ((color >> 8) & 0xff) as f64 / 255.0,
        (color & 0xff) as f64 / 255.0,
    ]
}

/// Summarize a page. Font names are listed for at most `max_fonts` boxes.
pub fn summarize_page(page: &PageLayout, max_fonts: usize) -> PageSummary {
    let mut text_bboxes: Vec<BBox> = page.spans.iter().map(|s| s.bbox).collect();
    sort_reading_order(&mut text_bboxes);

    let mut font_names = BTreeMap::new();
    for span in &page.spans {
        if font_names.len() >= max_fonts {
            break;
        }
        let Some(font) = span.font.as_ref() else {
            continue;
        };
        // Identical boxes share the number of the last one.
        if let Some(pos) = text_bboxes.iter().rposition(|b| *b == span.bbox) {
            font_names.insert(pos + 1, font.clone());
        }
    }

    let mut image_rects = page.image_rects.clone();
    let character_image_rect = character_image_rect(&page.image_rects);
    sort_reading_order(&mut image_rects);

    let first = page.spans.first();

    PageSummary {
        page_number: page.page_number,
        width: page.width,
        height: page.height,
        contains_text: page.spans.iter().any(|s| !s.text.trim().is_empty()),
        contains_images: !page.images.is_empty() || !page.image_rects.is_empty(),
        centers: text_bboxes.iter().map(BBox::center).collect(),
        text_width: text_width(&text_bboxes),
        text_bboxes,
        font_names,
        font_size: first.and_then(|s| s.size),
        text_color: map_color(first.and_then(|s| s.color)),
        text_rgb: first.and_then(|s| s.color).map(normalized_rgb),
        image_rects,
        character_image_rect,
        embedded_images: page
            .images
            .iter()
            .map(|img| ImageSummary {
                xref: img.xref,
                width: img.width,
                height: img.height,
                has_samples: img.data.is_some(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::TextSpan;

    fn span(bbox: BBox, font: Option<&str>) -> TextSpan {
        TextSpan {
            bbox,
            text: "text".to_string(),
            font: font.map(str::to_string),
            size: Some(18.0),
            color: Some(0x336699),
        }
    }

    fn page(spans: Vec<TextSpan>, image_rects: Vec<BBox>) -> PageLayout {
        PageLayout {
            page_number: 1,
            width: 800.0,
            height: 1200.0,
            spans,
            images: vec![],
            image_rects,
        }
    }

    #[test]
    fn test_text_width() {
        let boxes = vec![
            BBox::new(50.0, 0.0, 200.0, 10.0),
            BBox::new(20.0, 30.0, 120.0, 40.0),
        ];
        assert_eq!(text_width(&boxes), 180.0);
        assert_eq!(text_width(&[]), 0.0);
    }

    #[test]
    fn test_character_image_is_last_offset_image() {
        let rects = vec![
            BBox::new(0.0, 0.0, 800.0, 1200.0),
            BBox::new(300.0, 400.0, 600.0, 900.0),
            BBox::new(0.0, 10.0, 100.0, 100.0),
        ];
        assert_eq!(
            character_image_rect(&rects),
            Some(BBox::new(300.0, 400.0, 600.0, 900.0))
        );
        assert_eq!(character_image_rect(&rects[..1]), None);
    }

    #[test]
    fn test_summary_orders_boxes_and_numbers_fonts() {
        let low = BBox::new(10.0, 500.0, 100.0, 520.0);
        let high = BBox::new(10.0, 50.0, 100.0, 70.0);
        let p = page(
            vec![span(low, Some("Baloo2-ExtraBold")), span(high, Some("ComicNeue-Bold"))],
            vec![],
        );
        let s = summarize_page(&p, 4);
        assert!(s.contains_text);
        assert!(!s.contains_images);
        assert_eq!(s.text_bboxes, vec![high, low]);
        assert_eq!(s.centers[0], (55.0, 60.0));
        assert_eq!(s.font_names.get(&1).map(String::as_str), Some("ComicNeue-Bold"));
        assert_eq!(s.font_names.get(&2).map(String::as_str), Some("Baloo2-ExtraBold"));
        assert_eq!(s.font_size, Some(18.0));
        assert_eq!(s.text_color.as_deref(), Some("#336699"));
    }

    #[test]
    fn test_duplicate_boxes_take_last_number() {
        let bbox = BBox::new(10.0, 50.0, 100.0, 70.0);
        let p = page(
            vec![span(bbox, Some("ComicNeue-Bold")), span(bbox, Some("Baloo2-ExtraBold"))],
            vec![],
        );
        let s = summarize_page(&p, 4);
        assert_eq!(s.font_names.len(), 1);
        assert_eq!(s.font_names.get(&2).map(String::as_str), Some("Baloo2-ExtraBold"));
    }

    #[test]
    fn test_normalized_rgb() {
        assert_eq!(normalized_rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(normalized_rgb(0x000000), [0.0, 0.0, 0.0]);
        let s = summarize_page(&page(vec![span(BBox::new(0.0, 0.0, 1.0, 1.0), None)], vec![]), 4);
        assert_eq!(s.text_rgb, Some(normalized_rgb(0x336699)));
    }

    #[test]
    fn test_summary_font_names_capped() {
        let spans = (0..6)
            .map(|i| span(BBox::new(0.0, i as f64 * 10.0, 10.0, 5.0), Some("F")))
            .collect();
        let s = summarize_page(&page(spans, vec![]), 4);
        assert_eq!(s.font_names.len(), 4);
    }
}

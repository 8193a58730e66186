pub mod color;
pub mod font;

use crate::error::StoryPageError;
use crate::extraction::{PageLayout, TextSpan};
use crate::fonts::schema::FontTableDef;
use color::map_color;
use font::map_font;
use serde::Serialize;

/// Horizontal padding added to every text box width, in points.
///
/// Downstream rendering wraps text that exactly fills its box.
pub const TEXT_BOX_WIDTH_PADDING: f64 = 5.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Center,
}

/// One text span reshaped for the template API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBoxRecord {
    /// Span bounding box `[x0, y0, x1, y1]`, unmodified.
    pub bbox: [f64; 4],
    pub text: String,
    pub font_size: i64,
    /// Font file name, `None` for fonts missing from the font table.
    pub font: Option<String>,
    /// Reserved; never computed.
    pub stroke_width: Option<i64>,
    pub text_align: TextAlign,
    pub line_height: i64,
    pub text_color: Option<String>,
    pub width: i64,
    pub top: i64,
    pub left: i64,
}

/// Build the record for a single span.
///
/// Every numeric field is truncated toward zero, so `-3.7` becomes `-3`.
pub fn text_box_from_span(
    span: &TextSpan,
    page_number: usize,
    fonts: &FontTableDef,
) -> Result<TextBoxRecord, StoryPageError> {
    let size = span.size.ok_or(StoryPageError::MissingField {
        page: page_number,
        field: "size",
    })?;

    Ok(TextBoxRecord {
        bbox: span.bbox.to_array(),
        text: span.text.clone(),
        font_size: size as i64,
        font: map_font(fonts, span.font.as_deref()),
        stroke_width: None,
        text_align: TextAlign::Center,
        line_height: (size * LINE_HEIGHT_FACTOR) as i64,
        text_color: map_color(span.color),
        width: (span.bbox.width() + TEXT_BOX_WIDTH_PADDING) as i64,
        top: span.bbox.y0 as i64,
        left: span.bbox.x0 as i64,
    })
}

/// Extract one record per text span, in reading order.
///
/// Records are sorted by `top`, then `left`. The sort is stable, so spans
/// at the same position keep the backend's traversal order.
pub fn extract_text_boxes(
    page: &PageLayout,
    fonts: &FontTableDef,
) -> Result<Vec<TextBoxRecord>, StoryPageError> {
    let mut records = page
        .spans
        .iter()
        .map(|span| text_box_from_span(span, page.page_number, fonts))
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by_key(|r| (r.top, r.left));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BBox;
    use crate::fonts::builtin::load_preset;

    fn span(x0: f64, y0: f64, x1: f64, y1: f64, text: &str) -> TextSpan {
        TextSpan {
            bbox: BBox::new(x0, y0, x1, y1),
            text: text.to_string(),
            font: Some("ComicNeue-Bold".to_string()),
            size: Some(24.0),
            color: Some(0x1a2b3c),
        }
    }

    fn page(spans: Vec<TextSpan>) -> PageLayout {
        PageLayout {
            page_number: 1,
            width: 800.0,
            height: 1200.0,
            spans,
            images: vec![],
            image_rects: vec![],
        }
    }

    #[test]
    fn test_record_fields() {
        let fonts = load_preset("default").unwrap();
        let r = text_box_from_span(&span(10.7, 20.9, 60.2, 44.0, "Once"), 1, &fonts).unwrap();
        assert_eq!(r.bbox, [10.7, 20.9, 60.2, 44.0]);
        assert_eq!(r.text, "Once");
        assert_eq!(r.font_size, 24);
        assert_eq!(r.font.as_deref(), Some("ComicNeue-Bold.ttf"));
        assert_eq!(r.stroke_width, None);
        assert_eq!(r.text_align, TextAlign::Center);
        assert_eq!(r.line_height, 28);
        assert_eq!(r.text_color.as_deref(), Some("#1a2b3c"));
        assert_eq!(r.top, 20);
        assert_eq!(r.left, 10);
    }

    #[test]
    fn test_width_includes_padding() {
        let fonts = load_preset("default").unwrap();
        // (60.2 - 10.7) + 5 = 54.5
        let r = text_box_from_span(&span(10.7, 20.0, 60.2, 44.0, "x"), 1, &fonts).unwrap();
        assert_eq!(r.width, 54);
    }

    #[test]
    fn test_negative_position_truncates_toward_zero() {
        let fonts = load_preset("default").unwrap();
        // Text bleeding off the top-left corner.
        let r = text_box_from_span(&span(-3.7, -0.4, 20.0, 10.0, "x"), 1, &fonts).unwrap();
        assert_eq!(r.left, -3);
        assert_eq!(r.top, 0);
        // (20.0 - -3.7) + 5 = 28.7
        assert_eq!(r.width, 28);
    }

    #[test]
    fn test_fractional_font_size_truncated() {
        let fonts = load_preset("default").unwrap();
        let mut s = span(0.0, 0.0, 10.0, 10.0, "x");
        s.size = Some(15.9);
        let r = text_box_from_span(&s, 1, &fonts).unwrap();
        assert_eq!(r.font_size, 15);
        // 15.9 * 1.2 = 19.08
        assert_eq!(r.line_height, 19);
    }

    #[test]
    fn test_missing_font_and_color_map_to_none() {
        let fonts = load_preset("default").unwrap();
        let mut s = span(0.0, 0.0, 10.0, 10.0, "x");
        s.font = None;
        s.color = None;
        let r = text_box_from_span(&s, 1, &fonts).unwrap();
        assert_eq!(r.font, None);
        assert_eq!(r.text_color, None);
    }

    #[test]
    fn test_missing_size_is_error() {
        let fonts = load_preset("default").unwrap();
        let mut s = span(0.0, 0.0, 10.0, 10.0, "x");
        s.size = None;
        let result = text_box_from_span(&s, 3, &fonts);
        assert!(matches!(
            result,
            Err(StoryPageError::MissingField { page: 3, field: "size" })
        ));
    }

    #[test]
    fn test_reading_order() {
        let fonts = load_preset("default").unwrap();
        let p = page(vec![
            span(300.0, 500.0, 400.0, 520.0, "bottom"),
            span(200.0, 100.2, 250.0, 120.0, "top-right"),
            span(50.0, 100.9, 150.0, 120.0, "top-left"),
            span(10.0, 300.0, 90.0, 320.0, "middle"),
        ]);
        let records = extract_text_boxes(&p, &fonts).unwrap();
        let texts: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["top-left", "top-right", "middle", "bottom"]);
    }

    #[test]
    fn test_one_record_per_span() {
        let fonts = load_preset("default").unwrap();
        let p = page(vec![
            span(10.0, 10.0, 20.0, 20.0, "a"),
            span(10.0, 10.0, 20.0, 20.0, "a"),
        ]);
        assert_eq!(extract_text_boxes(&p, &fonts).unwrap().len(), 2);
    }

    #[test]
    fn test_serialized_keys() {
        let fonts = load_preset("default").unwrap();
        let r = text_box_from_span(&span(0.0, 0.0, 10.0, 10.0, "x"), 1, &fonts).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["fontSize"], 24);
        assert_eq!(json["textAlign"], "center");
        assert!(json["strokeWidth"].is_null());
        assert_eq!(json["lineHeight"], 28);
    }
}

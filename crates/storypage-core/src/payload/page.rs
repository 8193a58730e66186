use crate::layout::{TextAlign, TextBoxRecord};
use crate::page::{PageGeometry, PageType};
use crate::report::{PageWarning, WarningKind};
use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Default number of `TextElementN` groups a page record carries.
pub const DEFAULT_MAX_TEXT_ELEMENTS: usize = 4;

/// One `TextElementN` group of a page record.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub font_size: i64,
    pub stroke_width: Option<i64>,
    pub font_program: Option<String>,
    pub text_align: TextAlign,
    pub line_height: i64,
    pub text_color: Option<String>,
    pub width: i64,
    pub top: i64,
    pub left: i64,
}

impl From<&TextBoxRecord> for TextElement {
    fn from(r: &TextBoxRecord) -> Self {
        TextElement {
            text: r.text.clone(),
            font_size: r.font_size,
            stroke_width: r.stroke_width,
            font_program: r.font.clone(),
            text_align: r.text_align,
            line_height: r.line_height,
            text_color: r.text_color.clone(),
            width: r.width,
            top: r.top,
            left: r.left,
        }
    }
}

/// Page record, as posted to the page-creation API.
///
/// Serializes to a flat object: `TextElement1.Text`, `TextElement1.FontSize`,
/// ... for each text element present.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub story_template_id: Option<i64>,
    pub page_type: PageType,
    pub page_width: i64,
    pub page_height: i64,
    /// Upload file name of the background image.
    pub image: String,
    /// Upload file name of the low resolution background image.
    pub low_res_image: String,
    pub text_elements: Vec<TextElement>,
}

impl Serialize for PageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("StoryTemplateId", &self.story_template_id)?;
        map.serialize_entry("PageType", &self.page_type)?;
        map.serialize_entry("PageWidth", &self.page_width)?;
        map.serialize_entry("PageHeight", &self.page_height)?;
        map.serialize_entry("Image", &self.image)?;
        map.serialize_entry("LowResImage", &self.low_res_image)?;

        for (i, el) in self.text_elements.iter().enumerate() {
            let prefix = format!("TextElement{}", i + 1);
            map.serialize_entry(&format!("{prefix}.Text"), &el.text)?;
            map.serialize_entry(&format!("{prefix}.FontSize"), &el.font_size)?;
            map.serialize_entry(&format!("{prefix}.StrokeWidth"), &el.stroke_width)?;
            map.serialize_entry(&format!("{prefix}.FontProgram"), &el.font_program)?;
            map.serialize_entry(&format!("{prefix}.TextAlign"), &el.text_align)?;
            map.serialize_entry(&format!("{prefix}.LineHeight"), &el.line_height)?;
            map.serialize_entry(&format!("{prefix}.TextColor"), &el.text_color)?;
            map.serialize_entry(&format!("{prefix}.Width"), &el.width)?;
            map.serialize_entry(&format!("{prefix}.Top"), &el.top)?;
            map.serialize_entry(&format!("{prefix}.Left"), &el.left)?;
        }

        map.end()
    }
}

/// Upload file names for a page's background images.
pub fn image_file_names(page_number: usize) -> (String, String) {
    (
        format!("page-{:03}.png", page_number),
        format!("page-{:03}.lowres.png", page_number),
    )
}

/// Assemble a page record from ordered text boxes.
///
/// Only the first `max_text_elements` boxes are carried; extra boxes are
/// dropped with a warning.
pub fn build_page_record(
    page_number: usize,
    story_template_id: Option<i64>,
    geometry: &PageGeometry,
    text_boxes: &[TextBoxRecord],
    max_text_elements: usize,
) -> (PageRecord, Option<PageWarning>) {
    let kept = text_boxes.len().min(max_text_elements);
    let warning = (text_boxes.len() > kept).then(|| {
        warn!(
            "page {}: {} text boxes found, only the first {} fit in the page record",
            page_number,
            text_boxes.len(),
            kept
        );
        PageWarning::new(
            page_number,
            WarningKind::TextElementsTruncated,
            format!(
                "dropped {} of {} text boxes (limit {})",
                text_boxes.len() - kept,
                text_boxes.len(),
                max_text_elements
            ),
        )
    });

    let (image, low_res_image) = image_file_names(page_number);
    let record = PageRecord {
        story_template_id,
        page_type: geometry.page_type,
        page_width: geometry.width,
        page_height: geometry.height,
        image,
        low_res_image,
        text_elements: text_boxes[..kept].iter().map(TextElement::from).collect(),
    };

    (record, warning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, top: i64) -> TextBoxRecord {
        TextBoxRecord {
            bbox: [10.0, top as f64, 110.0, top as f64 + 20.0],
            text: text.to_string(),
            font_size: 20,
            font: Some("ComicNeue-Bold.ttf".to_string()),
            stroke_width: None,
            text_align: TextAlign::Center,
            line_height: 24,
            text_color: Some("#000000".to_string()),
            width: 105,
            top,
            left: 10,
        }
    }

    fn geometry() -> PageGeometry {
        PageGeometry {
            width: 800,
            height: 1200,
            page_type: PageType::Middle,
        }
    }

    #[test]
    fn test_flat_text_element_keys() {
        let boxes = vec![text_box("Hello", 10), text_box("World", 40)];
        let (record, warning) = build_page_record(2, Some(17), &geometry(), &boxes, 4);
        assert!(warning.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["StoryTemplateId"], 17);
        assert_eq!(json["PageType"], 2);
        assert_eq!(json["PageWidth"], 800);
        assert_eq!(json["Image"], "page-002.png");
        assert_eq!(json["LowResImage"], "page-002.lowres.png");
        assert_eq!(json["TextElement1.Text"], "Hello");
        assert_eq!(json["TextElement2.Text"], "World");
        assert_eq!(json["TextElement2.TextAlign"], "center");
        assert_eq!(json["TextElement1.FontProgram"], "ComicNeue-Bold.ttf");
        assert!(json["TextElement1.StrokeWidth"].is_null());
        assert!(json.get("TextElement3.Text").is_none());
    }

    #[test]
    fn test_cap_truncates_and_warns() {
        let boxes: Vec<_> = (0..6).map(|i| text_box(&format!("t{i}"), i * 10)).collect();
        let (record, warning) = build_page_record(1, None, &geometry(), &boxes, 4);
        assert_eq!(record.text_elements.len(), 4);
        assert_eq!(record.text_elements[3].text, "t3");

        let warning = warning.unwrap();
        assert_eq!(warning.kind, WarningKind::TextElementsTruncated);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("TextElement4.Text").is_some());
        assert!(json.get("TextElement5.Text").is_none());
    }

    #[test]
    fn test_cap_is_configurable() {
        let boxes: Vec<_> = (0..6).map(|i| text_box("x", i * 10)).collect();
        let (record, warning) = build_page_record(1, None, &geometry(), &boxes, 6);
        assert_eq!(record.text_elements.len(), 6);
        assert!(warning.is_none());
    }
}

pub mod background;
pub mod error;
pub mod extraction;
pub mod fonts;
pub mod inspect;
pub mod layout;
pub mod page;
pub mod payload;
pub mod report;

use background::{render_background, select_background, BackgroundImage, BACKGROUND_REFERENCE_SIZE};
use error::StoryPageError;
use extraction::{PageLayout, PdfExtractor};
use fonts::schema::FontTableDef;
use layout::{extract_text_boxes, TextBoxRecord};
use log::{debug, info, warn};
use page::PageGeometry;
use payload::{build_page_record, PageRecord, DEFAULT_MAX_TEXT_ELEMENTS};
use report::{PageFailure, PageWarning, WarningKind};

/// Options for describing pages.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    /// Number of text elements carried by a page record.
    pub max_text_elements: usize,
    /// Native pixel size that identifies the background image.
    pub background_size: (u32, u32),
    /// Template the pages belong to, if already known.
    pub story_template_id: Option<i64>,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        DescribeOptions {
            max_text_elements: DEFAULT_MAX_TEXT_ELEMENTS,
            background_size: BACKGROUND_REFERENCE_SIZE,
            story_template_id: None,
        }
    }
}

/// Everything derived from one page.
#[derive(Debug, Clone)]
pub struct PageDescription {
    pub page_number: usize,
    pub geometry: PageGeometry,
    /// All text boxes in reading order, before the record cap.
    pub text_boxes: Vec<TextBoxRecord>,
    pub record: PageRecord,
    pub background: BackgroundImage,
    pub warnings: Vec<PageWarning>,
}

/// Result of describing a whole document.
///
/// A page that fails lands in `failures`; the other pages are still described.
#[derive(Debug, Clone, Default)]
pub struct DocumentDescription {
    pub pages: Vec<PageDescription>,
    pub failures: Vec<PageFailure>,
}

impl DocumentDescription {
    pub fn warnings(&self) -> impl Iterator<Item = &PageWarning> {
        self.pages.iter().flat_map(|p| p.warnings.iter())
    }
}

/// Describe a single page: text boxes, page record and background image.
///
/// `index` is the 0-based page position and `total_pages` the page count,
/// used to classify the page as first, middle or last.
pub fn describe_page(
    page: &PageLayout,
    index: usize,
    total_pages: usize,
    fonts: &FontTableDef,
    options: &DescribeOptions,
) -> Result<PageDescription, StoryPageError> {
    if index >= total_pages {
        return Err(StoryPageError::PageOutOfRange {
            index,
            total: total_pages,
        });
    }

    let geometry = PageGeometry::new(page, index, total_pages);
    let text_boxes = extract_text_boxes(page, fonts)?;
    let mut warnings = unknown_font_warnings(page, fonts);

    let (record, truncated) = build_page_record(
        page.page_number,
        options.story_template_id,
        &geometry,
        &text_boxes,
        options.max_text_elements,
    );
    warnings.extend(truncated);

    let selected = select_background(&page.images, options.background_size);
    let rendered = render_background(
        selected,
        geometry.width.max(0) as u32,
        geometry.height.max(0) as u32,
        page.page_number,
    )?;
    warnings.extend(rendered.warning);

    debug!(
        "page {}: {} text box(es), type {}, {} warning(s)",
        page.page_number,
        text_boxes.len(),
        geometry.page_type,
        warnings.len()
    );

    Ok(PageDescription {
        page_number: page.page_number,
        geometry,
        text_boxes,
        record,
        background: rendered.background,
        warnings,
    })
}

fn unknown_font_warnings(page: &PageLayout, fonts: &FontTableDef) -> Vec<PageWarning> {
    let mut seen: Vec<&str> = Vec::new();
    for span in &page.spans {
        if let Some(font) = span.font.as_deref() {
            if fonts.resolve(font).is_none() && !seen.contains(&font) {
                seen.push(font);
            }
        }
    }

    seen.into_iter()
        .map(|font| {
            PageWarning::new(
                page.page_number,
                WarningKind::UnknownFont,
                format!("font '{}' is not in font table '{}'", font, fonts.name),
            )
        })
        .collect()
}

/// Describe every page of already extracted layouts.
pub fn describe_pages(
    pages: &[PageLayout],
    fonts: &FontTableDef,
    options: &DescribeOptions,
) -> DocumentDescription {
    let total = pages.len();
    let mut description = DocumentDescription::default();

    for (index, page) in pages.iter().enumerate() {
        match describe_page(page, index, total, fonts, options) {
            Ok(desc) => description.pages.push(desc),
            Err(e) => {
                warn!("page {}: skipped: {}", page.page_number, e);
                description.failures.push(PageFailure {
                    page_number: page.page_number,
                    reason: e.to_string(),
                });
            }
        }
    }

    description
}

/// Main API entry point: extract and describe every page of a PDF.
pub fn describe_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    fonts: &FontTableDef,
    options: &DescribeOptions,
) -> Result<DocumentDescription, StoryPageError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    if pages.is_empty() {
        return Err(StoryPageError::Extraction("PDF has no pages".into()));
    }

    info!(
        "extracted {} page(s) with {}",
        pages.len(),
        extractor.backend_name()
    );

    Ok(describe_pages(&pages, fonts, options))
}

/// Extract a PDF and summarize each page's raw layout.
pub fn inspect_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    max_fonts: usize,
) -> Result<Vec<inspect::PageSummary>, StoryPageError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(pages
        .iter()
        .map(|p| inspect::summarize_page(p, max_fonts))
        .collect())
}

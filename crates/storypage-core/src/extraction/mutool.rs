use crate::background::BACKGROUND_REFERENCE_SIZE;
use crate::error::StoryPageError;
use crate::extraction::{BBox, EmbeddedImage, PageLayout, PdfExtractor, TextSpan};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using the MuPDF command line tool.
///
/// Text, page size and image placements come from `mutool draw -F stext`.
/// Embedded images are listed page by page with `mutool info -I`, and the
/// samples of images with the background pixel size are pulled out with
/// `mutool extract` into a scratch directory.
pub struct MutoolExtractor {
    sample_size: (u32, u32),
}

impl MutoolExtractor {
    pub fn new() -> Self {
        Self::with_sample_size(BACKGROUND_REFERENCE_SIZE)
    }

    /// Only images of exactly `size` pixels get their samples extracted.
    pub fn with_sample_size(size: (u32, u32)) -> Self {
        MutoolExtractor { sample_size: size }
    }
}

impl Default for MutoolExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for MutoolExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageLayout>, StoryPageError> {
        // Write PDF bytes to a temp file
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| StoryPageError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| StoryPageError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let xml = run_mutool(
            "draw",
            &["-q", "-F", "stext", "-O", "preserve-images", "-o", "-"],
            &tmp_path,
            &[],
            None,
        )?;
        let mut pages = parse_stext_xml(&xml)?;

        // One run per page: a single run lists an image shared by several
        // pages only under the first of them.
        let mut listed = Vec::new();
        for page in &pages {
            let number = page.page_number.to_string();
            let info = run_mutool("info", &["-I"], &tmp_path, &[number.as_str()], None)?;
            listed.extend(parse_image_info(&info));
        }

        let wanted = sample_candidates(&listed, self.sample_size);
        let samples = if wanted.is_empty() {
            HashMap::new()
        } else {
            extract_image_samples(&tmp_path, &wanted)?
        };
        debug!(
            "mutool: {} page(s), {} listed image(s), {} extracted sample file(s)",
            pages.len(),
            listed.len(),
            samples.len()
        );

        attach_images(&mut pages, listed, &samples);
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "mutool"
    }
}

fn run_mutool(
    subcommand: &str,
    args: &[&str],
    pdf_path: &Path,
    trailing: &[&str],
    working_dir: Option<&Path>,
) -> Result<String, StoryPageError> {
    let mut command = Command::new("mutool");
    command
        .arg(subcommand)
        .args(args)
        .arg(pdf_path)
        .args(trailing);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoryPageError::MutoolNotFound
        } else {
            StoryPageError::Extraction(format!("mutool {} failed: {}", subcommand, e))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(StoryPageError::MutoolFailed {
            command: subcommand.to_string(),
            code,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Object numbers of listed images whose pixel size is `size`.
fn sample_candidates(listed: &[ListedImage], size: (u32, u32)) -> BTreeSet<u32> {
    listed
        .iter()
        .filter(|img| (img.width, img.height) == size)
        .map(|img| img.xref)
        .collect()
}

/// Attach listed images to their pages, with samples where extracted.
///
/// Listings for page numbers outside the document are skipped.
fn attach_images(
    pages: &mut [PageLayout],
    listed: Vec<ListedImage>,
    samples: &HashMap<u32, Vec<u8>>,
) {
    for img in listed {
        let Some(page) = img
            .page_number
            .checked_sub(1)
            .and_then(|i| pages.get_mut(i))
        else {
            debug!(
                "mutool: image object {} listed for unknown page {}",
                img.xref, img.page_number
            );
            continue;
        };
        page.images.push(EmbeddedImage {
            xref: img.xref,
            width: img.width,
            height: img.height,
            data: samples.get(&img.xref).cloned(),
        });
    }
}

/// Run `mutool extract` for the given objects in a scratch directory and
/// collect the image files by object number.
///
/// The directory is removed when this returns, on success and on error.
fn extract_image_samples(
    pdf_path: &Path,
    xrefs: &BTreeSet<u32>,
) -> Result<HashMap<u32, Vec<u8>>, StoryPageError> {
    let staging = tempfile::TempDir::new()?;
    let objects: Vec<String> = xrefs.iter().map(u32::to_string).collect();
    let objects: Vec<&str> = objects.iter().map(String::as_str).collect();
    run_mutool("extract", &[], pdf_path, &objects, Some(staging.path()))?;

    let mut samples = HashMap::new();
    for entry in std::fs::read_dir(staging.path())? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(xref) = parse_extracted_image_name(&name.to_string_lossy()) {
            samples.insert(xref, std::fs::read(entry.path())?);
        }
    }

    Ok(samples)
}

/// `image-0012.png` -> 12. Fonts and other extracted files are ignored.
fn parse_extracted_image_name(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("image-")?;
    let (number, _ext) = rest.split_once('.')?;
    number.parse().ok()
}

#[derive(Debug, Clone, PartialEq)]
struct ListedImage {
    page_number: usize,
    xref: u32,
    width: u32,
    height: u32,
}

/// Parse the `Images (N):` section of `mutool info -I`.
///
/// Lines look like `\t1\t(5 0 R):\t[ DCT ] 1536x1536 8bpc ICC (12 0 R)`;
/// newer releases pad the numbers with spaces instead of tabs.
fn parse_image_info(info: &str) -> Vec<ListedImage> {
    let mut out = Vec::new();
    let mut in_images = false;

    for raw in info.lines() {
        let line = raw.trim();

        if line.starts_with("Images (") {
            in_images = true;
            continue;
        }

        if !in_images {
            continue;
        }

        if line.is_empty() {
            in_images = false;
            continue;
        }

        if let Some(img) = parse_image_line(line) {
            out.push(img);
        }
    }

    out
}

fn parse_image_line(line: &str) -> Option<ListedImage> {
    let page_number = line.split_whitespace().next()?.parse().ok()?;

    let last_ref = line.rfind('(')?;
    let xref = line[last_ref + 1..].split_whitespace().next()?.parse().ok()?;

    let after_filters = &line[line.find("] ")? + 2..];
    let dims = after_filters.split_whitespace().next()?;
    let (w, h) = dims.split_once('x')?;

    Some(ListedImage {
        page_number,
        xref,
        width: w.parse().ok()?,
        height: h.parse().ok()?,
    })
}

#[derive(Debug, Clone, Default)]
struct FontAttrs {
    name: Option<String>,
    size: Option<f64>,
}

/// Characters accumulated into the span currently being built.
#[derive(Debug)]
struct SpanBuilder {
    text: String,
    bbox: Option<BBox>,
    color: Option<u32>,
    font: FontAttrs,
}

impl SpanBuilder {
    fn finish(self, line_bbox: Option<BBox>) -> Option<TextSpan> {
        if self.text.is_empty() {
            return None;
        }
        Some(TextSpan {
            bbox: self.bbox.or(line_bbox)?,
            text: self.text,
            font: self.font.name,
            size: self.font.size,
            color: self.color,
        })
    }
}

#[derive(Debug, Default)]
struct StextState {
    pages: Vec<PageLayout>,
    page: Option<PageLayout>,
    font: FontAttrs,
    line_bbox: Option<BBox>,
    run: Option<SpanBuilder>,
}

impl StextState {
    fn flush_run(&mut self) {
        if let Some(run) = self.run.take() {
            if let (Some(page), Some(span)) = (self.page.as_mut(), run.finish(self.line_bbox)) {
                page.spans.push(span);
            }
        }
    }

    fn finish_page(&mut self) {
        self.flush_run();
        if let Some(page) = self.page.take() {
            self.pages.push(page);
        }
    }

    fn open(&mut self, e: &BytesStart, is_empty: bool) -> Result<(), StoryPageError> {
        match e.name().as_ref() {
            b"page" => {
                self.finish_page();
                self.page = Some(PageLayout {
                    page_number: self.pages.len() + 1,
                    width: attr_f64(e, "width")?.unwrap_or(0.0),
                    height: attr_f64(e, "height")?.unwrap_or(0.0),
                    spans: Vec::new(),
                    images: Vec::new(),
                    image_rects: Vec::new(),
                });
                if is_empty {
                    self.finish_page();
                }
            }
            b"line" => {
                self.flush_run();
                self.line_bbox = attr_value(e, "bbox")?.and_then(|b| parse_bbox(&b));
            }
            b"font" => {
                self.flush_run();
                self.font = FontAttrs {
                    name: attr_value(e, "name")?,
                    size: attr_f64(e, "size")?,
                };
            }
            b"image" => {
                let bbox = attr_value(e, "bbox")?.and_then(|b| parse_bbox(&b));
                if let (Some(page), Some(bbox)) = (self.page.as_mut(), bbox) {
                    page.image_rects.push(bbox);
                }
            }
            b"char" => self.push_char(e)?,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"page" => self.finish_page(),
            b"line" => {
                self.flush_run();
                self.line_bbox = None;
            }
            b"font" => {
                self.flush_run();
                self.font = FontAttrs::default();
            }
            _ => {}
        }
    }

    fn push_char(&mut self, e: &BytesStart) -> Result<(), StoryPageError> {
        let c = attr_value(e, "c")?.unwrap_or_default();
        let quad = attr_value(e, "quad")?.and_then(|q| parse_quad(&q));
        let color = attr_value(e, "color")?.and_then(|c| parse_hex_color(&c));

        if self.run.as_ref().is_some_and(|run| run.color != color) {
            self.flush_run();
        }

        let font = self.font.clone();
        let run = self.run.get_or_insert_with(|| SpanBuilder {
            text: String::new(),
            bbox: None,
            color,
            font,
        });
        run.text.push_str(&c);
        if let Some(q) = quad {
            run.bbox = Some(match run.bbox {
                Some(b) => b.union(&q),
                None => q,
            });
        }
        Ok(())
    }
}

/// Parse the XML written by `mutool draw -F stext` into page layouts.
fn parse_stext_xml(xml: &str) -> Result<Vec<PageLayout>, StoryPageError> {
    let mut reader = Reader::from_str(xml);
    let mut state = StextState::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| StoryPageError::Extraction(format!("invalid stext XML: {}", e)))?;
        match event {
            Event::Start(e) => state.open(&e, false)?,
            Event::Empty(e) => state.open(&e, true)?,
            Event::End(e) => state.close(e.name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    state.finish_page();
    Ok(state.pages)
}

fn attr_value(e: &BytesStart, name: &str) -> Result<Option<String>, StoryPageError> {
    for attr in e.attributes() {
        let attr = attr
            .map_err(|err| StoryPageError::Extraction(format!("invalid stext attribute: {}", err)))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(|err| {
                StoryPageError::Extraction(format!("invalid value for '{}': {}", name, err))
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn attr_f64(e: &BytesStart, name: &str) -> Result<Option<f64>, StoryPageError> {
    Ok(attr_value(e, name)?.and_then(|v| v.trim().parse().ok()))
}

fn parse_numbers(s: &str) -> Option<Vec<f64>> {
    s.split_whitespace().map(|n| n.parse::<f64>().ok()).collect()
}

fn parse_bbox(s: &str) -> Option<BBox> {
    match parse_numbers(s)?.as_slice() {
        [x0, y0, x1, y1] => Some(BBox::new(*x0, *y0, *x1, *y1)),
        _ => None,
    }
}

/// Quads are four corner points (ul, ur, ll, lr); the bbox is their extent.
fn parse_quad(s: &str) -> Option<BBox> {
    let nums = parse_numbers(s)?;
    if nums.len() != 8 {
        return None;
    }
    let xs = [nums[0], nums[2], nums[4], nums[6]];
    let ys = [nums[1], nums[3], nums[5], nums[7]];
    Some(BBox::new(
        xs.iter().copied().fold(f64::INFINITY, f64::min),
        ys.iter().copied().fold(f64::INFINITY, f64::min),
        xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ))
}

/// `#1a2b3c` -> 0x1a2b3c
fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

use crate::error::StoryPageError;
use crate::extraction::EmbeddedImage;
use crate::report::{PageWarning, WarningKind};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Native pixel size that marks an embedded image as the page background.
pub const BACKGROUND_REFERENCE_SIZE: (u32, u32) = (1536, 1536);

/// Pick the background among a page's embedded images.
///
/// Only images whose pixel size equals `reference` qualify. When several
/// qualify, the last one in enumeration order wins.
pub fn select_background(
    images: &[EmbeddedImage],
    reference: (u32, u32),
) -> Option<&EmbeddedImage> {
    images
        .iter()
        .rev()
        .find(|img| (img.width, img.height) == reference)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSource {
    Embedded { xref: u32 },
    Blank,
}

/// PNG encoded background, stretched to the page size.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    pub image: Vec<u8>,
    /// Same bytes as `image`; no separate downsampling is done.
    pub low_res_image: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source: BackgroundSource,
}

impl BackgroundImage {
    /// File upload map handed to the HTTP layer.
    pub fn upload_files(&self) -> BTreeMap<&'static str, &[u8]> {
        BTreeMap::from([
            ("Image", self.image.as_slice()),
            ("LowResImage", self.low_res_image.as_slice()),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct RenderedBackground {
    pub background: BackgroundImage,
    /// Set when the blank canvas was substituted for the selected image.
    pub warning: Option<PageWarning>,
}

/// Render the page background at exactly `target_width` x `target_height`.
///
/// The source image is stretched without preserving its aspect ratio.
/// With no source, or when the source cannot be decoded, a solid white
/// canvas is used instead and a warning is returned. Only failures to
/// encode or stage the PNG are errors.
pub fn render_background(
    handle: Option<&EmbeddedImage>,
    target_width: u32,
    target_height: u32,
    page_number: usize,
) -> Result<RenderedBackground, StoryPageError> {
    let (w, h) = (target_width.max(1), target_height.max(1));

    let Some(selected) = handle else {
        debug!("page {}: no background image, using blank canvas", page_number);
        let warning = PageWarning::new(
            page_number,
            WarningKind::BackgroundFallback,
            "no embedded image matches the background size; using a blank canvas",
        );
        return render_blank(w, h, Some(warning));
    };

    match decode_and_stretch(selected, w, h).and_then(|img| encode_png(&img)) {
        Ok(png) => {
            debug!(
                "page {}: background from image object {} ({}x{} -> {}x{})",
                page_number, selected.xref, selected.width, selected.height, w, h
            );
            Ok(RenderedBackground {
                background: BackgroundImage {
                    low_res_image: png.clone(),
                    image: png,
                    width: w,
                    height: h,
                    source: BackgroundSource::Embedded {
                        xref: selected.xref,
                    },
                },
                warning: None,
            })
        }
        Err(e) => {
            warn!(
                "page {}: background image object {} unusable ({}); using blank canvas",
                page_number, selected.xref, e
            );
            let warning = PageWarning::new(
                page_number,
                WarningKind::BackgroundFallback,
                format!("image object {}: {}", selected.xref, e),
            );
            render_blank(w, h, Some(warning))
        }
    }
}

fn render_blank(
    width: u32,
    height: u32,
    warning: Option<PageWarning>,
) -> Result<RenderedBackground, StoryPageError> {
    let canvas = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])));
    let png = encode_png(&canvas)?;
    Ok(RenderedBackground {
        background: BackgroundImage {
            low_res_image: png.clone(),
            image: png,
            width,
            height,
            source: BackgroundSource::Blank,
        },
        warning,
    })
}

fn decode_and_stretch(
    source: &EmbeddedImage,
    width: u32,
    height: u32,
) -> Result<DynamicImage, StoryPageError> {
    let data = source
        .data
        .as_deref()
        .ok_or_else(|| StoryPageError::ImageDecode("no samples were extracted".into()))?;
    let decoded =
        image::load_from_memory(data).map_err(|e| StoryPageError::ImageDecode(e.to_string()))?;
    let stretched = decoded.resize_exact(width, height, FilterType::Lanczos3);
    Ok(DynamicImage::ImageRgb8(stretched.to_rgb8()))
}

/// Encode as PNG through a scratch file that is removed on every exit path.
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, StoryPageError> {
    let staging = tempfile::Builder::new()
        .prefix("storypage-bg-")
        .suffix(".png")
        .tempfile()?;
    image.save_with_format(staging.path(), ImageFormat::Png)?;
    let bytes = std::fs::read(staging.path())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn embedded(xref: u32, width: u32, height: u32, data: Option<Vec<u8>>) -> EmbeddedImage {
        EmbeddedImage {
            xref,
            width,
            height,
            data,
        }
    }

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_select_empty() {
        assert!(select_background(&[], BACKGROUND_REFERENCE_SIZE).is_none());
    }

    #[test]
    fn test_select_requires_exact_size() {
        let images = vec![embedded(1, 1536, 1024, None), embedded(2, 2048, 2048, None)];
        assert!(select_background(&images, BACKGROUND_REFERENCE_SIZE).is_none());
    }

    #[test]
    fn test_select_keeps_last_match() {
        let images = vec![
            embedded(1, 1536, 1536, None),
            embedded(2, 300, 300, None),
            embedded(3, 1536, 1536, None),
        ];
        let chosen = select_background(&images, BACKGROUND_REFERENCE_SIZE).unwrap();
        assert_eq!(chosen.xref, 3);
    }

    #[test]
    fn test_render_none_is_white_canvas() {
        let rendered = render_background(None, 800, 1200, 1).unwrap();
        let bg = &rendered.background;
        assert_eq!(bg.source, BackgroundSource::Blank);
        assert_eq!(bg.image, bg.low_res_image);

        let decoded = image::load_from_memory(&bg.image).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (800, 1200));
        assert!(decoded.pixels().all(|p| p.0 == [255, 255, 255]));

        let warning = rendered.warning.unwrap();
        assert_eq!(warning.kind, WarningKind::BackgroundFallback);
    }

    #[test]
    fn test_render_stretches_to_target() {
        let source = embedded(7, 64, 16, Some(png_bytes(64, 16, [10, 200, 30])));
        let rendered = render_background(Some(&source), 30, 90, 2).unwrap();
        assert!(rendered.warning.is_none());
        assert_eq!(
            rendered.background.source,
            BackgroundSource::Embedded { xref: 7 }
        );

        let decoded = image::load_from_memory(&rendered.background.image)
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded.dimensions(), (30, 90));
        assert_eq!(decoded.get_pixel(15, 45).0, [10, 200, 30]);
    }

    #[test]
    fn test_render_undecodable_falls_back() {
        let source = embedded(9, 1536, 1536, Some(b"not an image".to_vec()));
        let rendered = render_background(Some(&source), 40, 50, 4).unwrap();
        assert_eq!(rendered.background.source, BackgroundSource::Blank);
        let warning = rendered.warning.unwrap();
        assert_eq!(warning.page_number, 4);
        assert!(warning.message.contains("image object 9"));

        let decoded = image::load_from_memory(&rendered.background.image).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 50));
    }

    #[test]
    fn test_render_missing_samples_falls_back() {
        let source = embedded(5, 1536, 1536, None);
        let rendered = render_background(Some(&source), 10, 10, 1).unwrap();
        assert_eq!(rendered.background.source, BackgroundSource::Blank);
        assert!(rendered.warning.is_some());
    }

    #[test]
    fn test_upload_files_keys() {
        let rendered = render_background(None, 4, 4, 1).unwrap();
        let files = rendered.background.upload_files();
        assert_eq!(files.keys().copied().collect::<Vec<_>>(), vec!["Image", "LowResImage"]);
    }
}

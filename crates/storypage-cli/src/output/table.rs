use storypage_core::extraction::BBox;
use storypage_core::inspect::PageSummary;

fn fmt_bbox(b: &BBox) -> String {
    format!("[{:.1}, {:.1}, {:.1}, {:.1}]", b.x0, b.y0, b.x1, b.y1)
}

pub fn print_summaries(summaries: &[PageSummary]) {
    for (i, page) in summaries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "=== Page {} ({:.0} x {:.0}) ===\n",
            page.page_number, page.width, page.height
        );

        if page.contains_text {
            println!("  Text boxes: {}", page.text_bboxes.len());
            println!("  Text width: {:.1}", page.text_width);
            if let Some(size) = page.font_size {
                println!("  Font size:  {}", size);
            }
            if let Some(ref color) = page.text_color {
                println!("  Text color: {}", color);
            }
            println!();

            for (n, (bbox, center)) in page.text_bboxes.iter().zip(&page.centers).enumerate() {
                let font = page
                    .font_names
                    .get(&(n + 1))
                    .map(String::as_str)
                    .unwrap_or("-");
                println!(
                    "  {:>2}. {}  center ({:.1}, {:.1})  {}",
                    n + 1,
                    fmt_bbox(bbox),
                    center.0,
                    center.1,
                    font
                );
            }
            println!();
        } else {
            println!("  No text\n");
        }

        if page.contains_images {
            println!("  Image placements: {}", page.image_rects.len());
            for rect in &page.image_rects {
                println!("    {}", fmt_bbox(rect));
            }
            if let Some(ref rect) = page.character_image_rect {
                println!("  Character image: {}", fmt_bbox(rect));
            }
            for img in &page.embedded_images {
                let samples = if img.has_samples { "" } else { " (no samples)" };
                println!(
                    "    xref {}: {} x {}{}",
                    img.xref, img.width, img.height, samples
                );
            }
        } else {
            println!("  No images");
        }
    }
}

use storypage_core::background::BACKGROUND_REFERENCE_SIZE;
use storypage_core::error::StoryPageError;
use storypage_core::extraction::mutool::MutoolExtractor;
use storypage_core::fonts;
use storypage_core::payload::template::load_template;
use storypage_core::DescribeOptions;
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct DescribeArgs {
    pub pdf_file: PathBuf,
    pub out_dir: PathBuf,
    pub fonts: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub max_text_elements: usize,
    pub story_template_id: Option<i64>,
}

pub fn run(args: DescribeArgs) -> Result<(), StoryPageError> {
    let font_table = match &args.fonts {
        Some(path) => fonts::load_font_table(path)?,
        None => fonts::builtin::load_preset("default")?,
    };
    let template = args.template.as_deref().map(load_template).transpose()?;

    let options = DescribeOptions {
        max_text_elements: args.max_text_elements,
        background_size: BACKGROUND_REFERENCE_SIZE,
        story_template_id: args.story_template_id,
    };

    let pdf_bytes = std::fs::read(&args.pdf_file)?;
    let extractor = MutoolExtractor::with_sample_size(options.background_size);
    let doc = storypage_core::describe_pdf(&pdf_bytes, &extractor, &font_table, &options)?;

    std::fs::create_dir_all(&args.out_dir)?;

    if let Some(ref template) = template {
        let path = args.out_dir.join("template.json");
        std::fs::write(&path, serde_json::to_string_pretty(template)?)?;
    }

    let mut manifest = Vec::new();
    for page in &doc.pages {
        let record_name = format!("page-{:03}.json", page.page_number);
        std::fs::write(
            args.out_dir.join(&record_name),
            serde_json::to_string_pretty(&page.record)?,
        )?;

        // Upload field -> file name, as referenced from the record.
        let mut uploads = BTreeMap::new();
        for (field, bytes) in page.background.upload_files() {
            let file_name = match field {
                "Image" => &page.record.image,
                _ => &page.record.low_res_image,
            };
            std::fs::write(args.out_dir.join(file_name), bytes)?;
            debug!("wrote {} ({} bytes)", file_name, bytes.len());
            uploads.insert(field, file_name.clone());
        }

        manifest.push(serde_json::json!({
            "page_number": page.page_number,
            "record": record_name,
            "files": uploads,
        }));
    }

    let manifest_json = serde_json::json!({
        "source": args.pdf_file.display().to_string(),
        "template": template.as_ref().map(|_| "template.json"),
        "pages": manifest,
    });
    std::fs::write(
        args.out_dir.join("manifest.json"),
        serde_json::to_string_pretty(&manifest_json)?,
    )?;

    eprintln!(
        "Described {} page(s), written to {}",
        doc.pages.len(),
        args.out_dir.display()
    );
    for w in doc.warnings() {
        eprintln!("  warning: page {}: {}", w.page_number, w.message);
    }

    if !doc.failures.is_empty() {
        for f in &doc.failures {
            eprintln!("  failed: page {}: {}", f.page_number, f.reason);
        }
        return Err(StoryPageError::PagesFailed {
            failed: doc.failures.len(),
            total: doc.pages.len() + doc.failures.len(),
        });
    }

    Ok(())
}

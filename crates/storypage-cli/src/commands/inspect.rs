use storypage_core::extraction::mutool::MutoolExtractor;
use storypage_core::payload::DEFAULT_MAX_TEXT_ELEMENTS;
use std::path::PathBuf;

use crate::output;

pub fn run(pdf_file: PathBuf, output_format: &str) -> Result<(), storypage_core::error::StoryPageError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = MutoolExtractor::new();
    let summaries =
        storypage_core::inspect_pdf(&pdf_bytes, &extractor, DEFAULT_MAX_TEXT_ELEMENTS)?;

    match output_format {
        "json" => output::json::print(&summaries)?,
        _ => output::table::print_summaries(&summaries),
    }

    Ok(())
}

use storypage_core::payload::template::load_template;
use std::path::Path;

use crate::output;

pub fn run(file: &Path) -> Result<(), storypage_core::error::StoryPageError> {
    let template = load_template(file)?;
    output::json::print(&template)
}

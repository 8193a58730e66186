use storypage_core::fonts::builtin;
use std::path::Path;

pub fn list() -> Result<(), storypage_core::error::StoryPageError> {
    println!("Available font tables:\n");
    for name in builtin::PRESETS {
        let table = builtin::load_preset(name)?;
        println!("  {:<8} {} (v{})", name, table.name, table.version);
        if let Some(ref desc) = table.description {
            println!("           {}", desc);
        }
        let width = table.fonts.keys().map(|k| k.len()).max().unwrap_or(10);
        for (font, file) in &table.fonts {
            println!("           {:<width$}  -> {}", font, file, width = width);
        }
        println!();
    }
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), storypage_core::error::StoryPageError> {
    let table = storypage_core::fonts::load_font_table(file)?;

    println!("Font table '{}' (v{}) is valid.", table.name, table.version);
    println!("  Fonts: {}", table.fonts.len());

    // Two identifiers sharing a file is allowed, but usually a copy-paste slip.
    let mut by_file: std::collections::BTreeMap<&str, Vec<&str>> = Default::default();
    for (font, file) in &table.fonts {
        by_file.entry(file.as_str()).or_default().push(font.as_str());
    }
    let warnings: Vec<String> = by_file
        .iter()
        .filter(|(_, fonts)| fonts.len() > 1)
        .map(|(file, fonts)| format!("'{}' is used by {}", file, fonts.join(", ")))
        .collect();

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

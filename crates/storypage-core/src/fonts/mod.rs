pub mod builtin;
pub mod schema;

use crate::error::StoryPageError;
use schema::FontTableDef;
use std::path::Path;

/// Load a font table from a JSON file.
pub fn load_font_table(path: &Path) -> Result<FontTableDef, StoryPageError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoryPageError::FontTableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_font_table(&content, path)
}

/// Parse a font table from a JSON string.
pub fn parse_font_table(json: &str, source: &Path) -> Result<FontTableDef, StoryPageError> {
    let table: FontTableDef =
        serde_json::from_str(json).map_err(|e| StoryPageError::FontTableLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_font_table(&table)?;
    Ok(table)
}

/// Parse a font table from a JSON string (no file path context).
pub fn parse_font_table_str(json: &str) -> Result<FontTableDef, StoryPageError> {
    let table: FontTableDef = serde_json::from_str(json).map_err(StoryPageError::Json)?;
    validate_font_table(&table)?;
    Ok(table)
}

/// Validate that a font table is well-formed.
pub fn validate_font_table(table: &FontTableDef) -> Result<(), StoryPageError> {
    if table.name.trim().is_empty() {
        return Err(StoryPageError::FontTableInvalid(
            "name must not be empty".into(),
        ));
    }

    if table.fonts.is_empty() {
        return Err(StoryPageError::FontTableInvalid(
            "fonts must not be empty".into(),
        ));
    }

    for (font, file) in &table.fonts {
        if font.trim().is_empty() {
            return Err(StoryPageError::FontTableInvalid(
                "font identifier must not be empty".into(),
            ));
        }
        if file.trim().is_empty() {
            return Err(StoryPageError::FontTableInvalid(format!(
                "font '{}' has an empty file name",
                font
            )));
        }
        if file.contains('/') || file.contains('\\') {
            return Err(StoryPageError::FontTableInvalid(format!(
                "font '{}' maps to '{}', expected a bare file name",
                font, file
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_table() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "fonts": { "Fredoka-Bold": "Fredoka-Bold.ttf" }
        }"#;
        let table = parse_font_table_str(json).unwrap();
        assert_eq!(table.name, "Test");
        assert_eq!(table.resolve("Fredoka-Bold"), Some("Fredoka-Bold.ttf"));
        assert_eq!(table.resolve("Helvetica"), None);
    }

    #[test]
    fn test_resolve_strips_subset_tag() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "fonts": { "Fredoka-Bold": "Fredoka-Bold.ttf" }
        }"#;
        let table = parse_font_table_str(json).unwrap();
        assert_eq!(table.resolve("ABCDEF+Fredoka-Bold"), Some("Fredoka-Bold.ttf"));
        assert_eq!(table.resolve("abcdef+Fredoka-Bold"), None);
    }

    #[test]
    fn test_empty_fonts_rejected() {
        let json = r#"{ "name": "Bad", "version": "1.0", "fonts": {} }"#;
        assert!(parse_font_table_str(json).is_err());
    }

    #[test]
    fn test_path_in_file_name_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "fonts": { "Fredoka-Bold": "fonts/Fredoka-Bold.ttf" }
        }"#;
        assert!(matches!(
            parse_font_table_str(json),
            Err(StoryPageError::FontTableInvalid(_))
        ));
    }
}

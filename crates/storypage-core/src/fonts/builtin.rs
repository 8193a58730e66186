use crate::error::StoryPageError;
use crate::fonts::schema::FontTableDef;

const DEFAULT_FONTS_JSON: &str = include_str!("../../../../fonts/default.json");

/// Available predefined font tables.
pub const PRESETS: &[&str] = &["default"];

/// Load a predefined font table by name.
pub fn load_preset(name: &str) -> Result<FontTableDef, StoryPageError> {
    match name {
        "default" => {
            let table: FontTableDef = serde_json::from_str(DEFAULT_FONTS_JSON)?;
            Ok(table)
        }
        _ => Err(StoryPageError::FontTableInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

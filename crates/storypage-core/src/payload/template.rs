use crate::error::StoryPageError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Story template record, as posted to the template API.
///
/// The same shape is used for the template file read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateRecord {
    pub theme_id: i64,
    #[serde(default)]
    pub is_trending: bool,
    pub font_program1: String,
    pub font_program2: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub gender: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub original_character_name: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub original_description: String,
}

/// Load and validate a template record from a JSON file.
pub fn load_template(path: &Path) -> Result<TemplateRecord, StoryPageError> {
    let content = std::fs::read_to_string(path)?;
    parse_template_str(&content)
}

/// Parse and validate a template record from a JSON string.
pub fn parse_template_str(json: &str) -> Result<TemplateRecord, StoryPageError> {
    let template: TemplateRecord = serde_json::from_str(json)?;
    validate_template(&template)?;
    Ok(template)
}

pub fn validate_template(template: &TemplateRecord) -> Result<(), StoryPageError> {
    if template.title.trim().is_empty() {
        return Err(StoryPageError::TemplateInvalid(
            "Title must not be empty".into(),
        ));
    }

    for (field, value) in [
        ("FontProgram1", &template.font_program1),
        ("FontProgram2", &template.font_program2),
    ] {
        if value.trim().is_empty() {
            return Err(StoryPageError::TemplateInvalid(format!(
                "{} must not be empty",
                field
            )));
        }
    }

    if template.price < Decimal::ZERO {
        return Err(StoryPageError::TemplateInvalid(format!(
            "Price must not be negative (got {})",
            template.price
        )));
    }

    Ok(())
}

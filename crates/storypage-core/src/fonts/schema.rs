use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A lookup table from PDF font identifiers to distributable font files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontTableDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Map of internal font identifier -> font file name.
    pub fonts: BTreeMap<String, String>,
}

impl FontTableDef {
    /// Resolve a font identifier to its file name.
    ///
    /// Falls back to the identifier without a subset tag (`ABCDEF+Name`).
    pub fn resolve(&self, font: &str) -> Option<&str> {
        if let Some(file) = self.fonts.get(font) {
            return Some(file.as_str());
        }
        strip_subset_tag(font)
            .and_then(|base| self.fonts.get(base))
            .map(|file| file.as_str())
    }
}

fn strip_subset_tag(font: &str) -> Option<&str> {
    let (tag, base) = font.split_once('+')?;
    if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) {
        Some(base)
    } else {
        None
    }
}

use crate::fonts::schema::FontTableDef;

/// Map a span's font identifier to a distributable font file name.
///
/// Unknown or missing fonts map to `None`.
pub fn map_font(table: &FontTableDef, font: Option<&str>) -> Option<String> {
    font.and_then(|f| table.resolve(f)).map(str::to_string)
}

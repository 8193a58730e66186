/// Render a packed 0xRRGGBB color as `#rrggbb`.
///
/// Only the low 24 bits are used. A missing color stays missing.
pub fn map_color(color: Option<u32>) -> Option<String> {
    color.map(|c| format!("#{:06x}", c & 0x00ff_ffff))
}

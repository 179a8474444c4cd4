use anyhow::Result;

use quill_geometry::LayoutRect;

/// A rasterized glyph, placed in layout space.
///
/// The source rectangle is in atlas texels, the destination origin in layout pixels. The
/// destination size equals the source size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub source_x: u32,
    pub source_y: u32,
    pub width: u32,
    pub height: u32,
    pub dest_x: f32,
    pub dest_y: f32,
}

impl PositionedGlyph {
    pub fn new(source: (u32, u32), size: (u32, u32), dest: (f32, f32)) -> Self {
        Self {
            source_x: source.0,
            source_y: source.1,
            width: size.0,
            height: size.1,
            dest_x: dest.0,
            dest_y: dest.1,
        }
    }
}

/// Shapes text and places the glyph bitmaps into the atlas.
///
/// Implementations decide where glyphs are stored in the atlas and what happens when it is full.
/// For the same inputs they must produce the same glyphs in the same order.
pub trait GlyphLayoutSource {
    type Font: ?Sized;

    /// Lays out `text` inside `bounds`.
    ///
    /// The returned glyphs are consumed once, in order.
    fn layout(
        &mut self,
        font: &Self::Font,
        text: &str,
        size: f32,
        bounds: LayoutRect,
    ) -> Result<impl Iterator<Item = PositionedGlyph>>;
}

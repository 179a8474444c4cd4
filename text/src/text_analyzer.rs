use anyhow::Result;
use cosmic_text::{AttrsList, BufferLine, FontSystem, LineEnding, Shaping, Wrap};

use quill_geometry::{LayoutPoint, LayoutRect};
use quill_renderer::{GlyphAtlas, GlyphLayoutSource, PositionedGlyph};

use crate::{FontFace, GlyphPacker, PackedGlyph};

/// Shapes and wraps text with cosmic-text and places its glyphs into the atlas.
pub struct TextAnalyzer<'a> {
    pub font_system: &'a mut FontSystem,
    pub packer: &'a mut GlyphPacker,
    pub atlas: &'a GlyphAtlas,
    pub queue: &'a wgpu::Queue,
}

impl GlyphLayoutSource for TextAnalyzer<'_> {
    type Font = FontFace;

    fn layout(
        &mut self,
        font: &FontFace,
        text: &str,
        size: f32,
        bounds: LayoutRect,
    ) -> Result<impl Iterator<Item = PositionedGlyph>> {
        let attrs = font.to_attrs();
        let mut line = BufferLine::new(
            text,
            LineEnding::None,
            AttrsList::new(&attrs),
            Shaping::Advanced,
        );
        let layout_lines = line.layout(
            self.font_system,
            size,
            Some(bounds.width()),
            Wrap::Word,
            None,
            0,
        );

        let mut glyphs = Vec::with_capacity(text.len());
        let mut line_top = 0.0;
        for layout_line in layout_lines {
            if line_top > bounds.height() {
                break;
            }
            let baseline = line_top + layout_line.max_ascent;

            for glyph in &layout_line.glyphs {
                let physical = glyph.physical((0.0, 0.0), 1.0);
                let packed =
                    self.packer
                        .pack(self.font_system, self.atlas, self.queue, physical.cache_key)?;
                if let Some(packed) = packed {
                    glyphs.push(place_glyph(
                        bounds.origin,
                        baseline,
                        (physical.x, physical.y),
                        &packed,
                    ));
                }
            }

            line_top = baseline + layout_line.max_descent;
        }

        Ok(glyphs.into_iter())
    }
}

/// Positions the bitmap of a packed glyph relative to the pen on the baseline of its line.
fn place_glyph(
    origin: LayoutPoint,
    baseline: f32,
    pen: (i32, i32),
    packed: &PackedGlyph,
) -> PositionedGlyph {
    let dest_x = origin.x + (pen.0 + packed.left) as f32;
    let dest_y = origin.y + baseline + (pen.1 - packed.top) as f32;

    PositionedGlyph::new(
        (packed.atlas_x, packed.atlas_y),
        (packed.width, packed.height),
        (dest_x, dest_y),
    )
}

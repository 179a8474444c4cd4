use std::ops::Range;

use anyhow::Result;

use quill_geometry::{LayoutRect, Rgba8};

use crate::{
    layout_source::{GlyphLayoutSource, PositionedGlyph},
    pods::TextVertex,
    tools::QuadIndices,
};

/// The CPU side of a text buffer: the vertices of the current text and the indices of every quad
/// slot that was ever used.
///
/// Appending replaces the vertices, it does not concatenate. The indices only grow.
#[derive(Debug, Default)]
pub struct TextMesh {
    vertices: Vec<TextVertex>,
    quad_count: usize,
    indices: QuadIndices,
}

impl TextMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lays out `text` and replaces the mesh with its glyphs.
    ///
    /// Returns the quad slots for which indices had to be generated.
    #[allow(clippy::too_many_arguments)]
    pub fn append<L: GlyphLayoutSource>(
        &mut self,
        layout: &mut L,
        font: &L::Font,
        text: &str,
        size: f32,
        atlas_width: u32,
        bounds: LayoutRect,
        color: Rgba8,
    ) -> Result<Range<usize>> {
        let glyphs = layout.layout(font, text, size, bounds)?;
        self.rebuild(glyphs, atlas_width, color)
    }

    /// Replaces the mesh with the quads of `glyphs`.
    ///
    /// If this fails, the previous mesh stays.
    pub fn rebuild(
        &mut self,
        glyphs: impl IntoIterator<Item = PositionedGlyph>,
        atlas_width: u32,
        color: Rgba8,
    ) -> Result<Range<usize>> {
        let vertices: Vec<TextVertex> = glyphs
            .into_iter()
            .flat_map(|glyph| glyph_quad(&glyph, atlas_width, color))
            .collect();

        let quad_count = vertices.len() / QuadIndices::VERTICES_PER_QUAD;
        let new_slots = self.indices.ensure_quads(quad_count)?;

        self.vertices = vertices;
        self.quad_count = quad_count;
        Ok(new_slots)
    }

    /// Hides the text. No storage is released.
    pub fn clear(&mut self) {
        self.quad_count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.quad_count == 0
    }

    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// The number of indices a draw of this mesh uses.
    pub fn index_count(&self) -> usize {
        self.quad_count * QuadIndices::INDICES_PER_QUAD
    }

    /// The vertices of the last successful append (still present after [`Self::clear`]).
    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &QuadIndices {
        &self.indices
    }

    /// The high-water mark of quads indices were generated for.
    pub fn filled_quads(&self) -> usize {
        self.indices.filled_quads()
    }
}

/// The four vertices of a glyph: bottom-left, bottom-right, top-right, top-left.
///
/// Texture coordinates of both axes are normalized by the width of the (square) atlas.
pub fn glyph_quad(glyph: &PositionedGlyph, atlas_width: u32, color: Rgba8) -> [TextVertex; 4] {
    let (width, height) = (glyph.width as f32, glyph.height as f32);
    let (left, top) = (glyph.dest_x, glyph.dest_y);
    let (right, bottom) = (left + width, top + height);

    // The source rectangle is not validated, so its edges may exceed u32.
    let atlas_width = atlas_width as f64;
    let normalize = |texel: f64| (texel / atlas_width) as f32;
    let (source_x, source_y) = (glyph.source_x as f64, glyph.source_y as f64);
    let u0 = normalize(source_x);
    let v0 = normalize(source_y);
    let u1 = normalize(source_x + glyph.width as f64);
    let v1 = normalize(source_y + glyph.height as f64);

    [
        TextVertex::new((left, bottom), (u0, v1), color),
        TextVertex::new((right, bottom), (u1, v1), color),
        TextVertex::new((right, top), (u1, v0), color),
        TextVertex::new((left, top), (u0, v0), color),
    ]
}

#[cfg(test)]
mod tests {
    use std::iter;

    use anyhow::anyhow;
    use euclid::rect;

    use super::*;

    const ATLAS_WIDTH: u32 = 2048;

    /// Every non-space character becomes a 10x12 glyph with a 8 pixel advance. The atlas slot of
    /// a character is derived from its code point.
    struct FixedAdvanceLayout {
        calls: usize,
    }

    struct TestFont;

    impl GlyphLayoutSource for FixedAdvanceLayout {
        type Font = TestFont;

        fn layout(
            &mut self,
            _font: &TestFont,
            text: &str,
            _size: f32,
            bounds: LayoutRect,
        ) -> Result<impl Iterator<Item = PositionedGlyph>> {
            self.calls += 1;
            let origin = bounds.origin;
            Ok(text
                .chars()
                .enumerate()
                .filter(|(_, c)| !c.is_whitespace())
                .map(move |(i, c)| {
                    let code = c as u32;
                    PositionedGlyph::new(
                        ((code % 128) * 10, (code / 128) * 12),
                        (10, 12),
                        (origin.x + i as f32 * 8.0, origin.y),
                    )
                }))
        }
    }

    struct FailingLayout;

    impl GlyphLayoutSource for FailingLayout {
        type Font = TestFont;

        fn layout(
            &mut self,
            _font: &TestFont,
            _text: &str,
            _size: f32,
            _bounds: LayoutRect,
        ) -> Result<impl Iterator<Item = PositionedGlyph>> {
            Err::<iter::Empty<PositionedGlyph>, _>(anyhow!("Font has no glyphs"))
        }
    }

    fn append(mesh: &mut TextMesh, text: &str) -> Range<usize> {
        let mut layout = FixedAdvanceLayout { calls: 0 };
        mesh.append(
            &mut layout,
            &TestFont,
            text,
            36.0,
            ATLAS_WIDTH,
            rect(50.0, 50.0, 400.0, 400.0),
            Rgba8::WHITE,
        )
        .unwrap()
    }

    fn glyphs(n: usize) -> Vec<PositionedGlyph> {
        (0..n)
            .map(|i| PositionedGlyph::new((i as u32 * 4, 0), (4, 4), (i as f32 * 5.0, 0.0)))
            .collect()
    }

    #[test]
    fn quad_corners_are_emitted_in_fixed_order() {
        let glyph = PositionedGlyph::new((0, 0), (10, 20), (100.0, 200.0));
        let quad = glyph_quad(&glyph, ATLAS_WIDTH, Rgba8::WHITE);

        let positions: Vec<_> = quad.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            [[100.0, 220.0], [110.0, 220.0], [110.0, 200.0], [100.0, 200.0]]
        );
    }

    #[test]
    fn texture_coordinates_are_normalized_by_the_atlas_width() {
        let glyph = PositionedGlyph::new((7, 13), (5, 9), (0.0, 0.0));
        let atlas_width = 100;
        let quad = glyph_quad(&glyph, atlas_width, Rgba8::WHITE);

        let s = atlas_width as f32;
        let (u0, v0, u1, v1) = (7.0 / s, 13.0 / s, 12.0 / s, 22.0 / s);
        let tex_coords: Vec<_> = quad.iter().map(|v| v.tex_coords).collect();
        assert_eq!(tex_coords, [[u0, v1], [u1, v1], [u1, v0], [u0, v0]]);
    }

    #[test]
    fn texture_coordinates_are_not_clamped() {
        let glyph = PositionedGlyph::new((90, 95), (20, 10), (0.0, 0.0));
        let quad = glyph_quad(&glyph, 100, Rgba8::WHITE);

        assert_eq!(quad[1].tex_coords, [1.1, 1.05]);
    }

    #[test]
    fn source_rectangles_at_the_end_of_the_u32_range_do_not_overflow() {
        let glyph = PositionedGlyph::new((u32::MAX - 2, u32::MAX - 1), (4, 4), (0.0, 0.0));
        let quad = glyph_quad(&glyph, 2048, Rgba8::WHITE);

        let u1 = ((u32::MAX as f64 + 2.0) / 2048.0) as f32;
        let v1 = ((u32::MAX as f64 + 3.0) / 2048.0) as f32;
        assert_eq!(quad[1].tex_coords, [u1, v1]);
    }

    #[test]
    fn all_corners_share_the_color() {
        let color = Rgba8::new(10, 20, 30, 40);
        let quad = glyph_quad(&glyphs(1)[0], ATLAS_WIDTH, color);
        assert!(quad.iter().all(|v| v.color == color));
    }

    #[test]
    fn append_builds_one_quad_per_glyph() {
        let mut mesh = TextMesh::new();
        let new_slots = append(&mut mesh, "Hello Quill");

        assert_eq!(mesh.quad_count(), 10);
        assert_eq!(mesh.vertices().len(), 40);
        assert_eq!(mesh.index_count(), 60);
        assert_eq!(new_slots, 0..10);
    }

    #[test]
    fn append_replaces_the_previous_text() {
        let mut mesh = TextMesh::new();
        append(&mut mesh, "abcdefgh");
        append(&mut mesh, "xyz");

        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.index_count(), 18);
        assert_eq!(mesh.vertices().len(), 12);

        let mut expected = TextMesh::new();
        append(&mut expected, "xyz");
        assert_eq!(mesh.vertices(), expected.vertices());
    }

    #[test]
    fn shorter_appends_reuse_generated_indices() {
        let mut mesh = TextMesh::new();

        let generated: usize = ["abcdef", "ab", "abcdefghij", "a", "abcdefghij"]
            .iter()
            .map(|text| append(&mut mesh, text).len())
            .sum();

        assert_eq!(generated, 10);
        assert_eq!(mesh.filled_quads(), 10);
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn clear_keeps_the_generated_indices() {
        let mut mesh = TextMesh::new();
        assert_eq!(append(&mut mesh, "0123456789"), 0..10);

        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.index_count(), 0);
        assert_eq!(mesh.filled_quads(), 10);

        assert!(append(&mut mesh, "9876543210").is_empty());
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn empty_text_results_in_an_empty_mesh() {
        let mut mesh = TextMesh::new();
        append(&mut mesh, "abc");

        let new_slots = append(&mut mesh, "");
        assert!(new_slots.is_empty());
        assert_eq!(mesh.quad_count(), 0);
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.vertices().is_empty());
        assert_eq!(mesh.filled_quads(), 3);
    }

    #[test]
    fn layout_errors_are_propagated_and_keep_the_mesh() {
        let mut mesh = TextMesh::new();
        append(&mut mesh, "abc");

        let result = mesh.append(
            &mut FailingLayout,
            &TestFont,
            "def",
            12.0,
            ATLAS_WIDTH,
            rect(0.0, 0.0, 10.0, 10.0),
            Rgba8::WHITE,
        );

        assert!(result.is_err());
        assert_eq!(mesh.quad_count(), 3);
    }

    #[test]
    fn too_many_glyphs_keep_the_previous_mesh() {
        let mut mesh = TextMesh::new();
        mesh.rebuild(glyphs(4), ATLAS_WIDTH, Rgba8::WHITE).unwrap();
        let before = mesh.vertices().to_vec();

        let result = mesh.rebuild(
            glyphs(QuadIndices::MAX_QUADS + 1),
            ATLAS_WIDTH,
            Rgba8::WHITE,
        );

        assert!(result.is_err());
        assert_eq!(mesh.quad_count(), 4);
        assert_eq!(mesh.vertices(), before.as_slice());
        assert_eq!(mesh.filled_quads(), 4);
    }

    #[test]
    fn layout_is_asked_once_per_append() {
        let mut mesh = TextMesh::new();
        let mut layout = FixedAdvanceLayout { calls: 0 };
        for text in ["a", "bb", "ccc"] {
            mesh.append(
                &mut layout,
                &TestFont,
                text,
                12.0,
                ATLAS_WIDTH,
                rect(0.0, 0.0, 100.0, 100.0),
                Rgba8::WHITE,
            )
            .unwrap();
        }

        assert_eq!(layout.calls, 3);
        assert_eq!(mesh.quad_count(), 3);
    }
}

//! Glyph layout for the quill text renderer, built on cosmic-text.
//!
//! [`TextAnalyzer`] shapes and wraps text, and packs the rasterized glyphs into a
//! [`quill_renderer::GlyphAtlas`] through a [`GlyphPacker`].

mod font_face;
mod glyph_packer;
mod text_analyzer;

pub use font_face::*;
pub use glyph_packer::*;
pub use text_analyzer::*;

pub use cosmic_text::FontSystem;

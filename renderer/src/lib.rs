//! GPU text rendering from a single page glyph atlas.
//!
//! A [`TextBuffer`] turns the glyphs a [`GlyphLayoutSource`] places into the [`GlyphAtlas`] into
//! textured quads and draws them with one indexed draw call.

pub mod config;
mod context;
mod glyph_atlas;
mod layout_source;
pub mod pods;
mod render_device;
mod text_buffer;
mod text_mesh;
mod text_renderer;
pub mod tools;

pub use config::TextRendererConfig;
pub use context::*;
pub use glyph_atlas::*;
pub use layout_source::*;
pub use render_device::*;
pub use text_buffer::*;
pub use text_mesh::*;
pub use text_renderer::*;

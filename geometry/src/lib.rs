//! Geometry primitives shared by the text renderer and its layout collaborators.

mod color;
mod projection;

pub use color::*;
pub use projection::*;

pub type Matrix4 = glam::Mat4;

/// Layout space, in which glyph quads are positioned before projection.
pub struct LayoutUnit;
pub type LayoutRect = euclid::Rect<f32, LayoutUnit>;
pub type LayoutPoint = euclid::Point2D<f32, LayoutUnit>;

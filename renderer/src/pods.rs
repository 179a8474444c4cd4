use std::{
    fmt,
    mem::{self, size_of},
};

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexStepMode};

use quill_geometry::Rgba8;

// We need this for Rust to store our data correctly for the shaders
#[repr(C)]
// This is so we can store this in a buffer
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Matrix4(pub [[f32; 4]; 4]);

// WebGL uniform requirement
const_assert_eq!(size_of::<Matrix4>() % 16, 0);

impl From<quill_geometry::Matrix4> for Matrix4 {
    fn from(value: quill_geometry::Matrix4) -> Self {
        Self(value.to_cols_array_2d())
    }
}

/// Per draw information about the atlas the text is sampled from.
///
/// The fragment shader uses the size to convert normalized texture coordinates back to texels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct AtlasInfo {
    pub size: [f32; 2],
    pub padding: [f32; 2],
}

// WebGL uniform requirement
const_assert_eq!(size_of::<AtlasInfo>() % 16, 0);

impl AtlasInfo {
    /// Atlas info for a square atlas.
    pub fn new(atlas_width: u32) -> Self {
        let width = atlas_width as f32;
        Self {
            size: [width, width],
            padding: [0.0, 0.0],
        }
    }
}

/// One corner of a glyph quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    pub position: [f32; 2],
    /// Normalized by the atlas width.
    pub tex_coords: [f32; 2],
    pub color: Rgba8,
}

const_assert_eq!(size_of::<TextVertex>(), 20);

impl TextVertex {
    pub fn new(position: (f32, f32), uv: (f32, f32), color: Rgba8) -> Self {
        Self {
            position: [position.0, position.1],
            tex_coords: [uv.0, uv.1],
            color,
        }
    }
}

pub trait VertexLayout {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

impl VertexLayout for TextVertex {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRS: [VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Unorm8x4];

        VertexBufferLayout {
            array_stride: size_of::<TextVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &ATTRS,
        }
    }
}

pub trait AsBytes {
    fn as_bytes(&self) -> &[u8];
    fn size<R: TryFrom<usize> + fmt::Debug>() -> R
    where
        R::Error: fmt::Debug;
}

impl<T: Pod> AsBytes for T {
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    fn size<R: TryFrom<usize>>() -> R
    where
        R::Error: fmt::Debug,
    {
        mem::size_of::<Self>()
            .try_into()
            .expect("Failed to convert usize to the required size type")
    }
}

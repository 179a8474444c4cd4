use quill_geometry::Matrix4;

/// The context needed to create and update GPU resources.
pub struct PreparationContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

/// The context of a render pass.
///
/// The projection is global to the pass, it's set by the caller before text buffers render.
pub struct RenderContext<'a> {
    pub queue: &'a wgpu::Queue,
    pub projection: Matrix4,
    pub pass: wgpu::RenderPass<'a>,
}

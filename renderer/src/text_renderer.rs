use derive_more::Deref;

use crate::{
    bind_group_entries,
    glyph_atlas::GlyphAtlas,
    pods::{self, AsBytes, TextVertex, VertexLayout},
    tools::{BindGroupLayoutBuilder, create_pipeline},
};

/// The pipeline and bind group layouts shared by all text buffers.
///
/// Text is alpha blended over the render target. The blend state belongs to this pipeline, so it
/// only affects the draws of text buffers.
#[derive(Debug)]
pub struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    atlas_bind_group_layout: AtlasBindGroupLayout,
    atlas_info_bind_group_layout: AtlasInfoBindGroupLayout,
}

impl TextRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let atlas_bind_group_layout = AtlasBindGroupLayout::new(device);
        let atlas_info_bind_group_layout = AtlasInfoBindGroupLayout::new(device);

        let shader = &device.create_shader_module(wgpu::include_wgsl!("text_renderer.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts: &[&atlas_bind_group_layout, &atlas_info_bind_group_layout],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX,
                range: 0..pods::Matrix4::size(),
            }],
        });

        let targets = [Some(wgpu::ColorTargetState {
            format: target_format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let vertex_layout = [TextVertex::layout()];

        let pipeline = create_pipeline(
            "Text Pipeline",
            device,
            shader,
            &vertex_layout,
            &pipeline_layout,
            &targets,
        );

        Self {
            pipeline,
            atlas_bind_group_layout,
            atlas_info_bind_group_layout,
        }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Creates the binding text buffers sample the atlas through.
    pub fn bind_atlas(&self, device: &wgpu::Device, atlas: &GlyphAtlas) -> AtlasBinding {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glyph Atlas Bind Group"),
            layout: &self.atlas_bind_group_layout,
            entries: bind_group_entries!(0 => atlas.texture_view()),
        });

        AtlasBinding {
            bind_group,
            width: atlas.width(),
        }
    }

    pub(crate) fn create_atlas_info_bind_group(
        &self,
        device: &wgpu::Device,
        atlas_info: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Atlas Info Bind Group"),
            layout: &self.atlas_info_bind_group_layout,
            entries: bind_group_entries!(0 => atlas_info),
        })
    }
}

/// A glyph atlas, bound for sampling.
#[derive(Debug)]
pub struct AtlasBinding {
    bind_group: wgpu::BindGroup,
    width: u32,
}

impl AtlasBinding {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

#[derive(Debug, Deref)]
struct AtlasBindGroupLayout(wgpu::BindGroupLayout);

impl AtlasBindGroupLayout {
    fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::fragment()
            .texture_2d()
            .build("Glyph Atlas Bind Group Layout", device);

        Self(layout)
    }
}

#[derive(Debug, Deref)]
struct AtlasInfoBindGroupLayout(wgpu::BindGroupLayout);

impl AtlasInfoBindGroupLayout {
    fn new(device: &wgpu::Device) -> Self {
        let layout = BindGroupLayoutBuilder::fragment()
            .uniform()
            .build("Atlas Info Bind Group Layout", device);

        Self(layout)
    }
}

use anyhow::Result;
use wgpu::util::{BufferInitDescriptor, DeviceExt};

use quill_geometry::{Color, LayoutRect};

use crate::{
    context::{PreparationContext, RenderContext},
    layout_source::GlyphLayoutSource,
    pods::{AsBytes, AtlasInfo, Matrix4, TextVertex},
    text_mesh::TextMesh,
    text_renderer::{AtlasBinding, TextRenderer},
    tools::{QuadIndexBuffer, QuadIndices},
};

/// A piece of text, ready to be drawn with one indexed draw call.
///
/// All GPU buffers are owned and released when the text buffer is dropped. The atlas is only
/// referenced through the binding passed to [`Self::render`].
#[derive(Debug)]
pub struct TextBuffer {
    mesh: TextMesh,
    vertex_buffer: wgpu::Buffer,
    index_buffer: QuadIndexBuffer,
    atlas_info: wgpu::Buffer,
    atlas_info_bind_group: wgpu::BindGroup,
}

impl TextBuffer {
    pub const DEFAULT_QUAD_CAPACITY: usize = 64;

    pub fn new(device: &wgpu::Device, renderer: &TextRenderer) -> Self {
        Self::with_capacity(device, renderer, Self::DEFAULT_QUAD_CAPACITY)
    }

    /// Creates an empty text buffer with index storage for `quad_capacity` quads.
    pub fn with_capacity(
        device: &wgpu::Device,
        renderer: &TextRenderer,
        quad_capacity: usize,
    ) -> Self {
        let atlas_info = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Atlas Info Buffer"),
            contents: AtlasInfo::new(0).as_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let atlas_info_bind_group = renderer.create_atlas_info_bind_group(device, &atlas_info);

        Self {
            mesh: TextMesh::new(),
            vertex_buffer: create_vertex_buffer(device, &[]),
            index_buffer: QuadIndexBuffer::new(device, quad_capacity),
            atlas_info,
            atlas_info_bind_group,
        }
    }

    /// Lays out `text` in `bounds` and replaces the current text with it.
    ///
    /// The previous vertex buffer is released. Indices are generated and uploaded only for quad
    /// slots that were never used before.
    #[tracing::instrument(skip_all)]
    #[allow(clippy::too_many_arguments)]
    pub fn append<L: GlyphLayoutSource>(
        &mut self,
        context: &PreparationContext,
        layout: &mut L,
        font: &L::Font,
        text: &str,
        size: f32,
        atlas_width: u32,
        bounds: LayoutRect,
        color: Color,
    ) -> Result<()> {
        let new_slots = self.mesh.append(
            layout,
            font,
            text,
            size,
            atlas_width,
            bounds,
            color.to_rgba8(),
        )?;

        self.vertex_buffer = create_vertex_buffer(context.device, self.mesh.vertices());
        self.index_buffer.upload(
            context.device,
            context.queue,
            self.mesh.indices(),
            new_slots,
        );

        Ok(())
    }

    /// Hides the text without releasing any storage.
    pub fn clear(&mut self) {
        self.mesh.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.mesh.quad_count()
    }

    pub fn index_count(&self) -> usize {
        self.mesh.index_count()
    }

    /// The number of quads indices were generated for over the lifetime of this buffer.
    pub fn filled_quads(&self) -> usize {
        self.mesh.filled_quads()
    }

    /// The number of quads the GPU index storage can hold without growing.
    pub fn index_capacity(&self) -> usize {
        self.index_buffer.quad_capacity()
    }

    /// Draws the text.
    ///
    /// The draw is issued even if there is no text, so that the per draw state is applied
    /// consistently. The projection is taken from the context.
    pub fn render(
        &self,
        context: &mut RenderContext,
        renderer: &TextRenderer,
        atlas: &AtlasBinding,
        atlas_info: &AtlasInfo,
    ) {
        context
            .queue
            .write_buffer(&self.atlas_info, 0, atlas_info.as_bytes());

        let projection = Matrix4::from(context.projection);
        let pass = &mut context.pass;

        pass.set_pipeline(renderer.pipeline());
        pass.set_push_constants(wgpu::ShaderStages::VERTEX, 0, projection.as_bytes());
        pass.set_bind_group(0, atlas.bind_group(), &[]);
        pass.set_bind_group(1, &self.atlas_info_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        self.index_buffer.set(pass);

        pass.draw_indexed(0..self.mesh.index_count() as u32, 0, 0..1);
    }
}

/// Creates a vertex buffer with room for at least one quad, so that there is always something to
/// bind.
fn create_vertex_buffer(device: &wgpu::Device, vertices: &[TextVertex]) -> wgpu::Buffer {
    const EMPTY_QUAD: [TextVertex; QuadIndices::VERTICES_PER_QUAD] =
        [TextVertex {
            position: [0.0; 2],
            tex_coords: [0.0; 2],
            color: quill_geometry::Rgba8([0; 4]),
        }; QuadIndices::VERTICES_PER_QUAD];

    let vertices = if vertices.is_empty() {
        &EMPTY_QUAD[..]
    } else {
        vertices
    };

    device.create_buffer_init(&BufferInitDescriptor {
        label: Some("Text Vertex Buffer"),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

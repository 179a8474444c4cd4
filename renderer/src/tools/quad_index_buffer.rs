use std::{mem, ops::Range};

use log::debug;
use wgpu::{IndexFormat, RenderPass};

use super::quad_indices::{Index, QuadIndices};

/// The GPU mirror of [`QuadIndices`].
///
/// The buffer's storage only grows. Newly generated slots are written in place at their offset,
/// slots that were uploaded once are never touched again, unless the storage needs to grow.
#[derive(Debug)]
pub struct QuadIndexBuffer {
    buffer: wgpu::Buffer,
    /// The number of quads that were uploaded to `buffer`.
    uploaded_quads: usize,
}

impl QuadIndexBuffer {
    pub const INDEX_FORMAT: IndexFormat = IndexFormat::Uint16;
    const INDEX_SIZE: usize = mem::size_of::<Index>();
    const QUAD_SIZE: usize = QuadIndices::INDICES_PER_QUAD * Self::INDEX_SIZE;

    /// Creates an index buffer with storage for `quad_capacity` quads (at least one).
    pub fn new(device: &wgpu::Device, quad_capacity: usize) -> Self {
        Self {
            buffer: Self::create_buffer(device, quad_capacity.max(1)),
            uploaded_quads: 0,
        }
    }

    /// The number of quads the current storage can hold.
    pub fn quad_capacity(&self) -> usize {
        self.buffer.size() as usize / Self::QUAD_SIZE
    }

    pub fn set(&self, pass: &mut RenderPass<'_>) {
        pass.set_index_buffer(self.buffer.slice(..), Self::INDEX_FORMAT)
    }

    /// Uploads the quads of `new_slots` that [`QuadIndices::ensure_quads`] just generated.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        indices: &QuadIndices,
        new_slots: Range<usize>,
    ) {
        let required = indices.filled_quads();
        if required <= self.uploaded_quads {
            return;
        }
        debug_assert_eq!(new_slots.end, required);

        let current = self.quad_capacity();
        if required > current {
            let mut proposed_quad_capacity = current.max(1) << 1;
            while proposed_quad_capacity < required {
                proposed_quad_capacity <<= 1;
            }

            debug!(
                "Growing index buffer from {current} to {proposed_quad_capacity} quads, required: {required}"
            );

            // The old storage is released when it gets replaced. Everything generated so far is
            // uploaded again, but not regenerated.
            self.buffer = Self::create_buffer(device, proposed_quad_capacity);
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(indices.indices()));
        } else {
            let first_slot = self.uploaded_quads.min(new_slots.start);
            let range = first_slot..required;
            queue.write_buffer(
                &self.buffer,
                (first_slot * Self::QUAD_SIZE) as wgpu::BufferAddress,
                bytemuck::cast_slice(indices.quads(range)),
            );
        }

        self.uploaded_quads = required;
    }

    fn create_buffer(device: &wgpu::Device, quads: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Index Buffer"),
            size: (quads * Self::QUAD_SIZE) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

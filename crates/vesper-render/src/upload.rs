//! Handing batched geometry to the GPU.
//!
//! [`UploadSink`] is the seam between accessors and whatever owns GPU
//! memory. [`WgpuBatchBuffers`] is the wgpu implementation: one vertex and one
//! index buffer per accessor, recreated when the accessor's generation
//! changes and rewritten through the queue otherwise.

use std::borrow::Cow;

use log::debug;
use rustc_hash::FxHashMap;

use crate::accessor::AccessorId;
use crate::batching::DrawBatch;
use crate::buffer::UiVertex;

/// One accessor's data for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct AccessorUpload<'a> {
    pub accessor: AccessorId,
    /// Changes whenever the accessor's storage was reallocated.
    pub generation: u32,
    pub vertex_capacity: u32,
    pub index_capacity: u32,
    pub vertices: &'a [UiVertex],
    pub indices: &'a [u16],
}

/// Receives accessor data at upload time.
pub trait UploadSink {
    fn upload(&mut self, upload: AccessorUpload<'_>);
}

/// Round `bytes` up to the copy alignment wgpu requires for buffer writes.
fn align_copy_size(bytes: u64) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    bytes.div_ceil(align) * align
}

/// `data` padded with zeros to the copy alignment.
fn padded(data: &[u8]) -> Cow<'_, [u8]> {
    let aligned = align_copy_size(data.len() as u64) as usize;
    if aligned == data.len() {
        Cow::Borrowed(data)
    } else {
        let mut owned = data.to_vec();
        owned.resize(aligned, 0);
        Cow::Owned(owned)
    }
}

/// GPU buffers backing one accessor.
pub struct GpuAccessorBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    generation: u32,
    index_count: u32,
}

impl GpuAccessorBuffers {
    /// Bind vertex and index buffers to a render pass.
    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }

    /// Issue the indexed draw for one batch. The buffers must already be bound.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, batch: &DrawBatch) {
        debug_assert!(batch.index_range.end <= self.index_count);
        render_pass.draw_indexed(batch.index_range.clone(), 0, 0..1);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Per-accessor GPU buffers, kept across frames.
#[derive(Default)]
pub struct WgpuBatchBuffers {
    buffers: FxHashMap<AccessorId, GpuAccessorBuffers>,
}

impl WgpuBatchBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink writing into these buffers with `device` and `queue`.
    pub fn sink<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
    ) -> WgpuUploader<'a> {
        WgpuUploader {
            device,
            queue,
            buffers: &mut self.buffers,
        }
    }

    pub fn get(&self, accessor: AccessorId) -> Option<&GpuAccessorBuffers> {
        self.buffers.get(&accessor)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// [`UploadSink`] borrowing a device and queue for one upload pass.
pub struct WgpuUploader<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    buffers: &'a mut FxHashMap<AccessorId, GpuAccessorBuffers>,
}

impl WgpuUploader<'_> {
    fn create_buffers(&self, upload: &AccessorUpload<'_>) -> GpuAccessorBuffers {
        let vertex_size = align_copy_size(
            u64::from(upload.vertex_capacity) * std::mem::size_of::<UiVertex>() as u64,
        );
        let index_size =
            align_copy_size(u64::from(upload.index_capacity) * std::mem::size_of::<u16>() as u64);

        debug!(
            "Creating batch buffers for {:?} (generation {}): {} B vertices, {} B indices",
            upload.accessor, upload.generation, vertex_size, index_size
        );

        GpuAccessorBuffers {
            vertex_buffer: self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ui_batch_vertex_buffer"),
                size: vertex_size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            index_buffer: self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ui_batch_index_buffer"),
                size: index_size,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            generation: upload.generation,
            index_count: 0,
        }
    }
}

impl UploadSink for WgpuUploader<'_> {
    fn upload(&mut self, upload: AccessorUpload<'_>) {
        let stale = self
            .buffers
            .get(&upload.accessor)
            .is_none_or(|b| b.generation != upload.generation);
        if stale {
            let created = self.create_buffers(&upload);
            self.buffers.insert(upload.accessor, created);
        }

        let Some(target) = self.buffers.get_mut(&upload.accessor) else {
            return;
        };
        if !upload.vertices.is_empty() {
            self.queue.write_buffer(
                &target.vertex_buffer,
                0,
                &padded(bytemuck::cast_slice(upload.vertices)),
            );
        }
        if !upload.indices.is_empty() {
            self.queue.write_buffer(
                &target.index_buffer,
                0,
                &padded(bytemuck::cast_slice(upload.indices)),
            );
        }
        target.index_count = upload.indices.len() as u32;
    }
}

//! Batched UI rendering: append-only geometry accessors, the draw-call merger, and GPU upload.

pub mod accessor;
pub mod batching;
pub mod buffer;
pub mod error;
pub mod merger;
pub mod upload;

pub use accessor::{
    AccessorId, AccessorLimits, BatchAccessor, BufferRegion, MAX_VERTICES_PER_ACCESSOR,
};
pub use batching::{DrawBatch, MaterialId, TextureId};
pub use buffer::{Geometry, Quad, UiVertex};
pub use error::{BatchError, BufferKind};
pub use merger::{BatchMerger, FlushReason, MergeState, MergeStats, OpenBatch, RenderCommand};
pub use upload::{AccessorUpload, GpuAccessorBuffers, UploadSink, WgpuBatchBuffers, WgpuUploader};

//! Draw batches: runs of UI geometry that share material, texture and buffer.

use std::ops::Range;

use crate::accessor::AccessorId;

/// Opaque key identifying a material (pipeline state + uniforms).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u64);

/// Opaque key identifying a bound texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// One draw call worth of merged geometry.
///
/// Ranges address the accessor's storage for the frame the batch was built
/// in; they stay meaningful across accessor growth because growth preserves
/// offsets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawBatch {
    pub accessor: AccessorId,
    pub material: MaterialId,
    pub texture: Option<TextureId>,
    pub vertex_range: Range<u32>,
    pub index_range: Range<u32>,
    /// Number of submitted geometries merged into this batch.
    pub geometry_count: u32,
}

impl DrawBatch {
    pub fn index_count(&self) -> u32 {
        self.index_range.end - self.index_range.start
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_range.end - self.vertex_range.start
    }

    /// Whether `other` can be drawn with the same bindings as this batch.
    pub fn shares_state_with(&self, other: &DrawBatch) -> bool {
        self.accessor == other.accessor
            && self.material == other.material
            && self.texture == other.texture
    }
}

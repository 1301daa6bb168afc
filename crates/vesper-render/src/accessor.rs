//! Append-only vertex/index storage that batched UI geometry is written into.
//!
//! A [`BatchAccessor`] hands out [`BufferRegion`]s from a per-frame cursor.
//! When an allocation does not fit, the backing storage doubles until it does
//! and the accessor's generation is bumped: GPU buffers sized for the old
//! generation must be recreated at upload, and regions issued before the
//! growth are rejected by [`BatchAccessor::write`]. Treat a region as valid
//! only until the next `allocate` on the same accessor.

use bytemuck::Zeroable;
use log::debug;

use crate::buffer::{Geometry, UiVertex};
use crate::error::{BatchError, BufferKind};
use crate::upload::{AccessorUpload, UploadSink};

/// Indices are `u16`, so one accessor can address at most this many vertices.
pub const MAX_VERTICES_PER_ACCESSOR: u32 = u16::MAX as u32 + 1;

/// Identity of an accessor within its merger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessorId(pub u32);

/// Initial sizes and hard limits of an accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessorLimits {
    pub initial_vertex_capacity: u32,
    pub initial_index_capacity: u32,
    /// Clamped to [`MAX_VERTICES_PER_ACCESSOR`].
    pub max_vertices: u32,
    pub max_indices: u32,
}

impl Default for AccessorLimits {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            initial_index_capacity: 1536,
            max_vertices: MAX_VERTICES_PER_ACCESSOR,
            max_indices: MAX_VERTICES_PER_ACCESSOR * 6,
        }
    }
}

/// A reserved span of an accessor's vertex and index storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferRegion {
    pub accessor: AccessorId,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
    pub generation: u32,
    pub frame: u32,
}

/// Growable vertex/index storage with a per-frame write cursor.
#[derive(Debug)]
pub struct BatchAccessor {
    id: AccessorId,
    limits: AccessorLimits,
    vertices: Vec<UiVertex>,
    indices: Vec<u16>,
    vertex_capacity: u32,
    index_capacity: u32,
    generation: u32,
    frame: u32,
    dirty: bool,
}

fn grown_capacity(current: u32, required: u64, limit: u32) -> u32 {
    let mut capacity = u64::from(current.max(1));
    while capacity < required {
        capacity *= 2;
    }
    capacity.min(u64::from(limit)) as u32
}

impl BatchAccessor {
    pub fn new(id: AccessorId, limits: AccessorLimits) -> Self {
        let max_vertices = limits.max_vertices.min(MAX_VERTICES_PER_ACCESSOR);
        let limits = AccessorLimits {
            max_vertices,
            initial_vertex_capacity: limits.initial_vertex_capacity.min(max_vertices),
            initial_index_capacity: limits.initial_index_capacity.min(limits.max_indices),
            ..limits
        };
        Self {
            id,
            limits,
            vertices: Vec::with_capacity(limits.initial_vertex_capacity as usize),
            indices: Vec::with_capacity(limits.initial_index_capacity as usize),
            vertex_capacity: limits.initial_vertex_capacity,
            index_capacity: limits.initial_index_capacity,
            generation: 0,
            frame: 0,
            dirty: false,
        }
    }

    pub fn id(&self) -> AccessorId {
        self.id
    }

    pub fn limits(&self) -> AccessorLimits {
        self.limits
    }

    /// Number of times the storage has been reallocated.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn vertex_capacity(&self) -> u32 {
        self.vertex_capacity
    }

    pub fn index_capacity(&self) -> u32 {
        self.index_capacity
    }

    /// Vertices allocated so far this frame.
    pub fn vertex_cursor(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Indices allocated so far this frame.
    pub fn index_cursor(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertices(&self) -> &[UiVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Whether written data has not been uploaded yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Start a new frame: rewind the cursors, keep the capacity.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.frame = self.frame.wrapping_add(1);
        self.dirty = false;
    }

    /// Whether allocating this much more would grow (and reallocate) the storage.
    pub fn needs_growth(&self, vertex_count: u32, index_count: u32) -> bool {
        u64::from(self.vertex_cursor()) + u64::from(vertex_count) > u64::from(self.vertex_capacity)
            || u64::from(self.index_cursor()) + u64::from(index_count)
                > u64::from(self.index_capacity)
    }

    /// Check that allocating this much more stays within the hard limits.
    pub fn check_limits(&self, vertex_count: u32, index_count: u32) -> Result<(), BatchError> {
        let vertex_end = u64::from(self.vertex_cursor()) + u64::from(vertex_count);
        let index_end = u64::from(self.index_cursor()) + u64::from(index_count);

        if vertex_end > u64::from(self.limits.max_vertices) {
            return Err(BatchError::CapacityExceeded {
                accessor: self.id,
                kind: BufferKind::Vertex,
                requested: vertex_end,
                limit: self.limits.max_vertices,
            });
        }
        if index_end > u64::from(self.limits.max_indices) {
            return Err(BatchError::CapacityExceeded {
                accessor: self.id,
                kind: BufferKind::Index,
                requested: index_end,
                limit: self.limits.max_indices,
            });
        }
        Ok(())
    }

    /// Reserve room for `vertex_count` vertices and `index_count` indices.
    ///
    /// Grows the storage by doubling when needed. Fails only if the request
    /// exceeds the accessor's hard limits.
    pub fn allocate(
        &mut self,
        vertex_count: u32,
        index_count: u32,
    ) -> Result<BufferRegion, BatchError> {
        self.check_limits(vertex_count, index_count)?;
        let vertex_end = u64::from(self.vertex_cursor()) + u64::from(vertex_count);
        let index_end = u64::from(self.index_cursor()) + u64::from(index_count);

        if self.needs_growth(vertex_count, index_count) {
            let vertex_capacity =
                grown_capacity(self.vertex_capacity, vertex_end, self.limits.max_vertices);
            let index_capacity =
                grown_capacity(self.index_capacity, index_end, self.limits.max_indices);
            debug!(
                "Accessor {:?} growing: vertices {} -> {}, indices {} -> {}",
                self.id, self.vertex_capacity, vertex_capacity, self.index_capacity, index_capacity
            );
            self.vertex_capacity = self.vertex_capacity.max(vertex_capacity);
            self.index_capacity = self.index_capacity.max(index_capacity);
            self.vertices
                .reserve(self.vertex_capacity as usize - self.vertices.len());
            self.indices
                .reserve(self.index_capacity as usize - self.indices.len());
            self.generation = self.generation.wrapping_add(1);
        }

        let region = BufferRegion {
            accessor: self.id,
            vertex_offset: self.vertex_cursor(),
            vertex_count,
            index_offset: self.index_cursor(),
            index_count,
            generation: self.generation,
            frame: self.frame,
        };
        self.vertices
            .resize(vertex_end as usize, UiVertex::zeroed());
        self.indices.resize(index_end as usize, 0);
        Ok(region)
    }

    /// Copy `geometry` into `region`, rebasing its indices onto the region's first vertex.
    pub fn write(&mut self, region: &BufferRegion, geometry: Geometry<'_>) -> Result<(), BatchError> {
        if region.accessor != self.id {
            return Err(BatchError::ForeignRegion {
                region: region.accessor,
                accessor: self.id,
            });
        }
        if region.generation != self.generation || region.frame != self.frame {
            return Err(BatchError::StaleRegion {
                region: region.generation,
                region_frame: region.frame,
                current: self.generation,
                current_frame: self.frame,
            });
        }
        if geometry.vertices.len() != region.vertex_count as usize
            || geometry.indices.len() != region.index_count as usize
        {
            return Err(BatchError::RegionMismatch {
                expected_vertices: region.vertex_count,
                expected_indices: region.index_count,
                vertices: geometry.vertices.len(),
                indices: geometry.indices.len(),
            });
        }
        geometry.validate()?;

        let v0 = region.vertex_offset as usize;
        let i0 = region.index_offset as usize;
        self.vertices[v0..v0 + geometry.vertices.len()].copy_from_slice(geometry.vertices);
        let base = region.vertex_offset as u16;
        for (dst, &src) in self.indices[i0..i0 + geometry.indices.len()]
            .iter_mut()
            .zip(geometry.indices)
        {
            *dst = base + src;
        }
        self.dirty = true;
        Ok(())
    }

    /// Allocate a region for `geometry` and write it.
    ///
    /// The geometry is validated before anything is reserved, so a rejected
    /// append leaves the cursors untouched.
    pub fn append(&mut self, geometry: Geometry<'_>) -> Result<BufferRegion, BatchError> {
        geometry.validate()?;
        let region = self.allocate(geometry.vertex_count(), geometry.index_count())?;
        self.write(&region, geometry)?;
        Ok(region)
    }

    /// Push everything written this frame to `sink`.
    ///
    /// Returns `false` without calling the sink when nothing changed since the
    /// last upload.
    pub fn upload<S>(&mut self, sink: &mut S) -> bool
    where
        S: UploadSink + ?Sized,
    {
        if !self.dirty {
            return false;
        }
        sink.upload(AccessorUpload {
            accessor: self.id,
            generation: self.generation,
            vertex_capacity: self.vertex_capacity,
            index_capacity: self.index_capacity,
            vertices: &self.vertices,
            indices: &self.indices,
        });
        self.dirty = false;
        true
    }
}

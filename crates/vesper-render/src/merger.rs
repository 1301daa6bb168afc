//! The draw-call merge state machine for batched UI rendering.
//!
//! Commands arrive in painter's order. While consecutive commands share
//! material, texture and accessor they are appended to one open batch; any
//! change flushes the open batch to the output list and starts a new one.
//! Batch order therefore equals the submission order of each batch's first
//! command, and no batch ever mixes two materials or two textures.
//!
//! ```text
//!   Idle --commit--> Accumulating(m, t, a) --commit compatible--> Accumulating
//!     ^                     |
//!     +---- flush ----------+   (incompatible commit, flush_material(m),
//!                                auto_merge_batches, finish_merge_batches)
//! ```

use glam::Mat4;
use log::{debug, trace};

use crate::accessor::{AccessorId, AccessorLimits, BatchAccessor, BufferRegion};
use crate::batching::{DrawBatch, MaterialId, TextureId};
use crate::buffer::{Geometry, UiVertex};
use crate::error::BatchError;
use crate::upload::UploadSink;

/// A renderable submission: geometry plus the state it must be drawn with.
#[derive(Clone, Copy, Debug)]
pub struct RenderCommand<'a> {
    pub geometry: Geometry<'a>,
    pub material: MaterialId,
    pub texture: Option<TextureId>,
    /// World transform applied to vertex positions before batching.
    pub transform: Option<&'a Mat4>,
}

/// The batch currently being extended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenBatch {
    pub material: MaterialId,
    pub texture: Option<TextureId>,
    pub accessor: AccessorId,
    vertex_start: u32,
    vertex_end: u32,
    index_start: u32,
    index_end: u32,
    geometry_count: u32,
}

impl OpenBatch {
    fn open(material: MaterialId, texture: Option<TextureId>, region: &BufferRegion) -> Self {
        Self {
            material,
            texture,
            accessor: region.accessor,
            vertex_start: region.vertex_offset,
            vertex_end: region.vertex_offset + region.vertex_count,
            index_start: region.index_offset,
            index_end: region.index_offset + region.index_count,
            geometry_count: 1,
        }
    }

    fn extend(&mut self, region: &BufferRegion) {
        debug_assert_eq!(region.accessor, self.accessor);
        debug_assert_eq!(region.vertex_offset, self.vertex_end);
        debug_assert_eq!(region.index_offset, self.index_end);
        self.vertex_end = region.vertex_offset + region.vertex_count;
        self.index_end = region.index_offset + region.index_count;
        self.geometry_count += 1;
    }

    fn accepts(&self, material: MaterialId, texture: Option<TextureId>, accessor: AccessorId) -> bool {
        self.material == material && self.texture == texture && self.accessor == accessor
    }

    /// Geometries merged so far.
    pub fn geometry_count(&self) -> u32 {
        self.geometry_count
    }

    fn into_batch(self) -> DrawBatch {
        DrawBatch {
            accessor: self.accessor,
            material: self.material,
            texture: self.texture,
            vertex_range: self.vertex_start..self.vertex_end,
            index_range: self.index_start..self.index_end,
            geometry_count: self.geometry_count,
        }
    }
}

/// Merger state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MergeState {
    #[default]
    Idle,
    Accumulating(OpenBatch),
}

/// Why an open batch was closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushReason {
    /// The next command used a different material, texture or accessor.
    StateChange,
    /// The next command would have forced the accessor to reallocate.
    AccessorGrowth,
    /// The batch's material changed its GPU-visible properties.
    MaterialChanged,
    /// `auto_merge_batches`, `force_merge_batches` or `finish_merge_batches`.
    Explicit,
}

/// Per-frame counters, cleared by [`BatchMerger::reset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub commands: u32,
    pub batches: u32,
    pub state_change_flushes: u32,
    pub growth_flushes: u32,
    pub material_flushes: u32,
    pub explicit_flushes: u32,
}

impl MergeStats {
    fn record(&mut self, reason: FlushReason) {
        self.batches += 1;
        match reason {
            FlushReason::StateChange => self.state_change_flushes += 1,
            FlushReason::AccessorGrowth => self.growth_flushes += 1,
            FlushReason::MaterialChanged => self.material_flushes += 1,
            FlushReason::Explicit => self.explicit_flushes += 1,
        }
    }
}

/// Merges a stream of UI render commands into an ordered list of draw batches.
pub struct BatchMerger {
    limits: AccessorLimits,
    accessors: Vec<BatchAccessor>,
    current: AccessorId,
    state: MergeState,
    batches: Vec<DrawBatch>,
    stats: MergeStats,
    scratch: Vec<UiVertex>,
}

impl BatchMerger {
    /// A merger with one accessor, which is current.
    pub fn new(limits: AccessorLimits) -> Self {
        Self {
            limits,
            accessors: vec![BatchAccessor::new(AccessorId(0), limits)],
            current: AccessorId(0),
            state: MergeState::Idle,
            batches: Vec::new(),
            stats: MergeStats::default(),
            scratch: Vec::new(),
        }
    }

    /// Batches emitted so far this frame, in submission order.
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn state(&self) -> &MergeState {
        &self.state
    }

    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, MergeState::Accumulating(_))
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// The accessor new commands are written into.
    pub fn current_accessor(&self) -> AccessorId {
        self.current
    }

    pub fn accessor(&self, id: AccessorId) -> Option<&BatchAccessor> {
        self.accessors.get(id.0 as usize)
    }

    pub fn accessors(&self) -> &[BatchAccessor] {
        &self.accessors
    }

    /// Make a different accessor current and return its id.
    ///
    /// Reuses an accessor nothing has been written to this frame; a new one
    /// is created only when every other accessor is in use. The open batch,
    /// if any, is left alone; the next commit sees a different accessor and
    /// flushes it.
    pub fn switch_buffer_accessor(&mut self) -> AccessorId {
        let idle = self.accessors.iter().find(|accessor| {
            accessor.id() != self.current
                && accessor.vertex_cursor() == 0
                && accessor.index_cursor() == 0
        });
        let id = match idle {
            Some(accessor) => accessor.id(),
            None => {
                let id = AccessorId(self.accessors.len() as u32);
                debug!("Creating batch accessor {:?}", id);
                self.accessors.push(BatchAccessor::new(id, self.limits));
                id
            }
        };
        self.current = id;
        id
    }

    /// Make an existing accessor current.
    pub fn set_current_accessor(&mut self, id: AccessorId) -> Result<(), BatchError> {
        if self.accessor(id).is_none() {
            return Err(BatchError::UnknownAccessor(id));
        }
        self.current = id;
        Ok(())
    }

    /// Submit one renderable.
    ///
    /// Merges into the open batch when material, texture and accessor match
    /// and the accessor can take the geometry without growing; otherwise the
    /// open batch is flushed first and a new one is opened. A run of
    /// identical commands longer than the accessor's current capacity is
    /// therefore split at each growth.
    ///
    /// Invalid geometry and requests over the accessor's hard limits are
    /// rejected before anything changes.
    pub fn commit(
        &mut self,
        geometry: Geometry<'_>,
        material: MaterialId,
        texture: Option<TextureId>,
        transform: Option<&Mat4>,
    ) -> Result<(), BatchError> {
        geometry.validate()?;
        self.current_accessor_ref()?
            .check_limits(geometry.vertex_count(), geometry.index_count())?;

        let reason = match &self.state {
            MergeState::Accumulating(open) if !open.accepts(material, texture, self.current) => {
                Some(FlushReason::StateChange)
            }
            MergeState::Accumulating(_)
                if self
                    .current_accessor_ref()?
                    .needs_growth(geometry.vertex_count(), geometry.index_count()) =>
            {
                Some(FlushReason::AccessorGrowth)
            }
            _ => None,
        };
        if let Some(reason) = reason {
            self.flush(reason);
        }

        let region = self.write_geometry(geometry, transform)?;
        self.stats.commands += 1;
        match &mut self.state {
            MergeState::Accumulating(open) => open.extend(&region),
            MergeState::Idle => {
                self.state = MergeState::Accumulating(OpenBatch::open(material, texture, &region));
            }
        }
        Ok(())
    }

    /// Submit a [`RenderCommand`].
    pub fn submit(&mut self, command: RenderCommand<'_>) -> Result<(), BatchError> {
        self.commit(
            command.geometry,
            command.material,
            command.texture,
            command.transform,
        )
    }

    /// Close the open batch, if any.
    pub fn auto_merge_batches(&mut self) -> bool {
        self.flush(FlushReason::Explicit)
    }

    /// Write `geometries` as one batch with the given state, skipping compatibility checks.
    ///
    /// For static content the caller already knows to be homogeneous. Anything
    /// open is flushed first; the forced batch is flushed when done, including
    /// the part written before an error.
    pub fn force_merge_batches(
        &mut self,
        material: MaterialId,
        texture: Option<TextureId>,
        geometries: &[Geometry<'_>],
    ) -> Result<(), BatchError> {
        self.flush(FlushReason::Explicit);

        let mut result = Ok(());
        for geometry in geometries {
            let region = match self.write_geometry(*geometry, None) {
                Ok(region) => region,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            };
            self.stats.commands += 1;
            match &mut self.state {
                MergeState::Accumulating(open) => open.extend(&region),
                MergeState::Idle => {
                    self.state =
                        MergeState::Accumulating(OpenBatch::open(material, texture, &region));
                }
            }
        }

        self.flush(FlushReason::Explicit);
        result
    }

    /// Close the last batch of the frame. Must be called after the last commit.
    pub fn finish_merge_batches(&mut self) -> bool {
        self.flush(FlushReason::Explicit)
    }

    /// Flush the open batch if it uses `material`.
    ///
    /// Call when a material's GPU-visible properties change mid-frame so the
    /// new values are not applied to geometry queued before the change.
    pub fn flush_material(&mut self, material: MaterialId) -> bool {
        match &self.state {
            MergeState::Accumulating(open) if open.material == material => {
                self.flush(FlushReason::MaterialChanged)
            }
            _ => false,
        }
    }

    /// Start a new frame: drop batches, rewind every accessor, go idle.
    pub fn reset(&mut self) {
        self.batches.clear();
        self.state = MergeState::Idle;
        self.stats = MergeStats::default();
        for accessor in &mut self.accessors {
            accessor.reset();
        }
    }

    /// Upload every accessor with pending data. Returns how many were uploaded.
    pub fn upload_buffers<S>(&mut self, sink: &mut S) -> usize
    where
        S: UploadSink + ?Sized,
    {
        self.accessors
            .iter_mut()
            .filter(|accessor| accessor.is_dirty())
            .map(|accessor| accessor.upload(sink))
            .filter(|&uploaded| uploaded)
            .count()
    }

    fn current_accessor_ref(&self) -> Result<&BatchAccessor, BatchError> {
        self.accessor(self.current)
            .ok_or(BatchError::UnknownAccessor(self.current))
    }

    fn write_geometry(
        &mut self,
        geometry: Geometry<'_>,
        transform: Option<&Mat4>,
    ) -> Result<BufferRegion, BatchError> {
        let id = self.current;
        let accessor = self
            .accessors
            .get_mut(id.0 as usize)
            .ok_or(BatchError::UnknownAccessor(id))?;

        match transform {
            Some(transform) => {
                self.scratch.clear();
                self.scratch
                    .extend(geometry.vertices.iter().map(|v| v.transformed(transform)));
                accessor.append(Geometry::new(&self.scratch, geometry.indices))
            }
            None => accessor.append(geometry),
        }
    }

    fn flush(&mut self, reason: FlushReason) -> bool {
        match std::mem::take(&mut self.state) {
            MergeState::Accumulating(open) => {
                let batch = open.into_batch();
                trace!(
                    "Flushing batch {:?}/{:?}: {} geometries, {} indices ({:?})",
                    batch.material,
                    batch.texture,
                    batch.geometry_count,
                    batch.index_count(),
                    reason
                );
                self.batches.push(batch);
                self.stats.record(reason);
                true
            }
            MergeState::Idle => false,
        }
    }
}

impl Default for BatchMerger {
    fn default() -> Self {
        Self::new(AccessorLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Quad;
    use crate::upload::AccessorUpload;
    use bytemuck::Zeroable;
    use glam::Vec3;

    const M1: MaterialId = MaterialId(1);
    const M2: MaterialId = MaterialId(2);
    const T1: TextureId = TextureId(10);
    const T2: TextureId = TextureId(20);

    fn quad() -> Quad {
        Quad::new(0.0, 0.0, 8.0, 8.0, [1.0; 4])
    }

    fn small_limits() -> AccessorLimits {
        AccessorLimits {
            initial_vertex_capacity: 8,
            initial_index_capacity: 12,
            max_vertices: 64,
            max_indices: 96,
        }
    }

    #[derive(Default)]
    struct CountingSink {
        uploads: Vec<AccessorId>,
    }

    impl UploadSink for CountingSink {
        fn upload(&mut self, upload: AccessorUpload<'_>) {
            self.uploads.push(upload.accessor);
        }
    }

    #[test]
    fn test_identical_state_merges_into_one_batch() {
        let mut merger = BatchMerger::default();
        let q = quad();
        for _ in 0..10 {
            merger.commit(q.geometry(), M1, Some(T1), None).unwrap();
        }
        assert!(merger.batches().is_empty());
        assert!(merger.finish_merge_batches());

        let batches = merger.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].geometry_count, 10);
        assert_eq!(batches[0].index_range, 0..60);
        assert_eq!(batches[0].vertex_range, 0..40);
    }

    #[test]
    fn test_alternating_materials_never_merge() {
        let mut merger = BatchMerger::default();
        let q = quad();
        for i in 0..7 {
            let material = if i % 2 == 0 { M1 } else { M2 };
            merger.commit(q.geometry(), material, None, None).unwrap();
        }
        merger.finish_merge_batches();

        let batches = merger.batches();
        assert_eq!(batches.len(), 7);
        for (i, batch) in batches.iter().enumerate() {
            let expected = if i % 2 == 0 { M1 } else { M2 };
            assert_eq!(batch.material, expected);
            assert_eq!(batch.geometry_count, 1);
        }
        assert_eq!(merger.stats().state_change_flushes, 6);
        assert_eq!(merger.stats().explicit_flushes, 1);
    }

    #[test]
    fn test_texture_change_splits_batch() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, Some(T1), None).unwrap();
        merger.commit(q.geometry(), M1, Some(T2), None).unwrap();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();

        let textures: Vec<_> = merger.batches().iter().map(|b| b.texture).collect();
        assert_eq!(textures, vec![Some(T1), Some(T2), None]);
        assert_eq!(merger.batches()[2].geometry_count, 2);
    }

    #[test]
    fn test_batch_order_follows_first_submission() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M2, None, None).unwrap();
        merger.commit(q.geometry(), M2, None, None).unwrap();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.commit(q.geometry(), M2, None, None).unwrap();
        merger.finish_merge_batches();

        let order: Vec<_> = merger.batches().iter().map(|b| b.material).collect();
        assert_eq!(order, vec![M2, M1, M2]);
        // Index ranges are contiguous and increasing.
        let ranges: Vec<_> = merger.batches().iter().map(|b| b.index_range.clone()).collect();
        assert_eq!(ranges, vec![0..12, 12..18, 18..24]);
    }

    #[test]
    fn test_flush_material_emits_queued_geometry() {
        let mut merger = BatchMerger::default();
        let q = quad();
        for _ in 0..3 {
            merger.commit(q.geometry(), M1, None, None).unwrap();
        }
        assert!(merger.flush_material(M1));
        assert_eq!(merger.batches().len(), 1);
        assert_eq!(merger.batches()[0].geometry_count, 3);
        assert_eq!(*merger.state(), MergeState::Idle);

        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 2);
        assert_eq!(merger.batches()[1].geometry_count, 1);
        assert_eq!(merger.stats().material_flushes, 1);
    }

    #[test]
    fn test_flush_material_ignores_other_materials() {
        let mut merger = BatchMerger::default();
        merger.commit(quad().geometry(), M1, None, None).unwrap();
        assert!(!merger.flush_material(M2));
        assert!(merger.is_accumulating());
    }

    #[test]
    fn test_finish_without_commands_emits_nothing() {
        let mut merger = BatchMerger::default();
        assert!(!merger.finish_merge_batches());
        assert!(merger.batches().is_empty());
    }

    #[test]
    fn test_auto_merge_closes_open_batch() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        assert!(merger.auto_merge_batches());
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 2);
    }

    #[test]
    fn test_accessor_growth_flushes_before_reallocating() {
        let mut merger = BatchMerger::new(small_limits());
        let q = quad();
        // Capacity 8 vertices: two quads fit, the third would grow the accessor.
        for _ in 0..3 {
            merger.commit(q.geometry(), M1, None, None).unwrap();
        }
        merger.finish_merge_batches();

        let batches = merger.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].geometry_count, 2);
        assert_eq!(batches[1].geometry_count, 1);
        assert_eq!(batches[1].index_range, 12..18);
        assert_eq!(merger.stats().growth_flushes, 1);
        assert_eq!(merger.accessor(AccessorId(0)).unwrap().generation(), 1);
    }

    #[test]
    fn test_capacity_exceeded_surfaces_as_error() {
        let mut merger = BatchMerger::new(small_limits());
        let q = quad();
        for _ in 0..16 {
            merger.commit(q.geometry(), M1, None, None).unwrap();
        }
        let err = merger.commit(q.geometry(), M1, None, None).unwrap_err();
        assert!(matches!(err, BatchError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_switching_accessor_splits_batch() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        let second = merger.switch_buffer_accessor();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.set_current_accessor(AccessorId(0)).unwrap();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();

        let accessors: Vec<_> = merger.batches().iter().map(|b| b.accessor).collect();
        assert_eq!(accessors, vec![AccessorId(0), second, AccessorId(0)]);
        // The second run on accessor 0 continues after the first one.
        assert_eq!(merger.batches()[2].vertex_range, 4..8);
        assert_eq!(
            merger.set_current_accessor(AccessorId(9)),
            Err(BatchError::UnknownAccessor(AccessorId(9)))
        );
    }

    #[test]
    fn test_force_merge_bypasses_state_checks() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M2, None, None).unwrap();

        let geometries = [q.geometry(), q.geometry(), q.geometry()];
        merger
            .force_merge_batches(M1, Some(T1), &geometries)
            .unwrap();
        assert!(!merger.is_accumulating());

        let batches = merger.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].material, M2);
        assert_eq!(batches[1].material, M1);
        assert_eq!(batches[1].texture, Some(T1));
        assert_eq!(batches[1].geometry_count, 3);
    }

    #[test]
    fn test_force_merge_with_no_geometry_emits_nothing() {
        let mut merger = BatchMerger::default();
        merger.force_merge_batches(M1, None, &[]).unwrap();
        assert!(merger.batches().is_empty());
    }

    #[test]
    fn test_transform_applied_to_positions() {
        let mut merger = BatchMerger::default();
        let q = quad();
        let shift = Mat4::from_translation(Vec3::new(100.0, 50.0, 0.0));
        merger.commit(q.geometry(), M1, None, Some(&shift)).unwrap();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();

        let accessor = merger.accessor(AccessorId(0)).unwrap();
        assert_eq!(accessor.vertices()[0].position, [100.0, 50.0, 0.0]);
        assert_eq!(accessor.vertices()[4].position, [0.0, 0.0, 0.0]);
        // A transform does not affect merging.
        assert_eq!(merger.batches().len(), 1);
    }

    #[test]
    fn test_invalid_geometry_keeps_open_batch() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        let broken = Geometry::new(&q.vertices[..1], &q.indices);
        assert!(merger.commit(broken, M1, None, None).is_err());
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 1);
        assert_eq!(merger.batches()[0].geometry_count, 2);
    }

    #[test]
    fn test_invalid_geometry_needing_growth_keeps_open_batch() {
        let mut merger = BatchMerger::new(small_limits());
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();

        let vertices = [UiVertex::zeroed(); 10];
        let indices = [0, 1, 42];
        let broken = Geometry::new(&vertices, &indices);
        let err = merger.commit(broken, M1, None, None).unwrap_err();
        assert!(matches!(err, BatchError::IndexOutOfBounds { index: 42, .. }));
        assert!(merger.batches().is_empty());

        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 1);
        assert_eq!(merger.batches()[0].geometry_count, 2);
        assert_eq!(merger.stats().growth_flushes, 0);
        assert_eq!(merger.accessor(AccessorId(0)).unwrap().generation(), 0);
    }

    #[test]
    fn test_oversized_geometry_keeps_open_batch() {
        let mut merger = BatchMerger::new(small_limits());
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();

        let vertices = [UiVertex::zeroed(); 70];
        let indices = [0, 1, 2];
        let oversized = Geometry::new(&vertices, &indices);
        let err = merger.commit(oversized, M1, None, None).unwrap_err();
        assert!(matches!(err, BatchError::CapacityExceeded { .. }));

        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 1);
        assert_eq!(merger.batches()[0].geometry_count, 2);
        assert_eq!(merger.stats().growth_flushes, 0);
    }

    #[test]
    fn test_identical_run_splits_at_each_growth() {
        let mut merger = BatchMerger::new(small_limits());
        let q = quad();
        // 8 -> 16 -> 32 vertices: two growths, so three batches.
        for _ in 0..6 {
            merger.commit(q.geometry(), M1, None, None).unwrap();
        }
        merger.finish_merge_batches();
        let counts: Vec<_> = merger.batches().iter().map(|b| b.geometry_count).collect();
        assert_eq!(counts, vec![2, 2, 2]);
        assert_eq!(merger.stats().growth_flushes, 2);

        // The grown capacity survives the reset.
        merger.reset();
        for _ in 0..6 {
            merger.commit(q.geometry(), M1, None, None).unwrap();
        }
        merger.finish_merge_batches();
        assert_eq!(merger.batches().len(), 1);
        assert_eq!(merger.batches()[0].geometry_count, 6);
    }

    #[test]
    fn test_switching_every_frame_reuses_idle_accessors() {
        let mut merger = BatchMerger::default();
        let q = quad();
        for _ in 0..100 {
            merger.reset();
            merger.switch_buffer_accessor();
            merger.commit(q.geometry(), M1, None, None).unwrap();
            merger.finish_merge_batches();
        }
        assert!(merger.accessors().len() <= 2);
    }

    #[test]
    fn test_switch_skips_accessors_in_use() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        let second = merger.switch_buffer_accessor();
        assert_eq!(second, AccessorId(1));
        merger.commit(q.geometry(), M1, None, None).unwrap();
        // Both accessors hold data, so a third is created.
        assert_eq!(merger.switch_buffer_accessor(), AccessorId(2));
        // After the reset every accessor is empty; the first idle one is reused.
        merger.reset();
        assert_eq!(merger.switch_buffer_accessor(), AccessorId(0));
    }

    #[test]
    fn test_reset_starts_a_clean_frame() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        merger.reset();

        assert!(merger.batches().is_empty());
        assert_eq!(merger.stats(), MergeStats::default());
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches()[0].index_range, 0..6);
    }

    #[test]
    fn test_upload_buffers_skips_clean_accessors() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger.switch_buffer_accessor();
        merger.commit(q.geometry(), M1, None, None).unwrap();
        merger.finish_merge_batches();

        let mut sink = CountingSink::default();
        assert_eq!(merger.upload_buffers(&mut sink), 1);
        assert_eq!(sink.uploads, vec![AccessorId(1)]);
        assert_eq!(merger.upload_buffers(&mut sink), 0);
    }

    #[test]
    fn test_submit_matches_commit() {
        let mut merger = BatchMerger::default();
        let q = quad();
        merger
            .submit(RenderCommand {
                geometry: q.geometry(),
                material: M1,
                texture: Some(T1),
                transform: None,
            })
            .unwrap();
        merger.finish_merge_batches();
        assert_eq!(merger.batches()[0].texture, Some(T1));
        assert_eq!(merger.stats().commands, 1);
    }
}

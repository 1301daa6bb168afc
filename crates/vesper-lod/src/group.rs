//! LOD groups: ordered detail levels, their renderers, and the group's bounds.
//!
//! A [`LodGroup`] is owned by one scene node. Its levels live in a plain
//! arena addressed by index; inserting or deleting a level shifts the indices
//! of the levels after it, so callers must not cache indices across
//! structural changes.

use std::sync::Arc;

use glam::Vec3;
use log::trace;
use vesper_math::Aabb;

use crate::camera::{LodCamera, ProjectionType};
use crate::error::LodError;
use crate::metric;
use crate::node::SceneNode;
use crate::scene::SceneId;
use crate::selector;

/// Opaque handle of the render model behind a renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub u64);

/// Stable identity of an LOD group, used for scene membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LodGroupId(pub u64);

/// A mesh renderer variant that can be placed in an LOD level.
pub trait LodRenderer {
    /// World-space bounds, or `None` if the renderer has none yet
    /// (e.g. not attached to a scene).
    fn world_bounds(&self) -> Option<Aabb>;

    /// The render model this renderer drives, if created.
    fn model(&self) -> Option<ModelId>;
}

impl<T: LodRenderer + ?Sized> LodRenderer for &T {
    fn world_bounds(&self) -> Option<Aabb> {
        (**self).world_bounds()
    }

    fn model(&self) -> Option<ModelId> {
        (**self).model()
    }
}

impl<T: LodRenderer + ?Sized> LodRenderer for Arc<T> {
    fn world_bounds(&self) -> Option<Aabb> {
        (**self).world_bounds()
    }

    fn model(&self) -> Option<ModelId> {
        (**self).model()
    }
}

fn check_index(index: usize, len: usize) -> Result<(), LodError> {
    if index < len {
        Ok(())
    } else {
        Err(LodError::IndexOutOfRange { index, len })
    }
}

fn check_insert_index(index: usize, len: usize) -> Result<(), LodError> {
    if index <= len {
        Ok(())
    } else {
        Err(LodError::IndexOutOfRange { index, len })
    }
}

/// One detail level: a screen-height threshold and the renderers shown at it.
#[derive(Clone, Debug, PartialEq)]
pub struct LodLevel<R> {
    transition_height: f32,
    renderers: Vec<R>,
}

impl<R> LodLevel<R> {
    /// An empty level that becomes visible at `transition_height`.
    pub fn new(transition_height: f32) -> Self {
        Self {
            transition_height,
            renderers: Vec::new(),
        }
    }

    pub fn with_renderers(transition_height: f32, renderers: Vec<R>) -> Self {
        Self {
            transition_height,
            renderers,
        }
    }

    /// Minimum relative screen height at which this level is shown.
    pub fn transition_height(&self) -> f32 {
        self.transition_height
    }

    pub fn set_transition_height(&mut self, height: f32) {
        self.transition_height = height;
    }

    pub fn push_renderer(&mut self, renderer: R) {
        self.renderers.push(renderer);
    }

    /// Insert a renderer before `index`; `index == renderer_count()` appends.
    pub fn insert_renderer(&mut self, index: usize, renderer: R) -> Result<(), LodError> {
        check_insert_index(index, self.renderers.len())?;
        self.renderers.insert(index, renderer);
        Ok(())
    }

    /// Remove and return the renderer at `index`.
    pub fn delete_renderer(&mut self, index: usize) -> Result<R, LodError> {
        check_index(index, self.renderers.len())?;
        Ok(self.renderers.remove(index))
    }

    pub fn renderer(&self, index: usize) -> Option<&R> {
        self.renderers.get(index)
    }

    /// Replace the renderer at `index`, returning the previous one.
    pub fn set_renderer(&mut self, index: usize, renderer: R) -> Result<R, LodError> {
        check_index(index, self.renderers.len())?;
        Ok(std::mem::replace(&mut self.renderers[index], renderer))
    }

    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    pub fn renderers(&self) -> &[R] {
        &self.renderers
    }
}

impl<R> Default for LodLevel<R> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<R: LodRenderer> LodLevel<R> {
    /// Models of the renderers in this level, skipping renderers without one.
    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.renderers.iter().filter_map(LodRenderer::model)
    }
}

/// A set of detail levels for one object, plus its local reference point and size.
#[derive(Clone, Debug)]
pub struct LodGroup<R> {
    id: LodGroupId,
    reference_point: Vec3,
    size: f32,
    levels: Vec<LodLevel<R>>,
    scene: Option<SceneId>,
}

impl<R> LodGroup<R> {
    /// An empty group with reference point at the local origin and size 1.
    pub fn new(id: LodGroupId) -> Self {
        Self {
            id,
            reference_point: Vec3::ZERO,
            size: 1.0,
            levels: Vec::new(),
            scene: None,
        }
    }

    pub fn id(&self) -> LodGroupId {
        self.id
    }

    /// Reference point in the owning node's local space.
    pub fn reference_point(&self) -> Vec3 {
        self.reference_point
    }

    pub fn set_reference_point(&mut self, point: Vec3) {
        self.reference_point = point;
    }

    /// Object size in local space.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
    }

    /// The scene this group is attached to, if any.
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    pub(crate) fn set_scene(&mut self, scene: Option<SceneId>) {
        self.scene = scene;
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[LodLevel<R>] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&LodLevel<R>> {
        self.levels.get(index)
    }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut LodLevel<R>> {
        self.levels.get_mut(index)
    }

    /// Append a level and return its index.
    pub fn push_level(&mut self, level: LodLevel<R>) -> usize {
        self.levels.push(level);
        self.levels.len() - 1
    }

    /// Insert a level before `index`; `index == level_count()` appends.
    pub fn insert_level(&mut self, index: usize, level: LodLevel<R>) -> Result<(), LodError> {
        check_insert_index(index, self.levels.len())?;
        self.levels.insert(index, level);
        Ok(())
    }

    /// Remove and return the level at `index`.
    pub fn delete_level(&mut self, index: usize) -> Result<LodLevel<R>, LodError> {
        check_index(index, self.levels.len())?;
        Ok(self.levels.remove(index))
    }

    /// Replace the level at `index`, returning the previous one.
    pub fn set_level(&mut self, index: usize, level: LodLevel<R>) -> Result<LodLevel<R>, LodError> {
        check_index(index, self.levels.len())?;
        Ok(std::mem::replace(&mut self.levels[index], level))
    }

    /// Normalize the object size to 1 by rescaling every threshold by `1 / size`.
    ///
    /// Relative height is linear in size, so the level chosen at any distance
    /// is unchanged; only the units of size and thresholds move together.
    pub fn reset_object_size(&mut self) -> Result<(), LodError> {
        if self.size == 1.0 {
            return Ok(());
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(LodError::InvalidArgument(
                "object size must be positive and finite",
            ));
        }

        let scale = 1.0 / self.size;
        self.size = 1.0;
        for level in &mut self.levels {
            level.transition_height *= scale;
        }
        Ok(())
    }

    /// Relative screen height of this group as seen by `camera`.
    pub fn relative_height<C, N>(&self, camera: &C, node: &N) -> Result<f32, LodError>
    where
        C: LodCamera + ?Sized,
        N: SceneNode + ?Sized,
    {
        let distance = match camera.projection_type() {
            ProjectionType::Perspective => Some(
                node.world_matrix()
                    .transform_point3(self.reference_point)
                    .distance(camera.world_position()),
            ),
            ProjectionType::Orthographic => None,
        };
        metric::relative_height(camera, distance, metric::world_space_size(node, self.size))
    }

    /// Index of the level `camera` should draw, or `None` to cull the group.
    pub fn visible_level<C, N>(&self, camera: &C, node: &N) -> Result<Option<usize>, LodError>
    where
        C: LodCamera + ?Sized,
        N: SceneNode + ?Sized,
    {
        let height = self.relative_height(camera, node)?;
        Ok(selector::select_level(&self.levels, height))
    }

    /// Camera distance at which each level stops being shown.
    ///
    /// Levels with a non-positive threshold never switch out and report
    /// `f32::INFINITY`. Perspective cameras only.
    pub fn transition_distances<C, N>(&self, camera: &C, node: &N) -> Result<Vec<f32>, LodError>
    where
        C: LodCamera + ?Sized,
        N: SceneNode + ?Sized,
    {
        let world_size = metric::world_space_size(node, self.size);
        self.levels
            .iter()
            .map(|level| {
                if level.transition_height <= 0.0
                    && camera.projection_type() == ProjectionType::Perspective
                {
                    Ok(f32::INFINITY)
                } else {
                    metric::distance_for_relative_height(camera, level.transition_height, world_size)
                }
            })
            .collect()
    }
}

impl<R: LodRenderer> LodGroup<R> {
    /// Build a group with one level per renderer.
    ///
    /// Thresholds are spread evenly: with `n` renderers, level `k` (1-based)
    /// gets `1 - k / (n + 1)`. Bounds are then recomputed from the renderers.
    pub fn from_renderers<I, N>(id: LodGroupId, renderers: I, node: &N) -> Self
    where
        I: IntoIterator<Item = R>,
        N: SceneNode + ?Sized,
    {
        let renderers: Vec<R> = renderers.into_iter().collect();
        let step = 1.0 / (1 + renderers.len()) as f32;

        let mut group = Self::new(id);
        for (i, renderer) in renderers.into_iter().enumerate() {
            let height = 1.0 - step * (i + 1) as f32;
            group.push_level(LodLevel::with_renderers(height, vec![renderer]));
        }
        group.recalculate_bounds(node);
        group
    }

    /// Recompute the reference point and size from the renderers' world bounds.
    ///
    /// The enclosing world box of all renderers in all levels is re-expressed
    /// in the node's local frame; its center becomes the reference point and
    /// its largest extent the size. Renderers without bounds are skipped. If
    /// none has bounds the group is left unchanged and `false` is returned.
    pub fn recalculate_bounds<N>(&mut self, node: &N) -> bool
    where
        N: SceneNode + ?Sized,
    {
        let world_bounds: Vec<Aabb> = self
            .levels
            .iter()
            .flat_map(|level| level.renderers.iter())
            .filter_map(LodRenderer::world_bounds)
            .collect();

        let Some(world) = Aabb::enclosing(&world_bounds) else {
            trace!("LOD group {:?}: no renderer bounds, keeping size", self.id);
            return false;
        };

        let local = world.reexpress_in_frame(&node.inverse_world_matrix());
        self.reference_point = local.center();
        self.size = local.largest_extent();
        trace!(
            "LOD group {:?}: reference point {:?}, size {}",
            self.id, self.reference_point, self.size
        );
        true
    }

    /// All models across every level, in level then renderer order.
    pub fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        self.levels.iter().flat_map(LodLevel::models)
    }
}

//! Render-scene membership of LOD groups and the per-camera selection pass.
//!
//! The scene only records which groups are attached; groups stay owned by
//! their nodes and keep a weak back-reference ([`SceneId`]) to the scene.

use log::debug;
use rustc_hash::FxHashSet;

use crate::camera::LodCamera;
use crate::error::LodError;
use crate::group::{LodGroup, LodGroupId};
use crate::node::SceneNode;

/// Identity of a render scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(pub u32);

/// The level chosen for one group by a selection pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodSelection {
    pub group: LodGroupId,
    /// `None` when the group is culled.
    pub level: Option<usize>,
}

/// The set of LOD groups attached to one scene, in attachment order.
#[derive(Debug)]
pub struct RenderScene {
    id: SceneId,
    order: Vec<LodGroupId>,
    members: FxHashSet<LodGroupId>,
}

impl RenderScene {
    pub fn new(id: SceneId) -> Self {
        Self {
            id,
            order: Vec::new(),
            members: FxHashSet::default(),
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Attach `group` to this scene.
    ///
    /// A group already attached here is detached first, which moves it to the
    /// end of the attachment order. A group attached to a different scene must
    /// be detached from that scene explicitly.
    pub fn add_lod_group<R>(&mut self, group: &mut LodGroup<R>) -> Result<(), LodError> {
        match group.scene() {
            Some(scene) if scene != self.id => {
                return Err(LodError::InvalidOperation(
                    "LOD group is attached to another scene",
                ));
            }
            Some(_) => {
                self.remove_lod_group(group);
            }
            None => {}
        }

        self.order.push(group.id());
        self.members.insert(group.id());
        group.set_scene(Some(self.id));
        debug!("Attached LOD group {:?} to scene {:?}", group.id(), self.id);
        Ok(())
    }

    /// Detach `group` from this scene. Returns `false` if it was not attached here.
    pub fn remove_lod_group<R>(&mut self, group: &mut LodGroup<R>) -> bool {
        if group.scene() != Some(self.id) || !self.members.remove(&group.id()) {
            return false;
        }
        let id = group.id();
        self.order.retain(|&g| g != id);
        group.set_scene(None);
        debug!("Detached LOD group {:?} from scene {:?}", id, self.id);
        true
    }

    pub fn contains(&self, group: LodGroupId) -> bool {
        self.members.contains(&group)
    }

    /// Attached group ids in attachment order.
    pub fn lod_groups(&self) -> &[LodGroupId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run LOD selection for `camera` over the given groups and their nodes.
    ///
    /// Groups not attached to this scene are skipped. Results come back in
    /// input order.
    pub fn select_visible<'a, R, N, C, I>(
        &self,
        camera: &C,
        groups: I,
    ) -> Result<Vec<LodSelection>, LodError>
    where
        R: 'a,
        N: SceneNode + ?Sized + 'a,
        C: LodCamera + ?Sized,
        I: IntoIterator<Item = (&'a LodGroup<R>, &'a N)>,
    {
        groups
            .into_iter()
            .filter(|(group, _)| group.scene() == Some(self.id) && self.contains(group.id()))
            .map(|(group, node)| {
                Ok(LodSelection {
                    group: group.id(),
                    level: group.visible_level(camera, node)?,
                })
            })
            .collect()
    }
}

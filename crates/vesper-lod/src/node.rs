//! The scene-node view an LOD group needs: where it is and how it is scaled.

use glam::{Mat4, Quat, Vec3};

/// A node owning an LOD group.
pub trait SceneNode {
    /// Local-to-world matrix.
    fn world_matrix(&self) -> Mat4;

    /// World-to-local matrix.
    fn inverse_world_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Scale applied to the node, used as a uniform-scale proxy.
    fn scale(&self) -> Vec3;
}

/// Translation, rotation and scale of a root-level node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SceneNode for Transform {
    fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }
}

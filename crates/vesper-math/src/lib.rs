//! Bounding volumes and the bounds aggregation used by LOD groups.

mod aabb;

pub use aabb::Aabb;
pub use glam::{Mat4, Quat, Vec3};

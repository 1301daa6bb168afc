//! Level-of-detail groups: screen-height metric, level selection, bounds recomputation
//! and scene attachment.

mod camera;
mod error;
mod group;
mod metric;
mod node;
mod scene;
mod selector;

pub use camera::{Camera, LodCamera, Projection, ProjectionType};
pub use error::LodError;
pub use group::{LodGroup, LodGroupId, LodLevel, LodRenderer, ModelId};
pub use metric::{distance_for_relative_height, relative_height, world_space_size};
pub use node::{SceneNode, Transform};
pub use scene::{LodSelection, RenderScene, SceneId};
pub use selector::select_level;

//! Level selection from a relative screen height.

use crate::group::LodLevel;

/// Pick the level to show for an object at `relative_height`.
///
/// Scans `levels` in stored order and returns the first whose transition
/// height is at or below `relative_height`. Returns `None` when no level
/// qualifies: the object is too small on screen and is culled.
///
/// Levels are not sorted or validated here. They are expected in descending
/// threshold order (most detailed first); with any other order the first
/// match still wins.
pub fn select_level<R>(levels: &[LodLevel<R>], relative_height: f32) -> Option<usize> {
    levels
        .iter()
        .position(|level| level.transition_height() <= relative_height)
}

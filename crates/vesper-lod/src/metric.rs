//! Screen-space size metric: how tall an object of a given size appears to a camera.
//!
//! The metric is the "relative screen height": the object's projected height as a
//! fraction of the viewport, computed from its world size, its distance to the
//! camera and the camera's vertical projection scale. LOD thresholds are
//! expressed in the same unit.

use crate::camera::{LodCamera, ProjectionType};
use crate::error::LodError;
use crate::node::SceneNode;

/// Relative screen height of an object of world-space `size` at `distance`.
///
/// Perspective cameras need a distance; orthographic ones ignore it because
/// their projected size does not depend on depth. A zero distance yields
/// `f32::INFINITY` (the object covers the view).
pub fn relative_height<C>(camera: &C, distance: Option<f32>, size: f32) -> Result<f32, LodError>
where
    C: LodCamera + ?Sized,
{
    let scale = camera.vertical_scale_factor();
    match camera.projection_type() {
        ProjectionType::Perspective => {
            let distance = distance.ok_or(LodError::InvalidArgument(
                "distance must be present for perspective projection",
            ))?;
            if !distance.is_finite() || distance < 0.0 {
                return Err(LodError::InvalidArgument(
                    "distance must be finite and non-negative",
                ));
            }
            if distance == 0.0 {
                return Ok(f32::INFINITY);
            }
            Ok(size * scale / (distance * 2.0))
        }
        ProjectionType::Orthographic => Ok(size * scale * 0.5),
    }
}

/// Camera distance at which an object of world-space `size` reaches `relative_height`.
///
/// Only defined for perspective cameras.
pub fn distance_for_relative_height<C>(
    camera: &C,
    relative_height: f32,
    size: f32,
) -> Result<f32, LodError>
where
    C: LodCamera + ?Sized,
{
    if camera.projection_type() != ProjectionType::Perspective {
        return Err(LodError::InvalidOperation("camera type must be perspective"));
    }
    if relative_height.is_nan() || relative_height <= 0.0 {
        return Err(LodError::InvalidArgument("relative height must be positive"));
    }
    Ok(size * camera.vertical_scale_factor() / (relative_height * 2.0))
}

/// World-space size of a local size under the node's scale.
///
/// Uses the largest absolute axis scale as a uniform proxy. Under non-uniform
/// scale this overestimates the size along the other axes; it is an
/// approximation and is kept that way.
pub fn world_space_size<N>(node: &N, local_size: f32) -> f32
where
    N: SceneNode + ?Sized,
{
    local_size * node.scale().abs().max_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::node::Transform;
    use glam::Vec3;

    /// A camera with a directly specified scale factor.
    struct FixedCamera {
        projection: ProjectionType,
        scale: f32,
    }

    impl LodCamera for FixedCamera {
        fn projection_type(&self) -> ProjectionType {
            self.projection
        }
        fn vertical_scale_factor(&self) -> f32 {
            self.scale
        }
        fn world_position(&self) -> Vec3 {
            Vec3::ZERO
        }
    }

    fn perspective(scale: f32) -> FixedCamera {
        FixedCamera {
            projection: ProjectionType::Perspective,
            scale,
        }
    }

    #[test]
    fn test_perspective_scenario() {
        let h = relative_height(&perspective(1.0), Some(4.0), 2.0).unwrap();
        assert!((h - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_perspective_requires_distance() {
        let err = relative_height(&perspective(1.0), None, 2.0).unwrap_err();
        assert!(matches!(err, LodError::InvalidArgument(_)));
    }

    #[test]
    fn test_negative_or_nan_distance_rejected() {
        assert!(relative_height(&perspective(1.0), Some(-1.0), 2.0).is_err());
        assert!(relative_height(&perspective(1.0), Some(f32::NAN), 2.0).is_err());
    }

    #[test]
    fn test_zero_distance_fills_view() {
        let h = relative_height(&perspective(1.0), Some(0.0), 2.0).unwrap();
        assert!(h.is_infinite());
    }

    #[test]
    fn test_height_halves_when_distance_doubles() {
        let cam = perspective(2.4);
        let near = relative_height(&cam, Some(10.0), 3.0).unwrap();
        let far = relative_height(&cam, Some(20.0), 3.0).unwrap();
        assert!((near - 2.0 * far).abs() < 1e-6);
    }

    #[test]
    fn test_orthographic_ignores_distance() {
        let cam = FixedCamera {
            projection: ProjectionType::Orthographic,
            scale: 0.5,
        };
        let a = relative_height(&cam, None, 2.0).unwrap();
        let b = relative_height(&cam, Some(1000.0), 2.0).unwrap();
        assert_eq!(a, b);
        assert!((a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_inverse_recovers_distance() {
        let cam = Camera::perspective(Vec3::ZERO, 1.1, 1.0);
        let h = relative_height(&cam, Some(37.5), 4.0).unwrap();
        let d = distance_for_relative_height(&cam, h, 4.0).unwrap();
        assert!((d - 37.5).abs() < 1e-3);
    }

    #[test]
    fn test_inverse_rejects_orthographic() {
        let cam = Camera::orthographic(Vec3::ZERO, 5.0, 5.0);
        let err = distance_for_relative_height(&cam, 0.5, 1.0).unwrap_err();
        assert!(matches!(err, LodError::InvalidOperation(_)));
    }

    #[test]
    fn test_inverse_rejects_non_positive_height() {
        assert!(distance_for_relative_height(&perspective(1.0), 0.0, 1.0).is_err());
        assert!(distance_for_relative_height(&perspective(1.0), -0.2, 1.0).is_err());
    }

    #[test]
    fn test_world_space_size_uses_dominant_scale() {
        let node = Transform::IDENTITY.with_scale(Vec3::new(1.0, -3.0, 2.0));
        assert_eq!(world_space_size(&node, 2.0), 6.0);
    }
}

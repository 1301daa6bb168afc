//! Camera abstraction consumed by the screen metric.

use glam::{Mat4, Vec3};

/// How a camera projects the scene onto the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// What LOD selection needs to know about a camera.
pub trait LodCamera {
    /// Perspective or orthographic.
    fn projection_type(&self) -> ProjectionType;

    /// The projection's vertical scale term (`m11` / `y_axis.y` of the projection matrix).
    ///
    /// For a perspective projection this is `1 / tan(fov_y / 2)`; for an
    /// orthographic one it is `1 / half_height`.
    fn vertical_scale_factor(&self) -> f32;

    /// Camera position in world space.
    fn world_position(&self) -> Vec3;
}

/// A free camera with a perspective or orthographic lens.
///
/// Clip planes follow the reverse-Z convention: `near` maps to depth 1.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

/// Lens of a [`Camera`].
#[derive(Debug, Clone)]
pub enum Projection {
    /// `fov_y` in radians, `aspect_ratio` as width over height.
    Perspective { fov_y: f32, aspect_ratio: f32 },
    /// Half extents of the view volume in world units. Used for UI and 2D views.
    Orthographic { half_width: f32, half_height: f32 },
}

impl Camera {
    /// Build a perspective camera at `position`.
    pub fn perspective(position: Vec3, fov_y: f32, aspect_ratio: f32) -> Self {
        Self {
            position,
            projection: Projection::Perspective {
                fov_y,
                aspect_ratio,
            },
            ..Self::default()
        }
    }

    /// Build an orthographic camera at `position`.
    pub fn orthographic(position: Vec3, half_width: f32, half_height: f32) -> Self {
        Self {
            position,
            projection: Projection::Orthographic {
                half_width,
                half_height,
            },
            ..Self::default()
        }
    }

    /// View-to-clip transform, reverse-Z.
    pub fn projection_matrix(&self) -> Mat4 {
        let (near, far) = (self.near, self.far);
        match self.projection {
            Projection::Perspective { fov_y, aspect_ratio } => {
                Mat4::perspective_rh(fov_y, aspect_ratio, far, near)
            }
            Projection::Orthographic {
                half_width: w,
                half_height: h,
            } => Mat4::orthographic_rh(-w, w, -h, h, far, near),
        }
    }
}

impl LodCamera for Camera {
    fn projection_type(&self) -> ProjectionType {
        match self.projection {
            Projection::Perspective { .. } => ProjectionType::Perspective,
            Projection::Orthographic { .. } => ProjectionType::Orthographic,
        }
    }

    fn vertical_scale_factor(&self) -> f32 {
        self.projection_matrix().y_axis.y
    }

    fn world_position(&self) -> Vec3 {
        self.position
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            projection: Projection::Perspective {
                fov_y: std::f32::consts::FRAC_PI_4,
                aspect_ratio: 16.0 / 9.0,
            },
            near: 0.1,
            far: 10000.0,
        }
    }
}

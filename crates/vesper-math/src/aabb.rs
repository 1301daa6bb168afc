use glam::{Mat4, Vec3};

/// Axis-Aligned Bounding Box in f32 space.
///
/// Invariant: min.x <= max.x, min.y <= max.y, min.z <= max.z.
/// The two-corner constructor enforces this by sorting components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from two corners. Automatically sorts
    /// components so that min <= max on every axis.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from a center point and half-extents.
    ///
    /// Negative half-extents are treated by magnitude.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        let half = half.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box enclosing every box in `bounds`.
    ///
    /// Returns `None` when `bounds` is empty; there is nothing to enclose.
    pub fn enclosing<'a, I>(bounds: I) -> Option<Aabb>
    where
        I: IntoIterator<Item = &'a Aabb>,
    {
        bounds
            .into_iter()
            .fold(None, |acc: Option<Aabb>, b| match acc {
                Some(acc) => Some(acc.union(b)),
                None => Some(*b),
            })
    }

    /// Re-express this box in another frame.
    ///
    /// All eight corners are transformed by `world_to_local` and a new box is
    /// taken around them. An AABB does not stay axis-aligned under rotation,
    /// so the result is the tightest AABB around the transformed box, which
    /// may be larger than the input box. `world_to_local` is expected to be
    /// affine.
    pub fn reexpress_in_frame(&self, world_to_local: &Mat4) -> Aabb {
        let corners = self.corners();
        let first = world_to_local.transform_point3(corners[0]);
        let (min, max) = corners[1..]
            .iter()
            .map(|&c| world_to_local.transform_point3(c))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Aabb { min, max }
    }

    /// The eight corners, ordered by (x, y, z) bit pattern.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Returns true if `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Returns the smallest AABB enclosing both self and other.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the size along each axis.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the longest edge.
    pub fn largest_extent(&self) -> f32 {
        self.size().max_element()
    }
}

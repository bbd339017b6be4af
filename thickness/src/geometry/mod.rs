use crate::{mesh::Material, Pos};

pub mod aabb;
pub mod triangle;

/// A ray along with the distance to the closest hit found so far. Queries
/// only accept hits in `[0, t]` and lower `t` on every accepted hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Pos,
    pub direction: Pos,
    pub t: f32,
}

/// Details of the closest accepted hit. Only meaningful after a query that
/// returned `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub t: f32,
    pub position: Pos,
    /// Unit normal of the triangle that was hit, following its winding.
    pub normal: Pos,
    /// Weights of the three triangle vertices at the hit position.
    pub barycentric: Pos,
    pub material: Material,
}

impl Ray {
    /// Creates a ray with no distance limit.
    pub fn new(origin: Pos, direction: Pos) -> Self {
        Self::with_limit(origin, direction, f32::MAX)
    }

    pub fn with_limit(origin: Pos, direction: Pos, t: f32) -> Self {
        Self {
            origin,
            direction,
            t,
        }
    }

    pub fn at(&self, t: f32) -> Pos {
        self.origin + self.direction * t
    }
}

impl HitInfo {
    /// True once a hit has been written. Only meaningful for records that
    /// started out as [`HitInfo::default`], whose `t` is `f32::MAX`.
    pub fn is_hit(&self) -> bool {
        self.t != f32::MAX
    }
}

impl Default for HitInfo {
    fn default() -> Self {
        Self {
            t: f32::MAX,
            position: Pos::repeat(f32::NAN),
            normal: Pos::zeros(),
            barycentric: Pos::zeros(),
            material: Material::default(),
        }
    }
}

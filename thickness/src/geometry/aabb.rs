use common::misc::in_range_inclusive;

use crate::{geometry::Ray, Pos};

/// Axis aligned bounding box. A box covering nothing is represented by
/// [`AxisAlignedBox::empty`], which no ray ever hits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct AxisAlignedBox {
    pub lower: Pos,
    pub upper: Pos,
}

impl AxisAlignedBox {
    pub fn new(lower: Pos, upper: Pos) -> Self {
        Self { lower, upper }
    }

    pub fn empty() -> Self {
        Self {
            lower: Pos::repeat(f32::INFINITY),
            upper: Pos::repeat(f32::NEG_INFINITY),
        }
    }

    /// True if the box covers no points, including boxes with NaN corners.
    pub fn is_empty(&self) -> bool {
        !(0..3).all(|axis| self.lower[axis] <= self.upper[axis])
    }

    pub fn center(&self) -> Pos {
        (self.lower + self.upper) / 2.0
    }

    pub fn extent(&self) -> Pos {
        self.upper - self.lower
    }

    pub fn diagonal(&self) -> f32 {
        self.extent().norm()
    }

    /// Index of the longest side. Ties go to the earlier axis.
    pub fn longest_axis(&self) -> usize {
        let extent = self.extent();

        let mut longest = 0;
        for axis in 1..3 {
            if extent[axis] > extent[longest] {
                longest = axis;
            }
        }

        longest
    }

    pub fn expand_point(&mut self, point: Pos) {
        self.lower = self.lower.inf(&point);
        self.upper = self.upper.sup(&point);
    }

    pub fn contains(&self, point: Pos) -> bool {
        (0..3).all(|axis| in_range_inclusive(point[axis], self.lower[axis], self.upper[axis]))
    }

    /// Parametric distances where the infinite line through the ray enters
    /// and leaves the box, or `None` if it misses the box entirely.
    pub fn slab_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }

        let (mut near, mut far) = (f32::NEG_INFINITY, f32::INFINITY);
        for axis in 0..3 {
            let (origin, direction) = (ray.origin[axis], ray.direction[axis]);
            let (lower, upper) = (self.lower[axis], self.upper[axis]);

            // Parallel to this slab, so the origin decides everything.
            if direction == 0.0 {
                if !in_range_inclusive(origin, lower, upper) {
                    return None;
                }
                continue;
            }

            let (t0, t1) = ((lower - origin) / direction, (upper - origin) / direction);
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
        }

        (near <= far).then_some((near, far))
    }

    /// Checks if the part of the ray between its origin and its current best
    /// distance `t` touches the box. The ray is left untouched.
    pub fn intersect(&self, ray: &Ray) -> bool {
        self.slab_interval(ray)
            .is_some_and(|(near, far)| far >= 0.0 && near <= ray.t)
    }
}

impl Default for AxisAlignedBox {
    fn default() -> Self {
        Self::empty()
    }
}

use common::misc::{zero_within_epsilon, ZERO_EPSILON};

use crate::{
    geometry::{HitInfo, Ray},
    Pos,
};

/// The plane of points `p` where `normal.dot(p) == d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Pos,
    pub d: f32,
}

/// Plane containing a triangle, with its normal following the winding of
/// the vertices. Zero area triangles have no plane.
pub fn triangle_plane(v0: Pos, v1: Pos, v2: Pos) -> Option<Plane> {
    let normal = (v1 - v0).cross(&(v2 - v0)).try_normalize(0.0)?;
    Some(Plane {
        normal,
        d: normal.dot(&v0),
    })
}

/// Distance along the ray to where it crosses the plane. Rays parallel to
/// the plane and crossings behind the origin are rejected.
pub fn intersect_ray_with_plane(plane: &Plane, ray: &Ray) -> Option<f32> {
    let denominator = plane.normal.dot(&ray.direction);
    if zero_within_epsilon(denominator) {
        return None;
    }

    let t = (plane.d - plane.normal.dot(&ray.origin)) / denominator;
    // Written so NaN fails the check.
    (t >= 0.0).then_some(t)
}

/// Barycentric weights of `p` relative to the triangle, if `p` (assumed to
/// be on the triangle's plane with normal `n`) lies inside the triangle or
/// on its boundary. Weights slightly below zero are accepted so that a
/// point on an edge or vertex shared by several triangles is inside at
/// least one of them despite rounding.
pub fn point_in_triangle(v0: Pos, v1: Pos, v2: Pos, n: Pos, p: Pos) -> Option<Pos> {
    let area = n.dot(&(v1 - v0).cross(&(v2 - v0)));
    // Also rejects NaN.
    if !(area.abs() > 0.0) {
        return None;
    }

    // Each weight is the signed area of the sub triangle opposite a vertex.
    let weights = Pos::new(
        n.dot(&(v2 - v1).cross(&(p - v1))),
        n.dot(&(v0 - v2).cross(&(p - v2))),
        n.dot(&(v1 - v0).cross(&(p - v0))),
    ) / area;

    weights.iter().all(|&w| w >= -ZERO_EPSILON).then_some(weights)
}

// References:
//  - https://www.scratchapixel.com/lessons/3d-basic-rendering/ray-tracing-rendering-a-triangle/ray-triangle-intersection-geometric-solution.html
//  - https://math.stackexchange.com/questions/4322/check-whether-a-point-is-within-a-3d-triangle
/// Intersects a ray with a triangle. A hit is only accepted if it is in
/// front of the origin and closer than `ray.t`, in which case `ray.t` is
/// lowered to it and everything but the material is written to `hit`.
/// Nothing is modified when `false` is returned.
pub fn intersect_ray_with_triangle(
    v0: Pos,
    v1: Pos,
    v2: Pos,
    ray: &mut Ray,
    hit: &mut HitInfo,
) -> bool {
    let Some(plane) = triangle_plane(v0, v1, v2) else {
        return false;
    };

    let Some(t) = intersect_ray_with_plane(&plane, ray).filter(|&t| t < ray.t) else {
        return false;
    };

    let position = ray.at(t);
    let Some(barycentric) = point_in_triangle(v0, v1, v2, plane.normal, position) else {
        return false;
    };

    ray.t = t;
    hit.t = t;
    hit.position = position;
    hit.normal = plane.normal;
    hit.barycentric = barycentric;
    true
}

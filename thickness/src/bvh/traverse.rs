use common::config::Traversal;

use super::{node::NodeKind, Bvh};
use crate::{
    geometry::{triangle::intersect_ray_with_triangle, HitInfo, Ray},
    mesh::{Material, Mesh},
};

impl Bvh {
    /// Finds the closest triangle hit by the ray that is nearer than
    /// `ray.t`. On a hit `ray.t` is lowered to its distance, `hit` is filled
    /// in with the mesh's material and `true` is returned.
    ///
    /// `mesh` must be the mesh this BVH was built from.
    pub fn intersect(
        &self,
        mesh: &Mesh,
        ray: &mut Ray,
        hit: &mut HitInfo,
        traversal: Traversal,
    ) -> bool {
        match traversal {
            Traversal::Naive => intersect_naive(mesh, ray, hit),
            Traversal::Accelerated => self.intersect_node(0, &mesh.material, ray, hit),
        }
    }

    fn intersect_node(
        &self,
        index: u32,
        material: &Material,
        ray: &mut Ray,
        hit: &mut HitInfo,
    ) -> bool {
        let node = &self.nodes[index as usize];
        // The box test only reads the ray, so a miss leaves `t` as it was
        // for the sibling subtree.
        if !node.bounds.intersect(ray) {
            return false;
        }

        match node.kind() {
            NodeKind::Leaf { offset, count } => {
                let (start, end) = (offset as usize, (offset + count) as usize);
                let mut found = false;
                for primitive in &self.primitives[start..end] {
                    let [v0, v1, v2] = primitive.positions();
                    if intersect_ray_with_triangle(v0, v1, v2, ray, hit) {
                        hit.material = *material;
                        found = true;
                    }
                }
                found
            }
            NodeKind::Interior { left, right } => {
                // Both children are always visited. The right one benefits
                // from any closer hit already found on the left.
                let left = self.intersect_node(left, material, ray, hit);
                let right = self.intersect_node(right, material, ray, hit);
                left || right
            }
        }
    }
}

/// Tests the ray against every triangle of the mesh, keeping the closest hit.
pub fn intersect_naive(mesh: &Mesh, ray: &mut Ray, hit: &mut HitInfo) -> bool {
    let mut found = false;
    for triangle in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle_vertices(triangle).map(|x| x.position);
        if intersect_ray_with_triangle(v0, v1, v2, ray, hit) {
            hit.material = mesh.material;
            found = true;
        }
    }

    found
}

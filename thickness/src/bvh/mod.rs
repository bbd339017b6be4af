use std::time::Instant;

use common::progress::Progress;
use tracing::info;

use crate::{
    mesh::{Mesh, Vertex},
    Pos,
};
use build::build_bvh;
use node::Node;

mod build;
pub mod node;
mod traverse;

pub use traverse::intersect_naive;

/// Default maximum number of primitives in one leaf.
pub const LEAF_SIZE: usize = 4;

/// Bounding volume hierarchy over the triangles of a mesh. It is built once
/// and only read afterwards, so it can be shared between threads freely.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
    primitives: Vec<Primitive>,
    leaves: Vec<u32>,
    levels: u32,
}

/// Copy of the three vertices of a mesh triangle, stored in BVH order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub v0: Vertex,
    pub v1: Vertex,
    pub v2: Vertex,
}

impl Bvh {
    /// Builds a BVH with leaves of at most `leaf_size` triangles.
    ///
    /// # Panics
    /// If `leaf_size` is zero.
    pub fn build(mesh: &Mesh, leaf_size: usize) -> Self {
        Self::build_with_progress(mesh, leaf_size, &Progress::new())
    }

    /// Same as [`Bvh::build`], counting every triangle placed in a leaf on
    /// `progress`.
    pub fn build_with_progress(mesh: &Mesh, leaf_size: usize, progress: &Progress) -> Self {
        let start = Instant::now();
        progress.set_total(mesh.triangle_count() as u64);
        progress.set_complete(0);

        let primitives = (0..mesh.triangle_count())
            .map(|x| Primitive::from_mesh(mesh, x))
            .collect::<Vec<_>>();
        let bvh = build_bvh(primitives, leaf_size, progress);

        progress.set_finished();
        info!(
            nodes = bvh.nodes.len(),
            leaves = bvh.num_leaves(),
            levels = bvh.levels,
            "Built BVH in {:?}",
            start.elapsed()
        );

        bvh
    }

    /// All nodes, the root first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Primitives in leaf order. Each leaf refers to a contiguous range.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of levels in the tree, one for a tree that is just a leaf.
    pub fn num_levels(&self) -> u32 {
        self.levels
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }

    /// Indices of the leaf nodes, in the order they were created.
    pub fn leaf_indices(&self) -> &[u32] {
        &self.leaves
    }
}

impl Primitive {
    pub fn from_mesh(mesh: &Mesh, triangle: usize) -> Self {
        let [v0, v1, v2] = mesh.triangle_vertices(triangle).map(|x| *x);
        Self { v0, v1, v2 }
    }

    pub fn positions(&self) -> [Pos; 3] {
        [self.v0.position, self.v1.position, self.v2.position]
    }

    pub fn centroid(&self) -> Pos {
        (self.v0.position + self.v1.position + self.v2.position) / 3.0
    }
}

use common::progress::Progress;
use ordered_float::OrderedFloat;

use super::{node::Node, Bvh, Primitive};
use crate::geometry::aabb::AxisAlignedBox;

/// Recursive median split construction state.
struct Builder<'a> {
    leaf_size: usize,
    progress: &'a Progress,

    nodes: Vec<Node>,
    primitives: Vec<Primitive>,
    leaves: Vec<u32>,
    levels: u32,
}

/// Builds the node and primitive arrays over all of the given primitives.
/// Node zero is the root and every child is stored after its parent.
pub(super) fn build_bvh(
    mut primitives: Vec<Primitive>,
    leaf_size: usize,
    progress: &Progress,
) -> Bvh {
    assert!(leaf_size >= 1, "BVH leaves must hold at least one primitive");
    assert!(
        primitives.len() < Node::LEAF_BIT as usize,
        "Too many primitives for a packed BVH"
    );

    // A binary tree with n leaves has 2n - 1 nodes.
    let leaf_estimate = primitives.len().div_ceil(leaf_size).max(1);
    let mut builder = Builder {
        leaf_size,
        progress,

        nodes: Vec::with_capacity(leaf_estimate * 2),
        primitives: Vec::with_capacity(primitives.len()),
        leaves: Vec::with_capacity(leaf_estimate),
        levels: 0,
    };

    builder.construct(&mut primitives, 0);

    Bvh {
        nodes: builder.nodes,
        primitives: builder.primitives,
        leaves: builder.leaves,
        levels: builder.levels,
    }
}

impl Builder<'_> {
    fn construct(&mut self, window: &mut [Primitive], depth: u32) -> u32 {
        self.levels = self.levels.max(depth + 1);
        let bounds = bounding_box(window);

        // Reserve this node's slot before the children claim theirs.
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::leaf(bounds, 0, 0));

        if window.len() <= self.leaf_size {
            let offset = self.primitives.len() as u32;
            self.primitives.extend_from_slice(window);
            self.nodes[index as usize] = Node::leaf(bounds, offset, window.len() as u32);
            self.leaves.push(index);

            self.progress.add_complete(window.len() as u64);
            return index;
        }

        let axis = bounds.longest_axis();
        window.sort_by_cached_key(|primitive| OrderedFloat(primitive.centroid()[axis]));

        let (left, right) = window.split_at_mut(window.len() / 2);
        let left = self.construct(left, depth + 1);
        let right = self.construct(right, depth + 1);

        self.nodes[index as usize] = Node::interior(bounds, left, right);
        index
    }
}

/// Box around every vertex of every primitive. Empty for an empty slice.
fn bounding_box(primitives: &[Primitive]) -> AxisAlignedBox {
    let mut bounds = AxisAlignedBox::empty();
    for primitive in primitives {
        primitive
            .positions()
            .into_iter()
            .for_each(|x| bounds.expand_point(x));
    }

    bounds
}

#[cfg(test)]
mod test {
    use nalgebra::Vector3;

    use super::bounding_box;
    use crate::{
        bvh::{node::NodeKind, Bvh, Primitive},
        mesh::{Mesh, Vertex},
    };

    /// A row of unit triangles spaced out along the x axis.
    fn strip(count: usize) -> Mesh {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..count {
            let x = i as f32 * 2.0;
            let base = vertices.len() as u32;
            for position in [
                Vector3::new(x, 0.0, 0.0),
                Vector3::new(x + 1.0, 0.0, 0.0),
                Vector3::new(x, 1.0, 0.0),
            ] {
                vertices.push(Vertex::new(position, Vector3::z()));
            }
            triangles.push([base, base + 1, base + 2]);
        }

        Mesh::new(vertices, triangles)
    }

    #[test]
    fn empty_mesh_is_single_leaf() {
        let bvh = Bvh::build(&Mesh::default(), 4);
        assert_eq!(bvh.nodes().len(), 1);
        assert_eq!(bvh.num_leaves(), 1);
        assert_eq!(bvh.num_levels(), 1);
        assert!(bvh.primitives().is_empty());

        let root = bvh.nodes()[0];
        assert_eq!(root.kind(), NodeKind::Leaf { offset: 0, count: 0 });
        assert!(root.bounds.is_empty());
    }

    #[test]
    fn small_mesh_is_single_leaf() {
        let bvh = Bvh::build(&strip(4), 4);
        assert_eq!(bvh.nodes().len(), 1);
        assert_eq!(bvh.nodes()[0].kind(), NodeKind::Leaf { offset: 0, count: 4 });
        assert_eq!(bvh.nodes()[0].bounds.upper, Vector3::new(7.0, 1.0, 0.0));
    }

    #[test]
    fn median_split_shape() {
        // 10 -> 5 + 5 -> (2 + 3) + (2 + 3)
        let bvh = Bvh::build(&strip(10), 4);
        assert_eq!(bvh.num_levels(), 3);
        assert_eq!(bvh.num_leaves(), 4);
        assert_eq!(bvh.nodes().len(), 7);

        let counts = (bvh.leaf_indices().iter())
            .map(|&x| match bvh.nodes()[x as usize].kind() {
                NodeKind::Leaf { count, .. } => count,
                NodeKind::Interior { .. } => unreachable!(),
            })
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![2, 3, 2, 3]);

        // Split along x, so primitives end up sorted by their centroid.
        let xs = (bvh.primitives().iter())
            .map(|x| x.centroid().x)
            .collect::<Vec<_>>();
        assert!(xs.windows(2).all(|x| x[0] <= x[1]));
    }

    #[test]
    fn leaf_size_of_one() {
        let bvh = Bvh::build(&strip(5), 1);
        assert_eq!(bvh.num_leaves(), 5);
        assert_eq!(bvh.nodes().len(), 9);
    }

    #[test]
    #[should_panic]
    fn zero_leaf_size() {
        Bvh::build(&strip(2), 0);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = strip(3);
        let primitives = (0..mesh.triangle_count())
            .map(|x| Primitive::from_mesh(&mesh, x))
            .collect::<Vec<_>>();

        let bounds = bounding_box(&primitives);
        assert_eq!(bounds.lower, Vector3::zeros());
        assert_eq!(bounds.upper, Vector3::new(5.0, 1.0, 0.0));
        assert!(bounding_box(&[]).is_empty());
    }
}

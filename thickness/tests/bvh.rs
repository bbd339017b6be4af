use common::config::Traversal;
use nalgebra::Vector3;
use proptest::{collection::vec as pvec, prelude::*};

use thickness::{
    bvh::{node::NodeKind, Bvh},
    geometry::{HitInfo, Ray},
    mesh::{Mesh, Vertex},
    Pos,
};

fn soup(triangles: &[[Pos; 3]]) -> Mesh {
    let vertices = (triangles.iter())
        .flat_map(|&[a, b, c]| {
            let normal = (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or(Pos::z());
            [a, b, c].map(|x| Vertex::new(x, normal))
        })
        .collect::<Vec<_>>();
    let indices = (0..triangles.len() as u32)
        .map(|x| [x * 3, x * 3 + 1, x * 3 + 2])
        .collect();

    Mesh::new(vertices, indices)
}

fn arb_point() -> impl Strategy<Value = Pos> {
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

fn arb_direction() -> impl Strategy<Value = Pos> {
    arb_point().prop_filter("direction too short", |x| x.norm() > 0.1)
}

fn arb_soup() -> impl Strategy<Value = Mesh> {
    pvec([arb_point(), arb_point(), arb_point()], 0..64).prop_map(|x| soup(&x))
}

fn cast(bvh: &Bvh, mesh: &Mesh, ray: Ray, traversal: Traversal) -> (bool, Ray, HitInfo) {
    let (mut ray, mut hit) = (ray, HitInfo::default());
    let found = bvh.intersect(mesh, &mut ray, &mut hit, traversal);
    (found, ray, hit)
}

/// Triangle vertex positions as raw bits, so they can be sorted and compared.
fn triangle_key(positions: [Pos; 3]) -> [[u32; 3]; 3] {
    positions.map(|x| [x.x.to_bits(), x.y.to_bits(), x.z.to_bits()])
}

fn check_structure(bvh: &Bvh, mesh: &Mesh, leaf_size: usize) {
    let nodes = bvh.nodes();

    // Every node but the root has exactly one parent, stored before it.
    let mut parents = vec![0; nodes.len()];
    for (index, node) in nodes.iter().enumerate() {
        if let NodeKind::Interior { left, right } = node.kind() {
            for child in [left, right] {
                assert!(child as usize > index, "child {child} before parent {index}");
                parents[child as usize] += 1;
            }
        }
    }
    assert_eq!(parents[0], 0);
    assert!(parents[1..].iter().all(|&x| x == 1));

    // Leaves tile the primitive array without gaps or overlaps.
    let mut ranges = (bvh.leaf_indices().iter())
        .map(|&x| match nodes[x as usize].kind() {
            NodeKind::Leaf { offset, count } => (offset, count),
            NodeKind::Interior { .. } => panic!("node {x} is not a leaf"),
        })
        .collect::<Vec<_>>();
    ranges.sort();

    let mut next = 0;
    for (offset, count) in ranges {
        assert_eq!(offset, next);
        assert!(count as usize <= leaf_size);
        next += count;
    }
    assert_eq!(next as usize, mesh.triangle_count());

    let leaves = nodes.iter().filter(|x| x.is_leaf()).count();
    assert_eq!(leaves, bvh.num_leaves());

    // And they hold each mesh triangle exactly once.
    let mut stored = (bvh.primitives().iter())
        .map(|x| triangle_key(x.positions()))
        .collect::<Vec<_>>();
    let mut expected = (0..mesh.triangle_count())
        .map(|x| triangle_key(mesh.triangle_vertices(x).map(|x| x.position)))
        .collect::<Vec<_>>();
    stored.sort();
    expected.sort();
    assert_eq!(stored, expected);

    // Each leaf box covers its triangles.
    for &leaf in bvh.leaf_indices() {
        let node = nodes[leaf as usize];
        let NodeKind::Leaf { offset, count } = node.kind() else {
            unreachable!()
        };
        let primitives = &bvh.primitives()[offset as usize..(offset + count) as usize];
        for primitive in primitives {
            assert!(primitive.positions().iter().all(|&x| node.bounds.contains(x)));
        }
    }
}

#[test]
fn structure_for_every_size() {
    for count in 0..40 {
        let triangles = (0..count)
            .map(|i| {
                let base = Vector3::new((i % 7) as f32, (i / 7) as f32, (i % 3) as f32);
                [base, base + Vector3::x(), base + Vector3::y()]
            })
            .collect::<Vec<_>>();
        let mesh = soup(&triangles);

        for leaf_size in [1, 2, 4, 8] {
            let bvh = Bvh::build(&mesh, leaf_size);
            check_structure(&bvh, &mesh, leaf_size);
        }
    }
}

#[test]
fn rebuild_is_identical() {
    let triangles = (0..100)
        .map(|i| {
            let angle = i as f32 * 0.7;
            let base = Vector3::new(angle.cos() * 5.0, angle.sin() * 5.0, i as f32 * 0.1);
            [base, base + Vector3::new(0.5, 0.0, 0.2), base + Vector3::z()]
        })
        .collect::<Vec<_>>();
    let mesh = soup(&triangles);

    let (first, second) = (Bvh::build(&mesh, 4), Bvh::build(&mesh, 4));
    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.primitives(), second.primitives());
    assert_eq!(first.leaf_indices(), second.leaf_indices());
}

proptest! {
    #[test]
    fn random_soups_are_well_formed(mesh in arb_soup(), leaf_size in 1usize..9) {
        let bvh = Bvh::build(&mesh, leaf_size);
        check_structure(&bvh, &mesh, leaf_size);
    }

    #[test]
    fn naive_and_accelerated_agree(
        mesh in arb_soup(),
        leaf_size in 1usize..9,
        origin in arb_point(),
        direction in arb_direction(),
    ) {
        let bvh = Bvh::build(&mesh, leaf_size);
        let ray = Ray::new(origin, direction);

        let (naive_found, naive, _) = cast(&bvh, &mesh, ray, Traversal::Naive);
        let (bvh_found, accelerated, hit) = cast(&bvh, &mesh, ray, Traversal::Accelerated);

        prop_assert_eq!(naive_found, bvh_found);
        let tolerance = 1e-4 * naive.t.abs().max(1.0);
        prop_assert!((naive.t - accelerated.t).abs() <= tolerance,
            "naive t = {}, accelerated t = {}", naive.t, accelerated.t);
        if bvh_found {
            prop_assert_eq!(hit.t, accelerated.t);
            prop_assert!(accelerated.t >= 0.0);
        }
    }

    #[test]
    fn best_distance_never_grows(
        mesh in arb_soup(),
        origin in arb_point(),
        direction in arb_direction(),
    ) {
        let bvh = Bvh::build(&mesh, 4);

        for traversal in Traversal::ALL {
            let (found, first, _) = cast(&bvh, &mesh, Ray::new(origin, direction), traversal);
            if !found {
                prop_assert_eq!(first.t, f32::MAX);
                continue;
            }

            // Nothing is closer than the closest hit, so the best distance
            // survives a second query untouched.
            let (found, second, _) = cast(&bvh, &mesh, first, traversal);
            prop_assert!(!found);
            prop_assert_eq!(second.t, first.t);

            let limited = Ray::with_limit(origin, direction, first.t / 2.0);
            let (found, third, _) = cast(&bvh, &mesh, limited, traversal);
            prop_assert!(!found);
            prop_assert_eq!(third.t, first.t / 2.0);
        }
    }
}

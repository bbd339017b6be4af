use std::time::Instant;

use common::{config::TraceConfig, misc::human_duration, progress::Progress};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::{
    bvh::Bvh,
    geometry::{HitInfo, Ray},
    mesh::{Mesh, Vertex},
};

/// Computes the interior distance of every vertex of a mesh.
pub struct InteriorDistances {
    config: TraceConfig,
    mesh: Mesh,
    bvh: Bvh,
    progress: Progress,
}

impl InteriorDistances {
    /// Builds the BVH for `mesh` right away. The returned batch can then be
    /// moved to another thread and run with [`InteriorDistances::compute`].
    pub fn new(config: TraceConfig, mesh: Mesh) -> Self {
        let bvh = Bvh::build(&mesh, config.leaf_size);

        let progress = Progress::new();
        progress.set_total(mesh.vertex_count() as u64);

        Self {
            config,
            mesh,
            bvh,
            progress,
        }
    }

    /// Handle counting the vertices processed so far.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn compute(mut self) -> Mesh {
        compute_interior_distances(&mut self.mesh, &self.bvh, &self.config, &self.progress);
        self.mesh
    }
}

/// Distance from `vertex` to the closest surface behind it, found by casting
/// a ray along its inverted normal. The ray starts slightly inside the mesh
/// so it does not hit the faces around the vertex. Returns `f32::MAX` if the
/// ray leaves the mesh without hitting anything.
pub fn interior_distance(bvh: &Bvh, mesh: &Mesh, vertex: &Vertex, config: &TraceConfig) -> f32 {
    let direction = -vertex.normal;
    let origin = vertex.position + direction * config.interior_ray_offset;

    let mut ray = Ray::new(origin, direction);
    let mut hit = HitInfo::default();
    bvh.intersect(mesh, &mut ray, &mut hit, config.traversal);

    ray.t
}

/// Fills in [`Vertex::distance_inner`] for every vertex of `mesh`, in
/// parallel. `bvh` must have been built from `mesh`.
pub fn compute_interior_distances(
    mesh: &mut Mesh,
    bvh: &Bvh,
    config: &TraceConfig,
    progress: &Progress,
) {
    let start = Instant::now();
    progress.set_total(mesh.vertex_count() as u64);
    progress.set_complete(0);

    if !mesh.is_manifold() {
        warn!("Mesh is not closed, some interior rays may escape it");
    }

    debug!(
        vertices = mesh.vertex_count(),
        traversal = config.traversal.name(),
        "Casting interior rays"
    );

    let shared = &*mesh;
    let distances = (shared.vertices().par_iter())
        .map(|vertex| {
            let distance = interior_distance(bvh, shared, vertex, config);
            progress.add_complete(1);
            distance
        })
        .collect::<Vec<_>>();

    for (vertex, distance) in mesh.vertices_mut().iter_mut().zip(distances) {
        vertex.distance_inner = distance;
    }

    progress.set_finished();
    info!(
        vertices = mesh.vertex_count(),
        "Computed interior distances in {}",
        human_duration(start.elapsed())
    );
}

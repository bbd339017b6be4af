use std::f32::consts::{PI, TAU};

use nalgebra::Vector3;

use crate::{
    mesh::{Mesh, Vertex},
    Pos,
};

/// Incrementally builds closed meshes out of simple shapes. All faces are
/// wound counter-clockwise when seen from outside the shape.
pub struct MeshBuilder {
    vertices: Vec<Pos>,
    faces: Vec<[u32; 3]>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, vertex: Pos) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn add_face(&mut self, face: [u32; 3]) {
        self.faces.push(face);
    }

    /// Adds a quad given its corners in counter-clockwise order.
    pub fn add_quad(&mut self, [a, b, c, d]: [u32; 4]) {
        self.add_face([a, b, c]);
        self.add_face([a, c, d]);
    }

    /// Builds the mesh, with smooth vertex normals computed from the faces.
    pub fn build(self) -> Mesh {
        let vertices = (self.vertices.into_iter())
            .map(|x| Vertex::new(x, Vector3::zeros()))
            .collect();

        let mut mesh = Mesh::new(vertices, self.faces);
        mesh.compute_vertex_normals();
        mesh
    }
}

impl MeshBuilder {
    /// Adds an axis aligned box made of eight shared corners and twelve
    /// triangles.
    pub fn add_box(&mut self, center: Pos, size: Pos) {
        let half = size / 2.0;
        // Corner `i` sits on the positive side of axis `n` if bit `n` is set.
        let corners = (0..8)
            .map(|i| {
                let sign = Vector3::new(i & 1, (i >> 1) & 1, (i >> 2) & 1)
                    .map(|bit| if bit == 1 { 1.0 } else { -1.0 });
                self.add_vertex(center + half.component_mul(&sign))
            })
            .collect::<Vec<_>>();

        for quad in [
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
        ] {
            self.add_quad(quad.map(|x| corners[x]));
        }
    }

    /// Adds a UV sphere with `rings` latitude bands and `segments` longitude
    /// bands. The poles are on the z axis.
    pub fn add_uv_sphere(&mut self, center: Pos, radius: f32, rings: u32, segments: u32) {
        assert!(rings >= 2 && segments >= 3, "Sphere is too coarse");

        let top = self.add_vertex(center + Vector3::z() * radius);
        let mut bands = Vec::with_capacity(rings as usize - 1);
        for ring in 1..rings {
            let phi = PI * ring as f32 / rings as f32;
            let band = (0..segments)
                .map(|segment| {
                    let theta = TAU * segment as f32 / segments as f32;
                    let direction = Vector3::new(
                        phi.sin() * theta.cos(),
                        phi.sin() * theta.sin(),
                        phi.cos(),
                    );
                    self.add_vertex(center + direction * radius)
                })
                .collect::<Vec<_>>();
            bands.push(band);
        }
        let bottom = self.add_vertex(center - Vector3::z() * radius);

        let next = |segment: usize| (segment + 1) % segments as usize;
        for segment in 0..segments as usize {
            let (first, last) = (&bands[0], &bands[bands.len() - 1]);
            self.add_face([top, first[segment], first[next(segment)]]);
            self.add_face([bottom, last[next(segment)], last[segment]]);
        }

        for pair in bands.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            for segment in 0..segments as usize {
                let j = next(segment);
                self.add_quad([upper[segment], lower[segment], lower[j], upper[j]]);
            }
        }
    }

    /// Adds a closed cylinder (or cone frustum) standing on the xy plane at
    /// `bottom`.
    pub fn add_vertical_cylinder(
        &mut self,
        bottom: Pos,
        height: f32,
        (bottom_radius, top_radius): (f32, f32),
        precision: u32,
    ) {
        assert!(precision >= 3, "Cylinder needs at least three sides");

        let top = bottom + Vector3::new(0.0, 0.0, height);
        let bottom_center = self.add_vertex(bottom);
        let top_center = self.add_vertex(top);

        let mut rim = Vec::with_capacity(precision as usize);
        for i in 0..precision {
            let angle = TAU * (i as f32) / (precision as f32);
            let normal = Vector3::new(angle.cos(), angle.sin(), 0.0);

            let top = self.add_vertex(top + normal * top_radius);
            let bottom = self.add_vertex(bottom + normal * bottom_radius);
            rim.push((top, bottom));
        }

        for i in 0..rim.len() {
            let (top, bottom) = rim[i];
            let (next_top, next_bottom) = rim[(i + 1) % rim.len()];

            self.add_quad([top, bottom, next_bottom, next_top]);
            self.add_face([top_center, top, next_top]);
            self.add_face([bottom_center, next_bottom, bottom]);
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

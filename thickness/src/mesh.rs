use std::collections::HashMap;

use common::misc::linear_map;
use tracing::debug;

use crate::{geometry::aabb::AxisAlignedBox, Pos, TexCoord};

/// One mesh vertex along with the interior distance computed for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Pos,
    pub normal: Pos,
    pub tex_coord: TexCoord,
    /// Distance from the vertex to the nearest surface along the inverted
    /// normal. Infinite until computed, `f32::MAX` if the ray escaped.
    pub distance_inner: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse color.
    pub kd: Pos,
    /// Specular color.
    pub ks: Pos,
    pub shininess: f32,
    pub transparency: f32,
}

/// A triangle mesh with per-vertex attributes and a single material.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    triangles: Vec<[u32; 3]>,
    pub material: Material,
}

impl Vertex {
    pub fn new(position: Pos, normal: Pos) -> Self {
        Self {
            position,
            normal,
            ..Default::default()
        }
    }
}

impl Mesh {
    /// Creates a mesh from vertices and triangles. Every index in `triangles`
    /// must point into `vertices`.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>) -> Self {
        debug_assert!(
            triangles.iter().flatten().all(|&x| (x as usize) < vertices.len()),
            "Triangle index out of range"
        );

        Self {
            vertices,
            triangles,
            material: Material::default(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn triangle_vertices(&self, index: usize) -> [&Vertex; 3] {
        self.triangles[index].map(|x| &self.vertices[x as usize])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Geometric normal of a triangle, following counter-clockwise winding.
    pub fn face_normal(&self, index: usize) -> Pos {
        let [v0, v1, v2] = self.triangle_vertices(index).map(|x| x.position);
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }

    pub fn bounds(&self) -> AxisAlignedBox {
        let mut bounds = AxisAlignedBox::empty();
        self.vertices
            .iter()
            .for_each(|x| bounds.expand_point(x.position));
        bounds
    }

    /// Recomputes every vertex normal as the area weighted average of the
    /// normals of the faces it is part of.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Pos::zeros(); self.vertices.len()];
        for face in self.triangles.iter() {
            let [v0, v1, v2] = face.map(|x| self.vertices[x as usize].position);
            // The cross product magnitude is twice the face area.
            let normal = (v1 - v0).cross(&(v2 - v0));
            face.iter().for_each(|&x| normals[x as usize] += normal);
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Pos::zeros);
        }
    }

    /// Centers the mesh on its bounding box and scales it uniformly so its
    /// longest side has a length of one.
    pub fn normalize(&mut self) {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return;
        }

        let center = bounds.center();
        let extent = bounds.extent().max();
        let scale = if extent > 0.0 { extent.recip() } else { 1.0 };

        debug!(?center, scale, "Normalizing mesh");
        self.vertices
            .iter_mut()
            .for_each(|x| x.position = (x.position - center) * scale);
    }

    /// Mirrors the mesh along the given axis. Triangle winding is reversed so
    /// faces keep pointing outwards.
    pub fn flip(&mut self, axis: usize) {
        assert!(axis < 3, "Axis must be 0, 1 or 2");
        for vertex in self.vertices.iter_mut() {
            vertex.position[axis] = -vertex.position[axis];
            vertex.normal[axis] = -vertex.normal[axis];
        }

        self.triangles.iter_mut().for_each(|x| x.swap(1, 2));
    }

    /// Concatenates meshes into one, keeping the material of the first.
    pub fn merge(meshes: &[Mesh]) -> Mesh {
        let mut out = Mesh {
            material: meshes.first().map(|x| x.material).unwrap_or_default(),
            ..Default::default()
        };

        for mesh in meshes {
            let base = out.vertices.len() as u32;
            out.vertices.extend_from_slice(&mesh.vertices);
            (out.triangles).extend(mesh.triangles.iter().map(|x| x.map(|i| i + base)));
        }

        out
    }

    /// Checks if every edge is shared by exactly two triangles. Interior
    /// distances are only meaningful for closed meshes.
    pub fn is_manifold(&self) -> bool {
        let mut edges = HashMap::<_, u8>::new();

        for [a, b, c] in self.triangles.iter() {
            for (a, b) in [(a, b), (b, c), (c, a)] {
                *edges.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }

        !edges.is_empty() && edges.values().all(|&count| count == 2)
    }

    /// Minimum and maximum of the computed interior distances, ignoring
    /// vertices whose ray escaped the mesh or that were never computed.
    pub fn distance_range(&self) -> Option<(f32, f32)> {
        (self.vertices.iter())
            .map(|x| x.distance_inner)
            .filter(|&x| x.is_finite() && x < f32::MAX)
            .fold(None, |range, x| match range {
                None => Some((x, x)),
                Some((min, max)) => Some((x.min(min), x.max(max))),
            })
    }

    /// Interior distances mapped into `[0, 1]` over [`Mesh::distance_range`].
    /// Vertices without a distance map to one.
    pub fn normalized_distances(&self) -> Vec<f32> {
        let range = self.distance_range();
        (self.vertices.iter())
            .map(|x| x.distance_inner)
            .map(|distance| match range {
                _ if !distance.is_finite() || distance == f32::MAX => 1.0,
                Some((min, max)) if max > min => linear_map(distance, (min, max), (0.0, 1.0)),
                Some(_) => 0.0,
                None => 1.0,
            })
            .collect()
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Pos::zeros(),
            normal: Pos::zeros(),
            tex_coord: TexCoord::zeros(),
            distance_inner: f32::INFINITY,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Pos::repeat(1.0),
            ks: Pos::zeros(),
            shininess: 1.0,
            transparency: 1.0,
        }
    }
}

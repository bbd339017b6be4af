use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use common::config::{TraceConfig, Traversal};
use nalgebra::{ArrayStorage, Const, Matrix, Scalar, Vector3, U1};
use num_traits::Zero;

use thickness::{builder::MeshBuilder, mesh::Mesh};

#[derive(Debug, Parser)]
/// Computes the interior distance of every vertex of a procedural mesh.
pub struct Args {
    #[arg(long, value_enum, default_value_t = Shape::Sphere)]
    /// Shape to generate.
    pub shape: Shape,
    #[arg(long, default_value = "2.0, 2.0, 2.0", value_parser = vector_value_parser::<f32, 3>)]
    /// Size of the shape along the X, Y, and Z axes. Spheres and cylinders
    /// use the X size as their diameter.
    pub size: Vector3<f32>,
    #[arg(long, default_value_t = 64)]
    /// Number of segments around curved shapes.
    pub resolution: u32,
    #[arg(long)]
    /// Scale the mesh to fit in a unit box centered on the origin.
    pub normalize: bool,

    #[arg(long)]
    /// Path to a TOML trace config. Missing fields use their defaults.
    pub config: Option<PathBuf>,
    #[arg(long)]
    /// Test every triangle for each ray instead of using the BVH.
    pub naive: bool,
    #[arg(long)]
    /// Overrides the maximum number of triangles per BVH leaf.
    pub leaf_size: Option<usize>,
    #[arg(long)]
    /// Log everything, including per stage timings.
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shape {
    Box,
    Sphere,
    Cylinder,
}

impl Args {
    pub fn trace_config(&self) -> Result<TraceConfig> {
        let mut config = match &self.config {
            Some(path) => TraceConfig::load(path)?,
            None => TraceConfig::default(),
        };

        if self.naive {
            config.traversal = Traversal::Naive;
        }

        if let Some(leaf_size) = self.leaf_size {
            anyhow::ensure!(leaf_size >= 1, "--leaf-size must be at least 1");
            config.leaf_size = leaf_size;
        }

        Ok(config)
    }

    pub fn mesh(&self) -> Result<Mesh> {
        anyhow::ensure!(
            self.size.iter().all(|&x| x.is_finite() && x > 0.0),
            "Shape size must be positive"
        );

        let mut builder = MeshBuilder::new();
        let resolution = self.resolution.max(3);
        match self.shape {
            Shape::Box => builder.add_box(Vector3::zeros(), self.size),
            Shape::Sphere => {
                let rings = (resolution / 2).max(2);
                builder.add_uv_sphere(Vector3::zeros(), self.size.x / 2.0, rings, resolution)
            }
            Shape::Cylinder => {
                let radius = self.size.x / 2.0;
                let bottom = Vector3::new(0.0, 0.0, -self.size.z / 2.0);
                builder.add_vertical_cylinder(bottom, self.size.z, (radius, radius), resolution)
            }
        }

        let mut mesh = builder.build();
        if self.normalize {
            mesh.normalize();
        }

        Ok(mesh)
    }
}

fn vector_value_parser<T, const N: usize>(
    raw: &str,
) -> Result<Matrix<T, Const<N>, U1, ArrayStorage<T, N, 1>>>
where
    T: FromStr + Scalar + Zero,
    T::Err: Send + Sync + std::error::Error,
{
    let mut vec = Matrix::<T, Const<N>, U1, ArrayStorage<T, N, 1>>::zeros();

    let mut parts = raw.splitn(N, ',');
    for i in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        vec[i] = element
            .parse()
            .context("Can't convert element from string")?;
    }

    Ok(vec)
}
